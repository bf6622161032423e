//! Rule listing.

use cloudaudit_domain::{RuleDefinition, ServiceKind, rules};

pub fn list_rules(service: Option<ServiceKind>) -> Vec<&'static RuleDefinition> {
    match service {
        Some(service) => rules::for_service(service).collect(),
        None => rules::all().iter().collect(),
    }
}

/// One line per rule: `service  name  title`, columns aligned.
pub fn format_rule_list(rules: &[&RuleDefinition]) -> String {
    let service_width = rules
        .iter()
        .map(|r| r.service.as_str().len())
        .max()
        .unwrap_or(0);
    let name_width = rules.iter().map(|r| r.name.len()).max().unwrap_or(0);

    let mut out = String::new();
    for r in rules {
        out.push_str(&format!(
            "{:<service_width$}  {:<name_width$}  {}\n",
            r.service.as_str(),
            r.name,
            r.title
        ));
    }
    out
}
