//! The `explain` use case: look up rule documentation.

use cloudaudit_domain::{RuleDefinition, ServiceKind, rules};

/// Output from the explain use case.
#[derive(Clone, Debug)]
pub enum ExplainOutput {
    Found(&'static RuleDefinition),
    /// Unknown service or rule; includes every registered `service/rule` pair.
    NotFound {
        identifier: String,
        available: Vec<String>,
    },
}

/// Look up a rule by service and rule name.
pub fn run_explain(service: &str, rule: &str) -> ExplainOutput {
    let found = service
        .parse::<ServiceKind>()
        .ok()
        .and_then(|service| rules::lookup(service, rule));

    match found {
        Some(def) => ExplainOutput::Found(def),
        None => ExplainOutput::NotFound {
            identifier: format!("{service}/{rule}"),
            available: rules::all()
                .iter()
                .map(|r| format!("{}/{}", r.service, r.name))
                .collect(),
        },
    }
}

/// Format a rule explanation for terminal display.
pub fn format_explanation(rule: &RuleDefinition) -> String {
    let heading = format!("{}/{}: {}", rule.service, rule.name, rule.title);
    let mut out = String::new();

    out.push_str(&heading);
    out.push('\n');
    out.push_str(&"=".repeat(heading.len()));
    out.push_str("\n\n");
    out.push_str(rule.description);
    out.push_str("\n\n");
    out.push_str("Remediation\n");
    out.push_str("-----------\n");
    out.push_str(rule.remediation);
    out.push('\n');

    out
}

/// Format the "not found" error message for terminal display.
pub fn format_not_found(identifier: &str, available: &[String]) -> String {
    let mut out = String::new();

    out.push_str(&format!("Unknown rule: {}\n\n", identifier));
    out.push_str("Available rules:\n");
    for id in available {
        out.push_str(&format!("  - {}\n", id));
    }

    out
}
