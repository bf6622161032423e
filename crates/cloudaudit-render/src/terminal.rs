use crate::Verbosity;
use cloudaudit_types::{AuditRecord, AuditState, RegionWarning};

/// Display order of the state groups: most actionable first.
const GROUP_ORDER: [AuditState; 4] = [
    AuditState::Fail,
    AuditState::Warning,
    AuditState::Unknown,
    AuditState::Ok,
];

/// Human-readable table grouped by state, then physical id.
///
/// Returns an empty string under `Verbosity::Silent`.
pub fn render_terminal(
    records: &[AuditRecord],
    warnings: &[RegionWarning],
    verbosity: Verbosity,
) -> String {
    if verbosity == Verbosity::Silent {
        return String::new();
    }

    let mut out = String::new();
    if records.is_empty() {
        out.push_str("No resources found.\n");
    }

    let id_width = records
        .iter()
        .map(|r| r.physical_id.len())
        .max()
        .unwrap_or(0);
    let region_width = records.iter().map(|r| r.region.len()).max().unwrap_or(0);

    let mut counts = Vec::with_capacity(GROUP_ORDER.len());
    for state in GROUP_ORDER {
        let mut group: Vec<&AuditRecord> = records.iter().filter(|r| r.state == state).collect();
        counts.push((state, group.len()));
        if group.is_empty() {
            continue;
        }
        // Stable: records sharing an id keep their incoming (region) order.
        group.sort_by(|a, b| a.physical_id.cmp(&b.physical_id));

        out.push_str(&format!("{} ({})\n", state, group.len()));
        for r in group {
            out.push_str(&format!(
                "  {:<id_width$}  {:<region_width$}  {}/{}",
                r.physical_id, r.region, r.service, r.rule
            ));
            if let Some(name) = &r.name {
                out.push_str(&format!("  [{name}]"));
            }
            if let Some(comment) = &r.comment {
                out.push_str(&format!("  - {comment}"));
            }
            out.push('\n');
        }
        out.push('\n');
    }

    let summary: Vec<String> = counts
        .iter()
        .map(|(state, n)| format!("{n} {state}"))
        .collect();
    out.push_str(&format!(
        "Summary: {} record(s): {}\n",
        records.len(),
        summary.join(", ")
    ));

    if !warnings.is_empty() {
        out.push_str(&format!(
            "\nPartial scan: {} region(s) could not be enumerated\n",
            warnings.len()
        ));
        for w in warnings {
            out.push_str(&format!("  {}: {}\n", w.region, w.message));
        }
    }

    out
}
