use crate::model::{ResourceDescriptor, ResourceIdentity};
use crate::rules::{RuleDefinition, RuleOutcome};
use std::any::Any;
use std::cmp::Ordering;
use std::panic::{self, AssertUnwindSafe};

/// Outcome of one rule for one observed resource, before it becomes a record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Evaluation {
    pub resource: ResourceIdentity,
    pub outcome: RuleOutcome,
}

/// Evaluate `rule` against `resource`, converting a panicking rule into an `UNKNOWN` outcome.
///
/// Rules are not supposed to panic; when one does, the failure stays with this resource.
pub fn evaluate_isolated(rule: &RuleDefinition, resource: &ResourceDescriptor) -> RuleOutcome {
    match panic::catch_unwind(AssertUnwindSafe(|| rule.evaluate(resource))) {
        Ok(outcome) => outcome,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::warn!(
                rule = rule.name,
                service = %rule.service,
                resource = %resource.physical_id,
                region = %resource.region,
                error = %message,
                "rule evaluation failed; recording UNKNOWN"
            );
            RuleOutcome::unknown(format!("rule evaluation failed: {message}"))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "rule panicked".to_string()
    }
}

/// Sort evaluations by region (position in `region_order`), then physical id.
///
/// Regions missing from `region_order` sort after the known ones, by name.
pub fn sort_evaluations(evaluations: &mut [Evaluation], region_order: &[String]) {
    evaluations.sort_by(|a, b| compare_evaluations(a, b, region_order));
}

fn compare_evaluations(a: &Evaluation, b: &Evaluation, region_order: &[String]) -> Ordering {
    let rank = |region: &str| {
        region_order
            .iter()
            .position(|r| r == region)
            .unwrap_or(usize::MAX)
    };

    rank(&a.resource.region)
        .cmp(&rank(&b.resource.region))
        .then_with(|| a.resource.region.cmp(&b.resource.region))
        .then_with(|| a.resource.physical_id.cmp(&b.resource.physical_id))
}
