use crate::engine::Evaluation;
use crate::model::{Domain, RegionSelector, ResourceDescriptor, ScanScope};
use crate::rules::RuleOutcome;
use serde_json::Value;

pub fn descriptor(id: &str, region: &str, raw: Value) -> ResourceDescriptor {
    ResourceDescriptor {
        physical_id: id.to_string(),
        friendly_name: None,
        region: region.to_string(),
        raw,
    }
}

pub fn scope(region: &str) -> ScanScope {
    let region = region.parse::<RegionSelector>().expect("valid region");
    ScanScope::new(region, "default", Domain::Public)
}

pub fn evaluation(id: &str, region: &str) -> Evaluation {
    Evaluation {
        resource: descriptor(id, region, Value::Null).identity(),
        outcome: RuleOutcome::ok(),
    }
}

pub fn regions(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}
