use super::utils::bool_attr;
use super::{RuleDefinition, RuleOutcome};
use crate::model::ResourceDescriptor;
use crate::services::ServiceKind;
use cloudaudit_types::ids;

pub const EBS_ENCRYPTION: RuleDefinition = RuleDefinition {
    name: ids::RULE_EBS_ENCRYPTION,
    service: ServiceKind::Ec2,
    title: "EBS volumes are encrypted",
    description: "\
Checks the `Encrypted` flag of each EBS volume.",
    remediation: "\
Volumes cannot be encrypted in place. Snapshot the volume, copy the snapshot with
`--encrypted`, create a new volume from the copy, and swap it in. Enable
`aws ec2 enable-ebs-encryption-by-default` to cover future volumes.",
    evaluate: ebs_encryption,
};

fn ebs_encryption(resource: &ResourceDescriptor) -> RuleOutcome {
    match bool_attr(&resource.raw, &["Encrypted"]) {
        Some(true) => RuleOutcome::ok(),
        Some(false) => RuleOutcome::fail("volume is not encrypted"),
        None => RuleOutcome::warning("volume encryption flag was not reported"),
    }
}
