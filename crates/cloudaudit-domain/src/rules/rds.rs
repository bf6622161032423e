use super::utils::bool_attr;
use super::{RuleDefinition, RuleOutcome};
use crate::model::ResourceDescriptor;
use crate::services::ServiceKind;
use cloudaudit_types::ids;

pub const ENCRYPTION_AT_REST: RuleDefinition = RuleDefinition {
    name: ids::RULE_ENCRYPTION_AT_REST,
    service: ServiceKind::Rds,
    title: "RDS instances use encrypted storage",
    description: "\
Checks the `StorageEncrypted` flag of each database instance.",
    remediation: "\
Storage encryption is fixed at creation. Restore an encrypted copy of the latest snapshot
into a new instance and cut over.",
    evaluate: encryption_at_rest,
};

pub const PUBLIC_ACCESS: RuleDefinition = RuleDefinition {
    name: ids::RULE_PUBLIC_ACCESS,
    service: ServiceKind::Rds,
    title: "RDS instances are not publicly accessible",
    description: "\
Checks the `PubliclyAccessible` flag. A publicly accessible instance resolves to a public IP
address and is reachable from outside the VPC wherever security groups allow it.",
    remediation: "\
Disable public access:
  aws rds modify-db-instance --db-instance-identifier <id> --no-publicly-accessible --apply-immediately",
    evaluate: public_access,
};

fn encryption_at_rest(resource: &ResourceDescriptor) -> RuleOutcome {
    match bool_attr(&resource.raw, &["StorageEncrypted"]) {
        Some(true) => RuleOutcome::ok(),
        Some(false) => RuleOutcome::fail("instance storage is not encrypted"),
        None => RuleOutcome::fail("storage encryption flag was not reported; treating as unencrypted"),
    }
}

fn public_access(resource: &ResourceDescriptor) -> RuleOutcome {
    match bool_attr(&resource.raw, &["PubliclyAccessible"]) {
        Some(true) => RuleOutcome::fail("instance is publicly accessible"),
        Some(false) | None => RuleOutcome::ok(),
    }
}
