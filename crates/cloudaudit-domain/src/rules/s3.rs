use super::utils::{attr, bool_attr, str_attr};
use super::{RuleDefinition, RuleOutcome};
use crate::model::ResourceDescriptor;
use crate::services::ServiceKind;
use cloudaudit_types::ids;
use serde_json::Value;

pub const ENCRYPTION_AT_REST: RuleDefinition = RuleDefinition {
    name: ids::RULE_ENCRYPTION_AT_REST,
    service: ServiceKind::S3,
    title: "S3 buckets have default encryption",
    description: "\
Checks the bucket's default server-side encryption configuration. Objects written without an
explicit encryption header are only protected when the bucket has a default rule.",
    remediation: "\
Configure default encryption (SSE-KMS recommended):
  aws s3api put-bucket-encryption --bucket <bucket> --server-side-encryption-configuration \\
    '{\"Rules\":[{\"ApplyServerSideEncryptionByDefault\":{\"SSEAlgorithm\":\"aws:kms\"}}]}'",
    evaluate: encryption_at_rest,
};

pub const PUBLIC_ACCESS_BLOCK: RuleDefinition = RuleDefinition {
    name: ids::RULE_PUBLIC_ACCESS_BLOCK,
    service: ServiceKind::S3,
    title: "S3 buckets block public access",
    description: "\
Checks that all four public access block settings are enabled on the bucket.",
    remediation: "\
Enable every public access block setting:
  aws s3api put-public-access-block --bucket <bucket> --public-access-block-configuration \\
    BlockPublicAcls=true,IgnorePublicAcls=true,BlockPublicPolicy=true,RestrictPublicBuckets=true",
    evaluate: public_access_block,
};

const PUBLIC_ACCESS_SETTINGS: [&str; 4] = [
    "BlockPublicAcls",
    "IgnorePublicAcls",
    "BlockPublicPolicy",
    "RestrictPublicBuckets",
];

fn encryption_at_rest(resource: &ResourceDescriptor) -> RuleOutcome {
    let rules = attr(&resource.raw, &["ServerSideEncryptionConfiguration", "Rules"])
        .and_then(Value::as_array);
    let Some(rules) = rules.filter(|r| !r.is_empty()) else {
        return RuleOutcome::fail("bucket has no default encryption rule");
    };

    let algorithms: Vec<&str> = rules
        .iter()
        .filter_map(|r| str_attr(r, &["ApplyServerSideEncryptionByDefault", "SSEAlgorithm"]))
        .collect();

    if algorithms.iter().any(|a| a.starts_with("aws:kms")) {
        RuleOutcome::ok()
    } else if algorithms.contains(&"AES256") {
        RuleOutcome::ok_with("encrypted with S3 managed keys (AES256)")
    } else {
        RuleOutcome::fail("default encryption rule does not name a supported algorithm")
    }
}

fn public_access_block(resource: &ResourceDescriptor) -> RuleOutcome {
    let Some(config) = attr(&resource.raw, &["PublicAccessBlockConfiguration"]) else {
        return RuleOutcome::fail("bucket has no public access block configuration");
    };

    let disabled: Vec<&str> = PUBLIC_ACCESS_SETTINGS
        .into_iter()
        .filter(|setting| bool_attr(config, &[setting]) != Some(true))
        .collect();

    if disabled.is_empty() {
        RuleOutcome::ok()
    } else {
        RuleOutcome::fail(format!("public access block not enforced: {}", disabled.join(", ")))
    }
}
