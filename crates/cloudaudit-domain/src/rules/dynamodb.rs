use super::utils::{attr, shape_of, str_attr};
use super::{RuleDefinition, RuleOutcome};
use crate::model::ResourceDescriptor;
use crate::services::ServiceKind;
use cloudaudit_types::ids;

pub const ENCRYPTION_AT_REST: RuleDefinition = RuleDefinition {
    name: ids::RULE_ENCRYPTION_AT_REST,
    service: ServiceKind::DynamoDb,
    title: "DynamoDB tables use KMS encryption at rest",
    description: "\
Checks the table's server-side encryption description. Tables without an SSE description
are encrypted with an AWS owned key, which cannot be audited, rotated, or revoked by the
account owner.",
    remediation: "\
Enable server-side encryption with an AWS managed or customer managed KMS key:
  aws dynamodb update-table --table-name <table> --sse-specification Enabled=true,SSEType=KMS",
    evaluate: encryption_at_rest,
};

pub const POINT_IN_TIME_RECOVERY: RuleDefinition = RuleDefinition {
    name: ids::RULE_POINT_IN_TIME_RECOVERY,
    service: ServiceKind::DynamoDb,
    title: "DynamoDB tables have point-in-time recovery enabled",
    description: "\
Checks the table's continuous backup settings. Without point-in-time recovery an accidental
write or delete cannot be rolled back.",
    remediation: "\
Enable continuous backups:
  aws dynamodb update-continuous-backups --table-name <table> \\
    --point-in-time-recovery-specification PointInTimeRecoveryEnabled=true",
    evaluate: point_in_time_recovery,
};

fn encryption_at_rest(resource: &ResourceDescriptor) -> RuleOutcome {
    let Some(sse) = attr(&resource.raw, &["SSEDescription"]) else {
        return RuleOutcome::fail("table is encrypted with an AWS owned key; KMS encryption is not enabled");
    };
    if !sse.is_object() {
        return RuleOutcome::fail(format!(
            "SSEDescription is {}, expected an object",
            shape_of(sse)
        ));
    }

    match str_attr(sse, &["Status"]) {
        Some("ENABLED") => RuleOutcome::ok(),
        Some(status @ ("ENABLING" | "UPDATING")) => RuleOutcome::warning(format!(
            "server-side encryption change in progress (status {status})"
        )),
        Some(status) => RuleOutcome::fail(format!("server-side encryption status is {status}")),
        None => RuleOutcome::fail("server-side encryption status is not reported"),
    }
}

fn point_in_time_recovery(resource: &ResourceDescriptor) -> RuleOutcome {
    let status = str_attr(
        &resource.raw,
        &[
            "ContinuousBackupsDescription",
            "PointInTimeRecoveryDescription",
            "PointInTimeRecoveryStatus",
        ],
    );

    match status {
        Some("ENABLED") => RuleOutcome::ok(),
        Some(other) => RuleOutcome::fail(format!("point-in-time recovery is {other}")),
        None => RuleOutcome::warning("continuous backup settings were not reported for this table"),
    }
}
