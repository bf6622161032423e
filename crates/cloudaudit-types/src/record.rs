use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;

/// Stable schema identifier for a single audit record.
pub const SCHEMA_AUDIT_RECORD_V1: &str = "cloudaudit.audit_record.v1";

/// Compliance state of one resource under one rule.
///
/// `Unknown` is reserved for evaluation failures; rules themselves only report
/// `Ok`, `Warning` or `Fail`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditState {
    Ok,
    Fail,
    Unknown,
    Warning,
}

impl AuditState {
    pub fn as_str(self) -> &'static str {
        match self {
            AuditState::Ok => "OK",
            AuditState::Fail => "FAIL",
            AuditState::Unknown => "UNKNOWN",
            AuditState::Warning => "WARNING",
        }
    }
}

impl fmt::Display for AuditState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Aws,
}

/// Normalized audit record for one (resource, rule) pair.
///
/// Field names and order are part of the wire format consumed by downstream tooling.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub provider: Provider,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub physical_id: String,
    pub region: String,
    pub service: String,
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub time: OffsetDateTime,
    pub rule: String,
    pub state: AuditState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
}

/// A region whose enumeration was aborted after a non-fatal provider error.
///
/// Returned next to the records so callers can tell a partial scan from a complete one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RegionWarning {
    pub region: String,
    pub message: String,
}
