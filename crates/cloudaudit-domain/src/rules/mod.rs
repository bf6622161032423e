//! Rule contract and the static rule registry.
//!
//! Rules are pure functions from a descriptor to an outcome. They never report
//! `UNKNOWN`; that state belongs to the engine when an evaluation cannot complete.

use crate::model::ResourceDescriptor;
use crate::services::ServiceKind;
use cloudaudit_types::AuditState;
use std::fmt;

mod dynamodb;
mod ec2;
mod lambda;
mod rds;
mod s3;
mod utils;


/// Result of evaluating one rule against one resource.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleOutcome {
    pub state: AuditState,
    pub comment: Option<String>,
}

impl RuleOutcome {
    pub fn ok() -> Self {
        Self {
            state: AuditState::Ok,
            comment: None,
        }
    }

    pub fn ok_with(comment: impl Into<String>) -> Self {
        Self {
            state: AuditState::Ok,
            comment: Some(comment.into()),
        }
    }

    pub fn fail(comment: impl Into<String>) -> Self {
        Self {
            state: AuditState::Fail,
            comment: Some(comment.into()),
        }
    }

    pub fn warning(comment: impl Into<String>) -> Self {
        Self {
            state: AuditState::Warning,
            comment: Some(comment.into()),
        }
    }

    /// Evaluation could not complete. Only the engine produces this.
    pub fn unknown(comment: impl Into<String>) -> Self {
        Self {
            state: AuditState::Unknown,
            comment: Some(comment.into()),
        }
    }
}

/// A named compliance rule for one service.
#[derive(Clone, Copy)]
pub struct RuleDefinition {
    pub name: &'static str,
    pub service: ServiceKind,
    pub title: &'static str,
    pub description: &'static str,
    pub remediation: &'static str,
    pub evaluate: fn(&ResourceDescriptor) -> RuleOutcome,
}

impl fmt::Debug for RuleDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleDefinition")
            .field("name", &self.name)
            .field("service", &self.service)
            .finish_non_exhaustive()
    }
}

impl RuleDefinition {
    pub fn evaluate(&self, resource: &ResourceDescriptor) -> RuleOutcome {
        (self.evaluate)(resource)
    }
}

static REGISTRY: &[RuleDefinition] = &[
    dynamodb::ENCRYPTION_AT_REST,
    dynamodb::POINT_IN_TIME_RECOVERY,
    s3::ENCRYPTION_AT_REST,
    s3::PUBLIC_ACCESS_BLOCK,
    ec2::EBS_ENCRYPTION,
    rds::ENCRYPTION_AT_REST,
    rds::PUBLIC_ACCESS,
    lambda::SUPPORTED_RUNTIME,
];

/// Every registered rule, grouped by service in registration order.
pub fn all() -> &'static [RuleDefinition] {
    REGISTRY
}

/// Rules registered for one service.
pub fn for_service(service: ServiceKind) -> impl Iterator<Item = &'static RuleDefinition> {
    REGISTRY.iter().filter(move |r| r.service == service)
}

/// Find a rule by service and name. Rule names match case-insensitively.
pub fn lookup(service: ServiceKind, name: &str) -> Option<&'static RuleDefinition> {
    for_service(service).find(|r| r.name.eq_ignore_ascii_case(name.trim()))
}
