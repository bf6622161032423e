//! Pure compliance evaluation (no I/O).
//!
//! Input: resource descriptors produced elsewhere plus a rule from the static registry.
//! Output: rule outcomes, ordered evaluations, and audit records.

#![forbid(unsafe_code)]

pub mod audit;
pub mod model;
pub mod regions;
pub mod report;
pub mod rules;
pub mod services;

mod engine;

#[cfg(test)]
pub(crate) mod test_support;

pub use audit::{AuditRecordBuilder, Clock, SystemClock};
pub use engine::{Evaluation, evaluate_isolated, sort_evaluations};
pub use model::{
    Domain, ParseError, RegionSelector, ResourceDescriptor, ResourceIdentity, ScanScope,
};
pub use rules::{RuleDefinition, RuleOutcome};
pub use services::ServiceKind;
