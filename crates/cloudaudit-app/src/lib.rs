//! Use case orchestration for cloudaudit.
//!
//! This crate provides the application layer: use cases that coordinate the domain, provider,
//! settings, and render layers. The CLI crate depends on this and only handles argument parsing,
//! I/O, and exit codes.

#![forbid(unsafe_code)]

mod audit;
mod explain;
mod logging;
mod render;
mod rules;
mod scan;

#[cfg(test)]
mod test_support;

pub use audit::{AuditInput, AuditOutput, run_audit, verdict_exit_code};
pub use explain::{ExplainOutput, format_explanation, format_not_found, run_explain};
pub use logging::init_tracing;
pub use render::{render_output, write_records_file, write_render};
pub use rules::{format_rule_list, list_rules};
pub use scan::{ScanError, ScanOptions, ScanOutput, run_batch, run_scan};
