//! Stable DTOs and IDs used across the cloudaudit workspace.
//!
//! This crate is intentionally boring:
//! - the audit record emitted per (resource, rule) pair
//! - the closed set of audit states
//! - stable string IDs for services and rules

#![forbid(unsafe_code)]

pub mod ids;
pub mod record;

pub use record::{AuditRecord, AuditState, Provider, RegionWarning, SCHEMA_AUDIT_RECORD_V1};
