//! Config parsing and resolution.
//!
//! This crate is IO-free: it parses and resolves configuration provided as strings.

#![forbid(unsafe_code)]

mod model;
mod resolve;

pub use model::{CloudauditConfigV1, RetryConfig, SCHEMA_CONFIG_V1};
pub use resolve::{
    DEFAULT_WORKERS, MAX_WORKERS, Overrides, ResolvedConfig, parse_fail_on, parse_format,
};

/// Parse `cloudaudit.toml` into a typed model.
pub fn parse_config_toml(input: &str) -> anyhow::Result<CloudauditConfigV1> {
    let cfg: CloudauditConfigV1 = toml::from_str(input)?;
    Ok(cfg)
}

/// Resolve the effective settings (defaults, then file, then overrides).
pub fn resolve_config(
    cfg: CloudauditConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    resolve::resolve_config(cfg, overrides)
}
