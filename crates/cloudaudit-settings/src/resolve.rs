use crate::model::CloudauditConfigV1;
use anyhow::Context;
use cloudaudit_domain::report::FailOn;
use cloudaudit_provider::RetryPolicy;
use cloudaudit_render::Format;
use std::time::Duration;

pub const DEFAULT_WORKERS: usize = 8;
pub const MAX_WORKERS: usize = 16;
const MAX_ATTEMPTS: u32 = 10;

#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub workers: Option<u32>,
    pub fail_on: Option<String>,
    pub format: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedConfig {
    pub workers: usize,
    pub fail_on: FailOn,
    pub format: Format,
    pub retry: RetryPolicy,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            fail_on: FailOn::default(),
            format: Format::default(),
            retry: RetryPolicy::default(),
        }
    }
}

pub fn resolve_config(
    cfg: CloudauditConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    let mut resolved = ResolvedConfig::default();

    if let Some(workers) = overrides.workers.or(cfg.workers) {
        resolved.workers = parse_workers(workers)?;
    }

    if let Some(fail_on) = overrides.fail_on.as_deref().or(cfg.fail_on.as_deref()) {
        resolved.fail_on = parse_fail_on(fail_on)?;
    }

    if let Some(format) = overrides.format.as_deref().or(cfg.format.as_deref()) {
        resolved.format = parse_format(format)?;
    }

    let retry = &cfg.retry;
    if let Some(attempts) = retry.max_attempts {
        if attempts == 0 || attempts > MAX_ATTEMPTS {
            anyhow::bail!("retry.max_attempts must be between 1 and {MAX_ATTEMPTS}, got {attempts}");
        }
        resolved.retry.max_attempts = attempts;
    }
    if let Some(ms) = retry.base_delay_ms {
        resolved.retry.base_delay = Duration::from_millis(ms);
    }
    if let Some(ms) = retry.max_delay_ms {
        resolved.retry.max_delay = Duration::from_millis(ms);
    }
    if resolved.retry.base_delay > resolved.retry.max_delay {
        anyhow::bail!(
            "retry.base_delay_ms ({}) exceeds retry.max_delay_ms ({})",
            resolved.retry.base_delay.as_millis(),
            resolved.retry.max_delay.as_millis()
        );
    }

    Ok(resolved)
}

fn parse_workers(v: u32) -> anyhow::Result<usize> {
    let n = v as usize;
    if !(1..=MAX_WORKERS).contains(&n) {
        anyhow::bail!("workers must be between 1 and {MAX_WORKERS}, got {v}");
    }
    Ok(n)
}

pub fn parse_fail_on(v: &str) -> anyhow::Result<FailOn> {
    match v {
        "fail" => Ok(FailOn::Fail),
        "warning" | "warn" => Ok(FailOn::Warning),
        other => anyhow::bail!("unknown fail_on: {other} (expected fail|warning)"),
    }
}

pub fn parse_format(v: &str) -> anyhow::Result<Format> {
    v.parse::<Format>().context("invalid format")
}
