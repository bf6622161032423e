//! The `audit` use case: load settings and inventory, resolve rules, scan, and compute a verdict.

use crate::scan::{ScanOptions, ScanOutput, run_batch};
use anyhow::Context;
use camino::Utf8Path;
use cloudaudit_domain::report::{StateCounts, Verdict, compute_verdict};
use cloudaudit_domain::{ScanScope, ServiceKind, rules};
use cloudaudit_provider::InventoryProvider;
use cloudaudit_settings::{Overrides, ResolvedConfig};

/// Input for the audit use case.
#[derive(Clone, Debug)]
pub struct AuditInput<'a> {
    /// JSON inventory served by the offline provider.
    pub inventory: &'a Utf8Path,
    /// Config file contents (empty string if not found).
    pub config_text: &'a str,
    pub overrides: Overrides,
    pub scope: ScanScope,
    pub service: ServiceKind,
    /// A single rule name, or `None` for every rule registered for `service`.
    pub rule: Option<&'a str>,
}

#[derive(Clone, Debug)]
pub struct AuditOutput {
    pub scan: ScanOutput,
    pub counts: StateCounts,
    pub verdict: Verdict,
    pub resolved_config: ResolvedConfig,
}

pub fn run_audit(input: AuditInput<'_>) -> anyhow::Result<AuditOutput> {
    let cfg = if input.config_text.trim().is_empty() {
        cloudaudit_settings::CloudauditConfigV1::default()
    } else {
        cloudaudit_settings::parse_config_toml(input.config_text).context("parse config")?
    };
    let resolved = cloudaudit_settings::resolve_config(cfg, input.overrides.clone())
        .context("resolve config")?;

    let selected: Vec<_> = match input.rule {
        Some(name) => {
            let rule = rules::lookup(input.service, name).with_context(|| {
                let available: Vec<_> = rules::for_service(input.service).map(|r| r.name).collect();
                format!(
                    "unknown rule '{name}' for service {} (available: {})",
                    input.service,
                    available.join(", ")
                )
            })?;
            vec![rule]
        }
        None => rules::for_service(input.service).collect(),
    };
    if selected.is_empty() {
        anyhow::bail!("no rules registered for service {}", input.service);
    }

    let provider = InventoryProvider::from_path(input.inventory)?;
    let options = ScanOptions {
        workers: resolved.workers,
        retry: resolved.retry.clone(),
    };
    let scan = run_batch(&provider, &input.scope, &selected, &options)?;

    let counts = StateCounts::from_records(&scan.records);
    let verdict = compute_verdict(&counts, scan.is_partial(), resolved.fail_on);

    Ok(AuditOutput {
        scan,
        counts,
        verdict,
        resolved_config: resolved,
    })
}

/// Map verdict to exit code: 0 = pass/warn, 2 = fail.
pub fn verdict_exit_code(verdict: Verdict) -> i32 {
    match verdict {
        Verdict::Pass => 0,
        Verdict::Warn => 0,
        Verdict::Fail => 2,
    }
}
