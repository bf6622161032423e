//! The `scan` use case: enumerate one service across regions and evaluate rules.

use cloudaudit_domain::{
    AuditRecordBuilder, Clock, Evaluation, RegionSelector, ResourceIdentity, RuleDefinition,
    RuleOutcome, ScanScope, evaluate_isolated, sort_evaluations,
};
use cloudaudit_provider::{
    CancelToken, EnumerationContext, EnumerationError, PageEntry, RegionEnumerator,
    ResourceProvider, RetryPolicy, lookup_resource, with_retry,
};
use cloudaudit_settings::{DEFAULT_WORKERS, MAX_WORKERS};
use cloudaudit_types::{AuditRecord, RegionWarning};
use rayon::prelude::*;

#[derive(Clone, Debug, PartialEq)]
pub struct ScanOptions {
    /// Region workers running in parallel. Clamped to 1..=16.
    pub workers: usize,
    pub retry: RetryPolicy,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScanOutput {
    /// Ordered by region (enabled-region order), then physical id.
    pub records: Vec<AuditRecord>,
    /// Regions whose enumeration was cut short.
    pub warnings: Vec<RegionWarning>,
    /// The effective region set, in scan order.
    pub regions: Vec<String>,
}

impl ScanOutput {
    pub fn is_partial(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Conditions that end a scan without records.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("cannot resolve scan scope: {0}")]
    ScopeResolution(String),

    #[error("authorization failed: {0}")]
    Authorization(String),

    #[error("cannot start region workers: {0}")]
    WorkerPool(String),
}

/// Run one rule against every resource in scope.
///
/// Regions are enumerated in parallel on a bounded pool. Per-resource failures become `UNKNOWN`
/// records and per-region failures become warnings; only scope resolution and authorization
/// failures end the scan early.
pub fn run_scan(
    provider: &dyn ResourceProvider,
    scope: &ScanScope,
    rule: &RuleDefinition,
    options: &ScanOptions,
) -> Result<ScanOutput, ScanError> {
    run_batch(provider, scope, &[rule], options)
}

/// Run several rules with the same scope; outputs are concatenated in rule order.
pub fn run_batch(
    provider: &dyn ResourceProvider,
    scope: &ScanScope,
    rules: &[&RuleDefinition],
    options: &ScanOptions,
) -> Result<ScanOutput, ScanError> {
    let mut builder = AuditRecordBuilder::new();
    run_batch_with(provider, scope, rules, options, &mut builder)
}

pub(crate) fn run_batch_with<C: Clock>(
    provider: &dyn ResourceProvider,
    scope: &ScanScope,
    rules: &[&RuleDefinition],
    options: &ScanOptions,
    builder: &mut AuditRecordBuilder<C>,
) -> Result<ScanOutput, ScanError> {
    let regions = resolve_regions(provider, scope, &options.retry)?;
    tracing::info!(
        regions = regions.len(),
        rules = rules.len(),
        profile = scope.profile(),
        domain = %scope.domain(),
        "starting scan"
    );

    let pool = build_pool(options.workers, regions.len())?;
    let mut output = ScanOutput {
        regions,
        ..ScanOutput::default()
    };

    for rule in rules {
        let (mut evaluations, warnings) = match scope.resource_id() {
            Some(id) => scan_single(provider, scope, rule, &output.regions, id, options)?,
            None => fan_out(&pool, provider, scope, rule, &output.regions, options)?,
        };

        sort_evaluations(&mut evaluations, &output.regions);
        // Built after sorting so capture times follow emission order.
        output.records.extend(
            evaluations
                .into_iter()
                .map(|e| builder.build(scope, &e.resource, rule, e.outcome)),
        );
        for w in warnings {
            if !output.warnings.contains(&w) {
                output.warnings.push(w);
            }
        }
    }

    tracing::info!(
        records = output.records.len(),
        warnings = output.warnings.len(),
        "scan finished"
    );
    Ok(output)
}

fn resolve_regions(
    provider: &dyn ResourceProvider,
    scope: &ScanScope,
    retry: &RetryPolicy,
) -> Result<Vec<String>, ScanError> {
    let domain = scope.domain();
    let enabled = with_retry(retry, &CancelToken::new(), "enabled_regions", || {
        provider.enabled_regions(domain, scope.profile())
    })
    .map_err(|err| {
        if err.is_fatal() {
            ScanError::Authorization(err.to_string())
        } else {
            ScanError::ScopeResolution(format!("enabled regions unavailable: {err}"))
        }
    })?;

    match scope.region() {
        RegionSelector::All => {
            if enabled.is_empty() {
                return Err(ScanError::ScopeResolution(format!(
                    "no regions enabled for profile '{}'",
                    scope.profile()
                )));
            }
            Ok(enabled)
        }
        RegionSelector::Named(region) => {
            if !domain.contains_region(region) {
                return Err(ScanError::ScopeResolution(format!(
                    "'{region}' is not a {domain} region"
                )));
            }
            if !enabled.iter().any(|r| r == region) {
                return Err(ScanError::ScopeResolution(format!(
                    "region '{region}' is not enabled for profile '{}'",
                    scope.profile()
                )));
            }
            Ok(vec![region.clone()])
        }
    }
}

type RuleResult = (Vec<Evaluation>, Vec<RegionWarning>);

/// What one region worker hands back after join.
struct RegionResult {
    evaluations: Vec<Evaluation>,
    warning: Option<RegionWarning>,
}

/// One pool per run, shared by every rule of a batch.
fn build_pool(workers: usize, regions: usize) -> Result<rayon::ThreadPool, ScanError> {
    let workers = workers.clamp(1, MAX_WORKERS).min(regions.max(1));
    rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("cloudaudit-region-{i}"))
        .build()
        .map_err(|err| ScanError::WorkerPool(err.to_string()))
}

fn fan_out(
    pool: &rayon::ThreadPool,
    provider: &dyn ResourceProvider,
    scope: &ScanScope,
    rule: &RuleDefinition,
    regions: &[String],
    options: &ScanOptions,
) -> Result<RuleResult, ScanError> {
    let cancel = CancelToken::new();
    let ctx = EnumerationContext {
        provider,
        profile: scope.profile(),
        retry: &options.retry,
        cancel: &cancel,
    };

    let results: Result<Vec<RegionResult>, ScanError> = pool.install(|| {
        regions
            .par_iter()
            .map(|region| scan_region(ctx, rule, region))
            .collect()
    });

    let mut evaluations = Vec::new();
    let mut warnings = Vec::new();
    for r in results? {
        evaluations.extend(r.evaluations);
        warnings.extend(r.warning);
    }
    Ok((evaluations, warnings))
}

fn scan_region(
    ctx: EnumerationContext<'_>,
    rule: &RuleDefinition,
    region: &str,
) -> Result<RegionResult, ScanError> {
    let span = tracing::debug_span!("region", region, rule = rule.name);
    let _enter = span.enter();

    let mut out = RegionResult {
        evaluations: Vec::new(),
        warning: None,
    };

    for entry in RegionEnumerator::new(ctx, rule.service, region) {
        match entry {
            Ok(entry) => out.evaluations.push(evaluate_entry(rule, entry)),
            Err(err) if err.is_fatal() => {
                tracing::error!(error = %err, "fatal provider error; cancelling scan");
                ctx.cancel.cancel();
                return Err(ScanError::Authorization(err.to_string()));
            }
            // A sibling failed fatally; its error is the one reported.
            Err(EnumerationError::Cancelled { .. }) => {
                tracing::debug!("region cancelled");
                break;
            }
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    observed = out.evaluations.len(),
                    "region enumeration aborted"
                );
                out.warning = Some(RegionWarning {
                    region: region.to_string(),
                    message: err.to_string(),
                });
                break;
            }
        }
    }

    tracing::debug!(resources = out.evaluations.len(), "region finished");
    Ok(out)
}

fn evaluate_entry(rule: &RuleDefinition, entry: PageEntry) -> Evaluation {
    match entry {
        PageEntry::Resource(resource) => Evaluation {
            outcome: evaluate_isolated(rule, &resource),
            resource: resource.identity(),
        },
        PageEntry::Unreadable(u) => {
            tracing::warn!(
                physical_id = %u.physical_id,
                error = %u.message,
                "resource could not be read; recording UNKNOWN"
            );
            Evaluation {
                resource: ResourceIdentity {
                    physical_id: u.physical_id,
                    friendly_name: None,
                    region: u.region,
                },
                outcome: RuleOutcome::unknown(format!("resource could not be read: {}", u.message)),
            }
        }
    }
}

/// Look the resource up region by region; the first hit wins.
///
/// A miss is fatal only when every region was actually searched. Regions that could not be
/// searched come back as warnings with no records.
fn scan_single(
    provider: &dyn ResourceProvider,
    scope: &ScanScope,
    rule: &RuleDefinition,
    regions: &[String],
    physical_id: &str,
    options: &ScanOptions,
) -> Result<RuleResult, ScanError> {
    let cancel = CancelToken::new();
    let ctx = EnumerationContext {
        provider,
        profile: scope.profile(),
        retry: &options.retry,
        cancel: &cancel,
    };

    let mut warnings = Vec::new();
    for region in regions {
        match lookup_resource(ctx, rule.service, region, physical_id) {
            Ok(Some(entry)) => return Ok((vec![evaluate_entry(rule, entry)], warnings)),
            Ok(None) => {}
            Err(err) if err.is_fatal() => return Err(ScanError::Authorization(err.to_string())),
            Err(err) => {
                tracing::warn!(region = %region, error = %err, "lookup failed in region");
                warnings.push(RegionWarning {
                    region: region.clone(),
                    message: err.to_string(),
                });
            }
        }
    }

    if !warnings.is_empty() {
        tracing::warn!(
            physical_id,
            unsearched = warnings.len(),
            "resource not found in the regions that could be searched"
        );
        return Ok((Vec::new(), warnings));
    }
    Err(ScanError::ScopeResolution(format!(
        "{} resource '{physical_id}' not found in {} region(s)",
        rule.service,
        regions.len()
    )))
}
