//! CLI entry point for cloudaudit.
//!
//! This module is intentionally thin: it handles argument parsing, I/O, and exit codes.
//! All business logic lives in the `cloudaudit-app` crate.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use cloudaudit_app::{
    AuditInput, ExplainOutput, format_explanation, format_not_found, format_rule_list,
    init_tracing, list_rules, run_audit, run_explain, verdict_exit_code, write_records_file,
    write_render,
};
use cloudaudit_domain::{Domain, RegionSelector, ScanScope, ServiceKind};
use cloudaudit_render::Verbosity;
use cloudaudit_settings::Overrides;

#[derive(Parser, Debug)]
#[command(
    name = "cloudaudit",
    version,
    about = "Compliance scanner for cloud account resources"
)]
struct Cli {
    /// Path to cloudaudit config TOML. A missing file means defaults.
    #[arg(long, global = true, default_value = "cloudaudit.toml")]
    config: Utf8PathBuf,

    /// Debug-level logs on stderr.
    #[arg(long, short, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Errors only on stderr.
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Enumerate a service and evaluate rules against every resource.
    Scan(ScanArgs),

    /// List registered rules.
    Rules {
        /// Only rules for this service.
        #[arg(long)]
        service: Option<String>,
    },

    /// Explain a rule with remediation guidance.
    Explain {
        /// Service, e.g. "dynamodb".
        service: String,
        /// Rule name, e.g. "EncryptionAtRest".
        rule: String,
    },
}

#[derive(clap::Args, Debug)]
struct ScanArgs {
    /// JSON inventory describing the account.
    #[arg(long)]
    inventory: Utf8PathBuf,

    /// Service to scan (dynamodb, s3, ec2, rds, lambda).
    #[arg(long)]
    service: String,

    /// Rule to evaluate. Every rule for the service when omitted.
    #[arg(long)]
    rule: Option<String>,

    /// Region name, or "all" for every enabled region.
    #[arg(long, default_value = "all")]
    region: String,

    /// Credentials profile.
    #[arg(long, default_value = "default")]
    profile: String,

    /// Account partition (public|government).
    #[arg(long, default_value = "public")]
    domain: String,

    /// Scan only this resource, looked up directly by id.
    #[arg(long)]
    resource_id: Option<String>,

    /// Output format (terminal|json). Overrides the config file.
    #[arg(long)]
    format: Option<String>,

    /// Suppress terminal output. JSON output is still written.
    #[arg(long)]
    silent: bool,

    /// Region workers (1..=16). Overrides the config file.
    #[arg(long)]
    workers: Option<u32>,

    /// Exit non-zero on `fail` (default) or also on `warning`.
    #[arg(long)]
    fail_on: Option<String>,

    /// Also write the JSON records to this file.
    #[arg(long)]
    out: Option<Utf8PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // A second subscriber is the only failure mode; logging is best-effort.
    let _ = init_tracing(cli.verbose, cli.quiet, cli.log_json);

    match &cli.cmd {
        Commands::Scan(args) => cmd_scan(&cli.config, args),
        Commands::Rules { service } => cmd_rules(service.as_deref()),
        Commands::Explain { service, rule } => cmd_explain(service, rule),
    }
}

fn cmd_scan(config: &Utf8Path, args: &ScanArgs) -> anyhow::Result<()> {
    let result = (|| -> anyhow::Result<i32> {
        let cfg_text = read_config(config)?;

        let service: ServiceKind = args.service.parse().context("invalid --service")?;
        let region: RegionSelector = args.region.parse().context("invalid --region")?;
        let domain: Domain = args.domain.parse().context("invalid --domain")?;
        let mut scope = ScanScope::new(region, args.profile.clone(), domain);
        if let Some(id) = &args.resource_id {
            scope = scope.with_resource_id(id.clone());
        }

        let input = AuditInput {
            inventory: &args.inventory,
            config_text: &cfg_text,
            overrides: Overrides {
                workers: args.workers,
                fail_on: args.fail_on.clone(),
                format: args.format.clone(),
            },
            scope,
            service,
            rule: args.rule.as_deref(),
        };

        let output = run_audit(input)?;
        let verbosity = if args.silent {
            Verbosity::Silent
        } else {
            Verbosity::Normal
        };

        write_render(
            &output.scan.records,
            &output.scan.warnings,
            verbosity,
            output.resolved_config.format,
        )?;

        if let Some(out) = &args.out {
            write_records_file(out, &output.scan.records).context("write records json")?;
        }

        tracing::debug!(verdict = ?output.verdict, "scan complete");
        Ok(verdict_exit_code(output.verdict))
    })();

    match result {
        Ok(code) => {
            if code != 0 {
                std::process::exit(code);
            }
            Ok(())
        }
        Err(err) => {
            eprintln!("cloudaudit error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn read_config(path: &Utf8Path) -> anyhow::Result<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(err) => Err(err).with_context(|| format!("read config: {}", path)),
    }
}

fn cmd_rules(service: Option<&str>) -> anyhow::Result<()> {
    let service = match service {
        Some(s) => match s.parse::<ServiceKind>() {
            Ok(service) => Some(service),
            Err(err) => {
                eprintln!("cloudaudit error: {err}");
                std::process::exit(1);
            }
        },
        None => None,
    };
    print!("{}", format_rule_list(&list_rules(service)));
    Ok(())
}

fn cmd_explain(service: &str, rule: &str) -> anyhow::Result<()> {
    match run_explain(service, rule) {
        ExplainOutput::Found(rule) => {
            print!("{}", format_explanation(rule));
            Ok(())
        }
        ExplainOutput::NotFound {
            identifier,
            available,
        } => {
            eprint!("{}", format_not_found(&identifier, &available));
            std::process::exit(1);
        }
    }
}
