//! Developer tasks (schema generation, rule catalogue checks).
//!
//! Keeping this separate avoids bloating the end-user CLI.

use anyhow::{Context, bail};
use cloudaudit_settings::SCHEMA_CONFIG_V1;
use cloudaudit_types::{AuditRecord, SCHEMA_AUDIT_RECORD_V1};
use schemars::schema_for;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

/// Get the project root (parent of xtask directory).
fn project_root() -> anyhow::Result<PathBuf> {
    let manifest_dir = match std::env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => std::env::current_dir().context("determine current directory")?,
    };

    if manifest_dir.ends_with("xtask") {
        manifest_dir
            .parent()
            .map(PathBuf::from)
            .context("xtask has no parent")
    } else {
        Ok(manifest_dir)
    }
}

fn schemas_dir() -> anyhow::Result<PathBuf> {
    Ok(project_root()?.join("schemas"))
}

struct SchemaSpec {
    id: &'static str,
    generate: fn() -> schemars::Schema,
}

impl SchemaSpec {
    fn filename(&self) -> String {
        format!("{}.json", self.id)
    }
}

/// The wire format is an array of records.
fn generate_records_schema() -> schemars::Schema {
    schema_for!(Vec<AuditRecord>)
}

fn generate_config_schema() -> schemars::Schema {
    schema_for!(cloudaudit_settings::CloudauditConfigV1)
}

fn schema_specs() -> Vec<SchemaSpec> {
    vec![
        SchemaSpec {
            id: SCHEMA_AUDIT_RECORD_V1,
            generate: generate_records_schema,
        },
        SchemaSpec {
            id: SCHEMA_CONFIG_V1,
            generate: generate_config_schema,
        },
    ]
}

/// Serialize a schema to pretty-printed JSON with trailing newline.
fn serialize_schema(schema: &schemars::Schema) -> anyhow::Result<String> {
    let mut json = serde_json::to_string_pretty(schema).context("Failed to serialize schema")?;
    json.push('\n');
    Ok(json)
}

fn emit_schemas() -> anyhow::Result<()> {
    let dir = schemas_dir()?;
    fs::create_dir_all(&dir).context("Failed to create schemas directory")?;

    for schema in schema_specs() {
        let json = serialize_schema(&(schema.generate)())?;
        let path = dir.join(schema.filename());
        fs::write(&path, &json)
            .with_context(|| format!("Failed to write schema to {}", path.display()))?;
        println!("Wrote {}", path.display());
    }

    println!("\nSchemas emitted successfully.");
    Ok(())
}

/// Check that schemas/ matches what would be generated.
///
/// Compared as JSON values, so key order and whitespace do not count.
fn validate_schemas() -> anyhow::Result<()> {
    let dir = schemas_dir()?;
    let mut stale = Vec::new();

    for schema in schema_specs() {
        let filename = schema.filename();
        let path = dir.join(&filename);
        let expected = serde_json::to_value((schema.generate)())
            .context("Failed to serialize schema")?;
        match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<Value>(&text) {
                Ok(actual) if actual == expected => {}
                Ok(_) => stale.push(format!("{filename} (out of date)")),
                Err(_) => stale.push(format!("{filename} (invalid JSON)")),
            },
            Err(_) => stale.push(format!("{filename} (missing)")),
        }
    }

    if stale.is_empty() {
        println!("All schemas are up to date.");
        return Ok(());
    }
    for name in &stale {
        eprintln!("  - {}", name);
    }
    eprintln!("\nRun `cargo xtask emit-schemas` to regenerate.");
    bail!("Schema validation failed")
}

/// Every registered rule is documented and uniquely named within its service.
fn rule_coverage() -> anyhow::Result<()> {
    let mut errors = Vec::new();
    let mut seen = BTreeSet::new();

    for rule in cloudaudit_domain::rules::all() {
        let id = format!("{}/{}", rule.service, rule.name);
        if !seen.insert(id.to_ascii_lowercase()) {
            errors.push(format!("Rule '{id}' is registered twice"));
        }
        for (field, text) in [
            ("title", rule.title),
            ("description", rule.description),
            ("remediation", rule.remediation),
        ] {
            if text.trim().is_empty() {
                errors.push(format!("Rule '{id}' has empty {field}"));
            }
        }
    }

    if errors.is_empty() {
        println!("{} rules documented", seen.len());
        return Ok(());
    }
    for error in &errors {
        eprintln!("  - {}", error);
    }
    bail!("Rule coverage failed with {} errors", errors.len())
}

fn print_help() {
    eprintln!("xtask commands:");
    eprintln!("  help              Show this message");
    eprintln!("  emit-schemas      Generate JSON schemas from Rust types to schemas/");
    eprintln!("  validate-schemas  Check if schemas/ matches generated output (for CI)");
    eprintln!("  print-schema-ids  Print known schema IDs");
    eprintln!("  rule-coverage     Check every registered rule is documented");
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let cmd = args.get(1).map(|s| s.as_str()).unwrap_or("help");

    match cmd {
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        "emit-schemas" => emit_schemas(),
        "validate-schemas" => validate_schemas(),
        "rule-coverage" => rule_coverage(),
        "print-schema-ids" => {
            for schema in schema_specs() {
                println!("{}", schema.id);
            }
            Ok(())
        }
        other => bail!("unknown xtask command: {other}\n\nRun `cargo xtask help` for usage."),
    }
    .context("xtask failed")
}
