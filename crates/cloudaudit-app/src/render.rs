//! Render use cases: terminal and JSON output from scan results.

use anyhow::Context;
use camino::Utf8Path;
use cloudaudit_render::{Format, Verbosity};
use cloudaudit_types::{AuditRecord, RegionWarning};
use std::io::Write;

pub fn render_output(
    records: &[AuditRecord],
    warnings: &[RegionWarning],
    verbosity: Verbosity,
    format: Format,
) -> anyhow::Result<String> {
    cloudaudit_render::render(records, warnings, verbosity, format).context("render records")
}

/// Render to stdout.
pub fn write_render(
    records: &[AuditRecord],
    warnings: &[RegionWarning],
    verbosity: Verbosity,
    format: Format,
) -> anyhow::Result<()> {
    let text = render_output(records, warnings, verbosity, format)?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(text.as_bytes()).context("write stdout")?;
    stdout.flush().context("flush stdout")?;
    Ok(())
}

/// Write the JSON array of records to `path`, creating parent directories.
pub fn write_records_file(path: &Utf8Path, records: &[AuditRecord]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create directory: {}", parent))?;
        }
    }
    let data = cloudaudit_render::render_json(records).context("serialize records")?;
    std::fs::write(path, data).with_context(|| format!("write report: {}", path))?;
    Ok(())
}
