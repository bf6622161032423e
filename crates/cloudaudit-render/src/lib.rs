//! Rendering of audit records for people (terminal) and tools (JSON).
//!
//! Renderers are presentational only: every record handed in is reproduced.

#![forbid(unsafe_code)]

mod json;
mod model;
mod terminal;

pub use json::render_json;
pub use model::{Format, UnknownFormat, Verbosity};
pub use terminal::render_terminal;

use cloudaudit_types::{AuditRecord, RegionWarning};

/// Render `records` in `format`.
///
/// `Verbosity::Silent` only affects the terminal format. JSON is always emitted in full so
/// programmatic consumers keep working under `--silent`.
pub fn render(
    records: &[AuditRecord],
    warnings: &[RegionWarning],
    verbosity: Verbosity,
    format: Format,
) -> Result<String, serde_json::Error> {
    match format {
        Format::Terminal => Ok(render_terminal(records, warnings, verbosity)),
        Format::Json => render_json(records),
    }
}
