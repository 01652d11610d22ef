use anyhow::{Context, Result};
use logprof_core::ReportRow;
use std::fs;
use std::path::Path;

const TABLE_PLACEHOLDER: &str = "$table_json";

/// Substitute the row table into the HTML template and write the report.
pub fn render_report(template: &Path, report_path: &Path, rows: &[ReportRow]) -> Result<()> {
    tracing::debug!("Rendering report from template {}", template.display());

    let contents = fs::read_to_string(template)
        .with_context(|| format!("failed to read report template {}", template.display()))?;
    let table = serde_json::to_string(rows)?;
    let html = contents.replace(TABLE_PLACEHOLDER, &table);

    fs::write(report_path, html)
        .with_context(|| format!("failed to write report {}", report_path.display()))?;

    tracing::info!("Report written to {}", report_path.display());
    Ok(())
}
