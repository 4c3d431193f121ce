use anyhow::{Context, Result};
use chrono::Local;
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::analysis::AnalysisReport;
use crate::cli::ExportFormat;

const RULE_WIDTH: usize = 80;

/// Render the report as flat text: a banner, then one header block per section
pub fn render_text(report: &AnalysisReport) -> String {
    let heavy = "=".repeat(RULE_WIDTH);
    let light = "-".repeat(RULE_WIDTH);
    let mut out = String::new();

    let _ = writeln!(out, "{heavy}");
    let _ = writeln!(out, "SCIENTIFIC ARTICLE ANALYSIS");
    let _ = writeln!(out, "{heavy}");
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Date: {}",
        report.created_at.format("%Y-%m-%d %H:%M:%S")
    );
    let _ = writeln!(out, "File: {}", report.source);
    let _ = writeln!(out, "Model: {}", report.model);

    for section in report.sections() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{light}");
        let _ = writeln!(out, "{}", section.title.to_uppercase());
        let _ = writeln!(out, "{light}");
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", section.content);
    }

    out
}

/// Write the report to `path` in the given format
pub fn export_report(report: &AnalysisReport, format: ExportFormat, path: &Path) -> Result<()> {
    if report.is_empty() {
        anyhow::bail!("There are no results to export");
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let file =
        File::create(path).with_context(|| format!("Failed to create file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    match format {
        ExportFormat::Text => {
            writer
                .write_all(render_text(report).as_bytes())
                .context("Failed to write report")?;
        }
        ExportFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, report).context("Failed to write JSON")?;
        }
    }
    writer.flush().context("Failed to write report")?;

    tracing::info!("Report saved to {}", path.display());
    Ok(())
}

/// Timestamped file name inside `dir`, e.g. `analysis_20250101_120000.txt`
pub fn default_export_path(dir: &Path, format: ExportFormat) -> PathBuf {
    dir.join(format!(
        "analysis_{}.{}",
        Local::now().format("%Y%m%d_%H%M%S"),
        format.extension()
    ))
}
