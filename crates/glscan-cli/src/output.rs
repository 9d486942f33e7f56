use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use glscan_core::ReportBuilder;

use crate::cli::OutputFormat;

/// Write the sorted report to `path` in `format`, replacing any existing file.
pub fn write_report(report: &ReportBuilder, path: &Path, format: OutputFormat) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    match format {
        OutputFormat::Csv => report
            .write_csv_file(path)
            .with_context(|| format!("failed to write {}", path.display())),
        OutputFormat::Json => {
            let file =
                File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, &report.entries())?;
            writeln!(writer)?;
            writer
                .flush()
                .with_context(|| format!("failed to write {}", path.display()))
        }
    }
}
