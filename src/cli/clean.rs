//! Clean command - write the cleaned dataset back out as CSV

use super::Session;
use crate::dataset::write_dataset;
use anyhow::{Context, Result};
use console::style;
use std::path::Path;

pub(crate) fn run(session: &Session, out: &Path) -> Result<()> {
    let (dataset, ingest, report) = session.load()?;

    write_dataset(&dataset, out)
        .with_context(|| format!("Failed to write cleaned dataset to {}", out.display()))?;

    let dropped = report.input_rows - report.output_rows;
    eprintln!(
        "{} Wrote {} rows to {}",
        style("✓").green(),
        style(dataset.len()).bold(),
        style(out.display()).cyan()
    );
    eprintln!(
        "  {} malformed lines skipped, {} rows dropped during cleaning",
        ingest.malformed, dropped
    );
    Ok(())
}
