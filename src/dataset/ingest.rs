//! Raw CSV reading
//!
//! The export is ISO-8859-1 and occasionally contains lines with stray
//! commas. Those lines are skipped and counted instead of aborting the load.

use super::{Dataset, DatasetError, COLUMN_COUNT};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, warn};

/// One unparsed row. Empty fields are `None`.
pub type RawRow = [Option<String>; COLUMN_COUNT];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    /// Non-empty lines seen
    pub lines: usize,
    /// Rows with exactly nine fields
    pub accepted: usize,
    /// Rows skipped for having the wrong field count
    pub malformed: usize,
}

/// Read a dataset file from disk.
pub fn read_dataset(path: &Path) -> Result<(Vec<RawRow>, IngestStats), DatasetError> {
    let file = File::open(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let spinner = if console::Term::stderr().is_term() {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("Reading {}...", path.display()));
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    } else {
        ProgressBar::hidden()
    };

    let result = read_from_reader(BufReader::new(file));

    match &result {
        Ok((_, stats)) => spinner.finish_with_message(format!(
            "{}Read {} rows ({} malformed)",
            style("✓ ").green(),
            style(stats.accepted).cyan(),
            stats.malformed
        )),
        Err(_) => spinner.finish_and_clear(),
    }
    result
}

/// Read raw rows from any byte source.
pub fn read_from_reader<R: Read>(reader: R) -> Result<(Vec<RawRow>, IngestStats), DatasetError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    let mut stats = IngestStats::default();

    for result in csv_reader.byte_records() {
        let record = result?;
        stats.lines += 1;

        if record.len() != COLUMN_COUNT {
            stats.malformed += 1;
            debug!(
                "Skipping line {} with {} fields",
                record.position().map(|p| p.line()).unwrap_or(0),
                record.len()
            );
            continue;
        }

        let row: RawRow = std::array::from_fn(|i| {
            // Only truly empty fields are missing; blanks survive and trim to ""
            let value = latin1(&record[i]);
            if value.is_empty() {
                None
            } else {
                Some(value)
            }
        });
        rows.push(row);
        stats.accepted += 1;
    }

    if stats.malformed > 0 {
        warn!(
            "Skipped {} malformed line(s) out of {}",
            stats.malformed, stats.lines
        );
    }

    Ok((rows, stats))
}

/// Write a cleaned dataset as UTF-8 CSV with a header row.
pub fn write_dataset(dataset: &Dataset, path: &Path) -> Result<(), DatasetError> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in dataset.records() {
        writer.serialize(record)?;
    }
    writer.flush().map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// ISO-8859-1 maps every byte straight to the code point of the same value.
fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}
