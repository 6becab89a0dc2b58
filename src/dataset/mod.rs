//! Malware Domain List dataset: schema, loading and cleaning
//!
//! The export is a headerless CSV with nine columns:
//!
//! ```text
//! date,domain,ip,reverse,description,registrant,asn,inactive,country
//! ```
//!
//! Loading is split in two stages. `ingest` reads raw rows (tolerating
//! malformed lines), `clean` turns them into typed [`Record`]s.

mod clean;
mod filter;
mod ingest;

pub use clean::{clean, domain_of, parse_date, CleanOptions, CleaningReport, UniqueDelta};
pub use filter::{Matcher, RowFilter};
pub use ingest::{read_dataset, read_from_reader, write_dataset, IngestStats, RawRow};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

/// Number of columns in the export.
pub const COLUMN_COUNT: usize = 9;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("unknown column '{0}'. Valid columns: date, domain, ip, reverse, description, registrant, asn, inactive, country")]
    UnknownColumn(String),

    #[error("invalid filter '{expr}': {reason}")]
    InvalidFilter { expr: String, reason: String },

    #[error("no rows left after cleaning")]
    Empty,
}

/// One column of the export schema, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Column {
    Date,
    Domain,
    Ip,
    Reverse,
    Description,
    Registrant,
    Asn,
    Inactive,
    Country,
}

impl Column {
    pub fn all() -> &'static [Column; COLUMN_COUNT] {
        &[
            Column::Date,
            Column::Domain,
            Column::Ip,
            Column::Reverse,
            Column::Description,
            Column::Registrant,
            Column::Asn,
            Column::Inactive,
            Column::Country,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Column::Date => "date",
            Column::Domain => "domain",
            Column::Ip => "ip",
            Column::Reverse => "reverse",
            Column::Description => "description",
            Column::Registrant => "registrant",
            Column::Asn => "asn",
            Column::Inactive => "inactive",
            Column::Country => "country",
        }
    }

    /// Position of the column in a raw row.
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl FromStr for Column {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Column::all()
            .iter()
            .copied()
            .find(|c| c.name() == wanted)
            .ok_or_else(|| DatasetError::UnknownColumn(s.to_string()))
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A cleaned row of the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub date: NaiveDateTime,
    pub domain: String,
    pub ip: String,
    pub reverse: String,
    pub description: String,
    pub registrant: String,
    pub asn: String,
    pub inactive: String,
    pub country: String,
}

impl Record {
    /// Field value as text. Dates render as ISO-8601.
    pub fn field(&self, column: Column) -> Cow<'_, str> {
        match column {
            Column::Date => Cow::Owned(self.date.format("%Y-%m-%dT%H:%M:%S").to_string()),
            Column::Domain => Cow::Borrowed(&self.domain),
            Column::Ip => Cow::Borrowed(&self.ip),
            Column::Reverse => Cow::Borrowed(&self.reverse),
            Column::Description => Cow::Borrowed(&self.description),
            Column::Registrant => Cow::Borrowed(&self.registrant),
            Column::Asn => Cow::Borrowed(&self.asn),
            Column::Inactive => Cow::Borrowed(&self.inactive),
            Column::Country => Cow::Borrowed(&self.country),
        }
    }
}

/// The cleaned dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// All values of one column, in row order.
    pub fn column(&self, column: Column) -> Vec<Cow<'_, str>> {
        self.records.iter().map(|r| r.field(column)).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDateTime> {
        self.records.iter().map(|r| r.date).collect()
    }

    /// The column as numbers, or `None` if any value is not numeric.
    pub fn numeric_column(&self, column: Column) -> Option<Vec<f64>> {
        if column == Column::Date || self.records.is_empty() {
            return None;
        }
        self.records
            .iter()
            .map(|r| r.field(column).parse::<f64>().ok().filter(|v| v.is_finite()))
            .collect()
    }

    /// Rows matching every filter.
    pub fn filter(&self, filters: &[RowFilter]) -> Dataset {
        Dataset {
            records: self
                .records
                .iter()
                .filter(|r| filters.iter().all(|f| f.matches(r)))
                .cloned()
                .collect(),
        }
    }
}

/// Read and clean a dataset file in one go.
pub fn load(path: &Path, opts: &CleanOptions) -> Result<(Dataset, IngestStats, CleaningReport), DatasetError> {
    let (raw, stats) = read_dataset(path)?;
    let (dataset, report) = clean(raw, opts);
    if dataset.is_empty() {
        return Err(DatasetError::Empty);
    }
    info!(
        "Loaded {} clean rows from {} ({} read, {} malformed)",
        dataset.len(),
        path.display(),
        stats.accepted,
        stats.malformed
    );
    Ok((dataset, stats, report))
}
