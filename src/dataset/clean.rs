//! Cleaning raw rows into typed records
//!
//! Steps, in order:
//! 1. drop rows with any missing field
//! 2. drop rows containing the placeholder value (`-` in the export)
//! 3. trim and lowercase every text field
//! 4. reduce the `domain` URI to its network location
//! 5. parse `date` (`2009/01/01_10:00` style) into a timestamp

use super::{Column, Dataset, RawRow, Record, COLUMN_COUNT};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};
use url::Url;

const DATETIME_FORMATS: &[&str] = &[
    "%Y/%m/%dT%H:%M",
    "%Y/%m/%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];
const DATE_FORMATS: &[&str] = &["%Y/%m/%d", "%Y-%m-%d"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanOptions {
    /// Value that marks a field as unknown
    pub placeholder: String,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            placeholder: "-".to_string(),
        }
    }
}

/// How many distinct values a column had before and after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueDelta {
    pub column: Column,
    pub before: usize,
    pub after: usize,
}

/// Bookkeeping for every row the cleaner touched or dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningReport {
    pub input_rows: usize,
    pub dropped_missing: usize,
    pub dropped_placeholder: usize,
    pub dropped_bad_date: usize,
    /// Domains that could not be parsed as URIs and were cut at the first `/`
    pub domain_fallbacks: usize,
    pub output_rows: usize,
    pub normalized_uniques: Vec<UniqueDelta>,
}

/// Clean raw rows into a dataset.
pub fn clean(raw: Vec<RawRow>, opts: &CleanOptions) -> (Dataset, CleaningReport) {
    let mut report = CleaningReport {
        input_rows: raw.len(),
        ..Default::default()
    };

    let mut complete: Vec<[String; COLUMN_COUNT]> = Vec::with_capacity(raw.len());
    for row in raw {
        if row.iter().any(Option::is_none) {
            report.dropped_missing += 1;
            continue;
        }
        let row = row.map(Option::unwrap_or_default);
        if row.iter().any(|v| v.trim() == opts.placeholder) {
            report.dropped_placeholder += 1;
            continue;
        }
        complete.push(row);
    }

    let mut before: Vec<HashSet<&str>> = vec![HashSet::new(); COLUMN_COUNT];
    let mut after: Vec<HashSet<String>> = vec![HashSet::new(); COLUMN_COUNT];
    let mut records = Vec::with_capacity(complete.len());

    for row in &complete {
        for (i, value) in row.iter().enumerate() {
            before[i].insert(value.as_str());
        }

        let Some(date) = parse_date(&row[Column::Date.index()]) else {
            debug!("Unparsable date '{}'", row[Column::Date.index()]);
            report.dropped_bad_date += 1;
            continue;
        };

        let text = |col: Column| normalize(&row[col.index()]);
        let raw_domain = text(Column::Domain);
        let domain = domain_of(&raw_domain).unwrap_or_else(|| {
            report.domain_fallbacks += 1;
            raw_domain.split('/').next().unwrap_or_default().to_string()
        });

        let record = Record {
            date,
            domain,
            ip: text(Column::Ip),
            reverse: text(Column::Reverse),
            description: text(Column::Description),
            registrant: text(Column::Registrant),
            asn: text(Column::Asn),
            inactive: text(Column::Inactive),
            country: text(Column::Country),
        };
        for col in Column::all() {
            after[col.index()].insert(record.field(*col).into_owned());
        }
        records.push(record);
    }

    report.normalized_uniques = Column::all()
        .iter()
        .map(|col| UniqueDelta {
            column: *col,
            before: before[col.index()].len(),
            after: after[col.index()].len(),
        })
        .collect();
    report.output_rows = records.len();

    info!(
        "Cleaning kept {} of {} rows (missing: {}, placeholder: {}, bad date: {})",
        report.output_rows,
        report.input_rows,
        report.dropped_missing,
        report.dropped_placeholder,
        report.dropped_bad_date
    );

    (Dataset::new(records), report)
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Network location (`[user@]host[:port]`) of a URI-ish domain value.
///
/// Values without a scheme are read as `http://` URIs, so
/// `www.example.com/path/x.php` yields `www.example.com`. The netloc is
/// kept as written: `1.2.3.4:80` and `1.2.3.4` stay distinct.
pub fn domain_of(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let candidate = if has_scheme(value) {
        value.to_string()
    } else {
        format!("http://{}", value)
    };
    // `Url` only validates; its host is normalized (default ports, userinfo, IPv4 forms)
    if Url::parse(&candidate).is_err() {
        return None;
    }

    let start = candidate.find("://")? + 3;
    let rest = &candidate[start..];
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let netloc = &rest[..end];
    if netloc.is_empty() {
        return None;
    }
    Some(netloc.to_lowercase())
}

/// `scheme://` prefix per RFC 3986: a letter, then letters, digits, `+`, `-`, `.`.
fn has_scheme(value: &str) -> bool {
    let Some(idx) = value.find("://") else {
        return false;
    };
    let scheme = &value[..idx];
    scheme.starts_with(|c: char| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Parse an export timestamp. `_` separates date and time in the export.
pub fn parse_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim().replace('_', "T");
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&value, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(&value, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
