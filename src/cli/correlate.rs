//! Correlate command - which descriptions rise and fall together

use super::timeline::description_pivot;
use super::Session;
use crate::models::{CorrelationReport, Report};
use crate::stats::ranked_pairs;
use anyhow::{Context, Result};
use tracing::{info, warn};

/// Strongest pairs listed under the matrix
const STRONGEST_PAIRS: usize = 10;

pub(crate) fn run(session: &Session, top: usize, series: &[String]) -> Result<()> {
    let (dataset, _, _) = session.load()?;
    let pivot = description_pivot(&dataset)?;

    let months = pivot.months().len();
    if months < 2 {
        anyhow::bail!(
            "Need at least two months of data to correlate, found {}",
            months
        );
    }

    let names = if series.is_empty() {
        pivot.top_categories(top)
    } else {
        series.to_vec()
    };
    let matrix = pivot
        .correlation(&names)
        .context("Failed to correlate monthly volumes")?;

    let undefined = matrix
        .names
        .iter()
        .enumerate()
        .filter(|(i, _)| matrix.values[*i][*i].is_none())
        .count();
    if undefined > 0 {
        warn!("{} series have constant volume; their correlations are undefined", undefined);
    }

    let mut strongest = ranked_pairs(&matrix);
    strongest.truncate(STRONGEST_PAIRS);
    info!("Correlated {} descriptions over {} months", matrix.names.len(), months);

    session.emit(&Report::Correlation(CorrelationReport {
        months,
        matrix,
        strongest,
    }))
}
