//! Gtest command - rank one column's categories by association with another

use super::Session;
use crate::dataset::{Column, RowFilter};
use crate::models::{GTestReport, Report};
use crate::stats::{GTest, RankOptions};
use anyhow::{Context, Result};
use tracing::{info, warn};

/// Ranking limits after CLI and config defaults are merged
#[derive(Debug, Clone, Copy)]
pub(crate) struct Limits {
    pub top: usize,
    pub matches: usize,
    pub reverse: bool,
    pub min_volume: u64,
}

pub(crate) fn run(
    session: &Session,
    row_column: &str,
    col_column: &str,
    limits: Limits,
    filter_exprs: &[String],
) -> Result<()> {
    let row_column: Column = row_column.parse()?;
    let col_column: Column = col_column.parse()?;
    if row_column == col_column {
        warn!("Row and column are both '{}'; every row will score 0", row_column);
    }

    let filters = filter_exprs
        .iter()
        .map(|expr| RowFilter::parse(expr))
        .collect::<Result<Vec<_>, _>>()?;

    let (dataset, _, _) = session.load()?;
    let selected = if filters.is_empty() {
        dataset
    } else {
        let subset = dataset.filter(&filters);
        info!(
            "{} of {} rows match {}",
            subset.len(),
            dataset.len(),
            filter_exprs.join(" AND ")
        );
        if subset.is_empty() {
            anyhow::bail!("No rows match filter {}", filter_exprs.join(" AND "));
        }
        subset
    };

    let options = RankOptions {
        top_n: limits.top,
        match_limit: limits.matches,
        reverse: limits.reverse,
        min_volume: limits.min_volume,
    };
    let rows = selected.column(row_column);
    let cols = selected.column(col_column);
    let ranking = GTest::new()
        .rank(&rows, &cols, &options)
        .with_context(|| format!("G-test of {} against {} failed", row_column, col_column))?;

    if ranking.ranked.is_empty() {
        warn!(
            "No {} category reaches a volume of {}",
            row_column, limits.min_volume
        );
    }
    info!(
        "Ranked {} of {} {} categories",
        ranking.ranked.len(),
        ranking.row_categories,
        row_column
    );

    session.emit(&Report::GTest(GTestReport {
        row_column,
        col_column,
        filters: filters.iter().map(|f| f.to_string()).collect(),
        options,
        ranking,
    }))
}
