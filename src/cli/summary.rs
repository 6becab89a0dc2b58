//! Summary command - cleaning results and a column-by-column overview

use super::Session;
use crate::dataset::{Column, Dataset};
use crate::models::{ColumnSummary, NumericColumn, Report, SummaryReport};
use crate::stats::{
    describe_categorical, describe_numeric, redundant_pairs, value_counts, CorrelationMatrix,
};
use anyhow::Result;
use tracing::{debug, warn};

pub(crate) fn run(session: &Session, top: usize) -> Result<()> {
    let (dataset, ingest, cleaning) = session.load()?;

    let columns: Vec<ColumnSummary> = Column::all()
        .iter()
        .map(|&column| ColumnSummary {
            column,
            summary: describe_categorical(&dataset.column(column)),
        })
        .collect();

    let mut top_descriptions = value_counts(&dataset.column(Column::Description));
    top_descriptions.truncate(top);

    let (numeric, numeric_correlation) = numeric_overview(&dataset)?;
    let redundant_columns = numeric_correlation
        .as_ref()
        .map(|m| redundant_pairs(m, session.config.redundancy_threshold()))
        .unwrap_or_default();
    for pair in &redundant_columns {
        warn!(
            "Columns '{}' and '{}' carry the same information (r = {:.4})",
            pair.a, pair.b, pair.r
        );
    }

    session.emit(&Report::Summary(SummaryReport {
        source: session.data.display().to_string(),
        ingest,
        cleaning,
        rows: dataset.len(),
        columns,
        top_descriptions,
        numeric,
        numeric_correlation,
        redundant_columns,
    }))
}

/// Describe every all-numeric column and correlate them when there are at
/// least two.
fn numeric_overview(dataset: &Dataset) -> Result<(Vec<NumericColumn>, Option<CorrelationMatrix>)> {
    let mut numeric = Vec::new();
    let mut series = Vec::new();
    for &column in Column::all() {
        if let Some(values) = dataset.numeric_column(column) {
            debug!("Column '{}' is numeric", column);
            numeric.push(NumericColumn {
                column,
                summary: describe_numeric(&values),
            });
            series.push((column.name().to_string(), values));
        }
    }

    let matrix = if series.len() >= 2 && dataset.len() >= 2 {
        Some(CorrelationMatrix::from_series(series)?)
    } else {
        None
    };
    Ok((numeric, matrix))
}
