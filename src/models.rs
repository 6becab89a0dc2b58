//! Report models shared by the commands and the reporters
//!
//! Each command builds one of these and hands it to `reporters::report`.

use crate::dataset::{CleaningReport, Column, IngestStats};
use crate::stats::{
    CategoricalSummary, CorrelatedPair, CorrelationMatrix, GTestRanking, NumericSummary,
    RankOptions,
};
use serde::Serialize;

/// Anything a command can print.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Report {
    Summary(SummaryReport),
    GTest(GTestReport),
    Timeline(TimelineReport),
    Correlation(CorrelationReport),
}

/// Dataset overview: cleaning results, per-column summaries, numeric
/// column correlation.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    pub source: String,
    pub ingest: IngestStats,
    pub cleaning: CleaningReport,
    pub rows: usize,
    pub columns: Vec<ColumnSummary>,
    pub top_descriptions: Vec<(String, usize)>,
    pub numeric: Vec<NumericColumn>,
    pub numeric_correlation: Option<CorrelationMatrix>,
    pub redundant_columns: Vec<CorrelatedPair>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnSummary {
    pub column: Column,
    #[serde(flatten)]
    pub summary: CategoricalSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct NumericColumn {
    pub column: Column,
    #[serde(flatten)]
    pub summary: NumericSummary,
}

/// G-test association ranking between two columns.
#[derive(Debug, Clone, Serialize)]
pub struct GTestReport {
    pub row_column: Column,
    pub col_column: Column,
    pub filters: Vec<String>,
    pub options: RankOptions,
    pub ranking: GTestRanking,
}

/// Monthly volume per category.
#[derive(Debug, Clone, Serialize)]
pub struct TimelineReport {
    pub months: Vec<String>,
    pub series: Vec<NamedSeries>,
    /// All records per month, not only the selected categories
    pub totals: Vec<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NamedSeries {
    pub name: String,
    pub counts: Vec<usize>,
}

/// Correlation of monthly volumes between categories.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationReport {
    pub months: usize,
    pub matrix: CorrelationMatrix,
    pub strongest: Vec<CorrelatedPair>,
}

impl Report {
    pub fn title(&self) -> &'static str {
        match self {
            Report::Summary(_) => "Dataset Summary",
            Report::GTest(_) => "G-Test Association Ranking",
            Report::Timeline(_) => "Monthly Volume",
            Report::Correlation(_) => "Volume Correlation",
        }
    }
}
