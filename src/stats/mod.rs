//! Statistics over cleaned dataset columns
//!
//! Everything in here is a pure function of its inputs:
//! - `contingency` - co-occurrence counts between two categorical columns
//! - `gtest` - G-test association ranking over a contingency table
//! - `describe` - value counts and per-column summaries
//! - `correlation` - Pearson correlation and correlation matrices
//! - `timeline` - monthly volume pivots per category

mod contingency;
mod correlation;
mod describe;
mod gtest;
mod timeline;

pub use contingency::{ContingencyTable, CountGrid};
pub use correlation::{pearson, ranked_pairs, redundant_pairs, CorrelatedPair, CorrelationMatrix};
pub use describe::{
    describe_categorical, describe_numeric, value_counts, CategoricalSummary, NumericSummary,
};
pub use gtest::{
    chi_squared_survival, g_statistic, g_term, GTest, GTestRanking, RankOptions, ScoredRow,
};
pub use timeline::{MonthlyPivot, YearMonth};

use thiserror::Error;

/// Errors raised by the statistics routines.
///
/// These are always precondition violations on the caller's input; nothing
/// in this module retries or degrades to a partial result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type StatsResult<T> = Result<T, StatsError>;

pub(crate) fn invalid(msg: impl Into<String>) -> StatsError {
    StatsError::InvalidInput(msg.into())
}
