//! Monthly volume pivot: how many records per category per calendar month

use super::correlation::CorrelationMatrix;
use super::describe::value_counts;
use super::{invalid, StatsResult};
use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};
use rustc_hash::FxHashMap;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A calendar month bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(ts: &NaiveDateTime) -> Self {
        Self {
            year: ts.year(),
            month: ts.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Category counts bucketed by month.
///
/// Only months that contain at least one record appear; they are kept in
/// chronological order.
#[derive(Debug, Clone, Default)]
pub struct MonthlyPivot {
    months: Vec<YearMonth>,
    counts: FxHashMap<String, BTreeMap<YearMonth, usize>>,
    /// Category volume over the whole range, most common first
    ranking: Vec<(String, usize)>,
}

impl MonthlyPivot {
    pub fn build<S: AsRef<str>>(dates: &[NaiveDateTime], categories: &[S]) -> StatsResult<Self> {
        if dates.len() != categories.len() {
            return Err(invalid(format!(
                "{} dates but {} categories",
                dates.len(),
                categories.len()
            )));
        }

        let mut months = BTreeSet::new();
        let mut counts: FxHashMap<String, BTreeMap<YearMonth, usize>> = FxHashMap::default();
        for (ts, cat) in dates.iter().zip(categories) {
            let ym = YearMonth::of(ts);
            months.insert(ym);
            *counts
                .entry(cat.as_ref().to_string())
                .or_default()
                .entry(ym)
                .or_insert(0) += 1;
        }

        Ok(Self {
            months: months.into_iter().collect(),
            counts,
            ranking: value_counts(categories),
        })
    }

    pub fn months(&self) -> &[YearMonth] {
        &self.months
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    /// The `n` highest-volume categories.
    pub fn top_categories(&self, n: usize) -> Vec<String> {
        self.ranking.iter().take(n).map(|(c, _)| c.clone()).collect()
    }

    pub fn contains(&self, category: &str) -> bool {
        self.counts.contains_key(category)
    }

    /// Per-month counts for one category, zero-filled, aligned with `months()`.
    pub fn series(&self, category: &str) -> Vec<usize> {
        let by_month = self.counts.get(category);
        self.months
            .iter()
            .map(|m| by_month.and_then(|c| c.get(m)).copied().unwrap_or(0))
            .collect()
    }

    /// Total records per month across every category.
    pub fn totals(&self) -> Vec<(YearMonth, usize)> {
        self.months
            .iter()
            .map(|m| {
                let n = self
                    .counts
                    .values()
                    .filter_map(|c| c.get(m))
                    .sum::<usize>();
                (*m, n)
            })
            .collect()
    }

    /// Series for explicitly named categories, rejecting unknown names.
    pub fn select(&self, names: &[String]) -> StatsResult<Vec<(String, Vec<usize>)>> {
        names
            .iter()
            .map(|name| {
                if !self.contains(name) {
                    return Err(invalid(format!("unknown category '{}'", name)));
                }
                Ok((name.clone(), self.series(name)))
            })
            .collect()
    }

    /// Correlation of monthly volumes between the named categories.
    pub fn correlation(&self, names: &[String]) -> StatsResult<CorrelationMatrix> {
        let series = self
            .select(names)?
            .into_iter()
            .map(|(name, counts)| (name, counts.into_iter().map(|c| c as f64).collect()))
            .collect();
        CorrelationMatrix::from_series(series)
    }
}
