//! G-test association ranking
//!
//! For every row category r the G statistic compares r's distribution over
//! the column categories with the overall column distribution:
//!
//! ```text
//! e(r,k) = n_r * m_k / N
//! G_r    = 2 * Σ_k c(r,k) * ln(c(r,k) / e(r,k))      (c(r,k) > 0 only)
//! ```
//!
//! A large G means the row is concentrated on a few column values (strong
//! association). A G near zero means the row looks just like the marginal.
//! Under independence G_r is approximately chi-squared distributed with
//! `columns - 1` degrees of freedom, which gives the reported p-value.

use super::contingency::{ContingencyTable, CountGrid};
use super::{invalid, StatsResult};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Ranking knobs. `reverse` and `min_volume` are independent of each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankOptions {
    /// Number of row categories to return
    pub top_n: usize,
    /// Maximum number of column categories kept in the reduced table
    pub match_limit: usize,
    /// Lowest scores first instead of highest
    pub reverse: bool,
    /// Rows with fewer total occurrences are not eligible
    pub min_volume: u64,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            top_n: 10,
            match_limit: 10,
            reverse: false,
            min_volume: 0,
        }
    }
}

/// One scored row category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRow {
    pub category: String,
    pub score: f64,
    pub p_value: f64,
    pub dof: usize,
    /// Total occurrences of this category
    pub total: u64,
}

/// Result of a ranking call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GTestRanking {
    /// Selected rows with their scores, in rank order
    pub ranked: Vec<ScoredRow>,
    /// Selected rows × retained columns
    pub reduced: CountGrid,
    /// Selected rows × every column observed in those rows
    pub full: CountGrid,
    /// Records belonging to the selected rows
    pub match_count: u64,
    pub total_records: u64,
    pub row_categories: usize,
    pub column_categories: usize,
}

impl GTestRanking {
    /// Selected row labels in rank order.
    pub fn categories(&self) -> Vec<&str> {
        self.ranked.iter().map(|r| r.category.as_str()).collect()
    }
}

/// `observed * ln(observed / expected)` with the `0 * ln(0) = 0` convention.
#[must_use]
pub fn g_term(observed: f64, expected: f64) -> f64 {
    if observed <= 0.0 {
        return 0.0;
    }
    observed * (observed / expected).ln()
}

/// G statistic of one row against the table's column marginals.
///
/// Returns 0.0 for rows that were never observed.
#[must_use]
pub fn g_statistic(table: &ContingencyTable, row: &str) -> f64 {
    let n_r = table.row_total(row) as f64;
    let n = table.total() as f64;
    if n_r == 0.0 || n == 0.0 {
        return 0.0;
    }

    let sum: f64 = table
        .row_entries(row)
        .iter()
        .map(|(col, observed)| {
            let expected = n_r * table.col_total(col) as f64 / n;
            g_term(*observed as f64, expected)
        })
        .sum();

    // G is a scaled KL divergence; rounding can push an exact match a hair below zero
    (2.0 * sum).max(0.0)
}

/// Survival function (1 - CDF) of the chi-squared distribution.
///
/// Exact for 1 and 2 degrees of freedom, Wilson-Hilferty approximation
/// otherwise.
#[must_use]
pub fn chi_squared_survival(x: f64, dof: usize) -> f64 {
    if dof == 0 || x <= 0.0 {
        return 1.0;
    }
    let p = match dof {
        1 => erfc((x / 2.0).sqrt()),
        2 => (-x / 2.0).exp(),
        _ => {
            let k = dof as f64;
            let z = ((x / k).cbrt() - (1.0 - 2.0 / (9.0 * k))) / (2.0 / (9.0 * k)).sqrt();
            0.5 * erfc(z / std::f64::consts::SQRT_2)
        }
    };
    p.clamp(0.0, 1.0)
}

/// Complementary error function (Abramowitz & Stegun 7.1.26, max error 1.5e-7).
fn erfc(x: f64) -> f64 {
    if x < 0.0 {
        return 2.0 - erfc(-x);
    }
    let t = 1.0 / 0.327_591_1f64.mul_add(x, 1.0);
    let poly = t
        * (0.254_829_592
            + t * (-0.284_496_736
                + t * (1.421_413_741 + t * (-1.453_152_027 + t * 1.061_405_429))));
    poly * (-x * x).exp()
}

/// G-test scorer over pairs of categorical columns.
#[derive(Debug, Clone, Copy, Default)]
pub struct GTest;

impl GTest {
    pub fn new() -> Self {
        Self
    }

    /// Score every row category of a table, sorted by category.
    pub fn score_table(&self, table: &ContingencyTable) -> Vec<ScoredRow> {
        let dof = table.columns().len().saturating_sub(1);
        table
            .rows()
            .iter()
            .map(|row| {
                let score = g_statistic(table, row);
                ScoredRow {
                    category: row.clone(),
                    score,
                    p_value: chi_squared_survival(score, dof),
                    dof,
                    total: table.row_total(row),
                }
            })
            .collect()
    }

    /// Highest-scoring rows with default reverse/volume settings.
    pub fn highest_gtest_scores<R, C>(
        &self,
        rows: &[R],
        cols: &[C],
        top_n: usize,
        match_limit: usize,
    ) -> StatsResult<GTestRanking>
    where
        R: AsRef<str>,
        C: AsRef<str>,
    {
        self.rank(
            rows,
            cols,
            &RankOptions {
                top_n,
                match_limit,
                ..RankOptions::default()
            },
        )
    }

    /// Rank row categories by G score and shape the result for display.
    pub fn rank<R, C>(&self, rows: &[R], cols: &[C], opts: &RankOptions) -> StatsResult<GTestRanking>
    where
        R: AsRef<str>,
        C: AsRef<str>,
    {
        if opts.top_n == 0 {
            return Err(invalid("top_n must be at least 1"));
        }
        if opts.match_limit == 0 {
            return Err(invalid("match_limit must be at least 1"));
        }

        let table = ContingencyTable::from_pairs(rows, cols)?;
        if table.total() == 0 {
            return Err(invalid("no data"));
        }
        Ok(self.rank_table(&table, opts))
    }

    /// Rank an already-built table. Options are assumed validated.
    pub fn rank_table(&self, table: &ContingencyTable, opts: &RankOptions) -> GTestRanking {
        let mut scored: Vec<ScoredRow> = self
            .score_table(table)
            .into_iter()
            .filter(|row| row.total >= opts.min_volume)
            .collect();

        scored.sort_by(|a, b| {
            let by_score = if opts.reverse {
                a.score.partial_cmp(&b.score)
            } else {
                b.score.partial_cmp(&a.score)
            };
            by_score
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.category.cmp(&b.category))
        });
        scored.truncate(opts.top_n);

        let selected: Vec<String> = scored.iter().map(|r| r.category.clone()).collect();
        let full_columns = columns_by_volume(table, &selected);
        let reduced_columns: Vec<String> = full_columns
            .iter()
            .take(opts.match_limit)
            .cloned()
            .collect();

        GTestRanking {
            match_count: scored.iter().map(|r| r.total).sum(),
            reduced: CountGrid::project(table, &selected, &reduced_columns),
            full: CountGrid::project(table, &selected, &full_columns),
            ranked: scored,
            total_records: table.total(),
            row_categories: table.rows().len(),
            column_categories: table.columns().len(),
        }
    }
}

/// Columns observed in `rows`, by summed count descending then label.
fn columns_by_volume(table: &ContingencyTable, rows: &[String]) -> Vec<String> {
    let mut volume: FxHashMap<String, u64> = FxHashMap::default();
    for row in rows {
        for (col, n) in table.row_entries(row) {
            *volume.entry(col).or_insert(0) += n;
        }
    }
    let mut cols: Vec<(String, u64)> = volume.into_iter().collect();
    cols.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    cols.into_iter().map(|(c, _)| c).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::StatsError;

    fn scenario() -> (Vec<&'static str>, Vec<&'static str>) {
        (
            vec!["trojan", "trojan", "worm", "worm", "worm"],
            vec!["ASN1", "ASN2", "ASN1", "ASN1", "ASN1"],
        )
    }

    #[test]
    fn test_zero_observed_term_is_zero() {
        assert_eq!(g_term(0.0, 3.5), 0.0);
        assert_eq!(g_term(0.0, 0.0), 0.0);
        assert!(!g_term(0.0, 1e-300).is_nan());
    }

    #[test]
    fn test_term_matches_definition() {
        let t = g_term(4.0, 2.0);
        assert!((t - 4.0 * 2f64.ln()).abs() < 1e-12);
        assert_eq!(g_term(3.0, 3.0), 0.0);
    }

    #[test]
    fn test_scenario_worm_ranks_first() {
        let (rows, cols) = scenario();
        let result = GTest::new().highest_gtest_scores(&rows, &cols, 2, 2).unwrap();

        assert_eq!(result.categories(), vec!["worm", "trojan"]);
        assert!(result.ranked[0].score > result.ranked[1].score);
        assert_eq!(result.full.get("trojan", "ASN1"), Some(1));
        assert_eq!(result.full.get("trojan", "ASN2"), Some(1));
        assert_eq!(result.full.get("worm", "ASN1"), Some(3));
        assert_eq!(result.full.get("worm", "ASN2"), Some(0));
        assert_eq!(result.match_count, 5);
    }

    #[test]
    fn test_scenario_scores_by_hand() {
        let (rows, cols) = scenario();
        let table = ContingencyTable::from_pairs(&rows, &cols).unwrap();
        // worm: e(ASN1) = 3 * 4/5 = 2.4
        let worm = 2.0 * 3.0 * (3.0f64 / 2.4).ln();
        // trojan: e(ASN1) = 1.6, e(ASN2) = 0.4
        let trojan = 2.0 * ((1.0f64 / 1.6).ln() + (1.0f64 / 0.4).ln());
        assert!((g_statistic(&table, "worm") - worm).abs() < 1e-9);
        assert!((g_statistic(&table, "trojan") - trojan).abs() < 1e-9);
    }

    #[test]
    fn test_marginal_row_scores_zero() {
        // "b" is spread 2:1 exactly like the column marginal
        let rows = ["a", "a", "a", "b", "b", "b"];
        let cols = ["x", "x", "y", "x", "x", "y"];
        let table = ContingencyTable::from_pairs(&rows, &cols).unwrap();
        assert!(g_statistic(&table, "b").abs() < 1e-9);
        assert!(g_statistic(&table, "a").abs() < 1e-9);
    }

    #[test]
    fn test_concentrated_row_on_rare_column_scores_high() {
        let mut rows = vec!["spread"; 20];
        let mut cols: Vec<String> = (0..20).map(|i| format!("asn{}", i % 10)).collect();
        rows.extend(["focused"; 5]);
        cols.extend(std::iter::repeat("rare".to_string()).take(5));

        let table = ContingencyTable::from_pairs(&rows, &cols).unwrap();
        let focused = g_statistic(&table, "focused");
        let spread = g_statistic(&table, "spread");
        assert!(focused > 0.0);
        assert!(focused > spread);
        // 2 * 5 * ln(25/5)
        assert!((focused - 10.0 * 5f64.ln()).abs() < 1e-9);
    }

    #[test]
    fn test_reverse_orders_ascending_with_volume_floor() {
        let rows = ["a", "a", "a", "a", "b", "b", "c"];
        let cols = ["x", "y", "x", "y", "x", "x", "y"];
        let opts = RankOptions {
            top_n: 5,
            match_limit: 5,
            reverse: true,
            min_volume: 2,
        };
        let result = GTest::new().rank(&rows, &cols, &opts).unwrap();

        assert!(result.ranked.iter().all(|r| r.total >= 2));
        assert!(!result.categories().contains(&"c"));
        assert!(result
            .ranked
            .windows(2)
            .all(|w| w[0].score <= w[1].score));
        assert_eq!(result.ranked[0].category, "a");
    }

    #[test]
    fn test_volume_floor_applies_without_reverse() {
        let rows = ["a", "a", "b"];
        let cols = ["x", "y", "y"];
        let opts = RankOptions {
            min_volume: 2,
            ..RankOptions::default()
        };
        let result = GTest::new().rank(&rows, &cols, &opts).unwrap();
        assert_eq!(result.categories(), vec!["a"]);
    }

    #[test]
    fn test_match_limit_trims_columns_by_volume() {
        let rows = ["a", "a", "a", "a", "b", "b"];
        let cols = ["x", "x", "x", "y", "z", "z"];
        let opts = RankOptions {
            top_n: 2,
            match_limit: 2,
            ..RankOptions::default()
        };
        let result = GTest::new().rank(&rows, &cols, &opts).unwrap();

        assert_eq!(result.reduced.columns, vec!["x", "z"]);
        assert_eq!(result.full.columns, vec!["x", "z", "y"]);
        assert_eq!(result.reduced.row_sum("a"), 3);
        assert_eq!(result.full.row_sum("a"), 4);
    }

    #[test]
    fn test_top_n_larger_than_rows_returns_all() {
        let (rows, cols) = scenario();
        let result = GTest::new().highest_gtest_scores(&rows, &cols, 50, 50).unwrap();
        assert_eq!(result.ranked.len(), 2);
    }

    #[test]
    fn test_single_record() {
        let result = GTest::new().highest_gtest_scores(&["a"], &["x"], 1, 1).unwrap();
        assert_eq!(result.ranked.len(), 1);
        assert_eq!(result.ranked[0].score, 0.0);
        assert_eq!(result.ranked[0].p_value, 1.0);
        assert_eq!(result.reduced.counts, vec![vec![1]]);
    }

    #[test]
    fn test_invalid_inputs() {
        let gt = GTest::new();
        let err = gt
            .highest_gtest_scores(&["a", "b", "c"], &["x", "y"], 1, 1)
            .unwrap_err();
        assert!(matches!(err, StatsError::InvalidInput(_)));

        let empty: [&str; 0] = [];
        assert!(gt.highest_gtest_scores(&empty, &empty, 1, 1).is_err());
        assert!(gt.highest_gtest_scores(&["a"], &["x"], 0, 1).is_err());
        assert!(gt.highest_gtest_scores(&["a"], &["x"], 1, 0).is_err());
    }

    #[test]
    fn test_ties_break_by_label() {
        let rows = ["b", "a"];
        let cols = ["x", "x"];
        let result = GTest::new().highest_gtest_scores(&rows, &cols, 2, 1).unwrap();
        assert_eq!(result.categories(), vec!["a", "b"]);
    }

    #[test]
    fn test_survival_function_bounds() {
        assert_eq!(chi_squared_survival(0.0, 3), 1.0);
        assert_eq!(chi_squared_survival(5.0, 0), 1.0);
        let p = chi_squared_survival(3.841, 1);
        assert!((p - 0.05).abs() < 0.002);
        let p = chi_squared_survival(5.991, 2);
        assert!((p - 0.05).abs() < 1e-3);
        let p = chi_squared_survival(11.07, 5);
        assert!((p - 0.05).abs() < 0.01);
        assert!(chi_squared_survival(1000.0, 4) < 1e-6);
    }
}
