//! Contingency table of co-occurrence counts between two categorical columns

use super::{invalid, StatsResult};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Row-category × column-category count matrix, stored sparsely.
///
/// Cells that were never observed read as zero. Category lists are kept
/// sorted so iteration order never depends on hash order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContingencyTable {
    /// row -> column -> count, nonzero cells only
    cells: FxHashMap<String, FxHashMap<String, u64>>,
    row_totals: FxHashMap<String, u64>,
    col_totals: FxHashMap<String, u64>,
    rows: Vec<String>,
    columns: Vec<String>,
    total: u64,
}

impl ContingencyTable {
    /// Count co-occurrences of aligned `(rows[i], cols[i])` pairs.
    pub fn from_pairs<R, C>(rows: &[R], cols: &[C]) -> StatsResult<Self>
    where
        R: AsRef<str>,
        C: AsRef<str>,
    {
        if rows.len() != cols.len() {
            return Err(invalid(format!(
                "row series has {} values but column series has {}",
                rows.len(),
                cols.len()
            )));
        }
        if rows.is_empty() {
            return Err(invalid("cannot build a contingency table from empty series"));
        }

        let mut cells: FxHashMap<String, FxHashMap<String, u64>> = FxHashMap::default();
        let mut row_totals: FxHashMap<String, u64> = FxHashMap::default();
        let mut col_totals: FxHashMap<String, u64> = FxHashMap::default();

        for (r, c) in rows.iter().zip(cols) {
            let (r, c) = (r.as_ref(), c.as_ref());
            *cells
                .entry(r.to_string())
                .or_default()
                .entry(c.to_string())
                .or_insert(0) += 1;
            *row_totals.entry(r.to_string()).or_insert(0) += 1;
            *col_totals.entry(c.to_string()).or_insert(0) += 1;
        }

        let mut row_keys: Vec<String> = row_totals.keys().cloned().collect();
        row_keys.sort();
        let mut col_keys: Vec<String> = col_totals.keys().cloned().collect();
        col_keys.sort();

        Ok(Self {
            cells,
            row_totals,
            col_totals,
            rows: row_keys,
            columns: col_keys,
            total: rows.len() as u64,
        })
    }

    /// Observed count for a cell (zero if never seen).
    #[must_use]
    pub fn count(&self, row: &str, col: &str) -> u64 {
        self.cells
            .get(row)
            .and_then(|cols| cols.get(col))
            .copied()
            .unwrap_or(0)
    }

    /// Total occurrences of a row category.
    #[must_use]
    pub fn row_total(&self, row: &str) -> u64 {
        self.row_totals.get(row).copied().unwrap_or(0)
    }

    /// Total occurrences of a column category.
    #[must_use]
    pub fn col_total(&self, col: &str) -> u64 {
        self.col_totals.get(col).copied().unwrap_or(0)
    }

    /// Grand total N (number of aligned records).
    #[must_use]
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Distinct row categories, sorted.
    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    /// Distinct column categories, sorted.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of observed (nonzero) cells.
    #[must_use]
    pub fn nonzero_cells(&self) -> usize {
        self.cells.values().map(|cols| cols.len()).sum()
    }

    /// Nonzero `(column, count)` entries of one row, sorted by column.
    pub fn row_entries(&self, row: &str) -> Vec<(String, u64)> {
        let mut entries: Vec<(String, u64)> = self
            .cells
            .get(row)
            .map(|cols| cols.iter().map(|(c, n)| (c.clone(), *n)).collect())
            .unwrap_or_default();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Iterate over all nonzero `(row, column, count)` cells.
    pub fn cells(&self) -> impl Iterator<Item = (&str, &str, u64)> + '_ {
        self.cells.iter().flat_map(|(row, cols)| {
            cols.iter()
                .map(move |(col, n)| (row.as_str(), col.as_str(), *n))
        })
    }
}

/// A labelled count matrix ready for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CountGrid {
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    /// `counts[i][j]` is the count for `rows[i]` × `columns[j]`.
    pub counts: Vec<Vec<u64>>,
}

impl CountGrid {
    pub(crate) fn project(table: &ContingencyTable, rows: &[String], columns: &[String]) -> Self {
        let counts = rows
            .iter()
            .map(|r| columns.iter().map(|c| table.count(r, c)).collect())
            .collect();
        Self {
            rows: rows.to_vec(),
            columns: columns.to_vec(),
            counts,
        }
    }

    /// Sum of one row of the grid.
    #[must_use]
    pub fn row_sum(&self, row: &str) -> u64 {
        self.rows
            .iter()
            .position(|r| r == row)
            .map(|i| self.counts[i].iter().sum())
            .unwrap_or(0)
    }

    /// Look up one cell of the grid.
    #[must_use]
    pub fn get(&self, row: &str, col: &str) -> Option<u64> {
        let i = self.rows.iter().position(|r| r == row)?;
        let j = self.columns.iter().position(|c| c == col)?;
        Some(self.counts[i][j])
    }
}
