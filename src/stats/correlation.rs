//! Pearson correlation between numeric series

use super::{invalid, StatsResult};
use serde::{Deserialize, Serialize};

/// Pearson's r between two equal-length series.
///
/// Returns `Ok(None)` when either series is constant (r is undefined).
pub fn pearson(x: &[f64], y: &[f64]) -> StatsResult<Option<f64>> {
    if x.len() != y.len() {
        return Err(invalid(format!(
            "cannot correlate series of length {} and {}",
            x.len(),
            y.len()
        )));
    }
    if x.len() < 2 {
        return Err(invalid("correlation needs at least two points"));
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return Ok(None);
    }
    Ok(Some((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0)))
}

/// Symmetric matrix of pairwise correlations, names sorted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub names: Vec<String>,
    /// `values[i][j]` is r(names[i], names[j]); `None` where undefined
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    /// Build from named series, which must all share one length.
    pub fn from_series(mut series: Vec<(String, Vec<f64>)>) -> StatsResult<Self> {
        series.sort_by(|a, b| a.0.cmp(&b.0));

        let n = series.len();
        let mut values = vec![vec![None; n]; n];
        for i in 0..n {
            for j in i..n {
                let r = pearson(&series[i].1, &series[j].1)?;
                values[i][j] = r;
                values[j][i] = r;
            }
        }

        Ok(Self {
            names: series.into_iter().map(|(name, _)| name).collect(),
            values,
        })
    }

    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.names.iter().position(|n| n == a)?;
        let j = self.names.iter().position(|n| n == b)?;
        self.values[i][j]
    }
}

/// Two series and their correlation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelatedPair {
    pub a: String,
    pub b: String,
    pub r: f64,
}

/// Every defined off-diagonal pair, strongest |r| first.
pub fn ranked_pairs(matrix: &CorrelationMatrix) -> Vec<CorrelatedPair> {
    let mut pairs = Vec::new();
    for i in 0..matrix.names.len() {
        for j in (i + 1)..matrix.names.len() {
            if let Some(r) = matrix.values[i][j] {
                pairs.push(CorrelatedPair {
                    a: matrix.names[i].clone(),
                    b: matrix.names[j].clone(),
                    r,
                });
            }
        }
    }
    pairs.sort_by(|x, y| {
        y.r.abs()
            .partial_cmp(&x.r.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| x.a.cmp(&y.a))
            .then_with(|| x.b.cmp(&y.b))
    });
    pairs
}

/// Pairs that move together almost perfectly (|r| at or above `threshold`).
pub fn redundant_pairs(matrix: &CorrelationMatrix, threshold: f64) -> Vec<CorrelatedPair> {
    ranked_pairs(matrix)
        .into_iter()
        .filter(|p| p.r.abs() >= threshold)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_series() {
        let x = [1.0, 2.0, 3.0, 5.0];
        let r = pearson(&x, &x).unwrap().unwrap();
        assert!((r - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_anticorrelated() {
        let r = pearson(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]).unwrap().unwrap();
        assert!((r + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_known_value() {
        let r = pearson(&[1.0, 2.0, 3.0, 4.0], &[2.0, 1.0, 4.0, 3.0])
            .unwrap()
            .unwrap();
        assert!((r - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_constant_series_is_undefined() {
        assert_eq!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).unwrap(), None);
    }

    #[test]
    fn test_bad_lengths() {
        assert!(pearson(&[1.0, 2.0], &[1.0]).is_err());
        assert!(pearson(&[1.0], &[1.0]).is_err());
    }

    #[test]
    fn test_matrix_sorted_and_symmetric() {
        let matrix = CorrelationMatrix::from_series(vec![
            ("zeus".into(), vec![1.0, 2.0, 3.0]),
            ("banker".into(), vec![2.0, 4.0, 7.0]),
            ("flat".into(), vec![1.0, 1.0, 1.0]),
        ])
        .unwrap();

        assert_eq!(matrix.names, vec!["banker", "flat", "zeus"]);
        assert_eq!(matrix.get("zeus", "banker"), matrix.get("banker", "zeus"));
        assert!((matrix.get("zeus", "zeus").unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(matrix.get("flat", "flat"), None);
        assert_eq!(matrix.get("flat", "zeus"), None);
    }

    #[test]
    fn test_ranked_pairs_strongest_first() {
        let matrix = CorrelationMatrix::from_series(vec![
            ("a".into(), vec![1.0, 2.0, 3.0, 4.0]),
            ("b".into(), vec![2.0, 1.0, 4.0, 3.0]),
            ("c".into(), vec![4.0, 3.0, 2.0, 1.0]),
        ])
        .unwrap();
        let pairs = ranked_pairs(&matrix);
        assert_eq!(pairs.len(), 3);
        assert_eq!((pairs[0].a.as_str(), pairs[0].b.as_str()), ("a", "c"));
        assert!((pairs[0].r + 1.0).abs() < 1e-12);
        assert!(pairs.windows(2).all(|w| w[0].r.abs() >= w[1].r.abs()));
    }

    #[test]
    fn test_redundant_pairs() {
        let matrix = CorrelationMatrix::from_series(vec![
            ("inactive".into(), vec![0.0, 1.0, 1.0, 0.0]),
            ("country".into(), vec![0.0, 1.0, 1.0, 0.0]),
            ("other".into(), vec![3.0, 1.0, 2.0, 2.0]),
        ])
        .unwrap();
        let pairs = redundant_pairs(&matrix, 0.999);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].a, "country");
        assert_eq!(pairs[0].b, "inactive");
    }
}
