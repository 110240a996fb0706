//! Pearson correlation matrix and ranked pair extraction.

use tracing::debug;

use crate::error::{AnalyticsError, Result};
use crate::types::{CorrelationMatrix, CorrelationPair, CorrelationReport, FeatureColumn};

/// Computes pairwise Pearson coefficients across aligned columns.
pub struct CorrelationEngine;

/// Centered values of a fully present, non-constant column.
struct Moments {
    centered: Vec<f64>,
    sum_squares: f64,
}

impl CorrelationEngine {
    /// Build the matrix and the top-`k` positive and negative pair lists.
    ///
    /// All columns must have the same length. Records missing either value
    /// are skipped for that pair only. A coefficient is undefined (`None`)
    /// when either side is constant over the shared records or fewer than two
    /// records are shared; undefined pairs never enter the ranked lists.
    pub fn compute(columns: &[FeatureColumn], top_k: usize) -> Result<CorrelationReport> {
        let matrix = Self::matrix(columns)?;
        let pairs = Self::pairs(&matrix);
        let (top_positive, top_negative) = Self::rank(pairs, top_k);

        Ok(CorrelationReport {
            matrix,
            top_positive,
            top_negative,
        })
    }

    /// Symmetric coefficient matrix in input column order.
    pub fn matrix(columns: &[FeatureColumn]) -> Result<CorrelationMatrix> {
        check_alignment(columns)?;

        let size = columns.len();
        let moments: Vec<Option<Moments>> = columns.iter().map(complete_moments).collect();
        let mut values = vec![vec![None; size]; size];

        for i in 0..size {
            values[i][i] = has_variance(&columns[i]).then_some(1.0);

            for j in (i + 1)..size {
                let r = match (&moments[i], &moments[j]) {
                    (Some(a), Some(b)) => from_moments(a, b),
                    _ => pairwise_complete(&columns[i], &columns[j]),
                };
                let r = r.filter(|r| r.is_finite()).map(|r| r.clamp(-1.0, 1.0));
                values[i][j] = r;
                values[j][i] = r;
            }
        }

        debug!("Computed {}x{} correlation matrix", size, size);

        Ok(CorrelationMatrix {
            features: columns.iter().map(|c| c.name.clone()).collect(),
            values,
        })
    }

    /// Every defined off-diagonal pair once, with `feature_a < feature_b`.
    pub fn pairs(matrix: &CorrelationMatrix) -> Vec<CorrelationPair> {
        let mut pairs = Vec::new();
        for i in 0..matrix.len() {
            for j in (i + 1)..matrix.len() {
                let Some(correlation) = matrix.values[i][j] else {
                    continue;
                };
                let (a, b) = (&matrix.features[i], &matrix.features[j]);
                if a == b {
                    continue;
                }
                let (feature_a, feature_b) = if a < b { (a, b) } else { (b, a) };
                pairs.push(CorrelationPair {
                    feature_a: feature_a.clone(),
                    feature_b: feature_b.clone(),
                    correlation,
                });
            }
        }
        pairs
    }

    /// Split into the `k` most positive (descending) and `k` most negative
    /// (ascending) pairs. Zero coefficients belong to neither list. Ties are
    /// ordered by `(feature_a, feature_b)`.
    pub fn rank(
        pairs: Vec<CorrelationPair>,
        k: usize,
    ) -> (Vec<CorrelationPair>, Vec<CorrelationPair>) {
        let by_names = |a: &CorrelationPair, b: &CorrelationPair| {
            (&a.feature_a, &a.feature_b).cmp(&(&b.feature_a, &b.feature_b))
        };

        let (mut positive, rest): (Vec<_>, Vec<_>) =
            pairs.into_iter().partition(|p| p.correlation > 0.0);
        let mut negative: Vec<_> = rest.into_iter().filter(|p| p.correlation < 0.0).collect();

        positive.sort_by(|a, b| {
            b.correlation
                .total_cmp(&a.correlation)
                .then_with(|| by_names(a, b))
        });
        negative.sort_by(|a, b| {
            a.correlation
                .total_cmp(&b.correlation)
                .then_with(|| by_names(a, b))
        });

        positive.truncate(k);
        negative.truncate(k);
        (positive, negative)
    }
}

fn check_alignment(columns: &[FeatureColumn]) -> Result<()> {
    let Some(first) = columns.first() else {
        return Ok(());
    };
    match columns.iter().find(|c| c.len() != first.len()) {
        Some(column) => Err(AnalyticsError::Alignment {
            column: column.name.clone(),
            expected: first.len(),
            found: column.len(),
        }),
        None => Ok(()),
    }
}

fn has_variance(column: &FeatureColumn) -> bool {
    let mut present = column.present();
    match present.next() {
        Some(first) => present.any(|v| v != first),
        None => false,
    }
}

fn complete_moments(column: &FeatureColumn) -> Option<Moments> {
    if column.has_missing() || !has_variance(column) {
        return None;
    }
    let values: Vec<f64> = column.present().collect();
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let centered: Vec<f64> = values.iter().map(|v| v - mean).collect();
    let sum_squares = centered.iter().map(|c| c * c).sum();
    Some(Moments {
        centered,
        sum_squares,
    })
}

fn from_moments(a: &Moments, b: &Moments) -> Option<f64> {
    let covariance: f64 = a
        .centered
        .iter()
        .zip(&b.centered)
        .map(|(x, y)| x * y)
        .sum();
    let denominator = (a.sum_squares * b.sum_squares).sqrt();
    (denominator > 0.0).then(|| covariance / denominator)
}

fn pairwise_complete(a: &FeatureColumn, b: &FeatureColumn) -> Option<f64> {
    let (x, y): (Vec<f64>, Vec<f64>) = a
        .values()
        .iter()
        .zip(b.values())
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .unzip();

    if x.len() < 2 || is_constant(&x) || is_constant(&y) {
        return None;
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut ss_x = 0.0;
    let mut ss_y = 0.0;
    for (xi, yi) in x.iter().zip(&y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        covariance += dx * dy;
        ss_x += dx * dx;
        ss_y += dy * dy;
    }

    let denominator = (ss_x * ss_y).sqrt();
    (denominator > 0.0).then(|| covariance / denominator)
}

fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(name: &str, values: &[f64]) -> FeatureColumn {
        FeatureColumn::from_values(name, values.to_vec())
    }

    fn sample_columns() -> Vec<FeatureColumn> {
        vec![
            col("count", &[1.0, 2.0, 3.0, 4.0, 5.0]),
            col("srv_count", &[2.0, 4.0, 6.0, 8.0, 10.5]),
            col("rerror_rate", &[5.0, 4.0, 3.0, 2.0, 1.0]),
            col("land", &[0.0, 0.0, 0.0, 0.0, 0.0]),
            col("hot", &[3.0, 1.0, 4.0, 1.0, 5.0]),
        ]
    }

    #[test]
    fn test_matrix_symmetric_with_unit_diagonal() {
        let matrix = CorrelationEngine::matrix(&sample_columns()).unwrap();
        assert!(matrix.is_symmetric());
        for name in ["count", "srv_count", "rerror_rate", "hot"] {
            assert_eq!(matrix.get(name, name), Some(1.0));
        }
    }

    #[test]
    fn test_self_correlation_exactly_one() {
        let matrix = CorrelationEngine::matrix(&[
            col("a", &[0.1, 0.7, 0.3]),
            col("b", &[0.1, 0.7, 0.3]),
        ])
        .unwrap();
        assert_eq!(matrix.get("a", "a"), Some(1.0));
        assert!(matrix.get("a", "b").unwrap() <= 1.0);
    }

    #[test]
    fn test_zero_variance_excluded() {
        let report = CorrelationEngine::compute(&sample_columns(), 5).unwrap();
        assert_eq!(report.matrix.get("land", "land"), None);
        assert_eq!(report.matrix.get("land", "count"), None);

        let mentions_land = report
            .top_positive
            .iter()
            .chain(&report.top_negative)
            .any(|p| p.feature_a == "land" || p.feature_b == "land");
        assert!(!mentions_land);
    }

    #[test]
    fn test_perfect_negative_correlation() {
        let matrix = CorrelationEngine::matrix(&sample_columns()).unwrap();
        let r = matrix.get("count", "rerror_rate").unwrap();
        assert!((r + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_ranked_lists_ordered_and_disjoint() {
        let report = CorrelationEngine::compute(&sample_columns(), 5).unwrap();

        assert!(
            report
                .top_positive
                .windows(2)
                .all(|w| w[0].correlation >= w[1].correlation)
        );
        assert!(
            report
                .top_negative
                .windows(2)
                .all(|w| w[0].correlation <= w[1].correlation)
        );
        assert!(report.top_positive.iter().all(|p| p.correlation > 0.0));
        assert!(report.top_negative.iter().all(|p| p.correlation < 0.0));

        for pair in report.top_positive.iter().chain(&report.top_negative) {
            assert_ne!(pair.feature_a, pair.feature_b);
            assert!(pair.feature_a < pair.feature_b);
        }
        assert_eq!(report.top_positive[0].label(), "count - srv_count");
    }

    #[test]
    fn test_each_pair_emitted_once() {
        let matrix = CorrelationEngine::matrix(&sample_columns()).unwrap();
        let pairs = CorrelationEngine::pairs(&matrix);
        // 4 non-constant features -> 6 pairs
        assert_eq!(pairs.len(), 6);
        for (i, p) in pairs.iter().enumerate() {
            for q in &pairs[i + 1..] {
                assert!(!(p.feature_a == q.feature_a && p.feature_b == q.feature_b));
            }
        }
    }

    #[test]
    fn test_top_k_truncates() {
        let report = CorrelationEngine::compute(&sample_columns(), 1).unwrap();
        assert!(report.top_positive.len() <= 1);
        assert!(report.top_negative.len() <= 1);
    }

    #[test]
    fn test_ties_broken_by_names() {
        let pairs = vec![
            CorrelationPair {
                feature_a: "b".into(),
                feature_b: "c".into(),
                correlation: 0.5,
            },
            CorrelationPair {
                feature_a: "a".into(),
                feature_b: "c".into(),
                correlation: 0.5,
            },
            CorrelationPair {
                feature_a: "a".into(),
                feature_b: "b".into(),
                correlation: 0.5,
            },
        ];
        let (positive, negative) = CorrelationEngine::rank(pairs, 5);
        let labels: Vec<String> = positive.iter().map(CorrelationPair::label).collect();
        assert_eq!(labels, vec!["a - b", "a - c", "b - c"]);
        assert!(negative.is_empty());
    }

    #[test]
    fn test_alignment_error() {
        let err = CorrelationEngine::matrix(&[
            col("a", &[1.0, 2.0, 3.0]),
            col("b", &[1.0, 2.0]),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            AnalyticsError::Alignment { column, expected: 3, found: 2 } if column == "b"
        ));
    }

    #[test]
    fn test_pairwise_complete_observations() {
        let a = FeatureColumn::new("a", vec![Some(1.0), Some(2.0), None, Some(3.0)]);
        let b = FeatureColumn::new("b", vec![Some(2.0), Some(4.0), Some(100.0), Some(6.0)]);
        let matrix = CorrelationEngine::matrix(&[a, b]).unwrap();
        let r = matrix.get("a", "b").unwrap();
        assert!((r - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_input_gives_empty_report() {
        let report = CorrelationEngine::compute(&[], 5).unwrap();
        assert!(report.matrix.is_empty());
        assert!(report.top_positive.is_empty());
    }
}
