//! Per-feature descriptive statistics.

use tracing::debug;

use crate::error::{AnalyticsError, Result};
use crate::types::{FeatureColumn, FeatureStatistic, NamedStatistic};
use crate::utils::{quantile_sorted, sort_values};

/// Computes [`FeatureStatistic`] for numeric columns.
pub struct StatisticsAggregator;

impl StatisticsAggregator {
    /// Describe the present values of one column.
    ///
    /// Quartiles and median use linear interpolation between closest ranks
    /// (R-7). `std` divides by N. Values are sorted before any summation, so
    /// the result is identical for every row order.
    ///
    /// Fails with [`AnalyticsError::EmptyInput`] when no value is present.
    pub fn compute(column: &FeatureColumn) -> Result<FeatureStatistic> {
        let mut sorted: Vec<f64> = column.present().collect();
        if sorted.is_empty() {
            return Err(AnalyticsError::EmptyInput(column.name.clone()));
        }
        sort_values(&mut sorted);

        let n = sorted.len() as f64;
        let min = sorted[0];
        let max = sorted[sorted.len() - 1];

        let mean = (sorted.iter().sum::<f64>() / n).clamp(min, max);
        let variance = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let std = variance.max(0.0).sqrt();

        let quartile = |p: f64| quantile_sorted(&sorted, p).unwrap_or(min).clamp(min, max);
        // Interpolation rounding must not break min <= q25 <= median <= q75 <= max.
        let q25 = quartile(0.25);
        let median = quartile(0.5).max(q25);
        let q75 = quartile(0.75).max(median);

        Ok(FeatureStatistic {
            mean,
            median,
            std,
            min,
            max,
            q25,
            q75,
        })
    }

    /// Describe every column, skipping columns without present values.
    pub fn compute_all(columns: &[FeatureColumn]) -> Vec<NamedStatistic> {
        columns
            .iter()
            .filter_map(|column| match Self::compute(column) {
                Ok(statistic) => Some(NamedStatistic {
                    feature: column.name.clone(),
                    statistic,
                }),
                Err(e) => {
                    debug!("Skipping statistics for '{}': {}", column.name, e);
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(values: &[f64]) -> FeatureColumn {
        FeatureColumn::from_values("feature", values.to_vec())
    }

    #[test]
    fn test_one_to_ten() {
        let values: Vec<f64> = (1..=10).map(f64::from).collect();
        let stat = StatisticsAggregator::compute(&column(&values)).unwrap();

        assert_eq!(stat.mean, 5.5);
        assert_eq!(stat.median, 5.5);
        assert_eq!(stat.min, 1.0);
        assert_eq!(stat.max, 10.0);
        assert_eq!(stat.q25, 3.25);
        assert_eq!(stat.q75, 7.75);
        assert!((stat.std - 8.25_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_population_std() {
        // Sample std would be 1 here.
        let stat = StatisticsAggregator::compute(&column(&[1.0, 2.0, 3.0])).unwrap();
        assert!((stat.std - (2.0_f64 / 3.0).sqrt()).abs() < 1e-12);

        let stat = StatisticsAggregator::compute(&column(&[2.0, 4.0])).unwrap();
        assert_eq!(stat.std, 1.0);
    }

    #[test]
    fn test_odd_count_median() {
        let stat = StatisticsAggregator::compute(&column(&[9.0, 1.0, 5.0])).unwrap();
        assert_eq!(stat.median, 5.0);
    }

    #[test]
    fn test_missing_values_excluded() {
        let col = FeatureColumn::new("duration", vec![Some(2.0), None, Some(4.0), None]);
        let stat = StatisticsAggregator::compute(&col).unwrap();
        assert_eq!(stat.mean, 3.0);
        assert_eq!(stat.min, 2.0);
    }

    #[test]
    fn test_empty_input() {
        let col = FeatureColumn::new("urgent", vec![None, None]);
        let err = StatisticsAggregator::compute(&col).unwrap_err();
        assert!(matches!(err, AnalyticsError::EmptyInput(name) if name == "urgent"));
    }

    #[test]
    fn test_row_order_independent_and_idempotent() {
        let values = vec![0.1, 1e9, 0.7, 3.3, 0.2, 17.5, 0.3];
        let mut reversed = values.clone();
        reversed.reverse();

        let a = StatisticsAggregator::compute(&column(&values)).unwrap();
        let b = StatisticsAggregator::compute(&column(&reversed)).unwrap();
        let c = StatisticsAggregator::compute(&column(&values)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn test_constant_column_is_consistent() {
        let stat = StatisticsAggregator::compute(&column(&[0.1, 0.1, 0.1])).unwrap();
        assert!(stat.is_consistent());
        assert_eq!(stat.min, stat.max);
    }

    #[test]
    fn test_compute_all_skips_empty_columns() {
        let columns = vec![
            column(&[1.0, 2.0]),
            FeatureColumn::new("empty", vec![None]),
        ];
        let stats = StatisticsAggregator::compute_all(&columns);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].feature, "feature");
    }
}
