//! Mean comparison between normal and anomalous records.

use tracing::debug;

use crate::error::{AnalyticsError, Result};
use crate::types::{AnomalyComparison, AnomalyReport, FeatureColumn};
use crate::utils::order_independent_mean;

pub struct AnomalyComparator;

impl AnomalyComparator {
    /// Compare the per-label means of each column.
    ///
    /// `labels` must hold one entry per record of every column. Records whose
    /// label is neither `normal_label` nor `anomaly_label` are ignored. A
    /// feature without present values in either group is left out.
    pub fn compare<S: AsRef<str>>(
        columns: &[FeatureColumn],
        labels: &[S],
        normal_label: &str,
        anomaly_label: &str,
    ) -> Result<AnomalyReport> {
        if let Some(column) = columns.iter().find(|c| c.len() != labels.len()) {
            return Err(AnalyticsError::Alignment {
                column: column.name.clone(),
                expected: labels.len(),
                found: column.len(),
            });
        }

        let normal_count = labels.iter().filter(|l| l.as_ref() == normal_label).count();
        let anomaly_count = labels.iter().filter(|l| l.as_ref() == anomaly_label).count();

        let mut comparisons = Vec::with_capacity(columns.len());
        for column in columns {
            let group_mean = |target: &str| {
                order_independent_mean(
                    column
                        .values()
                        .iter()
                        .zip(labels)
                        .filter(|(_, label)| label.as_ref() == target)
                        .filter_map(|(value, _)| *value),
                )
            };

            match (group_mean(normal_label), group_mean(anomaly_label)) {
                (Some(normal_mean), Some(anomaly_mean)) => comparisons.push(AnomalyComparison {
                    feature: column.name.clone(),
                    normal_mean,
                    anomaly_mean,
                    difference: anomaly_mean - normal_mean,
                }),
                _ => debug!("Excluding '{}' from anomaly comparison: empty group", column.name),
            }
        }

        let ranking = rank_by_effect(&comparisons);

        Ok(AnomalyReport {
            comparisons,
            ranking,
            normal_count,
            anomaly_count,
        })
    }
}

/// Feature names by descending |difference|, ties by name.
pub(crate) fn rank_by_effect(comparisons: &[AnomalyComparison]) -> Vec<String> {
    let mut ranked: Vec<&AnomalyComparison> = comparisons.iter().collect();
    ranked.sort_by(|a, b| {
        b.difference
            .abs()
            .total_cmp(&a.difference.abs())
            .then_with(|| a.feature.cmp(&b.feature))
    });
    ranked.into_iter().map(|c| c.feature.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> Vec<&'static str> {
        vec!["normal", "anomaly", "normal", "anomaly", "normal"]
    }

    #[test]
    fn test_means_and_difference() {
        let columns = vec![FeatureColumn::from_values(
            "src_bytes",
            vec![10.0, 100.0, 20.0, 300.0, 30.0],
        )];
        let report = AnomalyComparator::compare(&columns, &labels(), "normal", "anomaly").unwrap();

        let cmp = report.get("src_bytes").unwrap();
        assert_eq!(cmp.normal_mean, 20.0);
        assert_eq!(cmp.anomaly_mean, 200.0);
        assert_eq!(cmp.difference, 180.0);
        assert_eq!(report.normal_count, 3);
        assert_eq!(report.anomaly_count, 2);
    }

    #[test]
    fn test_ranking_by_absolute_difference() {
        let columns = vec![
            FeatureColumn::from_values("small", vec![1.0, 2.0, 1.0, 2.0, 1.0]),
            FeatureColumn::from_values("negative", vec![50.0, 0.0, 50.0, 0.0, 50.0]),
            FeatureColumn::from_values("large", vec![0.0, 10.0, 0.0, 10.0, 0.0]),
        ];
        let report = AnomalyComparator::compare(&columns, &labels(), "normal", "anomaly").unwrap();
        assert_eq!(report.ranking, vec!["negative", "large", "small"]);

        // comparisons keep input order
        assert_eq!(report.comparisons[0].feature, "small");
        let ranked: Vec<&str> = report.ranked().map(|c| c.feature.as_str()).collect();
        assert_eq!(ranked, vec!["negative", "large", "small"]);
    }

    #[test]
    fn test_feature_with_empty_group_excluded() {
        let columns = vec![
            FeatureColumn::new(
                "num_shells",
                vec![Some(1.0), None, Some(2.0), None, Some(3.0)],
            ),
            FeatureColumn::from_values("hot", vec![1.0, 2.0, 3.0, 4.0, 5.0]),
        ];
        let report = AnomalyComparator::compare(&columns, &labels(), "normal", "anomaly").unwrap();
        assert!(report.get("num_shells").is_none());
        assert_eq!(report.ranking, vec!["hot"]);
    }

    #[test]
    fn test_no_anomalies_excludes_all_features() {
        let columns = vec![FeatureColumn::from_values("hot", vec![1.0, 2.0])];
        let report =
            AnomalyComparator::compare(&columns, &["normal", "normal"], "normal", "anomaly")
                .unwrap();
        assert!(report.comparisons.is_empty());
        assert_eq!(report.anomaly_count, 0);
    }

    #[test]
    fn test_misaligned_labels() {
        let columns = vec![FeatureColumn::from_values("hot", vec![1.0, 2.0])];
        let err = AnomalyComparator::compare(&columns, &labels(), "normal", "anomaly").unwrap_err();
        assert_eq!(err.error_code(), "ALIGNMENT_ERROR");
    }
}
