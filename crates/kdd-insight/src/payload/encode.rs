//! Computed results to endpoint payloads.
//!
//! Map keys follow input order (`serde_json` is built with
//! `preserve_order`). Undefined correlation coefficients are encoded as
//! `null`. Numbers are never rounded here.

use serde_json::{Map, Value, json};

use crate::types::{
    AnomalyReport, CategoricalSummary, ClassDistribution, CorrelationMatrix, CorrelationReport,
    DatasetOverview, FeatureDistribution, ModelMetricsSummary, NamedStatistic, RankedCorrelations,
};

pub fn overview(overview: &DatasetOverview) -> Value {
    json!({
        "total_records": overview.total_records,
        "total_features": overview.total_features,
        "numeric_features": overview.numeric_features,
        "categorical_features": overview.categorical_features,
        "feature_names": overview.feature_names,
        "dataset_description": overview.dataset_description,
    })
}

pub fn class_distribution(dist: &ClassDistribution) -> Value {
    let mut distribution = Map::new();
    let mut percentages = Map::new();
    for entry in &dist.entries {
        distribution.insert(entry.label.clone(), json!(entry.count));
        percentages.insert(entry.label.clone(), json!(entry.percentage));
    }
    json!({
        "distribution": distribution,
        "percentages": percentages,
        "total_records": dist.total_records,
        "explanation": "Class distribution. Normal: legitimate connections. \
            Anomaly: connections carrying an attack attempt.",
    })
}

pub fn statistics(stats: &[NamedStatistic]) -> Value {
    let mut root = Map::new();
    for named in stats {
        let s = &named.statistic;
        root.insert(
            named.feature.clone(),
            json!({
                "mean": s.mean,
                "median": s.median,
                "std": s.std,
                "min": s.min,
                "max": s.max,
                "q25": s.q25,
                "q75": s.q75,
                "explanation": format!(
                    "Statistics of {}: mean, median, range and spread.",
                    named.feature
                ),
            }),
        );
    }
    Value::Object(root)
}

/// Wrapped form, `{correlation_matrix, explanation}`.
pub fn correlation_matrix(matrix: &CorrelationMatrix) -> Value {
    let mut outer = Map::new();
    for (i, row_name) in matrix.features.iter().enumerate() {
        let mut row = Map::new();
        for (j, col_name) in matrix.features.iter().enumerate() {
            row.insert(col_name.clone(), json!(matrix.values[i][j]));
        }
        outer.insert(row_name.clone(), Value::Object(row));
    }
    json!({
        "correlation_matrix": outer,
        "explanation": "Pearson correlation between features. Values near 1: strong \
            positive correlation. Values near -1: strong negative correlation. \
            Values near 0: no linear correlation.",
    })
}

pub fn top_correlations(report: &CorrelationReport) -> Value {
    let ranked = RankedCorrelations::from(report);
    json!({
        "top_positive": ranked.top_positive,
        "top_negative": ranked.top_negative,
    })
}

pub fn feature_distributions(distributions: &[FeatureDistribution]) -> Value {
    let mut root = Map::new();
    for fd in distributions {
        let d = &fd.distribution;
        root.insert(
            fd.feature.clone(),
            json!({
                "values": d.frequencies,
                "bins": d.bins,
                "count": d.total_count,
                "explanation": format!(
                    "Histogram of {}: frequencies over {} intervals.",
                    fd.feature,
                    d.bin_count()
                ),
            }),
        );
    }
    Value::Object(root)
}

pub fn categorical_analysis(summaries: &[CategoricalSummary]) -> Value {
    let mut root = Map::new();
    for summary in summaries {
        let counts: Map<String, Value> = summary
            .counts
            .iter()
            .map(|c| (c.value.clone(), json!(c.count)))
            .collect();
        root.insert(
            summary.feature.clone(),
            json!({
                "counts": counts,
                "total": summary.total,
                "explanation": format!("Value frequencies of {}.", summary.feature),
            }),
        );
    }
    Value::Object(root)
}

pub fn anomaly_analysis(report: &AnomalyReport) -> Value {
    let mut comparison = Map::new();
    for c in &report.comparisons {
        comparison.insert(
            c.feature.clone(),
            json!({
                "normal_mean": c.normal_mean,
                "anomaly_mean": c.anomaly_mean,
                "difference": c.difference,
                "explanation": format!(
                    "Comparison of {} between normal and anomalous connections.",
                    c.feature
                ),
            }),
        );
    }
    json!({
        "comparison": comparison,
        "normal_count": report.normal_count,
        "anomaly_count": report.anomaly_count,
        "explanation": "Comparison between legitimate connections and connections \
            carrying anomalies or attacks.",
    })
}

pub fn model_metrics(metrics: &ModelMetricsSummary) -> Value {
    let characteristics: Map<String, Value> = metrics
        .characteristics
        .iter()
        .map(|c| (c.name.clone(), json!(c.description)))
        .collect();
    json!({
        "expected_metrics": {
            "accuracy": metrics.accuracy,
            "precision": metrics.precision,
            "recall": metrics.recall,
            "f1_score": metrics.f1_score,
        },
        "explanation": metrics.explanation,
        "dataset_characteristics": characteristics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClassShare, FeatureStatistic};

    #[test]
    fn test_class_distribution_shape() {
        let dist = ClassDistribution {
            entries: vec![
                ClassShare {
                    label: "normal".into(),
                    count: 3,
                    percentage: 75.0,
                },
                ClassShare {
                    label: "anomaly".into(),
                    count: 1,
                    percentage: 25.0,
                },
            ],
            total_records: 4,
        };
        let value = class_distribution(&dist);
        assert_eq!(value["distribution"]["normal"], 3);
        assert_eq!(value["percentages"]["anomaly"], 25.0);
        assert_eq!(value["total_records"], 4);

        let keys: Vec<&String> = value["distribution"].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["normal", "anomaly"]);
    }

    #[test]
    fn test_undefined_correlation_is_null() {
        let matrix = CorrelationMatrix {
            features: vec!["a".into(), "land".into()],
            values: vec![vec![Some(1.0), None], vec![None, None]],
        };
        let value = correlation_matrix(&matrix);
        assert!(value["correlation_matrix"]["a"]["land"].is_null());
        assert_eq!(value["correlation_matrix"]["a"]["a"], 1.0);
    }

    #[test]
    fn test_statistics_shape() {
        let stats = vec![NamedStatistic {
            feature: "duration".into(),
            statistic: FeatureStatistic {
                mean: 1.0,
                median: 1.0,
                std: 0.0,
                min: 1.0,
                max: 1.0,
                q25: 1.0,
                q75: 1.0,
            },
        }];
        let value = statistics(&stats);
        assert_eq!(value["duration"]["q75"], 1.0);
        assert!(value["duration"]["explanation"].is_string());
    }
}
