//! Built-in NSL-KDD reference figures shown when a unit's data source fails.
//!
//! Every constant set is a complete domain value that satisfies the same
//! invariants as a computed one, so a fallback view never mixes with real
//! data.

use crate::analytics::anomaly::rank_by_effect;
use crate::analytics::correlation::CorrelationEngine;
use crate::types::{
    AnomalyComparison, AnomalyReport, CategoricalSummary, ClassDistribution, ClassShare,
    CorrelationMatrix, DatasetOverview, Distribution, FeatureDistribution, FeatureStatistic,
    ModelMetricsSummary, NamedStatistic, RankedCorrelations, RankedPair, ValueCount,
};

pub const TOTAL_RECORDS: usize = 125_973;
pub const TOTAL_FEATURES: usize = 42;
pub const NUMERIC_FEATURES: usize = 38;
pub const CATEGORICAL_FEATURES: usize = 4;
pub const NORMAL_COUNT: usize = 67_343;
pub const ANOMALY_COUNT: usize = 58_630;

const DESCRIPTION: &str = "NSL-KDD 2009: network intrusion detection dataset \
    (reference figures, live data unavailable).";

const PROTOCOLS: &[(&str, usize)] = &[
    ("tcp", 68_234),
    ("udp", 44_526),
    ("icmp", 12_500),
    ("other", 713),
];

// feature, mean, median, std, min, max, q25, q75
const STATISTICS: &[(&str, [f64; 7])] = &[
    ("duration", [287.14, 0.0, 2604.52, 0.0, 42908.0, 0.0, 0.0]),
    ("src_bytes", [45566.74, 44.0, 5870331.18, 0.0, 1379963888.0, 0.0, 276.0]),
    ("dst_bytes", [19779.11, 0.0, 4021269.15, 0.0, 1309937401.0, 0.0, 516.0]),
    ("count", [84.11, 14.0, 114.51, 0.0, 511.0, 2.0, 143.0]),
    ("srv_count", [27.74, 8.0, 72.64, 0.0, 511.0, 2.0, 18.0]),
    ("serror_rate", [0.28, 0.0, 0.45, 0.0, 1.0, 0.0, 1.0]),
];

const CORRELATION_FEATURES: &[&str] = &[
    "duration",
    "src_bytes",
    "dst_bytes",
    "count",
    "srv_count",
    "serror_rate",
    "srv_serror_rate",
    "same_srv_rate",
];

// Pairs not listed are uncorrelated.
const CORRELATION_PAIRS: &[(&str, &str, f64)] = &[
    ("duration", "src_bytes", 0.07),
    ("duration", "dst_bytes", 0.04),
    ("duration", "count", -0.08),
    ("duration", "same_srv_rate", 0.07),
    ("src_bytes", "dst_bytes", 0.02),
    ("count", "srv_count", 0.37),
    ("count", "serror_rate", 0.52),
    ("count", "srv_serror_rate", 0.52),
    ("count", "same_srv_rate", -0.64),
    ("srv_count", "serror_rate", -0.11),
    ("srv_count", "same_srv_rate", 0.21),
    ("serror_rate", "srv_serror_rate", 0.99),
    ("serror_rate", "same_srv_rate", -0.76),
    ("srv_serror_rate", "same_srv_rate", -0.75),
];

// feature, lower bound, upper bound, frequencies
const HISTOGRAMS: &[(&str, f64, f64, [usize; 10])] = &[
    (
        "count",
        0.0,
        511.0,
        [70532, 9311, 5209, 4010, 4588, 6422, 5210, 4023, 3870, 12798],
    ),
    (
        "serror_rate",
        0.0,
        1.0,
        [87422, 1240, 610, 380, 310, 290, 240, 330, 560, 34591],
    ),
    (
        "same_srv_rate",
        0.0,
        1.0,
        [3120, 20510, 6380, 2410, 1630, 1720, 1210, 980, 1360, 86653],
    ),
];

// feature, normal mean, anomaly mean
const ANOMALY_MEANS: &[(&str, f64, f64)] = &[
    ("duration", 168.59, 423.49),
    ("src_bytes", 13133.28, 82820.88),
    ("dst_bytes", 4329.69, 36842.43),
    ("count", 22.52, 154.80),
    ("srv_count", 27.74, 27.73),
    ("serror_rate", 0.01, 0.60),
    ("same_srv_rate", 0.97, 0.31),
];

pub fn overview() -> DatasetOverview {
    DatasetOverview {
        total_records: TOTAL_RECORDS,
        total_features: TOTAL_FEATURES,
        numeric_features: NUMERIC_FEATURES,
        categorical_features: CATEGORICAL_FEATURES,
        feature_names: Vec::new(),
        dataset_description: DESCRIPTION.to_string(),
    }
}

pub fn class_distribution(normal_label: &str, anomaly_label: &str) -> ClassDistribution {
    let share = |label: &str, count: usize| ClassShare {
        label: label.to_string(),
        count,
        percentage: 100.0 * count as f64 / TOTAL_RECORDS as f64,
    };
    ClassDistribution {
        entries: vec![
            share(normal_label, NORMAL_COUNT),
            share(anomaly_label, ANOMALY_COUNT),
        ],
        total_records: TOTAL_RECORDS,
    }
}

pub fn statistics() -> Vec<NamedStatistic> {
    STATISTICS
        .iter()
        .map(|(feature, [mean, median, std, min, max, q25, q75])| NamedStatistic {
            feature: feature.to_string(),
            statistic: FeatureStatistic {
                mean: *mean,
                median: *median,
                std: *std,
                min: *min,
                max: *max,
                q25: *q25,
                q75: *q75,
            },
        })
        .collect()
}

/// Symmetric by construction: each listed pair fills both cells.
pub fn correlation_matrix() -> CorrelationMatrix {
    let n = CORRELATION_FEATURES.len();
    let mut values = vec![vec![Some(0.0); n]; n];
    for (i, row) in values.iter_mut().enumerate() {
        row[i] = Some(1.0);
    }

    let index = |name: &str| CORRELATION_FEATURES.iter().position(|f| *f == name);
    for (a, b, r) in CORRELATION_PAIRS {
        if let (Some(i), Some(j)) = (index(a), index(b)) {
            values[i][j] = Some(*r);
            values[j][i] = Some(*r);
        }
    }

    CorrelationMatrix {
        features: CORRELATION_FEATURES.iter().map(|f| f.to_string()).collect(),
        values,
    }
}

/// Ranked from [`correlation_matrix`] so both correlation units agree.
pub fn top_correlations(k: usize) -> RankedCorrelations {
    let pairs = CorrelationEngine::pairs(&correlation_matrix());
    let (positive, negative) = CorrelationEngine::rank(pairs, k);
    RankedCorrelations {
        top_positive: positive.iter().map(RankedPair::from).collect(),
        top_negative: negative.iter().map(RankedPair::from).collect(),
    }
}

pub fn feature_distributions() -> Vec<FeatureDistribution> {
    HISTOGRAMS
        .iter()
        .map(|(feature, low, high, frequencies)| {
            let bin_count = frequencies.len();
            let width = (high - low) / bin_count as f64;
            let mut bins: Vec<f64> = (0..bin_count).map(|i| low + width * i as f64).collect();
            bins.push(*high);

            FeatureDistribution {
                feature: feature.to_string(),
                distribution: Distribution {
                    bins,
                    frequencies: frequencies.to_vec(),
                    total_count: frequencies.iter().sum(),
                },
            }
        })
        .collect()
}

pub fn categorical_analysis(
    label_column: &str,
    normal_label: &str,
    anomaly_label: &str,
) -> Vec<CategoricalSummary> {
    let protocols = CategoricalSummary {
        feature: "protocol_type".to_string(),
        counts: PROTOCOLS
            .iter()
            .map(|(value, count)| ValueCount {
                value: value.to_string(),
                count: *count,
            })
            .collect(),
        total: PROTOCOLS.iter().map(|(_, c)| c).sum(),
    };
    let classes = CategoricalSummary {
        feature: label_column.to_string(),
        counts: vec![
            ValueCount {
                value: normal_label.to_string(),
                count: NORMAL_COUNT,
            },
            ValueCount {
                value: anomaly_label.to_string(),
                count: ANOMALY_COUNT,
            },
        ],
        total: TOTAL_RECORDS,
    };
    vec![protocols, classes]
}

pub fn anomaly_analysis() -> AnomalyReport {
    let comparisons: Vec<AnomalyComparison> = ANOMALY_MEANS
        .iter()
        .map(|(feature, normal_mean, anomaly_mean)| AnomalyComparison {
            feature: feature.to_string(),
            normal_mean: *normal_mean,
            anomaly_mean: *anomaly_mean,
            difference: anomaly_mean - normal_mean,
        })
        .collect();

    AnomalyReport {
        ranking: rank_by_effect(&comparisons),
        comparisons,
        normal_count: NORMAL_COUNT,
        anomaly_count: ANOMALY_COUNT,
    }
}

pub fn model_metrics() -> ModelMetricsSummary {
    ModelMetricsSummary::nsl_kdd_benchmark()
}
