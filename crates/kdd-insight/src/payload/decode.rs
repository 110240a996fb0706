//! Lenient payload decoding.
//!
//! A payload whose root is not a JSON object is a structural error. Below the
//! root, a missing or mistyped field is replaced by its named default and its
//! path is recorded in [`Decoded::defaulted`]. Per-feature entries that break
//! their invariants are dropped and recorded. A histogram whose `values` and
//! `bins` lengths disagree fails the whole payload with
//! [`AnalyticsError::Alignment`].

use serde_json::{Map, Value};
use tracing::warn;

use crate::analytics::anomaly::rank_by_effect;
use crate::analytics::classes::ClassDistributionComputer;
use crate::analytics::correlation::CorrelationEngine;
use crate::error::{AnalyticsError, Result};
use crate::types::{
    AnomalyComparison, AnomalyReport, CategoricalSummary, ClassDistribution, CorrelationMatrix,
    CorrelationPair, DatasetCharacteristic, DatasetOverview, Distribution, FeatureDistribution,
    FeatureStatistic, ModelMetricsSummary, NamedStatistic, RankedCorrelations, RankedPair,
    ValueCount,
};

/// Default for a missing record or feature count.
pub const DEFAULT_COUNT: usize = 0;
/// Default for a missing statistic field.
pub const DEFAULT_STATISTIC: f64 = 0.0;
/// Default for a missing description.
pub const DEFAULT_TEXT: &str = "";

/// Two readings of the same coefficient farther apart than this conflict.
const SYMMETRY_TOLERANCE: f64 = 1e-9;

/// A decoded value plus the paths of every field that fell back to a default
/// or was dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<T> {
    pub value: T,
    pub defaulted: Vec<String>,
}

impl<T> Decoded<T> {
    /// True when no field was defaulted or dropped.
    pub fn is_complete(&self) -> bool {
        self.defaulted.is_empty()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Decoded<U> {
        Decoded {
            value: f(self.value),
            defaulted: self.defaulted,
        }
    }
}

#[derive(Default)]
struct FieldReader {
    defaulted: Vec<String>,
}

impl FieldReader {
    fn finish<T>(self, value: T) -> Decoded<T> {
        Decoded {
            value,
            defaulted: self.defaulted,
        }
    }

    fn record(&mut self, path: impl Into<String>) {
        self.defaulted.push(path.into());
    }

    fn count(&mut self, obj: &Map<String, Value>, key: &str, path: &str) -> usize {
        match obj.get(key).and_then(as_count) {
            Some(n) => n,
            None => {
                self.record(format!("{path}.{key}"));
                DEFAULT_COUNT
            }
        }
    }

    fn number(&mut self, obj: &Map<String, Value>, key: &str, path: &str, default: f64) -> f64 {
        match obj.get(key).and_then(as_finite) {
            Some(v) => v,
            None => {
                self.record(format!("{path}.{key}"));
                default
            }
        }
    }

    fn text(&mut self, obj: &Map<String, Value>, key: &str, path: &str, default: &str) -> String {
        match obj.get(key).and_then(Value::as_str) {
            Some(s) => s.to_string(),
            None => {
                self.record(format!("{path}.{key}"));
                default.to_string()
            }
        }
    }

    fn object<'v>(
        &mut self,
        obj: &'v Map<String, Value>,
        key: &str,
        path: &str,
    ) -> Option<&'v Map<String, Value>> {
        let found = obj.get(key).and_then(Value::as_object);
        if found.is_none() {
            self.record(format!("{path}.{key}"));
        }
        found
    }
}

fn root<'v>(value: &'v Value, path: &str) -> Result<&'v Map<String, Value>> {
    value.as_object().ok_or_else(|| {
        AnalyticsError::malformed(path, format!("expected object, found {}", kind(value)))
    })
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn as_finite(value: &Value) -> Option<f64> {
    value.as_f64().filter(|v| v.is_finite())
}

/// Non-negative integer, also accepted as an integral float (`3.0`).
fn as_count(value: &Value) -> Option<usize> {
    if let Some(n) = value.as_u64() {
        return usize::try_from(n).ok();
    }
    let v = as_finite(value)?;
    (v >= 0.0 && v.fract() == 0.0 && v <= usize::MAX as f64).then_some(v as usize)
}

// ============================================================================
// Endpoint decoders
// ============================================================================

pub fn overview(value: &Value) -> Result<Decoded<DatasetOverview>> {
    let path = "overview";
    let obj = root(value, path)?;
    let mut r = FieldReader::default();

    let feature_names = match obj.get("feature_names").and_then(Value::as_array) {
        Some(names) => names
            .iter()
            .filter_map(|n| n.as_str().map(str::to_string))
            .collect(),
        None => {
            r.record(format!("{path}.feature_names"));
            Vec::new()
        }
    };

    let overview = DatasetOverview {
        total_records: r.count(obj, "total_records", path),
        total_features: r.count(obj, "total_features", path),
        numeric_features: r.count(obj, "numeric_features", path),
        categorical_features: r.count(obj, "categorical_features", path),
        feature_names,
        dataset_description: r.text(obj, "dataset_description", path, DEFAULT_TEXT),
    };
    Ok(r.finish(overview))
}

/// Counts come from `distribution`; percentages are recomputed from them.
///
/// Without a usable `distribution` the counts are rebuilt from
/// `percentages` and `total_records`, or left empty when those are missing
/// too. A `distribution` that is present but sums to zero is an
/// [`AnalyticsError::EmptyDataset`].
pub fn class_distribution(value: &Value) -> Result<Decoded<ClassDistribution>> {
    let path = "class_distribution";
    let obj = root(value, path)?;
    let mut r = FieldReader::default();

    let declared = r.count(obj, "total_records", path);
    let percentages = obj.get("percentages").and_then(Value::as_object);

    let dist = match r.object(obj, "distribution", path) {
        Some(distribution) => {
            let mut counts = Vec::with_capacity(distribution.len());
            let mut running = 0usize;
            for (label, count) in distribution {
                match as_count(count).and_then(|n| Some((n, running.checked_add(n)?))) {
                    Some((n, sum)) => {
                        running = sum;
                        counts.push((label.clone(), n));
                    }
                    None => r.record(format!("{path}.distribution.{label}")),
                }
            }

            let dist = ClassDistributionComputer::from_counts(counts)?;
            if declared != DEFAULT_COUNT && declared != dist.total_records {
                warn!(
                    "Declared total_records {} differs from summed counts {}",
                    declared, dist.total_records
                );
                r.record(format!("{path}.total_records"));
            }
            dist
        }
        None => counts_from_percentages(percentages, declared),
    };

    if percentages.is_none() {
        r.record(format!("{path}.percentages"));
    }

    Ok(r.finish(dist))
}

/// Counts rebuilt as `round(percentage * total / 100)`.
fn counts_from_percentages(
    percentages: Option<&Map<String, Value>>,
    total: usize,
) -> ClassDistribution {
    let counts = percentages
        .into_iter()
        .flatten()
        .filter_map(|(label, share)| {
            let share = as_finite(share).filter(|s| (0.0..=100.0).contains(s))?;
            Some((label.clone(), (share * total as f64 / 100.0).round() as usize))
        });
    ClassDistributionComputer::from_counts(counts).unwrap_or_default()
}

/// Entries violating `min <= q25 <= median <= q75 <= max` are dropped.
pub fn statistics(value: &Value) -> Result<Decoded<Vec<NamedStatistic>>> {
    let obj = root(value, "statistics")?;
    let mut r = FieldReader::default();
    let mut stats = Vec::with_capacity(obj.len());

    for (feature, entry) in obj {
        let path = format!("statistics.{feature}");
        let Some(entry) = entry.as_object() else {
            r.record(path);
            continue;
        };

        let statistic = FeatureStatistic {
            mean: r.number(entry, "mean", &path, DEFAULT_STATISTIC),
            median: r.number(entry, "median", &path, DEFAULT_STATISTIC),
            std: r.number(entry, "std", &path, DEFAULT_STATISTIC),
            min: r.number(entry, "min", &path, DEFAULT_STATISTIC),
            max: r.number(entry, "max", &path, DEFAULT_STATISTIC),
            q25: r.number(entry, "q25", &path, DEFAULT_STATISTIC),
            q75: r.number(entry, "q75", &path, DEFAULT_STATISTIC),
        };

        if !statistic.is_consistent() {
            warn!("Dropping statistics for '{}': inconsistent ordering", feature);
            r.record(path);
            continue;
        }

        stats.push(NamedStatistic {
            feature: feature.clone(),
            statistic,
        });
    }

    Ok(r.finish(stats))
}

/// Accepts both `{feature: {feature: r}}` and the wrapped
/// `{correlation_matrix: {...}, explanation}` form.
///
/// Entries present in one direction only are mirrored. Conflicting readings
/// of the same pair are treated as undefined.
pub fn correlation_matrix(value: &Value) -> Result<Decoded<CorrelationMatrix>> {
    let path = "correlation_matrix";
    let outer = root(value, path)?;
    let outer = match outer.get("correlation_matrix") {
        Some(inner) => root(inner, path)?,
        None => outer,
    };
    let mut r = FieldReader::default();

    let rows: Vec<(&String, &Map<String, Value>)> = outer
        .iter()
        .filter_map(|(name, row)| match row.as_object() {
            Some(row) => Some((name, row)),
            None => {
                r.record(format!("{path}.{name}"));
                None
            }
        })
        .collect();

    let size = rows.len();
    let mut values = vec![vec![None; size]; size];
    for (i, (row_name, row)) in rows.iter().enumerate() {
        for (j, (col_name, _)) in rows.iter().enumerate() {
            values[i][j] = match row.get(col_name.as_str()) {
                None | Some(Value::Null) => None,
                Some(v) => match as_finite(v) {
                    Some(v) => Some(v.clamp(-1.0, 1.0)),
                    None => {
                        r.record(format!("{path}.{row_name}.{col_name}"));
                        None
                    }
                },
            };
        }
    }

    for i in 0..size {
        for j in (i + 1)..size {
            let merged = match (values[i][j], values[j][i]) {
                (Some(a), Some(b)) if (a - b).abs() > SYMMETRY_TOLERANCE => {
                    r.record(format!("{path}.{}.{}", rows[i].0, rows[j].0));
                    None
                }
                (Some(a), _) => Some(a),
                (None, b) => b,
            };
            values[i][j] = merged;
            values[j][i] = merged;
        }
    }

    let matrix = CorrelationMatrix {
        features: rows.into_iter().map(|(name, _)| name.clone()).collect(),
        values,
    };
    Ok(r.finish(matrix))
}

/// Rebuild the ranked lists from a decoded matrix.
pub fn ranked_from_matrix(matrix: &CorrelationMatrix, k: usize) -> RankedCorrelations {
    let (positive, negative) = CorrelationEngine::rank(CorrelationEngine::pairs(matrix), k);
    RankedCorrelations {
        top_positive: positive.iter().map(RankedPair::from).collect(),
        top_negative: negative.iter().map(RankedPair::from).collect(),
    }
}

/// Entries with the wrong sign for their list are dropped; each list is
/// re-sorted and truncated to `k`.
pub fn top_correlations(value: &Value, k: usize) -> Result<Decoded<RankedCorrelations>> {
    let path = "top_correlations";
    let obj = root(value, path)?;
    let mut r = FieldReader::default();

    let mut read_list = |key: &str, keep: fn(f64) -> bool| -> Vec<CorrelationPair> {
        let Some(entries) = obj.get(key).and_then(Value::as_array) else {
            r.record(format!("{path}.{key}"));
            return Vec::new();
        };
        let mut pairs = Vec::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            let pair = entry.get("pair").and_then(Value::as_str);
            let correlation = entry.get("correlation").and_then(as_finite);
            match (pair, correlation) {
                (Some(pair), Some(c)) if keep(c) => pairs.push(CorrelationPair {
                    feature_a: pair.to_string(),
                    feature_b: String::new(),
                    correlation: c.clamp(-1.0, 1.0),
                }),
                _ => r.record(format!("{path}.{key}[{i}]")),
            }
        }
        pairs
    };

    let positive = read_list("top_positive", |c| c > 0.0);
    let negative = read_list("top_negative", |c| c < 0.0);
    let (positive, _) = CorrelationEngine::rank(positive, k);
    let (_, negative) = CorrelationEngine::rank(negative, k);

    let as_ranked = |pairs: Vec<CorrelationPair>| {
        pairs
            .into_iter()
            .map(|p| RankedPair {
                pair: p.feature_a,
                correlation: p.correlation,
            })
            .collect()
    };

    Ok(r.finish(RankedCorrelations {
        top_positive: as_ranked(positive),
        top_negative: as_ranked(negative),
    }))
}

pub fn feature_distributions(value: &Value) -> Result<Decoded<Vec<FeatureDistribution>>> {
    let obj = root(value, "feature_distributions")?;
    let mut r = FieldReader::default();
    let mut distributions = Vec::with_capacity(obj.len());

    for (feature, entry) in obj {
        let path = format!("feature_distributions.{feature}");
        let Some(entry) = entry.as_object() else {
            r.record(path);
            continue;
        };

        let frequencies: Option<Vec<usize>> = entry
            .get("values")
            .and_then(Value::as_array)
            .and_then(|a| a.iter().map(as_count).collect());
        let bins: Option<Vec<f64>> = entry
            .get("bins")
            .and_then(Value::as_array)
            .and_then(|a| a.iter().map(as_finite).collect());

        let (Some(frequencies), Some(bins)) = (frequencies, bins) else {
            r.record(path);
            continue;
        };

        if frequencies.len() + 1 != bins.len() {
            return Err(AnalyticsError::Alignment {
                column: feature.clone(),
                expected: frequencies.len() + 1,
                found: bins.len(),
            });
        }

        if !bins.windows(2).all(|w| w[0] < w[1]) {
            warn!("Dropping histogram for '{}': bins not increasing", feature);
            r.record(path);
            continue;
        }

        let Some(total_count) = frequencies
            .iter()
            .try_fold(0usize, |acc, &n| acc.checked_add(n))
        else {
            warn!("Dropping histogram for '{}': frequencies overflow", feature);
            r.record(path);
            continue;
        };
        if entry.get("count").and_then(as_count) != Some(total_count) {
            r.record(format!("{path}.count"));
        }

        distributions.push(FeatureDistribution {
            feature: feature.clone(),
            distribution: Distribution {
                bins,
                frequencies,
                total_count,
            },
        });
    }

    Ok(r.finish(distributions))
}

pub fn categorical_analysis(value: &Value) -> Result<Decoded<Vec<CategoricalSummary>>> {
    let obj = root(value, "categorical_analysis")?;
    let mut r = FieldReader::default();
    let mut summaries = Vec::with_capacity(obj.len());

    for (feature, entry) in obj {
        let path = format!("categorical_analysis.{feature}");
        let Some(counts_obj) = entry.as_object().and_then(|e| r.object(e, "counts", &path)) else {
            if !entry.is_object() {
                r.record(path);
            }
            continue;
        };

        let mut counts = Vec::with_capacity(counts_obj.len());
        let mut total = 0usize;
        for (value, count) in counts_obj {
            match as_count(count).and_then(|n| Some((n, total.checked_add(n)?))) {
                Some((count, sum)) => {
                    total = sum;
                    counts.push(ValueCount {
                        value: value.clone(),
                        count,
                    });
                }
                None => r.record(format!("{path}.counts.{value}")),
            }
        }
        if counts.is_empty() {
            continue;
        }
        counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));

        summaries.push(CategoricalSummary {
            feature: feature.clone(),
            total,
            counts,
        });
    }

    Ok(r.finish(summaries))
}

/// `difference` is recomputed from the means; entries lacking a mean are
/// dropped.
pub fn anomaly_analysis(value: &Value) -> Result<Decoded<AnomalyReport>> {
    let path = "anomaly_analysis";
    let obj = root(value, path)?;
    let mut r = FieldReader::default();

    let mut comparisons = Vec::new();
    if let Some(comparison) = r.object(obj, "comparison", path) {
        for (feature, entry) in comparison {
            let entry_path = format!("{path}.comparison.{feature}");
            let means = entry.as_object().and_then(|e| {
                Some((
                    e.get("normal_mean").and_then(as_finite)?,
                    e.get("anomaly_mean").and_then(as_finite)?,
                ))
            });
            match means {
                Some((normal_mean, anomaly_mean)) => comparisons.push(AnomalyComparison {
                    feature: feature.clone(),
                    normal_mean,
                    anomaly_mean,
                    difference: anomaly_mean - normal_mean,
                }),
                None => r.record(entry_path),
            }
        }
    }

    let report = AnomalyReport {
        ranking: rank_by_effect(&comparisons),
        comparisons,
        normal_count: r.count(obj, "normal_count", path),
        anomaly_count: r.count(obj, "anomaly_count", path),
    };
    Ok(r.finish(report))
}

/// Metrics outside [0, 1] fall back to the benchmark figure.
pub fn model_metrics(value: &Value) -> Result<Decoded<ModelMetricsSummary>> {
    let path = "model_metrics";
    let obj = root(value, path)?;
    let mut r = FieldReader::default();
    let benchmark = ModelMetricsSummary::nsl_kdd_benchmark();

    let empty = Map::new();
    let metrics_path = format!("{path}.expected_metrics");
    let metrics = r.object(obj, "expected_metrics", path).unwrap_or(&empty);
    let mut metric = |key: &str, default: f64| -> f64 {
        let v = r.number(metrics, key, &metrics_path, default);
        if (0.0..=1.0).contains(&v) {
            v
        } else {
            r.record(format!("{metrics_path}.{key}"));
            default
        }
    };

    let accuracy = metric("accuracy", benchmark.accuracy);
    let precision = metric("precision", benchmark.precision);
    let recall = metric("recall", benchmark.recall);
    let f1_score = metric("f1_score", benchmark.f1_score);

    let explanation = r.text(obj, "explanation", path, &benchmark.explanation);

    let characteristics = match r.object(obj, "dataset_characteristics", path) {
        Some(map) => map
            .iter()
            .filter_map(|(name, v)| {
                let description = match v {
                    Value::String(s) => s.clone(),
                    Value::Bool(_) | Value::Number(_) => v.to_string(),
                    _ => {
                        r.record(format!("{path}.dataset_characteristics.{name}"));
                        return None;
                    }
                };
                Some(DatasetCharacteristic {
                    name: name.clone(),
                    description,
                })
            })
            .collect(),
        None => benchmark.characteristics,
    };

    Ok(r.finish(ModelMetricsSummary {
        accuracy,
        precision,
        recall,
        f1_score,
        explanation,
        characteristics,
    }))
}
