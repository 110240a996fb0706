use serde::{Deserialize, Serialize};

// ============================================================================
// Input columns
// ============================================================================

/// A named numeric column, one value per record.
///
/// Missing values are `None`. Non-finite inputs are normalized to `None` at
/// construction so every present value is finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureColumn {
    pub name: String,
    values: Vec<Option<f64>>,
}

impl FeatureColumn {
    pub fn new(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        let values = values
            .into_iter()
            .map(|v| v.filter(|x| x.is_finite()))
            .collect();
        Self {
            name: name.into(),
            values,
        }
    }

    /// Build a column where every record has a value.
    pub fn from_values(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self::new(name, values.into_iter().map(Some).collect())
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    /// Number of records, present or not.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn present(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().filter_map(|v| *v)
    }

    pub fn present_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    pub fn has_missing(&self) -> bool {
        self.values.iter().any(Option::is_none)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalColumn {
    pub name: String,
    pub values: Vec<Option<String>>,
}

impl CategoricalColumn {
    pub fn new(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// ============================================================================
// Computed results
// ============================================================================

/// Descriptive statistics of one numeric feature.
///
/// `std` is the population standard deviation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureStatistic {
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub q25: f64,
    pub q75: f64,
}

impl FeatureStatistic {
    /// Check `min <= q25 <= median <= q75 <= max` and `std >= 0`.
    pub fn is_consistent(&self) -> bool {
        let all_finite = [
            self.mean,
            self.median,
            self.std,
            self.min,
            self.max,
            self.q25,
            self.q75,
        ]
        .iter()
        .all(|v| v.is_finite());

        all_finite
            && self.min <= self.q25
            && self.q25 <= self.median
            && self.median <= self.q75
            && self.q75 <= self.max
            && self.std >= 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedStatistic {
    pub feature: String,
    #[serde(flatten)]
    pub statistic: FeatureStatistic,
}

/// Equal-width histogram of one feature.
///
/// `bins` holds the `frequencies.len() + 1` boundaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    pub bins: Vec<f64>,
    pub frequencies: Vec<usize>,
    pub total_count: usize,
}

impl Distribution {
    pub fn bin_count(&self) -> usize {
        self.frequencies.len()
    }

    /// Lower and upper boundary of bin `index`.
    pub fn bin_range(&self, index: usize) -> Option<(f64, f64)> {
        Some((*self.bins.get(index)?, *self.bins.get(index + 1)?))
    }

    pub fn is_consistent(&self) -> bool {
        self.bins.len() == self.frequencies.len() + 1
            && self.frequencies.iter().sum::<usize>() == self.total_count
            && self.bins.windows(2).all(|w| w[0] < w[1])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureDistribution {
    pub feature: String,
    #[serde(flatten)]
    pub distribution: Distribution,
}

/// Square, symmetric table of Pearson coefficients.
///
/// `None` marks an undefined coefficient (a zero-variance feature or too few
/// shared observations).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub features: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn index_of(&self, feature: &str) -> Option<usize> {
        self.features.iter().position(|f| f == feature)
    }

    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.index_of(a)?;
        let j = self.index_of(b)?;
        self.values.get(i)?.get(j).copied().flatten()
    }

    pub fn is_symmetric(&self) -> bool {
        let n = self.len();
        self.values.len() == n
            && self.values.iter().all(|row| row.len() == n)
            && (0..n).all(|i| (0..n).all(|j| self.values[i][j] == self.values[j][i]))
    }

    /// Restrict the matrix to its first `n` features.
    pub fn truncated(&self, n: usize) -> Self {
        let n = n.min(self.len());
        Self {
            features: self.features[..n].to_vec(),
            values: self.values[..n]
                .iter()
                .map(|row| row[..n].to_vec())
                .collect(),
        }
    }
}

/// Unordered feature pair with its coefficient. `feature_a < feature_b`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationPair {
    pub feature_a: String,
    pub feature_b: String,
    pub correlation: f64,
}

impl CorrelationPair {
    /// Display label, `"a - b"`.
    pub fn label(&self) -> String {
        format!("{} - {}", self.feature_a, self.feature_b)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationReport {
    pub matrix: CorrelationMatrix,
    /// Most positive first.
    pub top_positive: Vec<CorrelationPair>,
    /// Most negative first.
    pub top_negative: Vec<CorrelationPair>,
}

/// Ranked pairs as delivered by a service that only exposes labels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankedCorrelations {
    pub top_positive: Vec<RankedPair>,
    pub top_negative: Vec<RankedPair>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPair {
    pub pair: String,
    pub correlation: f64,
}

impl From<&CorrelationPair> for RankedPair {
    fn from(pair: &CorrelationPair) -> Self {
        Self {
            pair: pair.label(),
            correlation: pair.correlation,
        }
    }
}

impl From<&CorrelationReport> for RankedCorrelations {
    fn from(report: &CorrelationReport) -> Self {
        Self {
            top_positive: report.top_positive.iter().map(RankedPair::from).collect(),
            top_negative: report.top_negative.iter().map(RankedPair::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassShare {
    pub label: String,
    pub count: usize,
    /// Unrounded, in [0, 100].
    pub percentage: f64,
}

/// Label counts, most frequent label first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassDistribution {
    pub entries: Vec<ClassShare>,
    pub total_records: usize,
}

impl ClassDistribution {
    pub fn get(&self, label: &str) -> Option<&ClassShare> {
        self.entries.iter().find(|e| e.label == label)
    }

    pub fn count_of(&self, label: &str) -> usize {
        self.get(label).map(|e| e.count).unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyComparison {
    pub feature: String,
    pub normal_mean: f64,
    pub anomaly_mean: f64,
    /// `anomaly_mean - normal_mean`
    pub difference: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnomalyReport {
    /// In input feature order.
    pub comparisons: Vec<AnomalyComparison>,
    /// Feature names by descending |difference|.
    pub ranking: Vec<String>,
    pub normal_count: usize,
    pub anomaly_count: usize,
}

impl AnomalyReport {
    pub fn get(&self, feature: &str) -> Option<&AnomalyComparison> {
        self.comparisons.iter().find(|c| c.feature == feature)
    }

    /// Comparisons in ranking order.
    pub fn ranked(&self) -> impl Iterator<Item = &AnomalyComparison> + '_ {
        self.ranking.iter().filter_map(|name| self.get(name))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalSummary {
    pub feature: String,
    /// Most frequent first, ties by value.
    pub counts: Vec<ValueCount>,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetOverview {
    pub total_records: usize,
    pub total_features: usize,
    pub numeric_features: usize,
    pub categorical_features: usize,
    #[serde(default)]
    pub feature_names: Vec<String>,
    #[serde(default)]
    pub dataset_description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetCharacteristic {
    pub name: String,
    pub description: String,
}

/// Expected detector performance, supplied by a collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetricsSummary {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub explanation: String,
    pub characteristics: Vec<DatasetCharacteristic>,
}

impl ModelMetricsSummary {
    /// Published NSL-KDD benchmark figures.
    pub fn nsl_kdd_benchmark() -> Self {
        Self {
            accuracy: 0.87,
            precision: 0.85,
            recall: 0.82,
            f1_score: 0.83,
            explanation: "Expected metrics based on NSL-KDD benchmarks. \
                Accuracy: share of correct predictions. \
                Precision: share of flagged anomalies that are real. \
                Recall: share of real anomalies that were flagged. \
                F1-Score: harmonic mean of precision and recall."
                .to_string(),
            characteristics: vec![
                DatasetCharacteristic {
                    name: "imbalanced".to_string(),
                    description: "true".to_string(),
                },
                DatasetCharacteristic {
                    name: "challenge".to_string(),
                    description: "Imbalanced dataset: 67% normal, 33% anomaly".to_string(),
                },
                DatasetCharacteristic {
                    name: "real_world".to_string(),
                    description: "Real network traffic with multiple attack types".to_string(),
                },
            ],
        }
    }

    pub fn metrics_in_range(&self) -> bool {
        [self.accuracy, self.precision, self.recall, self.f1_score]
            .iter()
            .all(|v| (0.0..=1.0).contains(v))
    }
}
