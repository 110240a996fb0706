//! Renderer-ready view models, one per visualization unit.
//!
//! Numeric fields are unrounded; every `*_label` field is preformatted text.

use serde::{Deserialize, Serialize};

use super::color::HeatmapBucket;
use crate::payload::Endpoint;
use crate::types::DatasetCharacteristic;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum ViewModel {
    Overview(OverviewView),
    ClassDistribution(ClassDistributionView),
    Statistics(StatisticsView),
    CorrelationHeatmap(HeatmapView),
    TopCorrelations(TopCorrelationsView),
    FeatureDistributions(DistributionsView),
    CategoricalDistribution(CategoricalView),
    AnomalyAnalysis(AnomalyView),
    ModelMetrics(MetricsView),
}

impl ViewModel {
    /// The unit this view belongs to.
    pub fn endpoint(&self) -> Endpoint {
        match self {
            Self::Overview(_) => Endpoint::Overview,
            Self::ClassDistribution(_) => Endpoint::ClassDistribution,
            Self::Statistics(_) => Endpoint::Statistics,
            Self::CorrelationHeatmap(_) => Endpoint::CorrelationMatrix,
            Self::TopCorrelations(_) => Endpoint::TopCorrelations,
            Self::FeatureDistributions(_) => Endpoint::FeatureDistributions,
            Self::CategoricalDistribution(_) => Endpoint::CategoricalAnalysis,
            Self::AnomalyAnalysis(_) => Endpoint::AnomalyAnalysis,
            Self::ModelMetrics(_) => Endpoint::ModelMetrics,
        }
    }
}

// ============================================================================
// Overview
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatCard {
    pub title: String,
    pub value: usize,
    pub value_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverviewView {
    pub cards: Vec<StatCard>,
    pub feature_names: Vec<String>,
    pub description: String,
}

// ============================================================================
// Class distribution
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSlice {
    pub label: String,
    pub display_name: String,
    pub count: usize,
    pub percentage: f64,
    pub percentage_label: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDistributionView {
    pub slices: Vec<ClassSlice>,
    pub total_records: usize,
    pub total_label: String,
}

// ============================================================================
// Statistics
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsCard {
    pub feature: String,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub q25: f64,
    pub q75: f64,
    pub mean_label: String,
    pub median_label: String,
    pub std_label: String,
    pub range_label: String,
    pub quartiles_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsView {
    pub cards: Vec<StatisticsCard>,
    /// Features available before the card limit.
    pub total_features: usize,
}

// ============================================================================
// Correlation
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapCell {
    pub row: String,
    pub column: String,
    /// `None` when the coefficient is undefined.
    pub value: Option<f64>,
    /// Two decimals, `"n/a"` when undefined.
    pub label: String,
    /// Three decimals, `"n/a"` when undefined.
    pub tooltip: String,
    pub bucket: Option<HeatmapBucket>,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub bucket: HeatmapBucket,
    pub label: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapView {
    pub features: Vec<String>,
    pub column_labels: Vec<String>,
    pub row_labels: Vec<String>,
    /// Row-major, `cells[i][j]` pairs `features[i]` with `features[j]`.
    pub cells: Vec<Vec<HeatmapCell>>,
    pub legend: Vec<LegendEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedRow {
    pub rank: usize,
    pub pair: String,
    pub correlation: f64,
    pub label: String,
    pub bucket: HeatmapBucket,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopCorrelationsView {
    pub positive: Vec<RankedRow>,
    pub negative: Vec<RankedRow>,
}

// ============================================================================
// Distributions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBar {
    pub name: String,
    pub frequency: usize,
    pub start: f64,
    pub end: f64,
    pub range_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureHistogram {
    pub feature: String,
    pub bars: Vec<HistogramBar>,
    pub total_count: usize,
    pub bin_count: usize,
    pub range_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionsView {
    pub features: Vec<FeatureHistogram>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySlice {
    pub value: String,
    pub display_name: String,
    pub count: usize,
    pub percentage: f64,
    pub percentage_label: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalBreakdown {
    pub feature: String,
    pub slices: Vec<CategorySlice>,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalView {
    pub features: Vec<CategoricalBreakdown>,
}

// ============================================================================
// Anomaly analysis
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyBadge {
    pub label: String,
    pub count: usize,
    pub count_label: String,
    pub share_label: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyBar {
    pub feature: String,
    /// Truncated axis name.
    pub name: String,
    pub normal_mean: f64,
    pub anomaly_mean: f64,
    pub difference: f64,
    pub difference_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyView {
    pub normal: AnomalyBadge,
    pub anomaly: AnomalyBadge,
    /// In ranking order.
    pub bars: Vec<AnomalyBar>,
    pub ranking: Vec<String>,
}

// ============================================================================
// Model metrics
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricBar {
    pub name: String,
    /// In [0, 1].
    pub value: f64,
    /// `value * 100`.
    pub percent: f64,
    pub label: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsView {
    pub bars: Vec<MetricBar>,
    pub explanation: String,
    pub characteristics: Vec<DatasetCharacteristic>,
}
