//! Payload to view model assembly.

use serde_json::Value;
use tracing::{debug, warn};

use super::color::HeatmapBucket;
use super::fallback;
use super::format::{capitalize, fixed, percent, ratio_percent, thousands, truncate};
use super::models::*;
use super::state::UnitState;
use crate::config::AnalyticsConfig;
use crate::error::Result;
use crate::payload::{Decoded, Endpoint, decode};
use crate::types::{
    AnomalyReport, CategoricalSummary, ClassDistribution, CorrelationMatrix, DatasetOverview,
    FeatureDistribution, ModelMetricsSummary, NamedStatistic, RankedCorrelations, RankedPair,
};

pub const NORMAL_COLOR: &str = "#10b981";
pub const ANOMALY_COLOR: &str = "#ef4444";
/// Cycled over categorical values and unexpected class labels.
pub const CATEGORY_COLORS: [&str; 5] = ["#3b82f6", "#10b981", "#f59e0b", "#ef4444", "#8b5cf6"];
pub const METRIC_COLORS: [&str; 4] = ["#3b82f6", "#10b981", "#f59e0b", "#8b5cf6"];

const COLUMN_LABEL_CHARS: usize = 8;
const ROW_LABEL_CHARS: usize = 10;
const AXIS_NAME_CHARS: usize = 12;
const UNDEFINED_LABEL: &str = "n/a";

/// Builds renderer-ready [`ViewModel`]s from payloads, computed values or the
/// built-in fallback figures.
#[derive(Debug, Clone, Default)]
pub struct ViewModelAssembler {
    config: AnalyticsConfig,
}

impl ViewModelAssembler {
    pub fn new(config: AnalyticsConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub(crate) fn from_validated(config: AnalyticsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Decode `payload` as the response of `endpoint` and build its view.
    pub fn assemble(&self, endpoint: Endpoint, payload: &Value) -> Result<Decoded<ViewModel>> {
        let decoded = match endpoint {
            Endpoint::Overview => decode::overview(payload)?.map(|v| self.overview(&v)),
            Endpoint::ClassDistribution => {
                decode::class_distribution(payload)?.map(|v| self.class_distribution(&v))
            }
            Endpoint::Statistics => decode::statistics(payload)?.map(|v| self.statistics(&v)),
            Endpoint::CorrelationMatrix => {
                decode::correlation_matrix(payload)?.map(|v| self.heatmap(&v))
            }
            Endpoint::TopCorrelations => decode::top_correlations(payload, self.config.top_k)?
                .map(|v| self.top_correlations(&v)),
            Endpoint::FeatureDistributions => {
                decode::feature_distributions(payload)?.map(|v| self.distributions(&v))
            }
            Endpoint::CategoricalAnalysis => {
                decode::categorical_analysis(payload)?.map(|v| self.categorical(&v))
            }
            Endpoint::AnomalyAnalysis => {
                decode::anomaly_analysis(payload)?.map(|v| self.anomaly(&v))
            }
            Endpoint::ModelMetrics => decode::model_metrics(payload)?.map(|v| self.metrics(&v)),
        };
        Ok(decoded)
    }

    /// The complete reference view for `endpoint`.
    pub fn fallback(&self, endpoint: Endpoint) -> ViewModel {
        let c = &self.config;
        match endpoint {
            Endpoint::Overview => self.overview(&fallback::overview()),
            Endpoint::ClassDistribution => self.class_distribution(&fallback::class_distribution(
                &c.normal_label,
                &c.anomaly_label,
            )),
            Endpoint::Statistics => self.statistics(&fallback::statistics()),
            Endpoint::CorrelationMatrix => self.heatmap(&fallback::correlation_matrix()),
            Endpoint::TopCorrelations => {
                self.top_correlations(&fallback::top_correlations(c.top_k))
            }
            Endpoint::FeatureDistributions => {
                self.distributions(&fallback::feature_distributions())
            }
            Endpoint::CategoricalAnalysis => self.categorical(&fallback::categorical_analysis(
                &c.label_column,
                &c.normal_label,
                &c.anomaly_label,
            )),
            Endpoint::AnomalyAnalysis => self.anomaly(&fallback::anomaly_analysis()),
            Endpoint::ModelMetrics => self.metrics(&fallback::model_metrics()),
        }
    }

    /// Settle a fetch outcome into a unit state.
    ///
    /// A fetch failure shows the fallback view. Any other error, or a payload
    /// that cannot be decoded, makes the unit unavailable.
    pub fn resolve(&self, endpoint: Endpoint, fetched: Result<Value>) -> UnitState {
        let payload = match fetched {
            Ok(payload) => payload,
            Err(e) if e.is_fallback_eligible() => {
                warn!("{} failed, showing reference figures: {}", endpoint, e);
                return UnitState::Fallback {
                    view: self.fallback(endpoint),
                    reason: e.to_string(),
                };
            }
            Err(e) => {
                warn!("{} unavailable: {}", endpoint, e);
                return UnitState::unavailable(&e);
            }
        };

        match self.assemble(endpoint, &payload) {
            Ok(decoded) => {
                if !decoded.is_complete() {
                    debug!(
                        "{} defaulted fields: {}",
                        endpoint,
                        decoded.defaulted.join(", ")
                    );
                }
                UnitState::Ready {
                    view: decoded.value,
                    defaulted: decoded.defaulted,
                }
            }
            Err(e) => {
                warn!("{} payload rejected: {}", endpoint, e);
                UnitState::unavailable(&e)
            }
        }
    }

    // ------------------------------------------------------------------------
    // Builders
    // ------------------------------------------------------------------------

    pub fn overview(&self, overview: &DatasetOverview) -> ViewModel {
        let card = |title: &str, value: usize| StatCard {
            title: title.to_string(),
            value,
            value_label: thousands(value),
        };

        ViewModel::Overview(OverviewView {
            cards: vec![
                card("Total Records", overview.total_records),
                card("Total Features", overview.total_features),
                card("Numeric Features", overview.numeric_features),
                card("Categorical Features", overview.categorical_features),
            ],
            feature_names: overview.feature_names.clone(),
            description: overview.dataset_description.clone(),
        })
    }

    pub fn class_distribution(&self, dist: &ClassDistribution) -> ViewModel {
        let slices = dist
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| ClassSlice {
                label: entry.label.clone(),
                display_name: capitalize(&entry.label),
                count: entry.count,
                percentage: entry.percentage,
                percentage_label: percent(entry.percentage, 1),
                color: self.class_color(&entry.label, i).to_string(),
            })
            .collect();

        ViewModel::ClassDistribution(ClassDistributionView {
            slices,
            total_records: dist.total_records,
            total_label: thousands(dist.total_records),
        })
    }

    pub fn statistics(&self, stats: &[NamedStatistic]) -> ViewModel {
        let cards = stats
            .iter()
            .take(self.config.statistics_cards)
            .map(|named| {
                let s = &named.statistic;
                StatisticsCard {
                    feature: named.feature.clone(),
                    mean: s.mean,
                    median: s.median,
                    std: s.std,
                    min: s.min,
                    max: s.max,
                    q25: s.q25,
                    q75: s.q75,
                    mean_label: fixed(s.mean, 2),
                    median_label: fixed(s.median, 2),
                    std_label: fixed(s.std, 2),
                    range_label: format!("{} - {}", fixed(s.min, 2), fixed(s.max, 2)),
                    quartiles_label: format!("{} - {}", fixed(s.q25, 2), fixed(s.q75, 2)),
                }
            })
            .collect();

        ViewModel::Statistics(StatisticsView {
            cards,
            total_features: stats.len(),
        })
    }

    pub fn heatmap(&self, matrix: &CorrelationMatrix) -> ViewModel {
        let matrix = matrix.truncated(self.config.heatmap_features);

        let cells = matrix
            .features
            .iter()
            .zip(&matrix.values)
            .map(|(row, values)| {
                matrix
                    .features
                    .iter()
                    .zip(values)
                    .map(|(column, value)| heatmap_cell(row, column, *value))
                    .collect()
            })
            .collect();

        let legend = HeatmapBucket::ALL
            .iter()
            .map(|bucket| LegendEntry {
                bucket: *bucket,
                label: bucket.label().to_string(),
                color: bucket.color().to_string(),
            })
            .collect();

        ViewModel::CorrelationHeatmap(HeatmapView {
            column_labels: matrix
                .features
                .iter()
                .map(|f| truncate(f, COLUMN_LABEL_CHARS))
                .collect(),
            row_labels: matrix
                .features
                .iter()
                .map(|f| truncate(f, ROW_LABEL_CHARS))
                .collect(),
            features: matrix.features,
            cells,
            legend,
        })
    }

    pub fn top_correlations(&self, ranked: &RankedCorrelations) -> ViewModel {
        let rows = |pairs: &[RankedPair]| -> Vec<RankedRow> {
            pairs
                .iter()
                .enumerate()
                .map(|(i, pair)| {
                    let bucket = HeatmapBucket::classify(pair.correlation);
                    RankedRow {
                        rank: i + 1,
                        pair: pair.pair.clone(),
                        correlation: pair.correlation,
                        label: fixed(pair.correlation, 3),
                        bucket,
                        color: bucket.color().to_string(),
                    }
                })
                .collect()
        };

        ViewModel::TopCorrelations(TopCorrelationsView {
            positive: rows(&ranked.top_positive),
            negative: rows(&ranked.top_negative),
        })
    }

    pub fn distributions(&self, distributions: &[FeatureDistribution]) -> ViewModel {
        let features = distributions
            .iter()
            .take(self.config.max_distribution_features)
            .map(|fd| {
                let dist = &fd.distribution;
                let bars = dist
                    .frequencies
                    .iter()
                    .enumerate()
                    .filter_map(|(i, frequency)| {
                        let (start, end) = dist.bin_range(i)?;
                        Some(HistogramBar {
                            name: format!("Bin {}", i + 1),
                            frequency: *frequency,
                            start,
                            end,
                            range_label: range_label(start, end),
                        })
                    })
                    .collect();

                FeatureHistogram {
                    feature: fd.feature.clone(),
                    bars,
                    total_count: dist.total_count,
                    bin_count: dist.bin_count(),
                    range_label: match (dist.bins.first(), dist.bins.last()) {
                        (Some(low), Some(high)) => range_label(*low, *high),
                        _ => UNDEFINED_LABEL.to_string(),
                    },
                }
            })
            .collect();

        ViewModel::FeatureDistributions(DistributionsView { features })
    }

    pub fn categorical(&self, summaries: &[CategoricalSummary]) -> ViewModel {
        let features = summaries
            .iter()
            .take(self.config.max_categorical_features)
            .map(|summary| {
                let slices = summary
                    .counts
                    .iter()
                    .enumerate()
                    .map(|(i, vc)| {
                        let percentage = share(vc.count, summary.total as f64);
                        CategorySlice {
                            value: vc.value.clone(),
                            display_name: capitalize(&vc.value),
                            count: vc.count,
                            percentage,
                            percentage_label: percent(percentage, 1),
                            color: CATEGORY_COLORS[i % CATEGORY_COLORS.len()].to_string(),
                        }
                    })
                    .collect();

                CategoricalBreakdown {
                    feature: summary.feature.clone(),
                    slices,
                    total: summary.total,
                }
            })
            .collect();

        ViewModel::CategoricalDistribution(CategoricalView { features })
    }

    pub fn anomaly(&self, report: &AnomalyReport) -> ViewModel {
        // decoded counts may sum past usize::MAX
        let total = report.normal_count as f64 + report.anomaly_count as f64;
        let badge = |label: &str, count: usize, color: &str| AnomalyBadge {
            label: capitalize(label),
            count,
            count_label: thousands(count),
            share_label: percent(share(count, total), 1),
            color: color.to_string(),
        };

        let bars = report
            .ranked()
            .take(self.config.max_comparison_features)
            .map(|c| AnomalyBar {
                feature: c.feature.clone(),
                name: truncate(&c.feature, AXIS_NAME_CHARS),
                normal_mean: c.normal_mean,
                anomaly_mean: c.anomaly_mean,
                difference: c.difference,
                difference_label: fixed(c.difference, 2),
            })
            .collect();

        ViewModel::AnomalyAnalysis(AnomalyView {
            normal: badge(&self.config.normal_label, report.normal_count, NORMAL_COLOR),
            anomaly: badge(&self.config.anomaly_label, report.anomaly_count, ANOMALY_COLOR),
            bars,
            ranking: report.ranking.clone(),
        })
    }

    pub fn metrics(&self, metrics: &ModelMetricsSummary) -> ViewModel {
        let values = [
            ("Accuracy", metrics.accuracy),
            ("Precision", metrics.precision),
            ("Recall", metrics.recall),
            ("F1-Score", metrics.f1_score),
        ];

        let bars = values
            .iter()
            .zip(METRIC_COLORS)
            .map(|((name, value), color)| MetricBar {
                name: name.to_string(),
                value: *value,
                percent: value * 100.0,
                label: ratio_percent(*value),
                color: color.to_string(),
            })
            .collect();

        ViewModel::ModelMetrics(MetricsView {
            bars,
            explanation: metrics.explanation.clone(),
            characteristics: metrics.characteristics.clone(),
        })
    }

    fn class_color(&self, label: &str, index: usize) -> &'static str {
        if label == self.config.normal_label {
            NORMAL_COLOR
        } else if label == self.config.anomaly_label {
            ANOMALY_COLOR
        } else {
            CATEGORY_COLORS[index % CATEGORY_COLORS.len()]
        }
    }
}

fn heatmap_cell(row: &str, column: &str, value: Option<f64>) -> HeatmapCell {
    match value {
        Some(r) => {
            let bucket = HeatmapBucket::classify(r);
            HeatmapCell {
                row: row.to_string(),
                column: column.to_string(),
                value: Some(r),
                label: fixed(r, 2),
                tooltip: format!("{} vs {}: {}", row, column, fixed(r, 3)),
                bucket: Some(bucket),
                color: bucket.color().to_string(),
            }
        }
        None => HeatmapCell {
            row: row.to_string(),
            column: column.to_string(),
            value: None,
            label: UNDEFINED_LABEL.to_string(),
            tooltip: format!("{} vs {}: {}", row, column, UNDEFINED_LABEL),
            bucket: None,
            color: HeatmapBucket::None.color().to_string(),
        },
    }
}

fn range_label(start: f64, end: f64) -> String {
    format!("{} - {}", fixed(start, 1), fixed(end, 1))
}

/// Percentage of `count` in `total`, 0 for an empty total.
fn share(count: usize, total: f64) -> f64 {
    if total == 0.0 {
        0.0
    } else {
        100.0 * count as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalyticsError;
    use crate::types::{ClassShare, Distribution};
    use serde_json::json;

    fn assembler() -> ViewModelAssembler {
        ViewModelAssembler::default()
    }

    #[test]
    fn test_class_slices() {
        let dist = ClassDistribution {
            entries: vec![
                ClassShare {
                    label: "normal".to_string(),
                    count: 67343,
                    percentage: 53.458,
                },
                ClassShare {
                    label: "anomaly".to_string(),
                    count: 58630,
                    percentage: 46.542,
                },
            ],
            total_records: 125973,
        };
        let ViewModel::ClassDistribution(view) = assembler().class_distribution(&dist) else {
            panic!("wrong variant");
        };
        assert_eq!(view.slices[0].display_name, "Normal");
        assert_eq!(view.slices[0].percentage_label, "53.5%");
        assert_eq!(view.slices[0].color, NORMAL_COLOR);
        assert_eq!(view.slices[1].percentage_label, "46.5%");
        assert_eq!(view.slices[1].color, ANOMALY_COLOR);
        assert_eq!(view.total_label, "125,973");
    }

    #[test]
    fn test_heatmap_cells_and_labels() {
        let matrix = CorrelationMatrix {
            features: vec!["dst_host_srv_count".to_string(), "num_shells".to_string()],
            values: vec![vec![Some(1.0), None], vec![None, None]],
        };
        let ViewModel::CorrelationHeatmap(view) = assembler().heatmap(&matrix) else {
            panic!("wrong variant");
        };
        assert_eq!(view.column_labels[0], "dst_host");
        assert_eq!(view.row_labels[0], "dst_host_s");
        assert_eq!(view.cells[0][0].label, "1.00");
        assert_eq!(view.cells[0][0].bucket, Some(HeatmapBucket::Strong));
        assert_eq!(view.cells[0][1].value, None);
        assert_eq!(view.cells[0][1].label, "n/a");
        assert_eq!(view.legend.len(), 5);
    }

    #[test]
    fn test_heatmap_limited_to_configured_features() {
        let view = assembler().fallback(Endpoint::CorrelationMatrix);
        let ViewModel::CorrelationHeatmap(view) = view else {
            panic!("wrong variant");
        };
        assert_eq!(view.features.len(), 8);
        assert!(view.cells.iter().all(|row| row.len() == 8));
    }

    #[test]
    fn test_histogram_bars() {
        let dists = vec![FeatureDistribution {
            feature: "duration".to_string(),
            distribution: Distribution {
                bins: vec![0.0, 5.0, 10.0],
                frequencies: vec![3, 1],
                total_count: 4,
            },
        }];
        let ViewModel::FeatureDistributions(view) = assembler().distributions(&dists) else {
            panic!("wrong variant");
        };
        let hist = &view.features[0];
        assert_eq!(hist.bars[0].name, "Bin 1");
        assert_eq!(hist.bars[1].range_label, "5.0 - 10.0");
        assert_eq!(hist.bin_count, 2);
        assert_eq!(hist.range_label, "0.0 - 10.0");
    }

    #[test]
    fn test_metric_bars() {
        let view = assembler().metrics(&ModelMetricsSummary::nsl_kdd_benchmark());
        let ViewModel::ModelMetrics(view) = view else {
            panic!("wrong variant");
        };
        let labels: Vec<&str> = view.bars.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["87.0%", "85.0%", "82.0%", "83.0%"]);
        assert_eq!(view.bars[3].name, "F1-Score");
        assert!((view.bars[0].percent - 87.0).abs() < 1e-9);
    }

    #[test]
    fn test_anomaly_bars_follow_ranking() {
        let view = assembler().fallback(Endpoint::AnomalyAnalysis);
        let ViewModel::AnomalyAnalysis(view) = view else {
            panic!("wrong variant");
        };
        let names: Vec<&str> = view.bars.iter().map(|b| b.feature.as_str()).collect();
        let ranking: Vec<&str> = view.ranking.iter().map(String::as_str).collect();
        assert_eq!(names, ranking);
        assert!(view.bars.iter().all(|b| b.name.chars().count() <= 12));
        assert_eq!(view.normal.count_label, "67,343");
        assert_eq!(view.normal.share_label, "53.5%");
    }

    #[test]
    fn test_fallback_matches_endpoint() {
        let assembler = assembler();
        for endpoint in Endpoint::ALL {
            assert_eq!(assembler.fallback(endpoint).endpoint(), endpoint);
        }
    }

    #[test]
    fn test_resolve_fetch_failure_uses_fallback() {
        let state = assembler().resolve(
            Endpoint::Overview,
            Err(AnalyticsError::fetch_failure("overview/", "connection refused")),
        );
        let view = match state {
            UnitState::Fallback { view, .. } => view,
            other => panic!("expected fallback, got {:?}", other),
        };
        let ViewModel::Overview(view) = view else {
            panic!("wrong variant");
        };
        assert_eq!(view.cards[0].value_label, "125,973");
    }

    #[test]
    fn test_resolve_non_object_is_unavailable() {
        let state = assembler().resolve(Endpoint::Statistics, Ok(json!([1, 2, 3])));
        assert_eq!(state.kind(), "unavailable");
    }

    #[test]
    fn test_resolve_records_defaults() {
        let state = assembler().resolve(Endpoint::Overview, Ok(json!({"total_records": 10})));
        let (view, defaulted) = match state {
            UnitState::Ready { view, defaulted } => (view, defaulted),
            other => panic!("expected ready, got {:?}", other),
        };
        assert!(!defaulted.is_empty());
        let ViewModel::Overview(view) = view else {
            panic!("wrong variant");
        };
        assert_eq!(view.cards[0].value, 10);
        assert_eq!(view.cards[1].value, 0);
    }

    #[test]
    fn test_resolve_class_distribution_without_counts_is_ready() {
        let state = assembler().resolve(
            Endpoint::ClassDistribution,
            Ok(json!({"total_records": 10, "percentages": {}})),
        );
        let (view, defaulted) = match state {
            UnitState::Ready { view, defaulted } => (view, defaulted),
            other => panic!("expected ready, got {:?}", other),
        };
        assert_eq!(defaulted, vec!["class_distribution.distribution"]);
        let ViewModel::ClassDistribution(view) = view else {
            panic!("wrong variant");
        };
        assert!(view.slices.is_empty());
        assert_eq!(view.total_label, "0");
    }

    #[test]
    fn test_resolve_overflowing_counts_is_ready() {
        let state = assembler().resolve(
            Endpoint::FeatureDistributions,
            Ok(json!({"f": {"values": [usize::MAX, 1], "bins": [0, 1, 2], "count": 1}})),
        );
        assert_eq!(state.kind(), "ready");

        let state = assembler().resolve(
            Endpoint::ClassDistribution,
            Ok(json!({
                "distribution": {"normal": usize::MAX, "anomaly": 5},
                "percentages": {},
                "total_records": 5,
            })),
        );
        let UnitState::Ready { defaulted, .. } = &state else {
            panic!("expected ready, got {:?}", state);
        };
        assert!(defaulted.contains(&"class_distribution.distribution.anomaly".to_string()));
    }

    #[test]
    fn test_anomaly_badges_with_huge_counts() {
        let report = AnomalyReport {
            normal_count: usize::MAX,
            anomaly_count: usize::MAX,
            ..AnomalyReport::default()
        };
        let ViewModel::AnomalyAnalysis(view) = assembler().anomaly(&report) else {
            panic!("wrong variant");
        };
        assert_eq!(view.normal.share_label, "50.0%");
        assert_eq!(view.anomaly.share_label, "50.0%");
    }
}
