//! Aggregation components and the [`DatasetAnalyzer`] façade.
//!
//! The components are plain computations over columns:
//!
//! - [`StatisticsAggregator`]: descriptive statistics per feature
//! - [`DistributionBinner`]: equal-width histograms
//! - [`CorrelationEngine`]: Pearson matrix and ranked pairs
//! - [`ClassDistributionComputer`]: label counts and shares
//! - [`AnomalyComparator`]: per-label mean comparison
//! - [`CategoricalSummarizer`]: value counts of categorical features
//!
//! [`DatasetAnalyzer`] runs them over a [`Dataset`] under an
//! [`AnalyticsConfig`] and encodes the results as endpoint payloads.

pub mod anomaly;
pub mod categorical;
pub mod classes;
pub mod correlation;
pub mod distribution;
pub mod statistics;

pub use anomaly::AnomalyComparator;
pub use categorical::CategoricalSummarizer;
pub use classes::ClassDistributionComputer;
pub use correlation::CorrelationEngine;
pub use distribution::DistributionBinner;
pub use statistics::StatisticsAggregator;

use serde_json::Value;
use tracing::{debug, info};

use crate::config::AnalyticsConfig;
use crate::dataset::Dataset;
use crate::error::{Result, ResultExt};
use crate::payload::{Endpoint, encode};
use crate::types::{
    AnomalyReport, CategoricalColumn, CategoricalSummary, ClassDistribution, CorrelationReport,
    DatasetOverview, FeatureDistribution, ModelMetricsSummary, NamedStatistic,
};

const DATASET_DESCRIPTION: &str = "NSL-KDD 2009: network intrusion detection dataset. \
    Connection records labeled as normal or anomaly, described by traffic features.";

/// Runs every aggregation over a [`Dataset`].
#[derive(Debug, Clone, Default)]
pub struct DatasetAnalyzer {
    config: AnalyticsConfig,
}

impl DatasetAnalyzer {
    /// Create an analyzer, rejecting an invalid configuration.
    pub fn new(config: AnalyticsConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Record and feature counts. The label column counts as categorical.
    pub fn overview(&self, dataset: &Dataset) -> DatasetOverview {
        let numeric_features = dataset.numeric_columns().len();
        let categorical_features = dataset.categorical_columns().len() + 1;

        DatasetOverview {
            total_records: dataset.len(),
            total_features: numeric_features + categorical_features,
            numeric_features,
            categorical_features,
            feature_names: dataset.feature_names(),
            dataset_description: DATASET_DESCRIPTION.to_string(),
        }
    }

    pub fn class_distribution(&self, dataset: &Dataset) -> Result<ClassDistribution> {
        ClassDistributionComputer::compute(dataset.labels())
    }

    pub fn statistics(&self, dataset: &Dataset) -> Vec<NamedStatistic> {
        StatisticsAggregator::compute_all(dataset.numeric_columns())
    }

    pub fn correlations(&self, dataset: &Dataset) -> Result<CorrelationReport> {
        CorrelationEngine::compute(dataset.numeric_columns(), self.config.top_k)
            .context("Computing correlation matrix")
    }

    /// Histograms of the first `max_distribution_features` numeric features.
    /// Features without present values are skipped.
    pub fn distributions(&self, dataset: &Dataset) -> Result<Vec<FeatureDistribution>> {
        let mut out = Vec::new();
        for column in dataset
            .numeric_columns()
            .iter()
            .take(self.config.max_distribution_features)
        {
            match DistributionBinner::compute(column, self.config.histogram_bins) {
                Ok(distribution) => out.push(FeatureDistribution {
                    feature: column.name.clone(),
                    distribution,
                }),
                Err(e) if e.is_empty_input() => {
                    debug!("Skipping histogram for '{}': {}", column.name, e);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(out)
    }

    /// Value counts of the first `max_categorical_features` categorical
    /// features, the label column included last.
    pub fn categorical(&self, dataset: &Dataset) -> Vec<CategoricalSummary> {
        let label_column = CategoricalColumn::new(
            dataset.label_column(),
            dataset.labels().iter().cloned().map(Some).collect(),
        );

        dataset
            .categorical_columns()
            .iter()
            .chain(std::iter::once(&label_column))
            .take(self.config.max_categorical_features)
            .filter_map(|column| match CategoricalSummarizer::summarize(column) {
                Ok(summary) => Some(summary),
                Err(e) => {
                    debug!("Skipping value counts for '{}': {}", column.name, e);
                    None
                }
            })
            .collect()
    }

    /// Normal vs anomaly means of the first `max_comparison_features`
    /// numeric features.
    pub fn anomaly(&self, dataset: &Dataset) -> Result<AnomalyReport> {
        let columns = dataset.numeric_columns();
        let columns = &columns[..columns.len().min(self.config.max_comparison_features)];
        AnomalyComparator::compare(
            columns,
            dataset.labels(),
            &self.config.normal_label,
            &self.config.anomaly_label,
        )
    }

    /// Compute and encode the payload served for `endpoint`.
    pub fn payload(
        &self,
        endpoint: Endpoint,
        dataset: &Dataset,
        metrics: &ModelMetricsSummary,
    ) -> Result<Value> {
        debug!("Computing payload for {}", endpoint);

        let value = match endpoint {
            Endpoint::Overview => encode::overview(&self.overview(dataset)),
            Endpoint::ClassDistribution => {
                encode::class_distribution(&self.class_distribution(dataset)?)
            }
            Endpoint::Statistics => encode::statistics(&self.statistics(dataset)),
            Endpoint::CorrelationMatrix => {
                encode::correlation_matrix(&self.correlations(dataset)?.matrix)
            }
            Endpoint::TopCorrelations => encode::top_correlations(&self.correlations(dataset)?),
            Endpoint::FeatureDistributions => {
                encode::feature_distributions(&self.distributions(dataset)?)
            }
            Endpoint::CategoricalAnalysis => {
                encode::categorical_analysis(&self.categorical(dataset))
            }
            Endpoint::AnomalyAnalysis => encode::anomaly_analysis(&self.anomaly(dataset)?),
            Endpoint::ModelMetrics => encode::model_metrics(metrics),
        };

        info!("Payload ready for {}", endpoint);
        Ok(value)
    }
}
