//! In-process data source backed by a loaded dataset.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use super::DataSource;
use crate::analytics::DatasetAnalyzer;
use crate::dataset::Dataset;
use crate::error::{AnalyticsError, Result};
use crate::payload::Endpoint;
use crate::types::ModelMetricsSummary;

/// Computes payloads from an in-memory [`Dataset`].
///
/// Each fetch runs the aggregation on the blocking pool, so concurrent units
/// do not stall the async runtime.
#[derive(Debug, Clone)]
pub struct LocalSource {
    dataset: Arc<Dataset>,
    analyzer: DatasetAnalyzer,
    metrics: Arc<ModelMetricsSummary>,
}

impl LocalSource {
    /// Serve `dataset` with the published benchmark metrics.
    pub fn new(dataset: Dataset, analyzer: DatasetAnalyzer) -> Self {
        Self::with_metrics(dataset, analyzer, ModelMetricsSummary::nsl_kdd_benchmark())
    }

    pub fn with_metrics(
        dataset: Dataset,
        analyzer: DatasetAnalyzer,
        metrics: ModelMetricsSummary,
    ) -> Self {
        Self {
            dataset: Arc::new(dataset),
            analyzer,
            metrics: Arc::new(metrics),
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }
}

impl DataSource for LocalSource {
    fn name(&self) -> &str {
        "local"
    }

    async fn fetch(&self, endpoint: Endpoint) -> Result<Value> {
        let dataset = Arc::clone(&self.dataset);
        let metrics = Arc::clone(&self.metrics);
        let analyzer = self.analyzer.clone();

        debug!("Computing {} locally over {} records", endpoint, dataset.len());
        tokio::task::spawn_blocking(move || analyzer.payload(endpoint, &dataset, &metrics))
            .await
            .map_err(|e| AnalyticsError::fetch_failure(endpoint.path(), e))?
    }
}
