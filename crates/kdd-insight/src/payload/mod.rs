//! JSON payload contract between a data service and the view layer.
//!
//! Each [`Endpoint`] is one logical service route and one visualization unit.
//! [`encode`] produces the payload shapes from computed results, [`decode`]
//! reads them back leniently into typed values.

pub mod decode;
pub mod encode;

pub use decode::Decoded;

use serde::{Deserialize, Serialize};

/// Logical service endpoints, one per visualization unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    Overview,
    ClassDistribution,
    Statistics,
    CorrelationMatrix,
    TopCorrelations,
    FeatureDistributions,
    CategoricalAnalysis,
    AnomalyAnalysis,
    ModelMetrics,
}

impl Endpoint {
    pub const ALL: [Endpoint; 9] = [
        Endpoint::Overview,
        Endpoint::ClassDistribution,
        Endpoint::Statistics,
        Endpoint::CorrelationMatrix,
        Endpoint::TopCorrelations,
        Endpoint::FeatureDistributions,
        Endpoint::CategoricalAnalysis,
        Endpoint::AnomalyAnalysis,
        Endpoint::ModelMetrics,
    ];

    /// Route relative to the service base URL.
    pub fn path(&self) -> &'static str {
        match self {
            Self::Overview => "overview/",
            Self::ClassDistribution => "class-distribution/",
            Self::Statistics => "statistics/",
            Self::CorrelationMatrix => "correlation-matrix/",
            Self::TopCorrelations => "correlation-analysis/",
            Self::FeatureDistributions => "feature-distributions/",
            Self::CategoricalAnalysis => "categorical-analysis/",
            Self::AnomalyAnalysis => "anomaly-analysis/",
            Self::ModelMetrics => "model-metrics/",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        let trimmed = path.trim_matches('/');
        Self::ALL
            .into_iter()
            .find(|e| e.path().trim_end_matches('/') == trimmed)
    }

    /// Human-readable unit title.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Overview => "Dataset Overview",
            Self::ClassDistribution => "Class Distribution",
            Self::Statistics => "Descriptive Statistics",
            Self::CorrelationMatrix => "Correlation Heatmap",
            Self::TopCorrelations => "Top Correlations",
            Self::FeatureDistributions => "Feature Distributions",
            Self::CategoricalAnalysis => "Protocol Distribution",
            Self::AnomalyAnalysis => "Anomaly Analysis",
            Self::ModelMetrics => "Model Metrics",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}
