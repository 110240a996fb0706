//! NSL-KDD Analytics Library
//!
//! Aggregation and view-binding layer for labeled network-intrusion datasets,
//! built with Rust and Polars.
//!
//! # Overview
//!
//! The library turns a labeled connection table into renderer-ready views:
//!
//! - **Aggregation**: descriptive statistics, equal-width histograms, Pearson
//!   correlations, class balance, normal vs anomaly comparison, value counts
//! - **Payloads**: a JSON contract per endpoint, with lenient decoding that
//!   defaults and records missing fields
//! - **Views**: one [`ViewModel`] per visualization unit, with heatmap color
//!   buckets and preformatted labels
//! - **Fallback**: built-in NSL-KDD reference figures when a source fails
//! - **Dashboard**: concurrent per-unit refresh where stale cycles never
//!   overwrite newer results
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use kdd_insight::{Dashboard, DatasetAnalyzer, LocalSource, dataset};
//!
//! let data = dataset::read_csv("KDDTrain.csv", "class")?;
//! let source = LocalSource::new(data, DatasetAnalyzer::default());
//!
//! let dashboard = Dashboard::builder(source)
//!     .on_update(|update| println!("{} -> {}", update.endpoint, update.state))
//!     .build()?;
//!
//! let snapshot = dashboard.activate_all().await;
//! println!("{}", serde_json::to_string_pretty(&snapshot)?);
//! ```
//!
//! # Remote Sources
//!
//! With the `http` feature (on by default), [`HttpSource`] fetches the same
//! payloads from a remote analytics service. Transport failures become
//! [`AnalyticsError::FetchFailure`] and the affected unit shows fallback
//! figures; every other unit is unaffected.
//!
//! # Configuration
//!
//! ```rust,ignore
//! use kdd_insight::AnalyticsConfig;
//!
//! let config = AnalyticsConfig::builder()
//!     .histogram_bins(8)
//!     .top_k(10)
//!     .label_column("class")
//!     .build()?;
//! ```

pub mod analytics;
pub mod config;
pub mod dashboard;
pub mod dataset;
pub mod error;
pub mod payload;
pub mod source;
pub mod types;
pub mod utils;
pub mod view;

// Re-exports for convenient access
pub use analytics::{
    AnomalyComparator, CategoricalSummarizer, ClassDistributionComputer, CorrelationEngine,
    DatasetAnalyzer, DistributionBinner, StatisticsAggregator,
};
pub use config::{AnalyticsConfig, AnalyticsConfigBuilder, ConfigValidationError};
pub use dashboard::{
    ClosureUnitObserver, Dashboard, DashboardBuilder, DashboardSnapshot, RefreshTicket,
    UnitObserver, UnitSnapshot, UnitUpdate, ViewUnit,
};
pub use dataset::Dataset;
pub use error::{AnalyticsError, Result, ResultExt};
pub use payload::{Decoded, Endpoint};
pub use source::{DataSource, LocalSource};
#[cfg(feature = "http")]
pub use source::{HttpSource, HttpSourceConfig};
pub use types::{
    AnomalyComparison, AnomalyReport, CategoricalColumn, CategoricalSummary, ClassDistribution,
    ClassShare, CorrelationMatrix, CorrelationPair, CorrelationReport, DatasetOverview,
    Distribution, FeatureColumn, FeatureDistribution, FeatureStatistic, ModelMetricsSummary,
    NamedStatistic, RankedCorrelations, RankedPair,
};
pub use view::{HeatmapBucket, UnitState, ViewModel, ViewModelAssembler};
