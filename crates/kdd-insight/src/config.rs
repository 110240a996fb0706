//! Configuration types for the analytics layer.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic setup.

use serde::{Deserialize, Serialize};

/// Default number of histogram bins per feature.
pub const DEFAULT_HISTOGRAM_BINS: usize = 10;

/// Default length of the ranked correlation lists.
pub const DEFAULT_TOP_K: usize = 5;

/// Configuration for the analytics layer.
///
/// Use [`AnalyticsConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use kdd_insight::config::AnalyticsConfig;
///
/// let config = AnalyticsConfig::builder()
///     .histogram_bins(8)
///     .top_k(5)
///     .label_column("class")
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Number of equal-width bins per feature histogram.
    /// Default: 10
    pub histogram_bins: usize,

    /// Number of pairs kept in each ranked correlation list.
    /// Default: 5
    pub top_k: usize,

    /// Maximum number of numeric features that get a histogram.
    /// Default: 10
    pub max_distribution_features: usize,

    /// Maximum number of numeric features compared between label groups.
    /// Default: 10
    pub max_comparison_features: usize,

    /// Maximum number of categorical features summarized.
    /// Default: 5
    pub max_categorical_features: usize,

    /// Number of features shown in the correlation heatmap.
    /// Default: 8
    pub heatmap_features: usize,

    /// Number of feature cards shown in the statistics panel.
    /// Default: 6
    pub statistics_cards: usize,

    /// Name of the column holding the record label.
    /// Default: "class"
    pub label_column: String,

    /// Label value of legitimate records.
    /// Default: "normal"
    pub normal_label: String,

    /// Label value of attack records.
    /// Default: "anomaly"
    pub anomaly_label: String,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            top_k: DEFAULT_TOP_K,
            max_distribution_features: 10,
            max_comparison_features: 10,
            max_categorical_features: 5,
            heatmap_features: 8,
            statistics_cards: 6,
            label_column: "class".to_string(),
            normal_label: "normal".to_string(),
            anomaly_label: "anomaly".to_string(),
        }
    }
}

impl AnalyticsConfig {
    /// Create a new configuration builder.
    pub fn builder() -> AnalyticsConfigBuilder {
        AnalyticsConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.histogram_bins == 0 {
            return Err(ConfigValidationError::ZeroCount {
                field: "histogram_bins".to_string(),
            });
        }

        if self.top_k == 0 {
            return Err(ConfigValidationError::ZeroCount {
                field: "top_k".to_string(),
            });
        }

        if self.heatmap_features == 0 {
            return Err(ConfigValidationError::ZeroCount {
                field: "heatmap_features".to_string(),
            });
        }

        for (field, value) in [
            ("label_column", &self.label_column),
            ("normal_label", &self.normal_label),
            ("anomaly_label", &self.anomaly_label),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigValidationError::EmptyName {
                    field: field.to_string(),
                });
            }
        }

        if self.normal_label == self.anomaly_label {
            return Err(ConfigValidationError::IdenticalLabels(
                self.normal_label.clone(),
            ));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid value for '{field}': must be at least 1")]
    ZeroCount { field: String },

    #[error("Invalid value for '{field}': must not be empty")]
    EmptyName { field: String },

    #[error("Normal and anomaly labels must differ (both are '{0}')")]
    IdenticalLabels(String),
}

impl From<ConfigValidationError> for crate::error::AnalyticsError {
    fn from(err: ConfigValidationError) -> Self {
        crate::error::AnalyticsError::InvalidConfig(err.to_string())
    }
}

/// Builder for [`AnalyticsConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct AnalyticsConfigBuilder {
    histogram_bins: Option<usize>,
    top_k: Option<usize>,
    max_distribution_features: Option<usize>,
    max_comparison_features: Option<usize>,
    max_categorical_features: Option<usize>,
    heatmap_features: Option<usize>,
    statistics_cards: Option<usize>,
    label_column: Option<String>,
    normal_label: Option<String>,
    anomaly_label: Option<String>,
}

impl AnalyticsConfigBuilder {
    /// Set the number of histogram bins.
    pub fn histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = Some(bins);
        self
    }

    /// Set the length of the ranked correlation lists.
    pub fn top_k(mut self, k: usize) -> Self {
        self.top_k = Some(k);
        self
    }

    /// Set the maximum number of features that get a histogram.
    pub fn max_distribution_features(mut self, n: usize) -> Self {
        self.max_distribution_features = Some(n);
        self
    }

    /// Set the maximum number of features compared between label groups.
    pub fn max_comparison_features(mut self, n: usize) -> Self {
        self.max_comparison_features = Some(n);
        self
    }

    /// Set the maximum number of categorical features summarized.
    pub fn max_categorical_features(mut self, n: usize) -> Self {
        self.max_categorical_features = Some(n);
        self
    }

    /// Set the number of heatmap features.
    pub fn heatmap_features(mut self, n: usize) -> Self {
        self.heatmap_features = Some(n);
        self
    }

    /// Set the number of statistics cards.
    pub fn statistics_cards(mut self, n: usize) -> Self {
        self.statistics_cards = Some(n);
        self
    }

    /// Set the label column name.
    pub fn label_column(mut self, column: impl Into<String>) -> Self {
        self.label_column = Some(column.into());
        self
    }

    /// Set the label value of legitimate records.
    pub fn normal_label(mut self, label: impl Into<String>) -> Self {
        self.normal_label = Some(label.into());
        self
    }

    /// Set the label value of attack records.
    pub fn anomaly_label(mut self, label: impl Into<String>) -> Self {
        self.anomaly_label = Some(label.into());
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `AnalyticsConfig` or an error if validation fails.
    pub fn build(self) -> Result<AnalyticsConfig, ConfigValidationError> {
        let defaults = AnalyticsConfig::default();
        let config = AnalyticsConfig {
            histogram_bins: self.histogram_bins.unwrap_or(defaults.histogram_bins),
            top_k: self.top_k.unwrap_or(defaults.top_k),
            max_distribution_features: self
                .max_distribution_features
                .unwrap_or(defaults.max_distribution_features),
            max_comparison_features: self
                .max_comparison_features
                .unwrap_or(defaults.max_comparison_features),
            max_categorical_features: self
                .max_categorical_features
                .unwrap_or(defaults.max_categorical_features),
            heatmap_features: self.heatmap_features.unwrap_or(defaults.heatmap_features),
            statistics_cards: self.statistics_cards.unwrap_or(defaults.statistics_cards),
            label_column: self.label_column.unwrap_or(defaults.label_column),
            normal_label: self.normal_label.unwrap_or(defaults.normal_label),
            anomaly_label: self.anomaly_label.unwrap_or(defaults.anomaly_label),
        };

        config.validate()?;
        Ok(config)
    }
}
