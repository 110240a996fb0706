//! Custom error types for the analytics layer.
//!
//! This module provides the error hierarchy using `thiserror`. Each variant
//! maps to one failure class of the aggregation and view-binding layer:
//!
//! - [`AnalyticsError::FetchFailure`]: the data source could not deliver a
//!   payload. Non-fatal, the unit switches to its fallback dataset.
//! - [`AnalyticsError::EmptyInput`] / [`AnalyticsError::EmptyDataset`]:
//!   degenerate input. Excluded from output rather than propagated.
//! - [`AnalyticsError::Alignment`]: columns of mismatched length. Fatal to
//!   the computation, surfaced as "data unavailable".
//! - [`AnalyticsError::MalformedPayload`]: unexpected shape or field type.
//!
//! Errors are serializable so they can be handed to a renderer as
//! `{code, message}`.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the analytics layer.
#[derive(Error, Debug)]
pub enum AnalyticsError {
    /// The data source failed to deliver a payload (network, transport, status).
    #[error("Failed to fetch '{endpoint}': {reason}")]
    FetchFailure { endpoint: String, reason: String },

    /// A column or subset had no present values to compute over.
    #[error("No present values in '{0}'")]
    EmptyInput(String),

    /// The dataset holds zero records.
    #[error("Dataset contains no records")]
    EmptyDataset,

    /// Columns that must be aligned by record index have different lengths.
    #[error("Column '{column}' has {found} values, expected {expected}")]
    Alignment {
        column: String,
        expected: usize,
        found: usize,
    },

    /// Payload has an unexpected shape or field type.
    #[error("Malformed payload at '{field}': {reason}")]
    MalformedPayload { field: String, reason: String },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Column was not found in the table.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client error (only with "http" feature).
    #[cfg(feature = "http")]
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// A refresh task ended without producing a state (panicked or was
    /// cancelled).
    #[error("Refresh task failed: {0}")]
    TaskFailed(String),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<AnalyticsError>,
    },
}

impl AnalyticsError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        AnalyticsError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Shorthand for a [`AnalyticsError::FetchFailure`].
    pub fn fetch_failure(endpoint: impl Into<String>, reason: impl ToString) -> Self {
        AnalyticsError::FetchFailure {
            endpoint: endpoint.into(),
            reason: reason.to_string(),
        }
    }

    /// Shorthand for a [`AnalyticsError::MalformedPayload`].
    pub fn malformed(field: impl Into<String>, reason: impl Into<String>) -> Self {
        AnalyticsError::MalformedPayload {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Get error code for renderer handling.
    ///
    /// Codes are stable strings so a renderer can pick the right placeholder
    /// (fallback chart, inline error badge, empty state).
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::FetchFailure { .. } => "FETCH_FAILURE",
            Self::EmptyInput(_) => "EMPTY_INPUT",
            Self::EmptyDataset => "EMPTY_DATASET",
            Self::Alignment { .. } => "ALIGNMENT_ERROR",
            Self::MalformedPayload { .. } => "MALFORMED_PAYLOAD",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::TaskFailed(_) => "TASK_FAILED",
            #[cfg(feature = "http")]
            Self::Http(_) => "HTTP_REQUEST_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Whether the failure should be answered with the built-in fallback
    /// dataset instead of an error indicator.
    pub fn is_fallback_eligible(&self) -> bool {
        match self {
            Self::FetchFailure { .. } => true,
            #[cfg(feature = "http")]
            Self::Http(_) => true,
            Self::WithContext { source, .. } => source.is_fallback_eligible(),
            _ => false,
        }
    }

    /// Check if this error is a degenerate-input condition that callers
    /// exclude from output instead of surfacing.
    pub fn is_empty_input(&self) -> bool {
        match self {
            Self::EmptyInput(_) | Self::EmptyDataset => true,
            Self::WithContext { source, .. } => source.is_empty_input(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for AnalyticsError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("AnalyticsError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for analytics operations.
pub type Result<T> = std::result::Result<T, AnalyticsError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| AnalyticsError::Polars(e).with_context(context))
    }
}
