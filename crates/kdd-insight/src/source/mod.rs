//! Data sources deliver one JSON payload per [`Endpoint`].
//!
//! The analytics layer has no transport dependency of its own; anything that
//! can produce payloads implements [`DataSource`]:
//!
//! - [`LocalSource`] computes payloads from an in-memory [`Dataset`](crate::dataset::Dataset)
//! - [`HttpSource`] fetches them from a remote analytics service (feature `http`)

pub mod local;

#[cfg(feature = "http")]
pub mod http;

pub use local::LocalSource;

#[cfg(feature = "http")]
pub use http::{HttpSource, HttpSourceConfig};

use std::future::Future;

use serde_json::Value;

use crate::error::Result;
use crate::payload::Endpoint;

/// Trait for anything that can deliver endpoint payloads.
///
/// Implementations must be `Send + Sync` so a dashboard can fetch every unit
/// concurrently from a shared source.
///
/// # Errors
///
/// A source reports transport problems as
/// [`AnalyticsError::FetchFailure`](crate::error::AnalyticsError::FetchFailure),
/// which the dashboard answers with fallback figures. Any other error marks
/// the unit unavailable.
pub trait DataSource: Send + Sync + 'static {
    /// Source name for logging.
    fn name(&self) -> &str;

    /// Fetch the payload served for `endpoint`.
    fn fetch(&self, endpoint: Endpoint) -> impl Future<Output = Result<Value>> + Send;
}
