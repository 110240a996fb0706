//! Concurrent refresh of every visualization unit.
//!
//! A [`Dashboard`] owns one [`ViewUnit`] per [`Endpoint`]. Activating a unit
//! runs one fetch-and-assemble cycle against the [`DataSource`]; units never
//! share mutable state, and a cycle that completes after its unit was
//! deactivated or refreshed again is discarded.
//!
//! # Example
//!
//! ```rust,ignore
//! use kdd_insight::{Dashboard, DatasetAnalyzer, LocalSource, dataset::generate_demo};
//!
//! let source = LocalSource::new(generate_demo(5000, 42)?, DatasetAnalyzer::default());
//! let dashboard = Dashboard::builder(source).build()?;
//! let snapshot = dashboard.activate_all().await;
//! ```

pub mod observer;
pub mod unit;

pub use observer::{ClosureUnitObserver, UnitObserver, UnitUpdate};
pub use unit::{RefreshTicket, ViewUnit};

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Local;
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::config::{AnalyticsConfig, ConfigValidationError};
use crate::error::AnalyticsError;
use crate::payload::Endpoint;
use crate::source::DataSource;
use crate::view::{UnitState, ViewModelAssembler};

/// Point-in-time copy of every unit's state.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub generated_at: String,
    pub source: String,
    pub units: Vec<UnitSnapshot>,
}

impl DashboardSnapshot {
    pub fn unit(&self, endpoint: Endpoint) -> Option<&UnitSnapshot> {
        self.units.iter().find(|u| u.endpoint == endpoint)
    }

    /// Number of units in the state named `kind`.
    pub fn count(&self, kind: &str) -> usize {
        self.units.iter().filter(|u| u.state.kind() == kind).count()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UnitSnapshot {
    pub endpoint: Endpoint,
    pub title: String,
    pub path: String,
    pub generation: u64,
    pub state: UnitState,
}

struct Inner<S> {
    source: S,
    assembler: ViewModelAssembler,
    units: Vec<ViewUnit>,
    observer: Option<Arc<dyn UnitObserver>>,
}

/// The set of visualization units over one data source.
///
/// Cloning is cheap and every clone drives the same units.
pub struct Dashboard<S: DataSource> {
    inner: Arc<Inner<S>>,
}

impl<S: DataSource> Clone for Dashboard<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: DataSource> Dashboard<S> {
    pub fn builder(source: S) -> DashboardBuilder<S> {
        DashboardBuilder {
            source,
            config: None,
            observer: None,
        }
    }

    pub fn source(&self) -> &S {
        &self.inner.source
    }

    pub fn assembler(&self) -> &ViewModelAssembler {
        &self.inner.assembler
    }

    pub fn unit(&self, endpoint: Endpoint) -> &ViewUnit {
        // units are created in `Endpoint::ALL` order
        &self.inner.units[endpoint_index(endpoint)]
    }

    pub fn state(&self, endpoint: Endpoint) -> UnitState {
        self.unit(endpoint).state()
    }

    /// Run one refresh cycle for `endpoint` and return the unit's state
    /// afterwards.
    ///
    /// If another cycle started or the unit was deactivated while this one
    /// was fetching, the result is dropped and the newer state is returned.
    pub async fn activate(&self, endpoint: Endpoint) -> UnitState {
        let ticket = self.begin(endpoint);
        self.complete(ticket).await
    }

    /// Refresh every unit concurrently, one task per unit.
    ///
    /// A task that panics or is cancelled leaves its unit `Unavailable`.
    pub async fn activate_all(&self) -> DashboardSnapshot {
        info!("Refreshing {} units from {}", Endpoint::ALL.len(), self.source().name());

        let mut tasks = JoinSet::new();
        let mut in_flight = HashMap::with_capacity(Endpoint::ALL.len());
        for endpoint in Endpoint::ALL {
            let ticket = self.begin(endpoint);
            let dashboard = self.clone();
            let handle = tasks.spawn(async move { dashboard.complete(ticket).await });
            in_flight.insert(handle.id(), ticket);
        }
        while let Some(result) = tasks.join_next_with_id().await {
            let Err(e) = result else { continue };
            warn!("Unit refresh task failed: {}", e);
            if let Some(ticket) = in_flight.get(&e.id()) {
                let error = AnalyticsError::TaskFailed(e.to_string());
                self.settle(ticket, UnitState::unavailable(&error));
            }
        }

        let snapshot = self.snapshot();
        info!(
            "Dashboard refreshed: {} ready, {} fallback, {} unavailable",
            snapshot.count("ready"),
            snapshot.count("fallback"),
            snapshot.count("unavailable")
        );
        snapshot
    }

    /// Deactivate a unit, discarding any cycle in flight.
    pub fn deactivate(&self, endpoint: Endpoint) {
        debug!("Deactivating {}", endpoint);
        self.unit(endpoint).deactivate();
    }

    pub fn deactivate_all(&self) {
        for unit in &self.inner.units {
            unit.deactivate();
        }
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            generated_at: Local::now().to_rfc3339(),
            source: self.source().name().to_string(),
            units: self
                .inner
                .units
                .iter()
                .map(|unit| UnitSnapshot {
                    endpoint: unit.endpoint(),
                    title: unit.endpoint().display_name().to_string(),
                    path: unit.endpoint().path().to_string(),
                    generation: unit.generation(),
                    state: unit.state(),
                })
                .collect(),
        }
    }

    fn begin(&self, endpoint: Endpoint) -> RefreshTicket {
        let ticket = self.unit(endpoint).begin();
        self.notify(&ticket, &UnitState::Loading);
        ticket
    }

    async fn complete(&self, ticket: RefreshTicket) -> UnitState {
        let endpoint = ticket.endpoint;
        let fetched = self.inner.source.fetch(endpoint).await;
        let state = self.inner.assembler.resolve(endpoint, fetched);
        self.settle(&ticket, state);
        self.unit(endpoint).state()
    }

    fn settle(&self, ticket: &RefreshTicket, state: UnitState) {
        if self.unit(ticket.endpoint).commit(ticket, state.clone()) {
            debug!(
                "{} settled as {} (generation {})",
                ticket.endpoint,
                state.kind(),
                ticket.generation
            );
            self.notify(ticket, &state);
        } else {
            debug!(
                "Discarding stale cycle {} of {}",
                ticket.generation, ticket.endpoint
            );
        }
    }

    fn notify(&self, ticket: &RefreshTicket, state: &UnitState) {
        if let Some(observer) = &self.inner.observer {
            observer.notify(UnitUpdate::new(ticket, state));
        }
    }
}

fn endpoint_index(endpoint: Endpoint) -> usize {
    Endpoint::ALL
        .iter()
        .position(|e| *e == endpoint)
        .unwrap_or_default()
}

/// Builder for [`Dashboard`].
pub struct DashboardBuilder<S: DataSource> {
    source: S,
    config: Option<AnalyticsConfig>,
    observer: Option<Arc<dyn UnitObserver>>,
}

impl<S: DataSource> DashboardBuilder<S> {
    /// Configuration used when assembling views.
    pub fn config(mut self, config: AnalyticsConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn observer(mut self, observer: Arc<dyn UnitObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Set an update callback closure.
    pub fn on_update<F>(mut self, callback: F) -> Self
    where
        F: Fn(UnitUpdate) + Send + Sync + 'static,
    {
        self.observer = Some(Arc::new(ClosureUnitObserver::new(callback)));
        self
    }

    /// Build the dashboard. Returns an error if the configuration is invalid.
    pub fn build(self) -> Result<Dashboard<S>, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(Dashboard {
            inner: Arc::new(Inner {
                source: self.source,
                assembler: ViewModelAssembler::from_validated(config),
                units: Endpoint::ALL.into_iter().map(ViewUnit::new).collect(),
                observer: self.observer,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::view::ViewModel;
    use parking_lot::Mutex;
    use serde_json::{Value, json};

    /// Fails every endpoint except the overview.
    struct FlakySource;

    impl DataSource for FlakySource {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn fetch(&self, endpoint: Endpoint) -> Result<Value> {
            match endpoint {
                Endpoint::Overview => Ok(json!({
                    "total_records": 4,
                    "total_features": 3,
                    "numeric_features": 2,
                    "categorical_features": 1,
                    "feature_names": ["a", "b", "c"],
                    "dataset_description": "test",
                })),
                Endpoint::Statistics => Ok(json!("not an object")),
                other => Err(AnalyticsError::fetch_failure(other.path(), "offline")),
            }
        }
    }

    /// Panics while fetching the statistics payload.
    struct PanickingSource;

    impl DataSource for PanickingSource {
        fn name(&self) -> &str {
            "panicking"
        }

        async fn fetch(&self, endpoint: Endpoint) -> Result<Value> {
            if endpoint == Endpoint::Statistics {
                panic!("statistics payload exploded");
            }
            FlakySource.fetch(endpoint).await
        }
    }

    #[tokio::test]
    async fn test_activate_ready() {
        let dashboard = Dashboard::builder(FlakySource).build().unwrap();
        let state = dashboard.activate(Endpoint::Overview).await;

        let Some(ViewModel::Overview(view)) = state.view() else {
            panic!("expected overview view, got {:?}", state);
        };
        assert_eq!(view.cards[0].value, 4);
        assert_eq!(state.kind(), "ready");
    }

    #[tokio::test]
    async fn test_activate_all_contains_failures_per_unit() {
        let dashboard = Dashboard::builder(FlakySource).build().unwrap();
        let snapshot = dashboard.activate_all().await;

        assert_eq!(snapshot.units.len(), Endpoint::ALL.len());
        assert_eq!(snapshot.count("ready"), 1);
        assert_eq!(snapshot.count("unavailable"), 1);
        assert_eq!(snapshot.count("fallback"), Endpoint::ALL.len() - 2);
        assert_eq!(snapshot.source, "flaky");
    }

    #[tokio::test]
    async fn test_observer_sees_transitions() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let dashboard = Dashboard::builder(FlakySource)
            .on_update(move |update| sink.lock().push((update.endpoint, update.state)))
            .build()
            .unwrap();

        dashboard.activate(Endpoint::ModelMetrics).await;

        assert_eq!(
            *seen.lock(),
            vec![
                (Endpoint::ModelMetrics, "loading".to_string()),
                (Endpoint::ModelMetrics, "fallback".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_deactivate_resets_unit() {
        let dashboard = Dashboard::builder(FlakySource).build().unwrap();
        dashboard.activate(Endpoint::Overview).await;
        dashboard.deactivate(Endpoint::Overview);

        assert_eq!(dashboard.state(Endpoint::Overview), UnitState::Idle);
        assert!(!dashboard.unit(Endpoint::Overview).is_active());
    }

    #[tokio::test]
    async fn test_panicking_task_leaves_unit_unavailable() {
        let dashboard = Dashboard::builder(PanickingSource).build().unwrap();
        let snapshot = dashboard.activate_all().await;

        match &snapshot.unit(Endpoint::Statistics).unwrap().state {
            UnitState::Unavailable { code, .. } => assert_eq!(code, "TASK_FAILED"),
            other => panic!("expected unavailable, got {:?}", other),
        }
        assert_eq!(snapshot.count("loading"), 0);
        assert_eq!(snapshot.count("ready"), 1);
        assert_eq!(dashboard.state(Endpoint::Overview).kind(), "ready");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = AnalyticsConfig {
            histogram_bins: 0,
            ..AnalyticsConfig::default()
        };
        assert!(Dashboard::builder(FlakySource).config(config).build().is_err());
    }

    static_assertions::assert_impl_all!(Dashboard<FlakySource>: Send, Sync, Clone);
}
