//! Integration tests for the analytics dashboard.
//!
//! These tests drive whole refresh cycles: dataset to payload to view, plus
//! fallback, unavailable and stale-cycle behavior against controllable
//! sources.

use kdd_insight::view::fallback;
use kdd_insight::{
    AnalyticsError, Dashboard, DataSource, DatasetAnalyzer, Endpoint, LocalSource, Result,
    UnitState, ViewModel, dataset,
};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::oneshot;

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn fixture_dashboard() -> Dashboard<LocalSource> {
    let data = dataset::read_csv(fixtures_path().join("kdd_sample.csv"), "class")
        .expect("Failed to read fixture");
    Dashboard::builder(LocalSource::new(data, DatasetAnalyzer::default()))
        .build()
        .expect("Failed to build dashboard")
}

fn expect_view(state: &UnitState) -> &ViewModel {
    state
        .view()
        .unwrap_or_else(|| panic!("expected a view, got {:?}", state))
}

/// Always fails with a transport error.
struct OfflineSource;

impl DataSource for OfflineSource {
    fn name(&self) -> &str {
        "offline"
    }

    async fn fetch(&self, endpoint: Endpoint) -> Result<Value> {
        Err(AnalyticsError::fetch_failure(endpoint.path(), "connection refused"))
    }
}

/// Serves fixed payloads; endpoints without one fail to fetch.
struct StaticSource {
    payloads: Vec<(Endpoint, Value)>,
}

impl DataSource for StaticSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch(&self, endpoint: Endpoint) -> Result<Value> {
        self.payloads
            .iter()
            .find(|(e, _)| *e == endpoint)
            .map(|(_, payload)| payload.clone())
            .ok_or_else(|| AnalyticsError::fetch_failure(endpoint.path(), "not served"))
    }
}

/// Each fetch waits for the payload sent on its own channel, in call order.
struct GatedSource {
    pending: Mutex<VecDeque<oneshot::Receiver<Value>>>,
    calls: AtomicUsize,
}

impl GatedSource {
    fn new(count: usize) -> (Self, Vec<oneshot::Sender<Value>>) {
        let (senders, receivers): (Vec<_>, VecDeque<_>) =
            (0..count).map(|_| oneshot::channel()).unzip();
        let source = Self {
            pending: Mutex::new(receivers),
            calls: AtomicUsize::new(0),
        };
        (source, senders)
    }
}

impl DataSource for GatedSource {
    fn name(&self) -> &str {
        "gated"
    }

    async fn fetch(&self, endpoint: Endpoint) -> Result<Value> {
        let gate = self.pending.lock().pop_front();
        self.calls.fetch_add(1, Ordering::SeqCst);
        match gate {
            Some(rx) => rx
                .await
                .map_err(|e| AnalyticsError::fetch_failure(endpoint.path(), e)),
            None => Err(AnalyticsError::fetch_failure(endpoint.path(), "no gate")),
        }
    }
}

async fn wait_for_calls(source: &GatedSource, expected: usize) {
    while source.calls.load(Ordering::SeqCst) < expected {
        tokio::task::yield_now().await;
    }
}

fn overview_payload(total_records: usize) -> Value {
    json!({
        "total_records": total_records,
        "total_features": 3,
        "numeric_features": 2,
        "categorical_features": 1,
        "feature_names": ["duration", "src_bytes", "class"],
        "dataset_description": "gated",
    })
}

fn overview_records(state: &UnitState) -> usize {
    match expect_view(state) {
        ViewModel::Overview(view) => view.cards[0].value,
        other => panic!("expected overview, got {:?}", other),
    }
}

// ============================================================================
// Local dataset, end to end
// ============================================================================

#[tokio::test]
async fn test_fixture_every_unit_ready() {
    let dashboard = fixture_dashboard();
    let snapshot = dashboard.activate_all().await;

    assert_eq!(snapshot.count("ready"), Endpoint::ALL.len());
    assert_eq!(snapshot.source, "local");
    for unit in &snapshot.units {
        match &unit.state {
            UnitState::Ready { defaulted, .. } => {
                assert!(defaulted.is_empty(), "{}: {:?}", unit.path, defaulted)
            }
            other => panic!("{} not ready: {:?}", unit.path, other),
        }
    }
}

#[tokio::test]
async fn test_fixture_overview_and_classes() {
    let dashboard = fixture_dashboard();

    let state = dashboard.activate(Endpoint::Overview).await;
    let ViewModel::Overview(overview) = expect_view(&state) else {
        panic!("wrong view");
    };
    let values: Vec<usize> = overview.cards.iter().map(|c| c.value).collect();
    // 7 numeric + protocol_type, service, flag and the label
    assert_eq!(values, vec![12, 11, 7, 4]);

    let state = dashboard.activate(Endpoint::ClassDistribution).await;
    let ViewModel::ClassDistribution(classes) = expect_view(&state) else {
        panic!("wrong view");
    };
    let labels: Vec<(&str, &str)> = classes
        .slices
        .iter()
        .map(|s| (s.label.as_str(), s.percentage_label.as_str()))
        .collect();
    assert_eq!(labels, vec![("normal", "58.3%"), ("anomaly", "41.7%")]);
}

#[tokio::test]
async fn test_fixture_heatmap_symmetric() {
    let dashboard = fixture_dashboard();
    let state = dashboard.activate(Endpoint::CorrelationMatrix).await;
    let ViewModel::CorrelationHeatmap(heatmap) = expect_view(&state) else {
        panic!("wrong view");
    };

    let n = heatmap.features.len();
    assert_eq!(n, 7);
    for i in 0..n {
        assert_eq!(heatmap.cells[i][i].value, Some(1.0));
        for j in 0..n {
            assert_eq!(heatmap.cells[i][j].value, heatmap.cells[j][i].value);
        }
    }
}

#[tokio::test]
async fn test_fixture_distributions_consistent() {
    let dashboard = fixture_dashboard();
    let state = dashboard.activate(Endpoint::FeatureDistributions).await;
    let ViewModel::FeatureDistributions(view) = expect_view(&state) else {
        panic!("wrong view");
    };

    for hist in &view.features {
        let total: usize = hist.bars.iter().map(|b| b.frequency).sum();
        assert_eq!(total, hist.total_count, "{}", hist.feature);
        assert_eq!(hist.total_count, 12);
        assert!(hist.bars.windows(2).all(|w| w[0].end <= w[1].start + 1e-9));
    }
}

#[tokio::test]
async fn test_fixture_anomaly_ranking() {
    let dashboard = fixture_dashboard();
    let state = dashboard.activate(Endpoint::AnomalyAnalysis).await;
    let ViewModel::AnomalyAnalysis(view) = expect_view(&state) else {
        panic!("wrong view");
    };

    assert_eq!(view.normal.count, 7);
    assert_eq!(view.anomaly.count, 5);
    let differences: Vec<f64> = view.bars.iter().map(|b| b.difference.abs()).collect();
    assert!(differences.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn test_demo_snapshot_serializes() {
    let data = dataset::generate_demo(300, dataset::DEMO_SEED).unwrap();
    let dashboard = Dashboard::builder(LocalSource::new(data, DatasetAnalyzer::default()))
        .build()
        .unwrap();
    let snapshot = dashboard.activate_all().await;

    let json = serde_json::to_value(&snapshot).unwrap();
    let units = json["units"].as_array().unwrap();
    assert_eq!(units.len(), Endpoint::ALL.len());
    assert_eq!(units[0]["state"]["state"], "ready");
    assert_eq!(units[0]["state"]["view"]["kind"], "overview");
}

// ============================================================================
// Failure containment
// ============================================================================

#[tokio::test]
async fn test_offline_source_shows_complete_fallback() {
    let dashboard = Dashboard::builder(OfflineSource).build().unwrap();
    let snapshot = dashboard.activate_all().await;

    assert_eq!(snapshot.count("fallback"), Endpoint::ALL.len());

    let state = &snapshot.unit(Endpoint::ClassDistribution).unwrap().state;
    let ViewModel::ClassDistribution(classes) = expect_view(state) else {
        panic!("wrong view");
    };
    let counts: Vec<usize> = classes.slices.iter().map(|s| s.count).collect();
    assert_eq!(counts, vec![fallback::NORMAL_COUNT, fallback::ANOMALY_COUNT]);
    assert_eq!(classes.total_label, "125,973");
}

#[tokio::test]
async fn test_failures_contained_per_unit() {
    let source = StaticSource {
        payloads: vec![
            (Endpoint::Overview, overview_payload(10)),
            (Endpoint::Statistics, json!([1, 2, 3])),
            (
                Endpoint::FeatureDistributions,
                json!({"duration": {"values": [1, 2], "bins": [0.0, 1.0], "count": 3}}),
            ),
        ],
    };
    let dashboard = Dashboard::builder(source).build().unwrap();
    let snapshot = dashboard.activate_all().await;

    let kind = |endpoint| snapshot.unit(endpoint).unwrap().state.kind();
    assert_eq!(kind(Endpoint::Overview), "ready");
    assert_eq!(kind(Endpoint::Statistics), "unavailable");
    assert_eq!(kind(Endpoint::FeatureDistributions), "unavailable");
    assert_eq!(kind(Endpoint::ModelMetrics), "fallback");
    assert_eq!(snapshot.count("fallback"), Endpoint::ALL.len() - 3);
}

#[tokio::test]
async fn test_missing_fields_defaulted_and_recorded() {
    let source = StaticSource {
        payloads: vec![(Endpoint::Overview, json!({"total_records": 42}))],
    };
    let dashboard = Dashboard::builder(source).build().unwrap();
    let state = dashboard.activate(Endpoint::Overview).await;

    match &state {
        UnitState::Ready { defaulted, .. } => {
            assert!(defaulted.contains(&"overview.total_features".to_string()));
            assert!(!defaulted.contains(&"overview.total_records".to_string()));
        }
        other => panic!("expected ready, got {:?}", other),
    }
    assert_eq!(overview_records(&state), 42);
}

// ============================================================================
// Refresh cycles
// ============================================================================

#[tokio::test]
async fn test_superseded_cycle_never_overwrites_newer_state() {
    let (source, mut senders) = GatedSource::new(2);
    let source = Arc::new(source);
    let dashboard = Dashboard::builder(SharedGate(Arc::clone(&source)))
        .build()
        .unwrap();

    let first = {
        let dashboard = dashboard.clone();
        tokio::spawn(async move { dashboard.activate(Endpoint::Overview).await })
    };
    wait_for_calls(&source, 1).await;

    let second = {
        let dashboard = dashboard.clone();
        tokio::spawn(async move { dashboard.activate(Endpoint::Overview).await })
    };
    wait_for_calls(&source, 2).await;

    let second_tx = senders.pop().unwrap();
    let first_tx = senders.pop().unwrap();

    second_tx.send(overview_payload(2)).unwrap();
    let settled = second.await.unwrap();
    assert_eq!(overview_records(&settled), 2);

    // the older cycle finishes last and must be discarded
    first_tx.send(overview_payload(1)).unwrap();
    let after_stale = first.await.unwrap();
    assert_eq!(overview_records(&after_stale), 2);
    assert_eq!(overview_records(&dashboard.state(Endpoint::Overview)), 2);
    assert_eq!(dashboard.unit(Endpoint::Overview).generation(), 2);
}

#[tokio::test]
async fn test_cycle_after_deactivation_is_discarded() {
    let (source, mut senders) = GatedSource::new(1);
    let source = Arc::new(source);
    let dashboard = Dashboard::builder(SharedGate(Arc::clone(&source)))
        .build()
        .unwrap();

    let cycle = {
        let dashboard = dashboard.clone();
        tokio::spawn(async move { dashboard.activate(Endpoint::Overview).await })
    };
    wait_for_calls(&source, 1).await;
    assert_eq!(dashboard.state(Endpoint::Overview), UnitState::Loading);

    dashboard.deactivate(Endpoint::Overview);
    senders.pop().unwrap().send(overview_payload(5)).unwrap();

    assert_eq!(cycle.await.unwrap(), UnitState::Idle);
    assert_eq!(dashboard.state(Endpoint::Overview), UnitState::Idle);
}

/// Lets a test keep a handle on the gated source the dashboard owns.
struct SharedGate(Arc<GatedSource>);

impl DataSource for SharedGate {
    fn name(&self) -> &str {
        self.0.name()
    }

    async fn fetch(&self, endpoint: Endpoint) -> Result<Value> {
        self.0.fetch(endpoint).await
    }
}
