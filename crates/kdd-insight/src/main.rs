//! CLI entry point: refresh every analytics unit and print the result.

use anyhow::{Result, anyhow};
use clap::Parser;
use dotenv::dotenv;
use kdd_insight::{
    AnalyticsConfig, Dashboard, DashboardSnapshot, DataSource, DatasetAnalyzer, Endpoint,
    LocalSource, UnitState, ViewModel, dataset,
};
use tracing::info;

#[cfg(feature = "http")]
use kdd_insight::{HttpSource, HttpSourceConfig};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "NSL-KDD analytics dashboard",
    long_about = "Computes the analytics units of a labeled network-intrusion dataset \
                  (statistics, correlations, histograms, class balance, anomaly \
                  comparison) and prints the assembled views.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  KDD_INSIGHT_API_URL   Base URL of a remote analytics service (with --remote)\n  \
                  RUST_LOG              Log filter, overrides --log-level\n\n\
                  EXAMPLES:\n  \
                  # Synthetic NSL-KDD-like data\n  \
                  kdd-insight\n\n  \
                  # A local CSV export\n  \
                  kdd-insight -i KDDTrain.csv --label-column class\n\n  \
                  # A remote service, JSON snapshot on stdout\n  \
                  kdd-insight --remote --source-url http://localhost:8000/api --json"
)]
struct Args {
    /// CSV file to analyze. Without it a synthetic dataset is generated.
    #[arg(short, long)]
    input: Option<String>,

    /// Fetch payloads from a remote analytics service instead of computing them
    #[arg(long)]
    remote: bool,

    /// Base URL of the remote service (implies --remote)
    #[arg(long)]
    source_url: Option<String>,

    /// Remote request timeout in seconds
    #[arg(long, default_value = "30")]
    timeout_secs: u64,

    /// Name of the label column
    #[arg(long, default_value = "class")]
    label_column: String,

    /// Records in the synthetic dataset
    #[arg(long, default_value_t = dataset::DEMO_SAMPLES)]
    samples: usize,

    /// Seed of the synthetic dataset
    #[arg(long, default_value_t = dataset::DEMO_SEED)]
    seed: u64,

    /// Histogram bins per feature
    #[arg(long, default_value = "10")]
    bins: usize,

    /// Pairs per ranked correlation list
    #[arg(long, default_value = "5")]
    top_k: usize,

    /// Refresh only this unit, by route (e.g. "statistics")
    #[arg(short, long)]
    unit: Option<String>,

    /// Print the snapshot as JSON instead of a summary
    ///
    /// Disables all logs so stdout only contains JSON.
    #[arg(long)]
    json: bool,

    /// Also write the JSON snapshot to this file
    #[arg(short, long)]
    output: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Only show warnings, errors and the final result
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is disabled so stdout only carries
/// the snapshot.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let args = Args::parse();
    init_logging(&args.log_level, args.quiet, args.json);

    let config = AnalyticsConfig::builder()
        .histogram_bins(args.bins)
        .top_k(args.top_k)
        .label_column(&args.label_column)
        .build()?;

    let only = match &args.unit {
        Some(path) => Some(
            Endpoint::from_path(path).ok_or_else(|| anyhow!("Unknown unit '{}'", path))?,
        ),
        None => None,
    };

    if args.remote || args.source_url.is_some() {
        return run_remote(&args, config, only).await;
    }

    let data = match &args.input {
        Some(path) => {
            if !std::path::Path::new(path).exists() {
                return Err(anyhow!("Input file not found: {}", path));
            }
            dataset::read_csv(path, &args.label_column)?
        }
        None => {
            info!(
                "No input given, generating {} synthetic records (seed {})",
                args.samples, args.seed
            );
            dataset::generate_demo(args.samples, args.seed)?
        }
    };

    let analyzer = DatasetAnalyzer::new(config.clone())?;
    let dashboard = Dashboard::builder(LocalSource::new(data, analyzer))
        .config(config)
        .build()?;
    run(dashboard, &args, only).await
}

#[cfg(feature = "http")]
async fn run_remote(args: &Args, config: AnalyticsConfig, only: Option<Endpoint>) -> Result<()> {
    let mut builder = HttpSourceConfig::builder().timeout_secs(args.timeout_secs);
    builder = match &args.source_url {
        Some(url) => builder.base_url(url),
        None => builder.base_url(HttpSourceConfig::from_env().base_url),
    };
    let source = HttpSource::new(builder.build())?;
    info!("Fetching from {}", source.config().base_url);

    let dashboard = Dashboard::builder(source).config(config).build()?;
    run(dashboard, args, only).await
}

#[cfg(not(feature = "http"))]
async fn run_remote(_args: &Args, _config: AnalyticsConfig, _only: Option<Endpoint>) -> Result<()> {
    Err(anyhow!("Remote sources need the 'http' feature"))
}

async fn run<S: DataSource>(
    dashboard: Dashboard<S>,
    args: &Args,
    only: Option<Endpoint>,
) -> Result<()> {
    let snapshot = match only {
        Some(endpoint) => {
            dashboard.activate(endpoint).await;
            let mut snapshot = dashboard.snapshot();
            snapshot.units.retain(|u| u.endpoint == endpoint);
            snapshot
        }
        None => dashboard.activate_all().await,
    };

    if let Some(path) = &args.output {
        std::fs::write(path, serde_json::to_string_pretty(&snapshot)?)?;
        info!("Snapshot written to {}", path);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print_summary(&snapshot);
    }
    Ok(())
}

/// Human-readable dashboard summary.
///
/// Uses `println!` on purpose: this is the command's output, not a log.
fn print_summary(snapshot: &DashboardSnapshot) {
    println!();
    println!("{}", "=".repeat(80));
    println!("NSL-KDD ANALYTICS ({} source)", snapshot.source);
    println!("{}", "=".repeat(80));
    println!();

    for unit in &snapshot.units {
        println!("{:<24} [{}]", unit.title, unit.state.kind());
        match &unit.state {
            UnitState::Ready { view, defaulted } => {
                print_view(view);
                if !defaulted.is_empty() {
                    println!("  ({} field(s) defaulted)", defaulted.len());
                }
            }
            UnitState::Fallback { view, reason } => {
                print_view(view);
                println!("  (reference figures: {})", reason);
            }
            UnitState::Unavailable { code, message } => {
                println!("  data unavailable: {} ({})", message, code);
            }
            UnitState::Idle | UnitState::Loading => {}
        }
        println!();
    }

    println!("{}", "-".repeat(80));
    println!(
        "{} ready, {} fallback, {} unavailable  |  {}",
        snapshot.count("ready"),
        snapshot.count("fallback"),
        snapshot.count("unavailable"),
        snapshot.generated_at
    );
    println!("{}", "=".repeat(80));
}

fn print_view(view: &ViewModel) {
    match view {
        ViewModel::Overview(v) => {
            for card in &v.cards {
                println!("  {:<22} {}", card.title, card.value_label);
            }
        }
        ViewModel::ClassDistribution(v) => {
            for slice in &v.slices {
                println!(
                    "  {:<22} {:>10}  {}",
                    slice.display_name,
                    slice.count,
                    slice.percentage_label
                );
            }
        }
        ViewModel::Statistics(v) => {
            println!(
                "  {:<22} {:>12} {:>12} {:>12}",
                "Feature", "Mean", "Median", "Std"
            );
            for card in &v.cards {
                println!(
                    "  {:<22} {:>12} {:>12} {:>12}",
                    card.feature, card.mean_label, card.median_label, card.std_label
                );
            }
        }
        ViewModel::CorrelationHeatmap(v) => {
            println!("  {} x {} features", v.features.len(), v.features.len());
            for (label, row) in v.row_labels.iter().zip(&v.cells) {
                let cells: Vec<&str> = row.iter().map(|c| c.label.as_str()).collect();
                println!("  {:<10} {}", label, cells.join(" "));
            }
        }
        ViewModel::TopCorrelations(v) => {
            for row in v.positive.iter().chain(&v.negative) {
                println!("  {:>2}. {:<40} {}", row.rank, row.pair, row.label);
            }
        }
        ViewModel::FeatureDistributions(v) => {
            for hist in &v.features {
                let bars: Vec<String> = hist.bars.iter().map(|b| b.frequency.to_string()).collect();
                println!(
                    "  {:<22} [{}] {}",
                    hist.feature,
                    hist.range_label,
                    bars.join(" ")
                );
            }
        }
        ViewModel::CategoricalDistribution(v) => {
            for breakdown in &v.features {
                let slices: Vec<String> = breakdown
                    .slices
                    .iter()
                    .map(|s| format!("{} {}", s.display_name, s.percentage_label))
                    .collect();
                println!("  {:<22} {}", breakdown.feature, slices.join(", "));
            }
        }
        ViewModel::AnomalyAnalysis(v) => {
            println!(
                "  {} {} ({}), {} {} ({})",
                v.normal.label,
                v.normal.count_label,
                v.normal.share_label,
                v.anomaly.label,
                v.anomaly.count_label,
                v.anomaly.share_label
            );
            for bar in &v.bars {
                println!("  {:<22} diff {}", bar.feature, bar.difference_label);
            }
        }
        ViewModel::ModelMetrics(v) => {
            for bar in &v.bars {
                println!("  {:<22} {}", bar.name, bar.label);
            }
        }
    }
}
