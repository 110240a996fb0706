//! Seeded synthetic table shaped like NSL-KDD.
//!
//! Used when no prepared table is available. Column names and value ranges
//! follow the NSL-KDD training set; the label split is 67% normal, 33% anomaly.

use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rand::rngs::StdRng;

use super::Dataset;
use crate::error::{AnalyticsError, Result};
use crate::types::{CategoricalColumn, FeatureColumn};

pub const DEMO_SEED: u64 = 42;
pub const DEMO_SAMPLES: usize = 5000;

#[derive(Debug, Clone, Copy)]
enum Draw {
    /// Exponential with the given scale.
    Exponential(f64),
    /// 1 with the given probability, else 0.
    Flag(f64),
    /// Integer in `[low, high)`.
    Int(i64, i64),
    /// Uniform in `[0, 1)`.
    Rate,
}

const NUMERIC: &[(&str, Draw)] = &[
    ("duration", Draw::Exponential(50.0)),
    ("src_bytes", Draw::Exponential(1000.0)),
    ("dst_bytes", Draw::Exponential(1000.0)),
    ("land", Draw::Flag(0.05)),
    ("wrong_fragment", Draw::Flag(0.02)),
    ("urgent", Draw::Flag(0.01)),
    ("hot", Draw::Int(0, 20)),
    ("num_compromised", Draw::Int(0, 5)),
    ("root_shell", Draw::Flag(0.05)),
    ("su_attempted", Draw::Flag(0.05)),
    ("num_root", Draw::Int(0, 10)),
    ("num_file_creations", Draw::Int(0, 50)),
    ("num_shells", Draw::Int(0, 5)),
    ("num_access_files", Draw::Int(0, 20)),
    ("num_outbound_cmds", Draw::Int(0, 10)),
    ("is_host_login", Draw::Flag(0.05)),
    ("is_guest_login", Draw::Flag(0.01)),
    ("count", Draw::Int(1, 100)),
    ("srv_count", Draw::Int(1, 100)),
    ("serror_rate", Draw::Rate),
    ("srv_serror_rate", Draw::Rate),
    ("rerror_rate", Draw::Rate),
    ("srv_rerror_rate", Draw::Rate),
    ("same_srv_rate", Draw::Rate),
    ("diff_srv_rate", Draw::Rate),
    ("srv_diff_host_rate", Draw::Rate),
    ("dst_host_count", Draw::Int(1, 255)),
    ("dst_host_srv_count", Draw::Int(1, 255)),
    ("dst_host_same_srv_rate", Draw::Rate),
    ("dst_host_diff_srv_rate", Draw::Rate),
    ("dst_host_same_src_port_rate", Draw::Rate),
    ("dst_host_srv_diff_host_rate", Draw::Rate),
    ("dst_host_serror_rate", Draw::Rate),
    ("dst_host_srv_serror_rate", Draw::Rate),
    ("dst_host_rerror_rate", Draw::Rate),
    ("dst_host_srv_rerror_rate", Draw::Rate),
];

const CATEGORICAL: &[(&str, &[(&str, f64)])] = &[
    ("protocol_type", &[("tcp", 0.7), ("udp", 0.2), ("icmp", 0.1)]),
    (
        "service",
        &[
            ("http", 0.4),
            ("ssh", 0.3),
            ("ftp", 0.15),
            ("dns", 0.1),
            ("smtp", 0.05),
        ],
    ),
    (
        "flag",
        &[
            ("S0", 0.1),
            ("S1", 0.2),
            ("SF", 0.6),
            ("REJ", 0.05),
            ("SH", 0.05),
        ],
    ),
];

const CLASSES: &[(&str, f64)] = &[("normal", 0.67), ("anomaly", 0.33)];

/// Generate `samples` records from `seed`. The same seed always yields the
/// same table.
pub fn generate_demo(samples: usize, seed: u64) -> Result<Dataset> {
    let mut rng = StdRng::seed_from_u64(seed);

    let categorical = CATEGORICAL
        .iter()
        .map(|(name, choices)| {
            let values = choose(&mut rng, choices, samples)?
                .into_iter()
                .map(|v| Some(v.to_string()))
                .collect();
            Ok(CategoricalColumn::new(*name, values))
        })
        .collect::<Result<Vec<_>>>()?;

    let numeric = NUMERIC
        .iter()
        .map(|(name, draw)| {
            let values = (0..samples).map(|_| sample(&mut rng, *draw)).collect();
            FeatureColumn::from_values(*name, values)
        })
        .collect();

    let labels = choose(&mut rng, CLASSES, samples)?
        .into_iter()
        .map(str::to_string)
        .collect();

    Dataset::new(numeric, categorical, labels, "class")
}

fn choose<'a>(rng: &mut StdRng, choices: &[(&'a str, f64)], n: usize) -> Result<Vec<&'a str>> {
    let index = WeightedIndex::new(choices.iter().map(|(_, w)| *w))
        .map_err(|e| AnalyticsError::InvalidConfig(format!("demo weights: {}", e)))?;
    Ok((0..n).map(|_| choices[index.sample(rng)].0).collect())
}

fn sample(rng: &mut StdRng, draw: Draw) -> f64 {
    match draw {
        Draw::Exponential(scale) => {
            let u: f64 = rng.r#gen();
            -scale * (1.0 - u).ln()
        }
        Draw::Flag(p) => {
            if rng.gen_bool(p) {
                1.0
            } else {
                0.0
            }
        }
        Draw::Int(low, high) => rng.gen_range(low..high) as f64,
        Draw::Rate => rng.r#gen(),
    }
}
