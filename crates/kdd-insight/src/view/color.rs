//! Correlation magnitude to heatmap bucket.

use serde::{Deserialize, Serialize};

/// Heatmap color bucket, by |r|.
///
/// | bucket          | range of \|r\| |
/// |-----------------|----------------|
/// | `Strong`        | (0.8, 1.0]     |
/// | `ModerateHigh`  | (0.6, 0.8]     |
/// | `Moderate`      | (0.4, 0.6]     |
/// | `Weak`          | (0.2, 0.4]     |
/// | `None`          | [0, 0.2]       |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatmapBucket {
    Strong,
    ModerateHigh,
    Moderate,
    Weak,
    None,
}

impl HeatmapBucket {
    /// Strongest first.
    pub const ALL: [HeatmapBucket; 5] = [
        HeatmapBucket::Strong,
        HeatmapBucket::ModerateHigh,
        HeatmapBucket::Moderate,
        HeatmapBucket::Weak,
        HeatmapBucket::None,
    ];

    /// Classify a coefficient. Magnitudes above 1 are clamped, NaN is `None`.
    pub fn classify(correlation: f64) -> Self {
        if correlation.is_nan() {
            return Self::None;
        }
        let magnitude = correlation.abs().min(1.0);
        if magnitude > 0.8 {
            Self::Strong
        } else if magnitude > 0.6 {
            Self::ModerateHigh
        } else if magnitude > 0.4 {
            Self::Moderate
        } else if magnitude > 0.2 {
            Self::Weak
        } else {
            Self::None
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::Strong => "strong",
            Self::ModerateHigh => "moderate_high",
            Self::Moderate => "moderate",
            Self::Weak => "weak",
            Self::None => "none",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Strong => "Strong (> 0.8)",
            Self::ModerateHigh => "Moderate-high (0.6 - 0.8)",
            Self::Moderate => "Moderate (0.4 - 0.6)",
            Self::Weak => "Weak (0.2 - 0.4)",
            Self::None => "None (<= 0.2)",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Self::Strong => "#dc2626",
            Self::ModerateHigh => "#f97316",
            Self::Moderate => "#eab308",
            Self::Weak => "#3b82f6",
            Self::None => "#374151",
        }
    }
}
