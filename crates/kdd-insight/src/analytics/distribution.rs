//! Equal-width histogram binning.

use crate::error::{AnalyticsError, Result};
use crate::types::{Distribution, FeatureColumn};
use crate::utils::sort_values;

/// Builds equal-width [`Distribution`]s over a column's present values.
pub struct DistributionBinner;

impl DistributionBinner {
    /// Bin the present values of `column` into `bins` equal-width intervals.
    ///
    /// Edges run from the observed min to the observed max, the last edge is
    /// exactly max. A value lands in bin `i` when `edges[i] <= v < edges[i+1]`;
    /// the last bin also holds max. A constant column yields one bin with
    /// edges `[v - 0.5, v + 0.5]`.
    pub fn compute(column: &FeatureColumn, bins: usize) -> Result<Distribution> {
        if bins == 0 {
            return Err(AnalyticsError::InvalidConfig(
                "histogram bin count must be at least 1".to_string(),
            ));
        }

        let mut sorted: Vec<f64> = column.present().collect();
        if sorted.is_empty() {
            return Err(AnalyticsError::EmptyInput(column.name.clone()));
        }
        sort_values(&mut sorted);

        let min = sorted[0];
        let max = sorted[sorted.len() - 1];
        let total_count = sorted.len();

        if min == max {
            let half = 0.5_f64.max(min.abs() * f64::EPSILON);
            return Ok(Distribution {
                bins: vec![min - half, max + half],
                frequencies: vec![total_count],
                total_count,
            });
        }

        let edges = equal_width_edges(min, max, bins);
        let bin_count = edges.len() - 1;
        let mut frequencies = vec![0usize; bin_count];
        for value in &sorted {
            let index = edges.partition_point(|edge| edge <= value).saturating_sub(1);
            frequencies[index.min(bin_count - 1)] += 1;
        }

        Ok(Distribution {
            bins: edges,
            frequencies,
            total_count,
        })
    }
}

/// `bins + 1` edges from `min` to `max`. Edges that collapse under rounding
/// are merged, so fewer may be returned. Requires `min < max`.
fn equal_width_edges(min: f64, max: f64, bins: usize) -> Vec<f64> {
    let width = (max - min) / bins as f64;
    let mut edges = Vec::with_capacity(bins + 1);
    edges.push(min);
    for i in 1..bins {
        let edge = min + i as f64 * width;
        if edge > edges[edges.len() - 1] && edge < max {
            edges.push(edge);
        }
    }
    edges.push(max);
    edges
}
