//! Value counts for categorical features (protocol, service, flag).

use std::collections::HashMap;

use crate::error::{AnalyticsError, Result};
use crate::types::{CategoricalColumn, CategoricalSummary, ValueCount};

pub struct CategoricalSummarizer;

impl CategoricalSummarizer {
    /// Count present values, most frequent first, ties by value.
    pub fn summarize(column: &CategoricalColumn) -> Result<CategoricalSummary> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for value in column.values.iter().flatten() {
            *counts.entry(value.as_str()).or_insert(0) += 1;
        }
        if counts.is_empty() {
            return Err(AnalyticsError::EmptyInput(column.name.clone()));
        }

        let mut counts: Vec<ValueCount> = counts
            .into_iter()
            .map(|(value, count)| ValueCount {
                value: value.to_string(),
                count,
            })
            .collect();
        counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));

        Ok(CategoricalSummary {
            feature: column.name.clone(),
            total: counts.iter().map(|c| c.count).sum(),
            counts,
        })
    }
}
