//! Labeled tabular input for the analytics layer.
//!
//! A [`Dataset`] holds numeric feature columns, categorical columns and one
//! label per record. Adapters build it from a Polars [`DataFrame`](polars::prelude::DataFrame)
//! ([`frame`]) or generate a synthetic NSL-KDD-like table ([`demo`]).

pub mod demo;
pub mod frame;

pub use demo::{DEMO_SAMPLES, DEMO_SEED, generate_demo};
pub use frame::{from_frame, read_csv};

use std::collections::HashSet;

use crate::error::{AnalyticsError, Result};
use crate::types::{CategoricalColumn, FeatureColumn};

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    numeric: Vec<FeatureColumn>,
    categorical: Vec<CategoricalColumn>,
    labels: Vec<String>,
    label_column: String,
}

impl Dataset {
    /// Assemble a dataset, checking that every column has one value per label
    /// and that column names are unique.
    pub fn new(
        numeric: Vec<FeatureColumn>,
        categorical: Vec<CategoricalColumn>,
        labels: Vec<String>,
        label_column: impl Into<String>,
    ) -> Result<Self> {
        let label_column = label_column.into();
        let expected = labels.len();

        let lengths = numeric
            .iter()
            .map(|c| (&c.name, c.len()))
            .chain(categorical.iter().map(|c| (&c.name, c.len())));
        let mut seen = HashSet::new();
        seen.insert(label_column.clone());

        for (name, found) in lengths {
            if found != expected {
                return Err(AnalyticsError::Alignment {
                    column: name.clone(),
                    expected,
                    found,
                });
            }
            if !seen.insert(name.clone()) {
                return Err(AnalyticsError::InvalidConfig(format!(
                    "duplicate column name '{}'",
                    name
                )));
            }
        }

        Ok(Self {
            numeric,
            categorical,
            labels,
            label_column,
        })
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn numeric_columns(&self) -> &[FeatureColumn] {
        &self.numeric
    }

    pub fn categorical_columns(&self) -> &[CategoricalColumn] {
        &self.categorical
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn label_column(&self) -> &str {
        &self.label_column
    }

    pub fn numeric_column(&self, name: &str) -> Option<&FeatureColumn> {
        self.numeric.iter().find(|c| c.name == name)
    }

    /// Numeric, then categorical, then the label column.
    pub fn feature_names(&self) -> Vec<String> {
        self.numeric
            .iter()
            .map(|c| c.name.clone())
            .chain(self.categorical.iter().map(|c| c.name.clone()))
            .chain(std::iter::once(self.label_column.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_checks_alignment() {
        let err = Dataset::new(
            vec![FeatureColumn::from_values("duration", vec![1.0])],
            Vec::new(),
            vec!["normal".into(), "anomaly".into()],
            "class",
        )
        .unwrap_err();
        assert!(matches!(err, AnalyticsError::Alignment { expected: 2, found: 1, .. }));
    }

    #[test]
    fn test_new_rejects_duplicate_names() {
        let err = Dataset::new(
            vec![
                FeatureColumn::from_values("hot", vec![1.0]),
                FeatureColumn::from_values("hot", vec![2.0]),
            ],
            Vec::new(),
            vec!["normal".into()],
            "class",
        )
        .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_feature_names_order() {
        let dataset = Dataset::new(
            vec![FeatureColumn::from_values("duration", vec![1.0])],
            vec![CategoricalColumn::new("flag", vec![Some("SF".into())])],
            vec!["normal".into()],
            "class",
        )
        .unwrap();
        assert_eq!(dataset.feature_names(), vec!["duration", "flag", "class"]);
        assert_eq!(dataset.len(), 1);
    }
}
