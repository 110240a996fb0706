//! Polars adapter: prepared table to [`Dataset`].
//!
//! No cleaning or type repair happens here. Numeric and boolean columns
//! become feature columns, string columns become categorical columns, and
//! anything else is skipped.

use std::path::{Path, PathBuf};

use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use tracing::{debug, info};

use super::Dataset;
use crate::error::{AnalyticsError, Result, ResultExt};
use crate::types::{CategoricalColumn, FeatureColumn};
use crate::utils::{DtypeCategory, get_dtype_category};

/// Label assigned to records whose label cell is null.
pub const UNKNOWN_LABEL: &str = "unknown";

/// Split a frame into numeric and categorical columns plus labels.
pub fn from_frame(df: &DataFrame, label_column: &str) -> Result<Dataset> {
    let label = df
        .column(label_column)
        .map_err(|_| AnalyticsError::ColumnNotFound(label_column.to_string()))?;
    let labels = string_values(label.as_materialized_series())
        .context(format!("Reading label column '{}'", label_column))?
        .into_iter()
        .map(|v| v.unwrap_or_else(|| UNKNOWN_LABEL.to_string()))
        .collect();

    let mut numeric = Vec::new();
    let mut categorical = Vec::new();

    for column in df.get_columns() {
        let name = column.name().as_str();
        if name == label_column {
            continue;
        }
        let series = column.as_materialized_series();

        match get_dtype_category(series.dtype()) {
            DtypeCategory::Numeric | DtypeCategory::Boolean => {
                let values = series
                    .cast(&DataType::Float64)
                    .context(format!("Casting '{}' to float", name))?;
                let values: Vec<Option<f64>> = values.f64()?.into_iter().collect();
                numeric.push(FeatureColumn::new(name, values));
            }
            DtypeCategory::String => {
                let values = string_values(series)
                    .context(format!("Reading categorical column '{}'", name))?;
                categorical.push(CategoricalColumn::new(name, values));
            }
            DtypeCategory::Other => {
                debug!("Skipping column '{}' with dtype {:?}", name, series.dtype());
            }
        }
    }

    debug!(
        "Frame split into {} numeric and {} categorical columns",
        numeric.len(),
        categorical.len()
    );

    Dataset::new(numeric, categorical, labels, label_column)
}

/// Read an already prepared CSV file and convert it.
pub fn read_csv(path: impl AsRef<Path>, label_column: &str) -> Result<Dataset> {
    let path = path.as_ref();
    info!("Loading dataset from: {}", path.display());

    let df = CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))
        .context(format!("Opening '{}'", path.display()))?
        .finish()
        .context(format!("Parsing '{}'", path.display()))?;

    info!("Dataset loaded successfully: {:?}", df.shape());
    from_frame(&df, label_column)
}

fn string_values(series: &Series) -> Result<Vec<Option<String>>> {
    let cast = series.cast(&DataType::String)?;
    Ok(cast
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.trim().to_string()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame() -> DataFrame {
        df!(
            "duration" => [0.0, 12.0, 3.0],
            "protocol_type" => ["tcp", "udp", "tcp"],
            "land" => [0i64, 1, 0],
            "class" => ["normal", "anomaly", "normal"],
        )
        .unwrap()
    }

    #[test]
    fn test_from_frame_splits_columns() {
        let dataset = from_frame(&sample_frame(), "class").unwrap();

        assert_eq!(dataset.len(), 3);
        let numeric: Vec<&str> = dataset
            .numeric_columns()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(numeric, vec!["duration", "land"]);
        assert_eq!(dataset.categorical_columns()[0].name, "protocol_type");
        assert_eq!(dataset.labels(), &["normal", "anomaly", "normal"]);
    }

    #[test]
    fn test_missing_label_column() {
        let err = from_frame(&sample_frame(), "label").unwrap_err();
        assert!(matches!(err, AnalyticsError::ColumnNotFound(name) if name == "label"));
    }

    #[test]
    fn test_null_label_becomes_unknown() {
        let df = df!(
            "hot" => [1.0, 2.0],
            "class" => [Some("normal"), None],
        )
        .unwrap();
        let dataset = from_frame(&df, "class").unwrap();
        assert_eq!(dataset.labels()[1], UNKNOWN_LABEL);
    }

    #[test]
    fn test_null_numeric_values_stay_missing() {
        let df = df!(
            "src_bytes" => [Some(1.0), None, Some(3.0)],
            "class" => ["normal", "normal", "anomaly"],
        )
        .unwrap();
        let dataset = from_frame(&df, "class").unwrap();
        assert_eq!(dataset.numeric_columns()[0].present_count(), 2);
    }
}
