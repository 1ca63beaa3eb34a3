//! Dataset CSV read/write using Polars
//!
//! Header: `N,P,K,temperature,humidity,ph,rainfall,label`
//!
//! Numeric columns are written with fixed precision (one decimal for
//! N/P/K/rainfall, two for temperature/humidity/ph), so the same dataset
//! always serializes to the same bytes.

use std::fs::{self, File};
use std::path::Path;

use polars::prelude::*;

use crate::dataset::{Dataset, Sample};
use crate::error::{CropError, Result};
use crate::features::{Feature, FeatureVector, LABEL_COLUMN, NUM_FEATURES};

/// Convert to a string-typed DataFrame with fixed-precision numeric columns
pub fn to_dataframe(dataset: &Dataset) -> Result<DataFrame> {
    let mut columns: Vec<Column> = Feature::ALL
        .iter()
        .map(|&feature| {
            let precision = feature.precision();
            let values: Vec<String> = dataset
                .iter()
                .map(|s| format!("{:.*}", precision, s.value(feature)))
                .collect();
            Column::from(Series::new(feature.column_name().into(), values))
        })
        .collect();

    let labels: Vec<&str> = dataset.labels();
    columns.push(Column::from(Series::new(LABEL_COLUMN.into(), labels)));

    Ok(DataFrame::new(columns)?)
}

/// Build a dataset from a DataFrame with the seven feature columns and `label`
///
/// Integer feature columns are cast to Float64; nulls are rejected.
pub fn from_dataframe(df: &DataFrame) -> Result<Dataset> {
    let n_rows = df.height();
    let mut features: Vec<FeatureVector> = vec![[0.0; NUM_FEATURES]; n_rows];

    for feature in Feature::ALL {
        let name = feature.column_name();
        let column = df.column(name)?.cast(&DataType::Float64)?;
        let values = column.f64()?;
        for (row, value) in values.into_iter().enumerate() {
            let value = value.ok_or_else(|| {
                CropError::MalformedDataset(format!("missing value in column '{}' at row {}", name, row))
            })?;
            features[row][feature.index()] = value;
        }
    }

    let labels = df.column(LABEL_COLUMN)?.str()?;
    let mut samples = Vec::with_capacity(n_rows);
    for (row, (label, fv)) in labels.into_iter().zip(features).enumerate() {
        let label = label.ok_or_else(|| {
            CropError::MalformedDataset(format!("missing label at row {}", row))
        })?;
        samples.push(Sample::new(fv, label));
    }

    Ok(Dataset::new(samples))
}

/// Write the dataset as CSV, creating parent directories as needed
pub fn write_csv(dataset: &Dataset, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut df = to_dataframe(dataset)?;
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .finish(&mut df)?;

    tracing::debug!(path = %path.display(), rows = dataset.len(), "wrote dataset CSV");
    Ok(())
}

/// Read a dataset CSV written by [`write_csv`] (or any CSV with the same header)
pub fn read_csv(path: &Path) -> Result<Dataset> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    let dataset = from_dataframe(&df)?;
    tracing::debug!(path = %path.display(), rows = dataset.len(), "read dataset CSV");
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample_dataset() -> Dataset {
        Dataset::new(vec![
            Sample::new([90.0, 42.0, 43.0, 20.879744, 82.002744, 6.502985, 202.935536], "rice"),
            Sample::new([20.0, 67.5, 80.0, 18.0, 17.0, 7.1, 70.24], "chickpea"),
        ])
    }

    #[test]
    fn test_csv_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crops.csv");
        write_csv(&sample_dataset(), &path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("N,P,K,temperature,humidity,ph,rainfall,label"));
        assert_eq!(lines.next(), Some("90.0,42.0,43.0,20.88,82.00,6.50,202.9,rice"));
        assert_eq!(lines.next(), Some("20.0,67.5,80.0,18.00,17.00,7.10,70.2,chickpea"));
    }

    #[test]
    fn test_csv_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("crops.csv");
        write_csv(&sample_dataset(), &path).unwrap();

        let ds = read_csv(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.labels(), vec!["rice", "chickpea"]);
        assert_relative_eq!(ds.samples()[0].value(Feature::Temperature), 20.88, epsilon = 1e-9);
    }

    #[test]
    fn test_read_integer_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ints.csv");
        fs::write(&path, "N,P,K,temperature,humidity,ph,rainfall,label\n90,42,43,24,68,7,120,rice\n").unwrap();

        let ds = read_csv(&path).unwrap();
        assert_eq!(ds.samples()[0].features, [90.0, 42.0, 43.0, 24.0, 68.0, 7.0, 120.0]);
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "N,P,K,label\n90,42,43,rice\n").unwrap();

        assert!(matches!(read_csv(&path), Err(CropError::Dataset(_))));
    }
}
