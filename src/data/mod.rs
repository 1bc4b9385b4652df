//! Price history loading

use polars::prelude::*;
use std::fs::File;
use std::path::Path;

use crate::error::{RegressionError, Result};

/// Load one ticker's price history from `<data_dir>/<ticker>.csv` and return
/// the named column as a flat series, newest row first (as stored).
pub fn load_prices(data_dir: impl AsRef<Path>, ticker: &str, column: &str) -> Result<Vec<f64>> {
    let path = data_dir.as_ref().join(format!("{}.csv", ticker));
    let file = File::open(&path)
        .map_err(|e| RegressionError::DataError(format!("{}: {}", path.display(), e)))?;

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(100))
        .into_reader_with_file_handle(file)
        .finish()?;

    let series = df
        .column(column)
        .map_err(|_| RegressionError::DataError(format!("column not found: {}", column)))?;

    let casted = series.cast(&DataType::Float64)?;
    let values: Vec<f64> = casted
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(0.0))
        .collect();

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_prices() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = File::create(dir.path().join("AAPL.csv")).unwrap();
        writeln!(file, "date,close,volume").unwrap();
        writeln!(file, "2020-01-03,75.0,1000").unwrap();
        writeln!(file, "2020-01-02,74.5,900").unwrap();
        writeln!(file, "2020-01-01,74.0,800").unwrap();

        let prices = load_prices(dir.path(), "AAPL", "close").unwrap();
        assert_eq!(prices, vec![75.0, 74.5, 74.0]);
    }

    #[test]
    fn test_missing_column() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = File::create(dir.path().join("AAPL.csv")).unwrap();
        writeln!(file, "date,close").unwrap();
        writeln!(file, "2020-01-01,74.0").unwrap();

        let err = load_prices(dir.path(), "AAPL", "open").unwrap_err();
        assert!(matches!(err, RegressionError::DataError(_)));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_prices(dir.path(), "MSFT", "close").unwrap_err();
        assert!(matches!(err, RegressionError::DataError(_)));
    }
}
