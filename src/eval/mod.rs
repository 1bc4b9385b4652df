//! Sliding-window model evaluation
//!
//! Trains a fresh model per window offset over a price history and averages
//! the mean squared error of its horizon predictions.

use ndarray::{Array1, Array2};
use std::path::Path;
use tracing::{debug, info};

use crate::data;
use crate::error::{RegressionError, Result};
use crate::model::{from_config, IndexModel, ModelConfig};

/// Average MSE of `config` over `iterations` sliding windows of the
/// ticker's price history.
///
/// Window offset `i` trains on days `i+1 .. i+1+n` (against day indices
/// `n, n-1, …, 1`) and scores predictions for `n, …, n+predict_n-1`
/// against days `i .. i+predict_n`.
pub fn average_mean_squared_error(
    config: &ModelConfig,
    ticker: &str,
    iterations: usize,
    data_dir: impl AsRef<Path>,
) -> Result<f64> {
    let prices = data::load_prices(data_dir, ticker, &config.input_options.column)?;

    let n = config.model_options.n();
    let predict_n = config.input_options.predict_n;

    let needed = iterations + n.max(predict_n);
    if prices.len() < needed {
        return Err(RegressionError::DataError(format!(
            "{} has {} rows of {}, need at least {}",
            ticker,
            prices.len(),
            config.input_options.column,
            needed
        )));
    }

    // Day indices n, n-1, …, 1 as a single-feature matrix
    let xs = Array2::from_shape_fn((n, 1), |(i, _)| (n - i) as f64);
    let horizon = Array2::from_shape_fn((predict_n, 1), |(i, _)| (n + i) as f64);

    let mut error_sum = 0.0;

    for i in 0..iterations {
        let mut model = from_config(config, ticker)?;

        let ys = Array1::from(prices[i + 1..i + 1 + n].to_vec());
        model.train(&xs, &ys)?;

        let y_pred = model.predict(&horizon)?;
        let actual = Array1::from(prices[i..i + y_pred.len()].to_vec());

        let mse = model.error(&actual, &y_pred);
        debug!(ticker, window = i, mse, "evaluated window");
        error_sum += mse;
    }

    let average = error_sum / iterations as f64;
    info!(ticker, iterations, average_mse = average, "evaluation finished");
    Ok(average)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InputOptions, LinearOptions};
    use std::fs::File;
    use std::io::Write;

    /// Price series that moves by exactly one unit per day. OLS fits the
    /// window exactly, so every horizon prediction lags the actual by one
    /// unit and each window's MSE is exactly 1.
    #[test]
    fn test_average_mse_on_unit_ramp() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = File::create(dir.path().join("TEST.csv")).unwrap();
        writeln!(file, "date,close").unwrap();
        for i in 0..20 {
            writeln!(file, "2020-01-{:02},{}", 20 - i, 100.0 - i as f64).unwrap();
        }

        let config = ModelConfig::linear(
            LinearOptions { n: 10, use_stock_price: true },
            InputOptions { column: "close".to_string(), predict_n: 1 },
        );

        let avg = average_mean_squared_error(&config, "TEST", 3, dir.path()).unwrap();
        assert!((avg - 1.0).abs() < 1e-6, "expected 1.0, got {}", avg);
    }

    #[test]
    fn test_too_short_history() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = File::create(dir.path().join("TEST.csv")).unwrap();
        writeln!(file, "date,close").unwrap();
        writeln!(file, "2020-01-01,100.0").unwrap();

        let config = ModelConfig::linear(
            LinearOptions { n: 10, use_stock_price: true },
            InputOptions { column: "close".to_string(), predict_n: 1 },
        );

        assert!(matches!(
            average_mean_squared_error(&config, "TEST", 3, dir.path()),
            Err(RegressionError::DataError(_))
        ));
    }
}
