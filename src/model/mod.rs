//! Index regression model wrappers
//!
//! Thin wrappers adapting the uniform train/predict/save/error contract onto
//! the estimators in [`crate::estimators`]. Training and prediction are
//! one-line delegations; estimator errors propagate unchanged. Saving goes
//! through an explicit [`ModelRegistry`] handle.

mod config;

pub use config::{
    InputOptions, LinearOptions, ModelConfig, ModelKind, ModelOptions, SvrOptions,
};

use ndarray::{Array1, Array2};
use tracing::warn;

use crate::error::{RegressionError, Result};
use crate::estimators::{LinearRegression, SupportVectorRegressor};
use crate::metrics;
use crate::registry::{ModelRecord, ModelRegistry};

/// Inputs for the forecast horizon: day indices `n, n+1, …, n+predict_n-1`
/// as a single-feature matrix
fn horizon_inputs(n: usize, predict_n: usize) -> Array2<f64> {
    Array2::from_shape_fn((predict_n, 1), |(i, _)| (n + i) as f64)
}

/// Compound predicted daily relative changes onto the last observed price
fn compound_changes(predictions: &mut Array1<f64>, last_price: f64) {
    if predictions.is_empty() {
        return;
    }
    predictions[0] = last_price * (1.0 + predictions[0]);
    for i in 1..predictions.len() {
        predictions[i] = predictions[i - 1] * (1.0 + predictions[i]);
    }
}

/// Uniform contract over index regression models
pub trait IndexModel {
    /// Kind of the underlying model
    fn kind(&self) -> ModelKind;

    /// The immutable configuration this model was built from
    fn config(&self) -> &ModelConfig;

    /// Ticker this model is trained for
    fn ticker(&self) -> &str;

    /// Fit the underlying estimator
    fn train(&mut self, xs: &Array2<f64>, ys: &Array1<f64>) -> Result<()>;

    /// Predict with the underlying estimator, returning a flat sequence
    fn predict(&self, xs: &Array2<f64>) -> Result<Array1<f64>>;

    /// Serialize the estimator into the registry and append a record
    fn save(&self, registry: &mut ModelRegistry) -> Result<ModelRecord>;

    /// Mean squared error between true and predicted values
    fn error(&self, y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
        metrics::mean_squared_error(y_true, y_pred)
    }

    /// Human-readable model name
    fn display_name(&self) -> String {
        self.config().display_name()
    }

    /// Predict the next `predict_n` days past the training window.
    ///
    /// In change mode (`use_stock_price` false) the predicted daily relative
    /// changes are compounded onto `last_price`, which is then required.
    fn forecast(&self, last_price: Option<f64>) -> Result<Array1<f64>> {
        let config = self.config();
        let xs = horizon_inputs(config.model_options.n(), config.input_options.predict_n);
        let mut predictions = self.predict(&xs)?;

        if !config.model_options.use_stock_price() {
            let last = last_price.ok_or_else(|| {
                RegressionError::InvalidInput(
                    "last price is required to forecast from daily changes".to_string(),
                )
            })?;
            compound_changes(&mut predictions, last);
        }

        Ok(predictions)
    }
}

/// Linear index regression
#[derive(Debug, Clone)]
pub struct LinearIndexRegression {
    ticker: String,
    config: ModelConfig,
    estimator: LinearRegression,
}

impl LinearIndexRegression {
    /// Create an untrained model for `ticker`
    pub fn new(
        options: LinearOptions,
        input_options: InputOptions,
        ticker: impl Into<String>,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            config: ModelConfig::linear(options, input_options),
            estimator: LinearRegression::new(),
        }
    }

    fn from_parts(config: ModelConfig, ticker: &str, estimator: LinearRegression) -> Self {
        Self {
            ticker: ticker.to_string(),
            config,
            estimator,
        }
    }

    /// The wrapped estimator
    pub fn estimator(&self) -> &LinearRegression {
        &self.estimator
    }
}

impl IndexModel for LinearIndexRegression {
    fn kind(&self) -> ModelKind {
        ModelKind::Linear
    }

    fn config(&self) -> &ModelConfig {
        &self.config
    }

    fn ticker(&self) -> &str {
        &self.ticker
    }

    fn train(&mut self, xs: &Array2<f64>, ys: &Array1<f64>) -> Result<()> {
        self.estimator.fit(xs, ys)
    }

    fn predict(&self, xs: &Array2<f64>) -> Result<Array1<f64>> {
        self.estimator.predict(xs)
    }

    fn save(&self, registry: &mut ModelRegistry) -> Result<ModelRecord> {
        registry.register(&self.ticker, &self.config, &self.estimator)
    }
}

/// Support-vector index regression
#[derive(Debug, Clone)]
pub struct SvrIndexRegression {
    ticker: String,
    config: ModelConfig,
    estimator: SupportVectorRegressor,
}

impl SvrIndexRegression {
    /// Create an untrained model for `ticker`
    pub fn new(
        options: SvrOptions,
        input_options: InputOptions,
        ticker: impl Into<String>,
    ) -> Self {
        let estimator = SupportVectorRegressor::new(options.estimator_config());
        Self {
            ticker: ticker.into(),
            config: ModelConfig::svr(options, input_options),
            estimator,
        }
    }

    fn from_parts(config: ModelConfig, ticker: &str, estimator: SupportVectorRegressor) -> Self {
        Self {
            ticker: ticker.to_string(),
            config,
            estimator,
        }
    }

    /// The wrapped estimator
    pub fn estimator(&self) -> &SupportVectorRegressor {
        &self.estimator
    }
}

impl IndexModel for SvrIndexRegression {
    fn kind(&self) -> ModelKind {
        ModelKind::Svr
    }

    fn config(&self) -> &ModelConfig {
        &self.config
    }

    fn ticker(&self) -> &str {
        &self.ticker
    }

    fn train(&mut self, xs: &Array2<f64>, ys: &Array1<f64>) -> Result<()> {
        self.estimator.fit(xs, ys)
    }

    fn predict(&self, xs: &Array2<f64>) -> Result<Array1<f64>> {
        self.estimator.predict(xs)
    }

    fn save(&self, registry: &mut ModelRegistry) -> Result<ModelRecord> {
        registry.register(&self.ticker, &self.config, &self.estimator)
    }
}

/// Either index regression model, for heterogeneous collections
#[derive(Debug, Clone)]
pub enum IndexRegressor {
    Linear(LinearIndexRegression),
    Svr(SvrIndexRegression),
}

impl IndexModel for IndexRegressor {
    fn kind(&self) -> ModelKind {
        match self {
            IndexRegressor::Linear(m) => m.kind(),
            IndexRegressor::Svr(m) => m.kind(),
        }
    }

    fn config(&self) -> &ModelConfig {
        match self {
            IndexRegressor::Linear(m) => m.config(),
            IndexRegressor::Svr(m) => m.config(),
        }
    }

    fn ticker(&self) -> &str {
        match self {
            IndexRegressor::Linear(m) => m.ticker(),
            IndexRegressor::Svr(m) => m.ticker(),
        }
    }

    fn train(&mut self, xs: &Array2<f64>, ys: &Array1<f64>) -> Result<()> {
        match self {
            IndexRegressor::Linear(m) => m.train(xs, ys),
            IndexRegressor::Svr(m) => m.train(xs, ys),
        }
    }

    fn predict(&self, xs: &Array2<f64>) -> Result<Array1<f64>> {
        match self {
            IndexRegressor::Linear(m) => m.predict(xs),
            IndexRegressor::Svr(m) => m.predict(xs),
        }
    }

    fn save(&self, registry: &mut ModelRegistry) -> Result<ModelRecord> {
        match self {
            IndexRegressor::Linear(m) => m.save(registry),
            IndexRegressor::Svr(m) => m.save(registry),
        }
    }
}

/// Build an untrained model from a configuration
pub fn from_config(config: &ModelConfig, ticker: &str) -> Result<IndexRegressor> {
    match (&config.model, &config.model_options) {
        (ModelKind::Linear, ModelOptions::Linear(_)) => {
            Ok(IndexRegressor::Linear(LinearIndexRegression::from_parts(
                config.clone(),
                ticker,
                LinearRegression::new(),
            )))
        }
        (ModelKind::Svr, ModelOptions::Svr(options)) => {
            Ok(IndexRegressor::Svr(SvrIndexRegression::from_parts(
                config.clone(),
                ticker,
                SupportVectorRegressor::new(options.estimator_config()),
            )))
        }
        _ => Err(RegressionError::InvalidInput(format!(
            "model kind {} does not match its options",
            config.model
        ))),
    }
}

/// Reconstruct one model per configuration hash known for `ticker`, each
/// with its estimator deserialized from the latest saved artifact.
///
/// Returns `None` for a ticker with no saved models.
pub fn load_all(registry: &ModelRegistry, ticker: &str) -> Result<Option<Vec<IndexRegressor>>> {
    let Some(hashes) = registry.hashes(ticker) else {
        return Ok(None);
    };

    let mut models = Vec::with_capacity(hashes.len());
    for hash in hashes {
        let Some(config) = registry.config_for(&hash) else {
            warn!(ticker, hash = %hash, "records without a stored configuration, skipping");
            continue;
        };
        let Some(record) = registry.latest_record(ticker, &hash) else {
            continue;
        };

        let model = match (&config.model, &config.model_options) {
            (ModelKind::Linear, ModelOptions::Linear(_)) => {
                let estimator: LinearRegression = registry.load_artifact(record)?;
                IndexRegressor::Linear(LinearIndexRegression::from_parts(
                    config.clone(),
                    ticker,
                    estimator,
                ))
            }
            (ModelKind::Svr, ModelOptions::Svr(_)) => {
                let estimator: SupportVectorRegressor = registry.load_artifact(record)?;
                IndexRegressor::Svr(SvrIndexRegression::from_parts(
                    config.clone(),
                    ticker,
                    estimator,
                ))
            }
            _ => {
                return Err(RegressionError::InvalidInput(format!(
                    "configuration {} does not match its model kind",
                    hash
                )))
            }
        };

        models.push(model);
    }

    Ok(Some(models))
}
