//! Index regression models for stock-price forecasting
//!
//! Thin model wrappers (linear regression, support-vector regression) over a
//! small estimator layer, paired with a content-addressed registry that
//! deduplicates training runs by hashing model configuration.
//!
//! # Modules
//!
//! - [`estimators`] - OLS and epsilon-SVR estimators
//! - [`model`] - Configuration types and the train/predict/save/error wrappers
//! - [`registry`] - Configuration hashing and the file-backed model ledger
//! - [`metrics`] - Mean squared error and the regression metric bundle
//! - [`data`] - Column-selectable CSV loading of ticker price histories
//! - [`eval`] - Sliding-window average-MSE evaluation harness

pub mod data;
pub mod error;
pub mod estimators;
pub mod eval;
pub mod metrics;
pub mod model;
pub mod registry;

pub use error::{RegressionError, Result};

/// Re-export of commonly used types
pub mod prelude {
    pub use crate::error::{RegressionError, Result};
    pub use crate::estimators::{KernelType, LinearRegression, SupportVectorRegressor, SvrConfig};
    pub use crate::metrics::{mean_squared_error, RegressionMetrics};
    pub use crate::model::{
        from_config, load_all, IndexModel, IndexRegressor, InputOptions, LinearIndexRegression,
        LinearOptions, ModelConfig, ModelKind, ModelOptions, SvrIndexRegression, SvrOptions,
    };
    pub use crate::registry::{config_hash, ModelRecord, ModelRegistry, RegistryIndex};
}
