//! Model configuration and identity
//!
//! A [`ModelConfig`] fully describes one trainable model: the model kind, its
//! hyperparameters, and the input options used to build training data. It is
//! immutable once a model is constructed; the registry hashes its canonical
//! JSON form to deduplicate training runs.

use serde::{Deserialize, Serialize};

use crate::estimators::{KernelType, SvrConfig};

/// Kind of index regression model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    #[serde(rename = "linear_index_regression")]
    Linear,
    #[serde(rename = "svr_index_regression")]
    Svr,
}

impl ModelKind {
    /// Stable string name, used in records and artifact metadata
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Linear => "linear_index_regression",
            ModelKind::Svr => "svr_index_regression",
        }
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hyperparameters for the linear model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinearOptions {
    /// Number of trailing days used as the training window
    pub n: usize,
    /// Train on raw prices (true) or daily relative changes (false)
    pub use_stock_price: bool,
}

/// Hyperparameters for the support-vector model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SvrOptions {
    /// Number of trailing days used as the training window
    pub n: usize,
    /// Train on raw prices (true) or daily relative changes (false)
    pub use_stock_price: bool,
    /// Kernel function (degree/gamma/coef0 carried by the variant)
    pub kernel: KernelType,
    /// Regularization parameter (C)
    pub c: f64,
    /// Epsilon tube width
    pub epsilon: f64,
    /// Tolerance for stopping criterion
    pub tol: f64,
    /// Maximum number of iterations
    pub max_iter: usize,
}

impl SvrOptions {
    /// Estimator configuration corresponding to these options
    pub fn estimator_config(&self) -> SvrConfig {
        SvrConfig {
            c: self.c,
            kernel: self.kernel.clone(),
            tol: self.tol,
            max_iter: self.max_iter,
            epsilon: self.epsilon,
        }
    }
}

impl Default for SvrOptions {
    fn default() -> Self {
        let est = SvrConfig::default();
        Self {
            n: 10,
            use_stock_price: true,
            kernel: est.kernel,
            c: est.c,
            epsilon: est.epsilon,
            tol: est.tol,
            max_iter: est.max_iter,
        }
    }
}

/// Model-kind-specific options.
///
/// Untagged: the SVR variant is listed first so its richer field set is
/// matched before the linear one; `LinearOptions` denies unknown fields so an
/// SVR document can never deserialize as linear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModelOptions {
    Svr(SvrOptions),
    Linear(LinearOptions),
}

impl ModelOptions {
    /// Training window length
    pub fn n(&self) -> usize {
        match self {
            ModelOptions::Svr(o) => o.n,
            ModelOptions::Linear(o) => o.n,
        }
    }

    /// Whether the model consumes raw prices rather than daily changes
    pub fn use_stock_price(&self) -> bool {
        match self {
            ModelOptions::Svr(o) => o.use_stock_price,
            ModelOptions::Linear(o) => o.use_stock_price,
        }
    }

    /// Model kind these options belong to
    pub fn kind(&self) -> ModelKind {
        match self {
            ModelOptions::Svr(_) => ModelKind::Svr,
            ModelOptions::Linear(_) => ModelKind::Linear,
        }
    }
}

/// Options describing the input data a model consumes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputOptions {
    /// CSV column holding the price series
    pub column: String,
    /// Number of days to predict ahead
    pub predict_n: usize,
}

impl Default for InputOptions {
    fn default() -> Self {
        Self {
            column: "close".to_string(),
            predict_n: 1,
        }
    }
}

/// Full configuration of one model; hashed by the registry for deduplication
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub model: ModelKind,
    #[serde(rename = "modelOptions")]
    pub model_options: ModelOptions,
    #[serde(rename = "inputOptions")]
    pub input_options: InputOptions,
}

impl ModelConfig {
    /// Configuration for a linear index regression
    pub fn linear(options: LinearOptions, input_options: InputOptions) -> Self {
        Self {
            model: ModelKind::Linear,
            model_options: ModelOptions::Linear(options),
            input_options,
        }
    }

    /// Configuration for a support-vector index regression
    pub fn svr(options: SvrOptions, input_options: InputOptions) -> Self {
        Self {
            model: ModelKind::Svr,
            model_options: ModelOptions::Svr(options),
            input_options,
        }
    }

    /// Human-readable model name
    pub fn display_name(&self) -> String {
        let data = if self.model_options.use_stock_price() {
            "price"
        } else {
            "change"
        };

        match &self.model_options {
            ModelOptions::Linear(o) => format!("Linear Regression ({} days {})", o.n, data),
            ModelOptions::Svr(o) => format!(
                "SVM Regression, Kernel = {} ({} days {})",
                o.kernel.name(),
                o.n,
                data
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_config() -> ModelConfig {
        ModelConfig::linear(
            LinearOptions { n: 10, use_stock_price: true },
            InputOptions::default(),
        )
    }

    fn svr_config() -> ModelConfig {
        ModelConfig::svr(
            SvrOptions {
                n: 10,
                use_stock_price: false,
                kernel: KernelType::Rbf { gamma: 0.1 },
                ..Default::default()
            },
            InputOptions::default(),
        )
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(ModelKind::Linear.as_str(), "linear_index_regression");
        assert_eq!(ModelKind::Svr.as_str(), "svr_index_regression");
    }

    #[test]
    fn test_config_json_round_trip() {
        for config in [linear_config(), svr_config()] {
            let json = serde_json::to_string(&config).unwrap();
            let back: ModelConfig = serde_json::from_str(&json).unwrap();
            assert_eq!(back, config);
        }
    }

    #[test]
    fn test_untagged_options_disambiguate() {
        let json = serde_json::to_string(&svr_config()).unwrap();
        let back: ModelConfig = serde_json::from_str(&json).unwrap();
        assert!(matches!(back.model_options, ModelOptions::Svr(_)));

        let json = serde_json::to_string(&linear_config()).unwrap();
        let back: ModelConfig = serde_json::from_str(&json).unwrap();
        assert!(matches!(back.model_options, ModelOptions::Linear(_)));
    }

    #[test]
    fn test_display_names() {
        assert_eq!(
            linear_config().display_name(),
            "Linear Regression (10 days price)"
        );
        assert_eq!(
            svr_config().display_name(),
            "SVM Regression, Kernel = rbf (10 days change)"
        );
    }
}
