//! Support vector regression
//!
//! Epsilon-insensitive SVR trained by iterative updates over a precomputed
//! kernel matrix.

use crate::error::{RegressionError, Result};
use ndarray::{Array1, Array2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Maximum number of samples for eager kernel matrix computation.
/// Beyond this, training will return an error to prevent OOM.
const MAX_KERNEL_MATRIX_SAMPLES: usize = 10_000;

/// Sample count above which the kernel matrix is computed in parallel
const PARALLEL_KERNEL_THRESHOLD: usize = 100;

/// Kernel function type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KernelType {
    /// Linear kernel: K(x, y) = x · y
    Linear,
    /// Polynomial kernel: K(x, y) = (γ * x · y + r)^d
    Polynomial { degree: usize, gamma: f64, coef0: f64 },
    /// Radial Basis Function (Gaussian): K(x, y) = exp(-γ * ||x - y||²)
    Rbf { gamma: f64 },
    /// Sigmoid kernel: K(x, y) = tanh(γ * x · y + r)
    Sigmoid { gamma: f64, coef0: f64 },
}

impl KernelType {
    /// Short kernel name as used in display strings
    pub fn name(&self) -> &'static str {
        match self {
            KernelType::Linear => "linear",
            KernelType::Polynomial { .. } => "poly",
            KernelType::Rbf { .. } => "rbf",
            KernelType::Sigmoid { .. } => "sigmoid",
        }
    }

    /// Evaluate the kernel between two vectors
    fn eval(&self, x1: &Array1<f64>, x2: &Array1<f64>) -> f64 {
        match self {
            KernelType::Linear => x1.dot(x2),
            KernelType::Polynomial { degree, gamma, coef0 } => {
                (*gamma * x1.dot(x2) + coef0).powi((*degree).min(i32::MAX as usize) as i32)
            }
            KernelType::Rbf { gamma } => {
                let diff = x1 - x2;
                (-gamma * diff.dot(&diff)).exp()
            }
            KernelType::Sigmoid { gamma, coef0 } => (*gamma * x1.dot(x2) + coef0).tanh(),
        }
    }
}

impl Default for KernelType {
    fn default() -> Self {
        KernelType::Rbf { gamma: 1.0 }
    }
}

/// SVR configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SvrConfig {
    /// Regularization parameter (C)
    pub c: f64,
    /// Kernel function
    pub kernel: KernelType,
    /// Tolerance for stopping criterion
    pub tol: f64,
    /// Maximum number of iterations
    pub max_iter: usize,
    /// Epsilon tube width
    pub epsilon: f64,
}

impl Default for SvrConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            kernel: KernelType::default(),
            tol: 1e-3,
            max_iter: 1000,
            epsilon: 0.1,
        }
    }
}

/// Support vector regressor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportVectorRegressor {
    config: SvrConfig,
    support_vectors: Option<Array2<f64>>,
    /// Combined coefficients (alpha - alpha*)
    alphas: Option<Array1<f64>>,
    bias: f64,
    is_fitted: bool,
}

impl SupportVectorRegressor {
    /// Create a new regressor
    pub fn new(config: SvrConfig) -> Self {
        Self {
            config,
            support_vectors: None,
            alphas: None,
            bias: 0.0,
            is_fitted: false,
        }
    }

    /// Configuration this regressor was built with
    pub fn config(&self) -> &SvrConfig {
        &self.config
    }

    /// Fit the regressor on epsilon-insensitive loss
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n = x.nrows();

        if n != y.len() {
            return Err(RegressionError::ShapeError {
                expected: format!("y length = {}", n),
                actual: format!("y length = {}", y.len()),
            });
        }

        if n > MAX_KERNEL_MATRIX_SAMPLES {
            return Err(RegressionError::InvalidInput(format!(
                "Dataset has {} samples, exceeding the maximum {} for the SVR kernel matrix. \
                 Consider subsampling.",
                n, MAX_KERNEL_MATRIX_SAMPLES
            )));
        }

        let mut alphas: Array1<f64> = Array1::zeros(n); // alpha
        let mut alphas_star: Array1<f64> = Array1::zeros(n); // alpha*
        let mut bias: f64 = 0.0;

        let kernel_matrix = self.compute_kernel_matrix(x);

        let learning_rate: f64 = 0.01;

        for _iter in 0..self.config.max_iter {
            let mut max_change: f64 = 0.0;

            for i in 0..n {
                let mut pred: f64 = bias;
                for j in 0..n {
                    pred += (alphas[j] - alphas_star[j]) * kernel_matrix[[j, i]];
                }

                let error: f64 = pred - y[i];

                // Update alphas based on epsilon-insensitive loss
                if error > self.config.epsilon {
                    let new_val = (alphas_star[i] + learning_rate).min(self.config.c);
                    max_change = max_change.max((new_val - alphas_star[i]).abs());
                    alphas_star[i] = new_val;
                } else if error < -self.config.epsilon {
                    let new_val = (alphas[i] + learning_rate).min(self.config.c);
                    max_change = max_change.max((new_val - alphas[i]).abs());
                    alphas[i] = new_val;
                }

                let bias_update = learning_rate * 0.1 * error;
                max_change = max_change.max(bias_update.abs());
                bias -= bias_update;
            }

            // Stop once all updates are within tolerance
            if max_change < self.config.tol {
                break;
            }
        }

        let combined_alphas = &alphas - &alphas_star;

        let support_indices: Vec<usize> = combined_alphas
            .iter()
            .enumerate()
            .filter(|(_, a): &(usize, &f64)| a.abs() > 1e-8)
            .map(|(i, _)| i)
            .collect();

        if support_indices.is_empty() {
            // Fallback: keep all points if no support vectors found
            self.support_vectors = Some(x.clone());
            self.alphas = Some(combined_alphas);
        } else {
            let n_features = x.ncols();
            let mut support_vectors = Array2::zeros((support_indices.len(), n_features));
            let mut support_alphas = Array1::zeros(support_indices.len());

            for (i, &idx) in support_indices.iter().enumerate() {
                support_vectors.row_mut(i).assign(&x.row(idx));
                support_alphas[i] = combined_alphas[idx];
            }

            self.support_vectors = Some(support_vectors);
            self.alphas = Some(support_alphas);
        }

        self.bias = bias;
        self.is_fitted = true;

        Ok(())
    }

    /// Compute the kernel matrix (parallelized for large datasets)
    fn compute_kernel_matrix(&self, x: &Array2<f64>) -> Array2<f64> {
        let n = x.nrows();

        // Sequential is faster for small matrices
        if n < PARALLEL_KERNEL_THRESHOLD {
            let mut k = Array2::zeros((n, n));
            for i in 0..n {
                for j in i..n {
                    let val = self
                        .config
                        .kernel
                        .eval(&x.row(i).to_owned(), &x.row(j).to_owned());
                    k[[i, j]] = val;
                    k[[j, i]] = val;
                }
            }
            return k;
        }

        // Parallel: upper-triangle rows computed independently
        let kernel = self.config.kernel.clone();
        let rows_data: Vec<Array1<f64>> = (0..n).map(|i| x.row(i).to_owned()).collect();

        let rows: Vec<Vec<(usize, f64)>> = (0..n)
            .into_par_iter()
            .map(|i| {
                let a = &rows_data[i];
                (i..n).map(|j| (j, kernel.eval(a, &rows_data[j]))).collect()
            })
            .collect();

        let mut k = Array2::zeros((n, n));
        for (i, row_vals) in rows.into_iter().enumerate() {
            for (j, val) in row_vals {
                k[[i, j]] = val;
                k[[j, i]] = val;
            }
        }
        k
    }

    /// Predict target values
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.is_fitted {
            return Err(RegressionError::ModelNotFitted);
        }

        let sv = self.support_vectors.as_ref().unwrap();
        let alphas = self.alphas.as_ref().unwrap();

        let n = x.nrows();
        let mut predictions = Array1::zeros(n);

        for i in 0..n {
            let sample = x.row(i).to_owned();
            let mut sum = self.bias;

            for j in 0..sv.nrows() {
                sum += alphas[j] * self.config.kernel.eval(&sample, &sv.row(j).to_owned());
            }

            predictions[i] = sum;
        }

        Ok(predictions)
    }

    /// Get number of support vectors
    pub fn n_support_vectors(&self) -> usize {
        self.support_vectors.as_ref().map(|sv| sv.nrows()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_svr_linear_series() {
        let x = Array2::from_shape_vec(
            (10, 1),
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0],
        )
        .unwrap();
        let y = Array1::from_vec(vec![
            2.0, 4.0, 6.0, 8.0, 10.0, 12.0, 14.0, 16.0, 18.0, 20.0,
        ]);

        let config = SvrConfig {
            c: 10.0,
            kernel: KernelType::Linear,
            epsilon: 0.5,
            max_iter: 500,
            ..Default::default()
        };

        let mut svr = SupportVectorRegressor::new(config);
        svr.fit(&x, &y).unwrap();

        let predictions = svr.predict(&x).unwrap();
        for (pred, actual) in predictions.iter().zip(y.iter()) {
            let error = (pred - actual).abs() / actual;
            assert!(
                error < 0.5,
                "Error {} too large for pred={}, actual={}",
                error,
                pred,
                actual
            );
        }
    }

    #[test]
    fn test_svr_rbf_fits() {
        let x = Array2::from_shape_vec((6, 1), vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        let y = Array1::from_vec(vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);

        let config = SvrConfig {
            kernel: KernelType::Rbf { gamma: 0.5 },
            c: 10.0,
            ..Default::default()
        };

        let mut svr = SupportVectorRegressor::new(config);
        svr.fit(&x, &y).unwrap();

        assert!(svr.n_support_vectors() > 0);
        assert_eq!(svr.predict(&x).unwrap().len(), 6);
    }

    #[test]
    fn test_predict_before_fit() {
        let svr = SupportVectorRegressor::new(SvrConfig::default());
        let x = Array2::from_shape_vec((1, 1), vec![1.0]).unwrap();
        assert!(matches!(
            svr.predict(&x),
            Err(RegressionError::ModelNotFitted)
        ));
    }

    #[test]
    fn test_kernel_names() {
        assert_eq!(KernelType::Linear.name(), "linear");
        assert_eq!(KernelType::Rbf { gamma: 0.1 }.name(), "rbf");
        assert_eq!(
            KernelType::Polynomial { degree: 3, gamma: 0.1, coef0: 0.0 }.name(),
            "poly"
        );
    }
}
