//! Statistical estimators backing the index regression wrappers
//!
//! The wrappers in [`crate::model`] delegate fitting and prediction to these
//! types and treat them as opaque; anything they return as an error
//! propagates to the caller unchanged.

pub mod linear;
pub mod svr;

pub use linear::LinearRegression;
pub use svr::{KernelType, SupportVectorRegressor, SvrConfig};
