//! Regression solvers for numeric design matrices.

mod ols;
mod traits;

pub use ols::{gaussian_log_likelihood, FittedOls, OlsRegressor, OlsRegressorBuilder};
pub use traits::{FittedRegressor, RegressionError, Regressor};
