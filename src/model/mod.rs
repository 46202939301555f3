//! Linear models specified by term expressions.
//!
//! A [`LinearModel`] pairs an explanatory and a response expression. Fitting
//! returns a [`FittedLinearModel`] that owns every fitted artifact: resolved
//! levels, the design matrix, coefficients and their covariance.

mod error;
mod linear;
mod tables;

pub use error::ModelError;
pub use linear::{FittedLinearModel, LinearModel, INTERCEPT};
pub use tables::{
    percentile_label, BandRequest, CoefficientRow, CoefficientTable, IntervalRow, IntervalTable, Level,
    PredictionBounds, PredictionTable,
};
