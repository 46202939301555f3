use crate::core::{DataError, NaError, OptionsError};
use crate::design::DesignError;
use crate::solvers::RegressionError;
use thiserror::Error;

/// Errors raised by model fitting, prediction and comparison.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error(transparent)]
    Design(#[from] DesignError),

    #[error(transparent)]
    Regression(#[from] RegressionError),

    #[error(transparent)]
    Options(#[from] OptionsError),

    #[error(transparent)]
    Na(#[from] NaError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error("response must evaluate to a single column, got {columns}; wrap it in identity() to sum the columns")]
    MultiColumnResponse { columns: usize },

    #[error("request either confidence or prediction bands, not both")]
    ConflictingBands,

    #[error("models are not nested: neither term set contains the other")]
    NotNested,

    #[error("models have different responses: '{full}' and '{reduced}'")]
    ResponseMismatch { full: String, reduced: String },

    #[error("models were fit on different numbers of observations: {full} and {reduced}")]
    ObservationMismatch { full: usize, reduced: usize },

    #[error("term '{term}' evaluates to {columns} columns; a single column is required")]
    MultiColumnTerm { term: String, columns: usize },
}
