use crate::core::DataError;
use thiserror::Error;

/// Errors raised while interpreting terms or building a design matrix.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DesignError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error("variable '{0}' must be interpreted against data before evaluation")]
    UnresolvedTerm(String),

    #[error("term '{0}' is not supported here")]
    UnsupportedTerm(String),

    #[error("level '{level}' of '{variable}' was not seen when fitting")]
    UnknownLevel { variable: String, level: String },

    #[error("no fitted levels for categorical variable '{0}'")]
    UnfittedFactor(String),
}
