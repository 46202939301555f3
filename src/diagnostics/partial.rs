//! Partial regression (added-variable) data.

use crate::design::{evaluate, DesignError, EncodingCache, EvalMode};
use crate::model::{FittedLinearModel, ModelError};
use crate::solvers::{FittedRegressor, OlsRegressor, Regressor};
use crate::terms::Expr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Residuals of the response and of one term, each regressed on every other term.
///
/// The least squares slope through the origin of `y_residuals` on
/// `x_residuals` equals the term's coefficient in the full model.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PartialRegression {
    pub term: String,
    pub x_residuals: Vec<f64>,
    pub y_residuals: Vec<f64>,
    pub slope: f64,
}

/// Added-variable data for `term`, which must be one of the model's terms
/// and encode to a single column.
pub fn partial_regression(fitted: &FittedLinearModel, term: &Expr) -> Result<PartialRegression, ModelError> {
    let terms = fitted.explanatory().terms();
    let interpreted = term.interpret(fitted.training_data())?;
    let Some(position) = terms.iter().position(|t| *t == interpreted) else {
        return Err(DesignError::UnsupportedTerm(term.to_string()).into());
    };

    let mut cache = EncodingCache::default();
    let column = evaluate(&interpreted, fitted.training_data(), &mut EvalMode::Fit(&mut cache))?;
    if column.ncols() != 1 {
        return Err(ModelError::MultiColumnTerm {
            term: interpreted.to_string(),
            columns: column.ncols(),
        });
    }

    let remaining: Vec<Expr> = terms
        .into_iter()
        .enumerate()
        .filter(|&(i, _)| i != position)
        .map(|(_, t)| t)
        .collect();
    let reduced = fitted.refit(Expr::from_terms(remaining))?;

    let x_fit = OlsRegressor::new(reduced.ols().options().clone())
        .fit(&reduced.design().values, &column.column(0))?;

    let x_residuals: Vec<f64> = x_fit.result().residuals.iter().copied().collect();
    let y_residuals: Vec<f64> = reduced.result().residuals.iter().copied().collect();

    let sxy: f64 = x_residuals.iter().zip(&y_residuals).map(|(x, y)| x * y).sum();
    let sxx: f64 = x_residuals.iter().map(|x| x * x).sum();
    let slope = if sxx > 0.0 { sxy / sxx } else { f64::NAN };

    Ok(PartialRegression {
        term: interpreted.to_string(),
        x_residuals,
        y_residuals,
        slope,
    })
}
