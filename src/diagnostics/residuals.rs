//! Residual and influence diagnostics of a fitted model.

use crate::model::FittedLinearModel;
use crate::solvers::FittedRegressor;
use faer::Col;

/// Leverage, scaled residuals and Cook's distance for every training row.
#[derive(Debug, Clone)]
pub struct ResidualDiagnostics {
    /// Diagonal of the hat matrix.
    pub leverage: Col<f64>,
    /// `e_i / s`.
    pub standardized: Col<f64>,
    /// `e_i / (s · sqrt(1 - h_ii))`.
    pub studentized: Col<f64>,
    /// Studentized with the leave-one-out variance estimate.
    pub externally_studentized: Col<f64>,
    pub cooks_distance: Col<f64>,
    n_parameters: usize,
}

impl ResidualDiagnostics {
    pub fn new(fitted: &FittedLinearModel) -> Self {
        let ols = fitted.ols();
        let result = ols.result();
        let leverage = ols.leverage(&fitted.design().values);
        let residuals = &result.residuals;
        let mse = result.mse;
        let n_parameters = result.n_parameters;

        Self {
            standardized: standardized_residuals(residuals, mse),
            studentized: studentized_residuals(residuals, &leverage, mse),
            externally_studentized: externally_studentized_residuals(residuals, &leverage, mse, n_parameters),
            cooks_distance: cooks_distance(residuals, &leverage, mse, n_parameters),
            leverage,
            n_parameters,
        }
    }

    /// Rows whose externally studentized residual exceeds `threshold` in magnitude.
    pub fn outliers(&self, threshold: f64) -> Vec<usize> {
        residual_outliers(&self.externally_studentized, threshold)
    }

    /// Rows whose Cook's distance exceeds `threshold`, `4/n` by default.
    pub fn influential(&self, threshold: Option<f64>) -> Vec<usize> {
        influential_cooks(&self.cooks_distance, threshold)
    }

    /// Rows whose leverage exceeds `threshold`, `2p/n` by default.
    pub fn high_leverage(&self, threshold: Option<f64>) -> Vec<usize> {
        high_leverage_points(&self.leverage, self.n_parameters, threshold)
    }
}

/// Residuals divided by the residual standard error.
///
/// With a zero variance estimate, zero residuals stay zero and the rest are NaN.
pub fn standardized_residuals(residuals: &Col<f64>, mse: f64) -> Col<f64> {
    if !(mse > 0.0) || !mse.is_finite() {
        return Col::from_fn(residuals.nrows(), |i| {
            if residuals[i].abs() < 1e-14 {
                0.0
            } else {
                f64::NAN
            }
        });
    }
    let s = mse.sqrt();
    Col::from_fn(residuals.nrows(), |i| residuals[i] / s)
}

/// Internally studentized residuals `e_i / (s · sqrt(1 - h_ii))`.
pub fn studentized_residuals(residuals: &Col<f64>, leverage: &Col<f64>, mse: f64) -> Col<f64> {
    let n = residuals.nrows();
    if !(mse > 0.0) || !mse.is_finite() {
        return Col::from_fn(n, |_| f64::NAN);
    }
    let s = mse.sqrt();
    Col::from_fn(n, |i| residuals[i] / (s * (1.0 - leverage[i]).max(1e-14).sqrt()))
}

/// Externally studentized (deleted) residuals.
///
/// Row `i` is scaled by the variance estimate of the fit without it,
/// `(SSE - e_i² / (1 - h_ii)) / (n - p - 1)`.
pub fn externally_studentized_residuals(
    residuals: &Col<f64>,
    leverage: &Col<f64>,
    mse: f64,
    n_params: usize,
) -> Col<f64> {
    let n = residuals.nrows();
    let df_resid = n.saturating_sub(n_params);
    if df_resid <= 1 || !(mse > 0.0) || !mse.is_finite() {
        return Col::from_fn(n, |_| f64::NAN);
    }

    let sse = mse * df_resid as f64;
    let df_loo = (df_resid - 1) as f64;

    Col::from_fn(n, |i| {
        let one_minus_h = (1.0 - leverage[i]).max(1e-14);
        let e_i = residuals[i];
        let mse_loo = (sse - e_i * e_i / one_minus_h) / df_loo;
        if mse_loo > 0.0 {
            e_i / (mse_loo.sqrt() * one_minus_h.sqrt())
        } else {
            f64::NAN
        }
    })
}

/// Cook's distance `e_i² / (p · MSE) · h_ii / (1 - h_ii)²`.
pub fn cooks_distance(residuals: &Col<f64>, leverage: &Col<f64>, mse: f64, n_params: usize) -> Col<f64> {
    let n = residuals.nrows();
    if !(mse > 0.0) || !mse.is_finite() || n_params == 0 {
        return Col::from_fn(n, |_| f64::NAN);
    }

    Col::from_fn(n, |i| {
        let e_i = residuals[i];
        let h_ii = leverage[i];
        let one_minus_h = (1.0 - h_ii).max(1e-14);
        let d = e_i * e_i / (n_params as f64 * mse) * h_ii / (one_minus_h * one_minus_h);
        if d.is_finite() {
            d.max(0.0)
        } else {
            f64::NAN
        }
    })
}

/// Indices with `|r_i| > threshold`; 2 or 3 are usual choices.
pub fn residual_outliers(studentized: &Col<f64>, threshold: f64) -> Vec<usize> {
    indices_where(studentized, |r| r.abs() > threshold)
}

pub fn influential_cooks(cooks: &Col<f64>, threshold: Option<f64>) -> Vec<usize> {
    let cutoff = threshold.unwrap_or(4.0 / cooks.nrows() as f64);
    indices_where(cooks, |d| d.is_finite() && d > cutoff)
}

pub fn high_leverage_points(leverage: &Col<f64>, n_params: usize, threshold: Option<f64>) -> Vec<usize> {
    let cutoff = threshold.unwrap_or(2.0 * n_params as f64 / leverage.nrows() as f64);
    indices_where(leverage, |h| h > cutoff)
}

fn indices_where(values: &Col<f64>, keep: impl Fn(f64) -> bool) -> Vec<usize> {
    values
        .iter()
        .enumerate()
        .filter(|&(_, &v)| keep(v))
        .map(|(i, _)| i)
        .collect()
}
