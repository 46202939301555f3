//! Regression result structures.

use super::na_action::NaInfo;
use faer::{Col, Mat};

/// Complete result from an ordinary least squares fit.
///
/// Holds the coefficients, the sums of squares decomposition, fit statistics,
/// and coefficient inference. Intercept statistics are kept apart from the
/// slope statistics; the covariance matrix covers both, intercept first.
#[derive(Debug, Clone)]
pub struct RegressionResult {
    // ========== Core Results ==========
    /// Estimated coefficients (excluding intercept).
    pub coefficients: Col<f64>,

    /// Intercept term (if model was fit with intercept).
    pub intercept: Option<f64>,

    /// Residuals (y - fitted_values).
    pub residuals: Col<f64>,

    /// Fitted values (predictions on training data).
    pub fitted_values: Col<f64>,

    /// Number of parameters (including intercept if present).
    pub n_parameters: usize,

    /// Number of observations.
    pub n_observations: usize,

    // ========== Sums of Squares ==========
    /// Error (residual) sum of squares.
    pub sse: f64,

    /// Regression sum of squares, `sst - sse`.
    pub ssr: f64,

    /// Total sum of squares around the response mean.
    pub sst: f64,

    // ========== Fit Statistics ==========
    /// Coefficient of determination (R²).
    pub r_squared: f64,

    /// Adjusted R².
    pub adj_r_squared: f64,

    /// Mean squared error, `sse / (n - p)`.
    pub mse: f64,

    /// Root mean squared error.
    pub rmse: f64,

    /// F-statistic for overall model significance.
    pub f_statistic: f64,

    /// P-value for F-statistic.
    pub f_pvalue: f64,

    // ========== Information Criteria ==========
    /// Gaussian log-likelihood at the fitted variance estimate.
    pub log_likelihood: f64,

    /// Akaike Information Criterion.
    pub aic: f64,

    /// Bayesian Information Criterion.
    pub bic: f64,

    // ========== Inference Statistics ==========
    /// Standard errors of coefficients.
    pub std_errors: Col<f64>,

    /// t-statistics for coefficients.
    pub t_statistics: Col<f64>,

    /// P-values for coefficient significance tests.
    pub p_values: Col<f64>,

    /// Lower bounds of confidence intervals.
    pub conf_interval_lower: Col<f64>,

    /// Upper bounds of confidence intervals.
    pub conf_interval_upper: Col<f64>,

    /// Standard error of intercept.
    pub intercept_std_error: Option<f64>,

    /// t-statistic for intercept.
    pub intercept_t_statistic: Option<f64>,

    /// P-value for intercept.
    pub intercept_p_value: Option<f64>,

    /// Intercept confidence interval (lower, upper).
    pub intercept_conf_interval: Option<(f64, f64)>,

    /// Confidence level used for intervals.
    pub confidence_level: f64,

    /// Estimated covariance of the parameters, `σ̂² (X'X)⁻¹`.
    ///
    /// Rows and columns follow `[Intercept | X]` when an intercept was fit.
    pub covariance: Mat<f64>,

    // ========== NA Handling Information ==========
    /// Information about NA handling (if NA values were present).
    ///
    /// Used by `NaAction::Exclude` to expand residuals/fitted values
    /// back to original length.
    pub na_info: Option<NaInfo>,
}

impl RegressionResult {
    /// Create a new empty result (used internally by solvers).
    pub(crate) fn empty(n_features: usize, n_observations: usize) -> Self {
        Self {
            coefficients: Col::zeros(n_features),
            intercept: None,
            residuals: Col::zeros(n_observations),
            fitted_values: Col::zeros(n_observations),
            n_parameters: 0,
            n_observations,
            sse: 0.0,
            ssr: 0.0,
            sst: 0.0,
            r_squared: 0.0,
            adj_r_squared: 0.0,
            mse: 0.0,
            rmse: 0.0,
            f_statistic: f64::NAN,
            f_pvalue: f64::NAN,
            log_likelihood: f64::NAN,
            aic: f64::NAN,
            bic: f64::NAN,
            std_errors: Col::zeros(n_features),
            t_statistics: Col::zeros(n_features),
            p_values: Col::zeros(n_features),
            conf_interval_lower: Col::zeros(n_features),
            conf_interval_upper: Col::zeros(n_features),
            intercept_std_error: None,
            intercept_t_statistic: None,
            intercept_p_value: None,
            intercept_conf_interval: None,
            confidence_level: 0.95,
            covariance: Mat::zeros(0, 0),
            na_info: None,
        }
    }

    /// Residual degrees of freedom (n - p).
    pub fn residual_df(&self) -> usize {
        self.n_observations.saturating_sub(self.n_parameters)
    }

    /// Model degrees of freedom (p - 1 if intercept, else p).
    pub fn model_df(&self) -> usize {
        if self.intercept.is_some() {
            self.n_parameters.saturating_sub(1)
        } else {
            self.n_parameters
        }
    }

    /// Number of slope coefficients (excluding intercept).
    pub fn n_features(&self) -> usize {
        self.coefficients.nrows()
    }

    // ========== NA-Aware Methods ==========

    /// Get residuals expanded to original length (for `NaAction::Exclude`).
    ///
    /// With rows 2 and 3 removed, `[r0, r1, r4]` expands to
    /// `[r0, r1, NaN, NaN, r4]`. Otherwise the residuals are returned unchanged.
    pub fn residuals_expanded(&self) -> Col<f64> {
        match &self.na_info {
            Some(info) if info.needs_expansion() => info.expand(&self.residuals),
            _ => self.residuals.clone(),
        }
    }

    /// Get fitted values expanded to original length (for `NaAction::Exclude`).
    pub fn fitted_expanded(&self) -> Col<f64> {
        match &self.na_info {
            Some(info) if info.needs_expansion() => info.expand(&self.fitted_values),
            _ => self.fitted_values.clone(),
        }
    }

    /// Check if NA values were removed during fitting.
    pub fn had_na_removed(&self) -> bool {
        self.na_info.as_ref().is_some_and(|info| info.has_removed())
    }

    /// Get the number of rows that were removed due to NA values.
    pub fn n_na_removed(&self) -> usize {
        self.na_info.as_ref().map_or(0, |info| info.n_removed)
    }
}
