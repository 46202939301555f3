//! Ordinary Least Squares regression solver.

use crate::core::{
    BandMethod, IntervalType, NaInfo, PredictionResult, RegressionOptions, RegressionOptionsBuilder,
    RegressionResult,
};
use crate::inference::{compute_prediction_intervals, CoefficientInference};
use crate::solvers::traits::{FittedRegressor, RegressionError, Regressor};
use crate::utils::{augmented_inverse, center_columns, center_vector, gram, solve_normal_equations, xt_y};
use faer::{Col, Mat};
use statrs::distribution::{ContinuousCDF, FisherSnedecor};

/// Ordinary Least Squares regression estimator.
///
/// Solves the normal equations exactly. With an intercept the columns of X and
/// the response are centered first and the intercept is recovered from the
/// means. A singular `X'X` is an error; no column is silently dropped.
///
/// # Example
///
/// ```
/// use linmod::solvers::{FittedRegressor, OlsRegressor, Regressor};
/// use faer::{Col, Mat};
///
/// let x = Mat::from_fn(5, 1, |i, _| i as f64);
/// let y = Col::from_fn(5, |i| 2.0 + 3.0 * i as f64);
///
/// let fitted = OlsRegressor::builder()
///     .with_intercept(true)
///     .build()
///     .fit(&x, &y)
///     .unwrap();
///
/// assert!((fitted.coefficients()[0] - 3.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct OlsRegressor {
    options: RegressionOptions,
}

impl OlsRegressor {
    /// Create a new OLS regressor with the given options.
    pub fn new(options: RegressionOptions) -> Self {
        Self { options }
    }

    /// Create a builder for configuring the regressor.
    pub fn builder() -> OlsRegressorBuilder {
        OlsRegressorBuilder::default()
    }
}

impl Regressor for OlsRegressor {
    type Fitted = FittedOls;

    fn fit(&self, x: &Mat<f64>, y: &Col<f64>) -> Result<Self::Fitted, RegressionError> {
        self.options.validate()?;

        let n_samples = x.nrows();
        let n_features = x.ncols();

        if x.nrows() != y.nrows() {
            return Err(RegressionError::DimensionMismatch {
                x_rows: x.nrows(),
                y_len: y.nrows(),
            });
        }

        let with_intercept = self.options.with_intercept;
        let n_params = n_features + usize::from(with_intercept);

        // At least one residual degree of freedom is needed for σ̂²
        if n_samples <= n_params || n_samples == 0 {
            return Err(RegressionError::InsufficientObservations {
                needed: n_params + 1,
                got: n_samples,
            });
        }

        let (coefficients, intercept, xtx_inverse) = if with_intercept {
            let (x_centered, x_means) = center_columns(x);
            let (y_centered, y_mean) = center_vector(y);

            let (coefficients, centered_inverse) = solve_normal_equations(
                &gram(&x_centered),
                &xt_y(&x_centered, &y_centered),
                self.options.singular_tolerance,
            )?;

            // intercept = mean(y) - mean(X)' * coefficients
            let intercept =
                y_mean - (0..n_features).map(|j| x_means[j] * coefficients[j]).sum::<f64>();

            let xtx_inverse = augmented_inverse(&centered_inverse, &x_means, n_samples);
            (coefficients, Some(intercept), xtx_inverse)
        } else {
            let (coefficients, xtx_inverse) =
                solve_normal_equations(&gram(x), &xt_y(x, y), self.options.singular_tolerance)?;
            (coefficients, None, xtx_inverse)
        };

        // Fitted values and residuals come from the uncentered data
        let fitted_values = Col::from_fn(n_samples, |i| {
            intercept.unwrap_or(0.0)
                + (0..n_features).map(|j| x[(i, j)] * coefficients[j]).sum::<f64>()
        });
        let residuals = Col::from_fn(n_samples, |i| y[i] - fitted_values[i]);

        let result = self.compute_statistics(
            y,
            coefficients,
            intercept,
            residuals,
            fitted_values,
            &xtx_inverse,
        );

        Ok(FittedOls {
            options: self.options.clone(),
            result,
            xtx_inverse,
        })
    }
}

impl OlsRegressor {
    /// Compute fit statistics and coefficient inference.
    fn compute_statistics(
        &self,
        y: &Col<f64>,
        coefficients: Col<f64>,
        intercept: Option<f64>,
        residuals: Col<f64>,
        fitted_values: Col<f64>,
        xtx_inverse: &Mat<f64>,
    ) -> RegressionResult {
        let n = y.nrows();
        let n_features = coefficients.nrows();
        let n_params = xtx_inverse.nrows();

        let y_mean: f64 = y.iter().sum::<f64>() / n as f64;
        let sst: f64 = y.iter().map(|&yi| (yi - y_mean).powi(2)).sum();
        let sse: f64 = residuals.iter().map(|&r| r.powi(2)).sum();
        let ssr = sst - sse;

        let r_squared = if sst > 0.0 {
            1.0 - sse / sst
        } else if sse < 1e-10 {
            1.0
        } else {
            0.0
        };

        let df_total = (n - 1) as f64;
        let df_resid = (n - n_params) as f64;
        let adj_r_squared = if df_total > 0.0 {
            1.0 - (1.0 - r_squared) * df_total / df_resid
        } else {
            f64::NAN
        };

        let mse = sse / df_resid;
        let rmse = mse.sqrt();

        // Overall F-test of the slopes
        let df_model = (n_params - usize::from(intercept.is_some())) as f64;
        let f_statistic = if df_model <= 0.0 {
            f64::NAN
        } else if mse > 0.0 {
            (ssr / df_model) / mse
        } else if ssr > 0.0 {
            f64::INFINITY
        } else {
            f64::NAN
        };
        let f_pvalue = if f_statistic.is_infinite() {
            0.0
        } else if f_statistic.is_finite() {
            FisherSnedecor::new(df_model, df_resid)
                .map_or(f64::NAN, |d| 1.0 - d.cdf(f_statistic))
        } else {
            f64::NAN
        };

        let log_likelihood = gaussian_log_likelihood(sse, n, mse);
        let k = n_params as f64;
        let aic = 2.0 * k - 2.0 * log_likelihood;
        let bic = k * (n as f64).ln() - 2.0 * log_likelihood;

        let mut result = RegressionResult::empty(n_features, n);
        result.intercept = intercept;
        result.residuals = residuals;
        result.fitted_values = fitted_values;
        result.n_parameters = n_params;
        result.sse = sse;
        result.ssr = ssr;
        result.sst = sst;
        result.r_squared = r_squared;
        result.adj_r_squared = adj_r_squared;
        result.mse = mse;
        result.rmse = rmse;
        result.f_statistic = f_statistic;
        result.f_pvalue = f_pvalue;
        result.log_likelihood = log_likelihood;
        result.aic = aic;
        result.bic = bic;
        result.confidence_level = self.options.confidence_level;
        result.covariance = Mat::from_fn(n_params, n_params, |i, j| mse * xtx_inverse[(i, j)]);

        self.compute_inference(coefficients, &mut result);
        result
    }

    /// Compute inference statistics (standard errors, t-stats, p-values, CIs).
    fn compute_inference(&self, coefficients: Col<f64>, result: &mut RegressionResult) {
        let df = result.residual_df() as f64;
        let level = self.options.confidence_level;
        let offset = usize::from(result.intercept.is_some());

        let se = CoefficientInference::standard_errors(&result.covariance, offset);
        let t_stats = CoefficientInference::t_statistics(&coefficients, &se);
        let p_vals = CoefficientInference::p_values(&t_stats, df);
        let (ci_lower, ci_upper) =
            CoefficientInference::confidence_intervals(&coefficients, &se, df, level);

        result.coefficients = coefficients;
        result.std_errors = se;
        result.t_statistics = t_stats;
        result.p_values = p_vals;
        result.conf_interval_lower = ci_lower;
        result.conf_interval_upper = ci_upper;

        if let Some(intercept) = result.intercept {
            let se_int = CoefficientInference::standard_error(result.covariance[(0, 0)]);
            let t_int = CoefficientInference::t_statistic(intercept, se_int);
            let t_crit = CoefficientInference::t_critical(df, level);

            result.intercept_std_error = Some(se_int);
            result.intercept_t_statistic = Some(t_int);
            result.intercept_p_value = Some(CoefficientInference::p_value(t_int, df));
            result.intercept_conf_interval =
                Some((intercept - t_crit * se_int, intercept + t_crit * se_int));
        }
    }
}

/// Gaussian log-likelihood `-n/2 · ln(2πσ²) - SSE / (2σ²)`.
///
/// NaN when the variance estimate is not positive.
pub fn gaussian_log_likelihood(sse: f64, n: usize, sigma2: f64) -> f64 {
    if sigma2 > 0.0 {
        -0.5 * n as f64 * (2.0 * std::f64::consts::PI * sigma2).ln() - sse / (2.0 * sigma2)
    } else {
        f64::NAN
    }
}

/// A fitted OLS regression model.
#[derive(Debug, Clone)]
pub struct FittedOls {
    options: RegressionOptions,
    result: RegressionResult,
    /// (X'X)⁻¹ or (X_aug'X_aug)⁻¹, unscaled by σ̂²
    xtx_inverse: Mat<f64>,
}

impl FittedOls {
    /// Get the options used to fit this model.
    pub fn options(&self) -> &RegressionOptions {
        &self.options
    }

    /// Unscaled inverse Gram matrix, intercept first when present.
    pub fn xtx_inverse(&self) -> &Mat<f64> {
        &self.xtx_inverse
    }

    /// Attach the missing value handling applied before fitting.
    pub(crate) fn with_na_info(mut self, info: NaInfo) -> Self {
        self.result.na_info = Some(info);
        self
    }

    /// Leverage `h = x₀'(X'X)⁻¹x₀` of each row of `x`.
    pub fn leverage(&self, x: &Mat<f64>) -> Col<f64> {
        let offset = usize::from(self.result.intercept.is_some());
        Col::from_fn(x.nrows(), |i| {
            let x0 = Col::from_fn(x.ncols() + offset, |j| {
                if j < offset {
                    1.0
                } else {
                    x[(i, j - offset)]
                }
            });
            crate::utils::quadratic_form(&x0, &self.xtx_inverse)
        })
    }
}

impl FittedRegressor for FittedOls {
    fn predict(&self, x: &Mat<f64>) -> Col<f64> {
        let intercept = self.result.intercept.unwrap_or(0.0);
        let coefficients = &self.result.coefficients;

        Col::from_fn(x.nrows(), |i| {
            intercept + (0..x.ncols()).map(|j| x[(i, j)] * coefficients[j]).sum::<f64>()
        })
    }

    fn result(&self) -> &RegressionResult {
        &self.result
    }

    fn predict_with_band(
        &self,
        x: &Mat<f64>,
        interval: IntervalType,
        level: f64,
        method: BandMethod,
    ) -> PredictionResult {
        let predictions = self.predict(x);
        compute_prediction_intervals(
            x,
            &self.xtx_inverse,
            &predictions,
            self.result.mse,
            self.result.residual_df() as f64,
            level,
            interval,
            method,
            self.result.intercept.is_some(),
        )
    }
}

/// Builder for `OlsRegressor`.
#[derive(Debug, Clone, Default)]
pub struct OlsRegressorBuilder {
    builder: RegressionOptionsBuilder,
}

impl OlsRegressorBuilder {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to include an intercept term.
    pub fn with_intercept(mut self, include: bool) -> Self {
        self.builder = self.builder.with_intercept(include);
        self
    }

    /// Set the confidence level for confidence intervals.
    pub fn confidence_level(mut self, level: f64) -> Self {
        self.builder = self.builder.confidence_level(level);
        self
    }

    /// Set the relative tolerance for singularity detection.
    pub fn singular_tolerance(mut self, tol: f64) -> Self {
        self.builder = self.builder.singular_tolerance(tol);
        self
    }

    /// Build the OLS regressor; options are validated when fitting.
    pub fn build(self) -> OlsRegressor {
        OlsRegressor::new(self.builder.build_unchecked())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_fit() {
        let x = Mat::from_fn(5, 1, |i, _| i as f64);
        let y = Col::from_fn(5, |i| 2.0 + 3.0 * i as f64);

        let model = OlsRegressor::builder().with_intercept(true).build();
        let fitted = model.fit(&x, &y).expect("model should fit");

        assert!((fitted.coefficients()[0] - 3.0).abs() < 1e-10);
        assert!((fitted.intercept().expect("intercept exists") - 2.0).abs() < 1e-10);
        assert!((fitted.r_squared() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_predict() {
        let x = Mat::from_fn(5, 1, |i, _| i as f64);
        let y = Col::from_fn(5, |i| 2.0 + 3.0 * i as f64);

        let model = OlsRegressor::builder().with_intercept(true).build();
        let fitted = model.fit(&x, &y).expect("model should fit");

        let x_new = Mat::from_fn(2, 1, |i, _| (i + 10) as f64);
        let preds = fitted.predict(&x_new);

        assert!((preds[0] - (2.0 + 3.0 * 10.0)).abs() < 1e-10);
        assert!((preds[1] - (2.0 + 3.0 * 11.0)).abs() < 1e-10);
    }

    #[test]
    fn test_intercept_only() {
        let x = Mat::<f64>::zeros(4, 0);
        let y = Col::from_fn(4, |i| [1.0, 2.0, 4.0, 9.0][i]);

        let fitted = OlsRegressor::builder().build().fit(&x, &y).unwrap();
        let result = fitted.result();

        assert!((result.intercept.unwrap() - 4.0).abs() < 1e-12);
        assert_eq!(result.n_parameters, 1);
        assert_eq!(result.residual_df(), 3);
        assert!((result.sse - result.sst).abs() < 1e-10);
        assert!(result.f_statistic.is_nan());
        // Var(ȳ) = σ̂² / n
        assert!((result.covariance[(0, 0)] - result.mse / 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_singular_design() {
        let x = Mat::from_fn(6, 2, |i, j| (i as f64) * (j + 1) as f64);
        let y = Col::from_fn(6, |i| i as f64);

        let result = OlsRegressor::builder().build().fit(&x, &y);
        assert!(matches!(result, Err(RegressionError::SingularMatrix)));
    }

    #[test]
    fn test_insufficient_observations() {
        let x = Mat::from_fn(2, 1, |i, _| i as f64);
        let y = Col::from_fn(2, |i| i as f64);

        let result = OlsRegressor::builder().build().fit(&x, &y);
        assert!(matches!(
            result,
            Err(RegressionError::InsufficientObservations { needed: 3, got: 2 })
        ));
    }

    #[test]
    fn test_no_intercept_covariance_shape() {
        let x = Mat::from_fn(6, 2, |i, j| ((i + 1) * (j + 2) % 7) as f64);
        let y = Col::from_fn(6, |i| i as f64 * 0.5 + 1.0);

        let fitted = OlsRegressor::builder().with_intercept(false).build().fit(&x, &y).unwrap();
        assert!(fitted.intercept().is_none());
        assert_eq!(fitted.result().covariance.nrows(), 2);
        assert!(fitted.result().intercept_std_error.is_none());
    }
}
