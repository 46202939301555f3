//! Prediction interval calculations.

use crate::core::{BandMethod, IntervalType, PredictionResult};
use crate::utils::quadratic_form;
use faer::{Col, Mat};
use statrs::distribution::{ContinuousCDF, FisherSnedecor, StudentsT};

/// Critical value scaling interval half-widths.
///
/// Pointwise bands use `t(1 - α/2; df)`; Working–Hotelling bands use
/// `sqrt(p · F(1 - α; p, df))` with `p` the number of parameters.
pub fn critical_value(method: BandMethod, confidence_level: f64, n_parameters: usize, df: f64) -> f64 {
    let alpha = 1.0 - confidence_level;
    match method {
        BandMethod::Pointwise => StudentsT::new(0.0, 1.0, df)
            .map(|t_dist| t_dist.inverse_cdf(1.0 - alpha / 2.0))
            .unwrap_or(f64::NAN),
        BandMethod::WorkingHotelling => {
            let p = n_parameters as f64;
            FisherSnedecor::new(p, df)
                .map(|f_dist| (p * f_dist.inverse_cdf(1.0 - alpha)).sqrt())
                .unwrap_or(f64::NAN)
        }
    }
}

/// Computes interval half-widths for new data points.
///
/// # Arguments
/// * `x_new` - New data points (n_new × n_features)
/// * `xtx_inv` - (X'X)⁻¹, or (X_aug'X_aug)⁻¹ if has_intercept
/// * `predictions` - Point predictions for x_new
/// * `mse` - Mean squared error from the fitted model
/// * `df` - Residual degrees of freedom
/// * `confidence_level` - Confidence level (e.g., 0.95)
/// * `interval_type` - Confidence or Prediction interval
/// * `method` - Pointwise or simultaneous critical value
/// * `has_intercept` - Whether the model has an intercept (x_new needs augmentation)
#[allow(clippy::too_many_arguments)]
pub fn compute_prediction_intervals(
    x_new: &Mat<f64>,
    xtx_inv: &Mat<f64>,
    predictions: &Col<f64>,
    mse: f64,
    df: f64,
    confidence_level: f64,
    interval_type: IntervalType,
    method: BandMethod,
    has_intercept: bool,
) -> PredictionResult {
    let n_new = x_new.nrows();
    let n_features = x_new.ncols();

    if df <= 0.0 || !mse.is_finite() {
        return PredictionResult::from_half_widths(predictions.clone(), Col::from_fn(n_new, |_| f64::NAN));
    }

    let n_parameters = xtx_inv.nrows();
    let crit = critical_value(method, confidence_level, n_parameters, df);

    let half_width = Col::from_fn(n_new, |i| {
        // x₀, possibly augmented with 1 for the intercept
        let offset = usize::from(has_intercept);
        let x0 = Col::from_fn(n_features + offset, |j| {
            if j < offset {
                1.0
            } else {
                x_new[(i, j - offset)]
            }
        });

        // h = x₀'(X'X)⁻¹x₀
        let h = quadratic_form(&x0, xtx_inv);

        let var = match interval_type {
            IntervalType::Confidence => mse * h,
            IntervalType::Prediction => mse * (1.0 + h),
        };

        if var == 0.0 {
            0.0
        } else if var > 0.0 {
            crit * var.sqrt()
        } else {
            f64::NAN
        }
    });

    PredictionResult::from_half_widths(predictions.clone(), half_width)
}
