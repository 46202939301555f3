//! Coefficient inference calculations.

use faer::{Col, Mat};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Computes inference statistics for regression coefficients.
pub struct CoefficientInference;

impl CoefficientInference {
    /// Standard errors from the diagonal of a covariance matrix.
    ///
    /// `offset` skips leading rows, so `1` drops the intercept of an
    /// `[Intercept | X]` covariance.
    pub fn standard_errors(covariance: &Mat<f64>, offset: usize) -> Col<f64> {
        let n = covariance.nrows().saturating_sub(offset);
        Col::from_fn(n, |j| Self::standard_error(covariance[(j + offset, j + offset)]))
    }

    /// Square root of a variance, NaN for negative round-off.
    pub fn standard_error(variance: f64) -> f64 {
        if variance >= 0.0 {
            variance.sqrt()
        } else {
            f64::NAN
        }
    }

    /// t-statistic `β / SE(β)`.
    ///
    /// A zero standard error with a non-zero estimate gives an infinite t.
    pub fn t_statistic(estimate: f64, std_error: f64) -> f64 {
        if std_error.is_nan() {
            f64::NAN
        } else if std_error == 0.0 {
            if estimate == 0.0 {
                f64::NAN
            } else {
                f64::INFINITY.copysign(estimate)
            }
        } else {
            estimate / std_error
        }
    }

    /// Compute t-statistics for coefficients.
    pub fn t_statistics(coefficients: &Col<f64>, std_errors: &Col<f64>) -> Col<f64> {
        Col::from_fn(coefficients.nrows(), |j| {
            Self::t_statistic(coefficients[j], std_errors[j])
        })
    }

    /// Two-sided p-value `2 * P(T > |t|)` with `T ~ t(df)`.
    pub fn p_value(t_statistic: f64, df: f64) -> f64 {
        if t_statistic.is_nan() {
            return f64::NAN;
        }
        if t_statistic.is_infinite() {
            return 0.0;
        }
        match StudentsT::new(0.0, 1.0, df) {
            Ok(t_dist) => 2.0 * (1.0 - t_dist.cdf(t_statistic.abs())),
            Err(_) => f64::NAN,
        }
    }

    /// Compute p-values from t-statistics.
    pub fn p_values(t_statistics: &Col<f64>, df: f64) -> Col<f64> {
        Col::from_fn(t_statistics.nrows(), |j| Self::p_value(t_statistics[j], df))
    }

    /// Critical value `t(1 - α/2; df)` for a two-sided interval.
    pub fn t_critical(df: f64, confidence_level: f64) -> f64 {
        let alpha = 1.0 - confidence_level;
        StudentsT::new(0.0, 1.0, df)
            .map(|t_dist| t_dist.inverse_cdf(1.0 - alpha / 2.0))
            .unwrap_or(f64::NAN)
    }

    /// Compute confidence intervals for coefficients.
    ///
    /// CI_j = β_j ± t_{α/2, df} * SE(β_j)
    pub fn confidence_intervals(
        coefficients: &Col<f64>,
        std_errors: &Col<f64>,
        df: f64,
        confidence_level: f64,
    ) -> (Col<f64>, Col<f64>) {
        let n = coefficients.nrows();
        let t_crit = Self::t_critical(df, confidence_level);

        let lower = Col::from_fn(n, |j| coefficients[j] - t_crit * std_errors[j]);
        let upper = Col::from_fn(n, |j| coefficients[j] + t_crit * std_errors[j]);

        (lower, upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_t_statistics() {
        let coefficients = Col::from_fn(3, |i| (i + 1) as f64);
        let std_errors = Col::from_fn(3, |_| 0.5);

        let t_stats = CoefficientInference::t_statistics(&coefficients, &std_errors);

        assert!((t_stats[0] - 2.0).abs() < 1e-10);
        assert!((t_stats[1] - 4.0).abs() < 1e-10);
        assert!((t_stats[2] - 6.0).abs() < 1e-10);
    }

    #[test]
    fn test_zero_standard_error() {
        assert_eq!(CoefficientInference::t_statistic(2.0, 0.0), f64::INFINITY);
        assert_eq!(CoefficientInference::t_statistic(-2.0, 0.0), f64::NEG_INFINITY);
        assert!(CoefficientInference::t_statistic(0.0, 0.0).is_nan());
        assert_eq!(CoefficientInference::p_value(f64::INFINITY, 3.0), 0.0);
    }

    #[test]
    fn test_p_values_bounds() {
        let t_stats = Col::from_fn(3, |i| (i + 1) as f64);
        let p_vals = CoefficientInference::p_values(&t_stats, 10.0);

        for p in p_vals.iter() {
            assert!(*p >= 0.0 && *p <= 1.0);
        }
        assert!(p_vals[0] > p_vals[2]);
    }

    #[test]
    fn test_t_critical_known_value() {
        // t(0.975; 10) = 2.228139
        let t = CoefficientInference::t_critical(10.0, 0.95);
        assert!((t - 2.228139).abs() < 1e-5);
    }

    #[test]
    fn test_standard_errors_with_offset() {
        let cov = Mat::from_fn(3, 3, |i, j| if i == j { (i + 1) as f64 * 4.0 } else { 0.0 });
        let se = CoefficientInference::standard_errors(&cov, 1);
        assert_eq!(se.nrows(), 2);
        assert!((se[0] - 8.0_f64.sqrt()).abs() < 1e-12);
        assert!((se[1] - 12.0_f64.sqrt()).abs() < 1e-12);
    }
}
