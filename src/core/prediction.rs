//! Prediction types for interval estimation.

use faer::Col;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Type of interval to compute for predictions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum IntervalType {
    /// Confidence interval for the mean response E[Y|X=x₀].
    /// Narrower - only accounts for uncertainty in coefficient estimates.
    Confidence,

    /// Prediction interval for a new observation Y|X=x₀.
    /// Wider - also accounts for residual variance (irreducible error).
    #[default]
    Prediction,
}

/// How the critical value scaling an interval half-width is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BandMethod {
    /// Student-t quantile `t(1 - α/2; n - p)`, valid one point at a time.
    #[default]
    Pointwise,

    /// Working–Hotelling simultaneous band, `sqrt(p · F(1 - α; p, n - p))`,
    /// valid for the whole regression surface at once.
    WorkingHotelling,
}

/// Result of prediction with optional intervals.
#[derive(Debug, Clone)]
pub struct PredictionResult {
    /// Point predictions (fitted values).
    pub fit: Col<f64>,
    /// Lower bounds of the interval.
    pub lower: Col<f64>,
    /// Upper bounds of the interval.
    pub upper: Col<f64>,
    /// Interval half-widths (`upper - fit`).
    pub half_width: Col<f64>,
}

impl PredictionResult {
    /// Create a new prediction result with only point predictions (no intervals).
    pub fn point_only(fit: Col<f64>) -> Self {
        let n = fit.nrows();
        Self {
            lower: fit.clone(),
            upper: fit.clone(),
            fit,
            half_width: Col::zeros(n),
        }
    }

    /// Create a prediction result from point predictions and half-widths.
    pub fn from_half_widths(fit: Col<f64>, half_width: Col<f64>) -> Self {
        let n = fit.nrows();
        let lower = Col::from_fn(n, |i| fit[i] - half_width[i]);
        let upper = Col::from_fn(n, |i| fit[i] + half_width[i]);
        Self {
            fit,
            lower,
            upper,
            half_width,
        }
    }

    /// Number of predictions.
    pub fn len(&self) -> usize {
        self.fit.nrows()
    }

    /// Returns true if there are no predictions.
    pub fn is_empty(&self) -> bool {
        self.fit.nrows() == 0
    }
}
