//! Named output tables of a fitted model.

use crate::core::{BandMethod, IntervalType, OptionsError};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Confidence level of an interval, given either directly or as `alpha`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Level {
    /// Coverage probability, e.g. `0.95`.
    Confidence(f64),
    /// Significance level, e.g. `0.05`.
    Alpha(f64),
}

impl Default for Level {
    fn default() -> Self {
        Level::Confidence(0.95)
    }
}

impl Level {
    pub fn confidence(&self) -> f64 {
        match *self {
            Level::Confidence(conf) => conf,
            Level::Alpha(alpha) => 1.0 - alpha,
        }
    }

    pub fn alpha(&self) -> f64 {
        1.0 - self.confidence()
    }

    /// Check the level lies strictly inside (0, 1).
    pub fn validate(&self) -> Result<(), OptionsError> {
        match *self {
            Level::Confidence(conf) if !(conf > 0.0 && conf < 1.0) => {
                Err(OptionsError::InvalidConfidenceLevel(conf))
            }
            Level::Alpha(alpha) if !(alpha > 0.0 && alpha < 1.0) => Err(OptionsError::InvalidAlpha(alpha)),
            _ => Ok(()),
        }
    }

    /// Labels of the lower and upper two-sided bounds, e.g. `("2.5%", "97.5%")`.
    pub fn bound_labels(&self) -> (String, String) {
        let half = self.alpha() / 2.0;
        (percentile_label(half), percentile_label(1.0 - half))
    }
}

impl From<f64> for Level {
    fn from(conf: f64) -> Self {
        Level::Confidence(conf)
    }
}

/// Percent label of a probability, rounded to five decimals.
pub fn percentile_label(probability: f64) -> String {
    let percent = (probability * 100.0 * 1e5).round() / 1e5;
    format!("{percent}%")
}

/// One coefficient of a fitted model.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CoefficientRow {
    pub name: String,
    pub estimate: f64,
    pub std_error: f64,
    pub t_statistic: f64,
    pub p_value: f64,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

/// Coefficient estimates with their inference, `Intercept` first when present.
///
/// Bounds are absent for an intercept-only model.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CoefficientTable {
    pub rows: Vec<CoefficientRow>,
    pub confidence_level: f64,
}

impl CoefficientTable {
    pub fn get(&self, name: &str) -> Option<&CoefficientRow> {
        self.rows.iter().find(|row| row.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One coefficient's confidence interval.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IntervalRow {
    pub name: String,
    pub lower: f64,
    pub upper: f64,
}

/// Coefficient confidence intervals with percentile column labels.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IntervalTable {
    pub lower_label: String,
    pub upper_label: String,
    pub rows: Vec<IntervalRow>,
}

impl IntervalTable {
    pub fn get(&self, name: &str) -> Option<&IntervalRow> {
        self.rows.iter().find(|row| row.name == name)
    }
}

/// Bounds of a prediction band.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PredictionBounds {
    pub lower_label: String,
    pub upper_label: String,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
    pub kind: IntervalType,
    pub method: BandMethod,
}

/// Predictions on new data, labeled `Predicted <response>`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PredictionTable {
    pub label: String,
    pub fit: Vec<f64>,
    pub bounds: Option<PredictionBounds>,
}

impl PredictionTable {
    pub fn len(&self) -> usize {
        self.fit.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fit.is_empty()
    }
}

/// Which band to attach to predictions.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BandRequest {
    /// Band for the mean response.
    pub confidence: bool,
    /// Band for a new observation.
    pub prediction: bool,
    pub level: Level,
    pub method: BandMethod,
}

impl BandRequest {
    pub fn confidence(level: impl Into<Level>) -> Self {
        Self {
            confidence: true,
            level: level.into(),
            ..Default::default()
        }
    }

    pub fn prediction(level: impl Into<Level>) -> Self {
        Self {
            prediction: true,
            level: level.into(),
            ..Default::default()
        }
    }

    /// Use a Working–Hotelling simultaneous band.
    pub fn simultaneous(mut self) -> Self {
        self.method = BandMethod::WorkingHotelling;
        self
    }
}
