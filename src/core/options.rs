//! Model options and configuration.

use super::na_action::NaAction;
use thiserror::Error;

/// Configuration options for linear models.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionOptions {
    /// Whether to include an intercept term (default: true).
    ///
    /// A model whose explanatory expression already contains a constant term
    /// always gets an intercept, regardless of this flag.
    pub with_intercept: bool,
    /// Confidence level for coefficient confidence intervals (default: 0.95).
    pub confidence_level: f64,
    /// Relative pivot tolerance below which X'X is treated as singular.
    pub singular_tolerance: f64,
    /// How rows with missing numeric values are handled before fitting.
    pub na_action: NaAction,
}

impl Default for RegressionOptions {
    fn default() -> Self {
        Self {
            with_intercept: true,
            confidence_level: 0.95,
            singular_tolerance: 1e-10,
            na_action: NaAction::Omit,
        }
    }
}

/// Errors that can occur when validating model options.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OptionsError {
    #[error("confidence_level must be in (0, 1), got {0}")]
    InvalidConfidenceLevel(f64),
    #[error("alpha must be in (0, 1), got {0}")]
    InvalidAlpha(f64),
    #[error("singular_tolerance must be positive, got {0}")]
    InvalidTolerance(f64),
}

impl RegressionOptions {
    /// Create a new builder for regression options.
    pub fn builder() -> RegressionOptionsBuilder {
        RegressionOptionsBuilder::default()
    }

    /// Options for a model without an implicit intercept.
    pub fn without_intercept() -> Self {
        Self {
            with_intercept: false,
            ..Default::default()
        }
    }

    /// Validate the options and return an error if invalid.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(OptionsError::InvalidConfidenceLevel(self.confidence_level));
        }
        if !(self.singular_tolerance > 0.0) {
            return Err(OptionsError::InvalidTolerance(self.singular_tolerance));
        }
        Ok(())
    }
}

/// Builder for `RegressionOptions`.
#[derive(Debug, Clone, Default)]
pub struct RegressionOptionsBuilder {
    options: RegressionOptions,
}

impl RegressionOptionsBuilder {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to include an intercept term.
    pub fn with_intercept(mut self, include: bool) -> Self {
        self.options.with_intercept = include;
        self
    }

    /// Set the confidence level for coefficient confidence intervals.
    pub fn confidence_level(mut self, level: f64) -> Self {
        self.options.confidence_level = level;
        self
    }

    /// Set the relative tolerance for singularity detection.
    pub fn singular_tolerance(mut self, tol: f64) -> Self {
        self.options.singular_tolerance = tol;
        self
    }

    /// Set the missing-value policy.
    pub fn na_action(mut self, action: NaAction) -> Self {
        self.options.na_action = action;
        self
    }

    /// Build and validate the options.
    pub fn build(self) -> Result<RegressionOptions, OptionsError> {
        self.options.validate()?;
        Ok(self.options)
    }

    /// Build the options without validation.
    pub fn build_unchecked(self) -> RegressionOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = RegressionOptions::default();
        assert!(opts.with_intercept);
        assert!((opts.confidence_level - 0.95).abs() < 1e-10);
        assert_eq!(opts.na_action, NaAction::Omit);
    }

    #[test]
    fn test_builder() {
        let opts = RegressionOptions::builder()
            .with_intercept(false)
            .confidence_level(0.9)
            .na_action(NaAction::Fail)
            .build()
            .unwrap();

        assert!(!opts.with_intercept);
        assert!((opts.confidence_level - 0.9).abs() < 1e-10);
        assert_eq!(opts.na_action, NaAction::Fail);
    }

    #[test]
    fn test_validation_invalid_confidence_level() {
        let zero = RegressionOptions::builder().confidence_level(0.0).build();
        let one = RegressionOptions::builder().confidence_level(1.0).build();
        assert!(matches!(zero, Err(OptionsError::InvalidConfidenceLevel(_))));
        assert!(matches!(one, Err(OptionsError::InvalidConfidenceLevel(_))));
    }

    #[test]
    fn test_validation_invalid_tolerance() {
        let result = RegressionOptions::builder().singular_tolerance(0.0).build();
        assert!(matches!(result, Err(OptionsError::InvalidTolerance(_))));
    }

    #[test]
    fn test_without_intercept() {
        assert!(!RegressionOptions::without_intercept().with_intercept);
    }
}
