//! Variance decomposition by term and F-tests between nested models.
//!
//! [`anova_terms`] refits the model once per term without that term and
//! reports the marginal (adjusted) sum of squares each term explains.
//! [`compare_models`] tests a reduced model against a full one that contains it.

mod nested;
mod terms;

pub use nested::{compare_models, NestedComparison};
pub use terms::anova_terms;

use statrs::distribution::{ContinuousCDF, FisherSnedecor};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One line of an ANOVA table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnovaRow {
    pub source: String,
    pub df: usize,
    /// Adjusted sum of squares.
    pub ss: f64,
    /// Adjusted mean square; NaN for the total row.
    pub ms: f64,
    /// NaN for the error and total rows.
    pub f_value: f64,
    /// NaN for the error and total rows.
    pub p_value: f64,
}

/// Rows `Regression`, `>> <term>` per term, `Error` and `Total`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnovaTable {
    pub rows: Vec<AnovaRow>,
}

pub const REGRESSION: &str = "Regression";
pub const ERROR: &str = "Error";
pub const TOTAL: &str = "Total";

/// Source label of a term row.
pub fn term_source(term: &str) -> String {
    format!(">> {term}")
}

impl AnovaTable {
    pub fn get(&self, source: &str) -> Option<&AnovaRow> {
        self.rows.iter().find(|row| row.source == source)
    }

    /// The row of a term, looked up by its label.
    pub fn term(&self, term: &str) -> Option<&AnovaRow> {
        self.get(&term_source(term))
    }

    pub fn regression(&self) -> Option<&AnovaRow> {
        self.get(REGRESSION)
    }

    pub fn error(&self) -> Option<&AnovaRow> {
        self.get(ERROR)
    }

    pub fn total(&self) -> Option<&AnovaRow> {
        self.get(TOTAL)
    }

    /// Term rows in model order.
    pub fn terms(&self) -> impl Iterator<Item = &AnovaRow> {
        self.rows.iter().filter(|row| row.source.starts_with(">> "))
    }
}

/// Upper tail probability of `F(df1, df2)` at `f`.
pub(crate) fn f_test_pvalue(f: f64, df1: f64, df2: f64) -> f64 {
    if f.is_infinite() && f > 0.0 {
        return 0.0;
    }
    if !f.is_finite() || df1 <= 0.0 || df2 <= 0.0 {
        return f64::NAN;
    }
    FisherSnedecor::new(df1, df2).map_or(f64::NAN, |dist| 1.0 - dist.cdf(f))
}

/// F statistic of an extra sum of squares against a residual mean square.
pub(crate) fn extra_ss_f(ss: f64, df: usize, mse: f64) -> f64 {
    if df == 0 {
        return f64::NAN;
    }
    let ms = ss / df as f64;
    if mse > 0.0 {
        ms / mse
    } else if ms > 0.0 {
        f64::INFINITY
    } else {
        f64::NAN
    }
}
