//! Missing value (NaN) handling for datasets.
//!
//! Only numeric columns referenced by a model are inspected; categorical
//! columns have no missing-value marker. Three policies are supported:
//! - `Omit`: Remove rows with NaN, output is shorter than input
//! - `Exclude`: Remove rows with NaN, pad output with NaN at original positions
//! - `Fail`: Return error if any NaN is present
//!
//! # Example
//!
//! ```
//! use linmod::core::{Dataset, NaAction, NaHandler};
//!
//! let data = Dataset::builder()
//!     .numeric("x", vec![1.0, f64::NAN, 3.0])
//!     .numeric("y", vec![2.0, 4.0, f64::NAN])
//!     .build()
//!     .unwrap();
//!
//! let (clean, info) = NaHandler::process(&data, &["x", "y"], NaAction::Omit).unwrap();
//! assert_eq!(clean.n_rows(), 1);
//! assert_eq!(info.n_removed, 2);
//! ```

use super::data::{Column, Dataset};
use faer::Col;
use thiserror::Error;

/// Action to take when missing values (NaN) are encountered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NaAction {
    /// Remove rows containing NaN. Residuals and fitted values are shorter than
    /// the input.
    #[default]
    Omit,

    /// Remove rows containing NaN, but allow residuals and fitted values to be
    /// expanded back to the input length with NaN at the removed positions.
    Exclude,

    /// Return an error if any NaN is present.
    Fail,
}

/// Errors raised by missing value handling.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NaError {
    /// NaN values found in input data when using `NaAction::Fail`.
    #[error("missing values found in data: {n_na} rows contain NaN")]
    NaValuesPresent { n_na: usize },

    /// All observations were removed due to NaN values.
    #[error("all observations contain missing values")]
    AllNa,
}

/// Information about the missing value handling applied to data.
#[derive(Debug, Clone, PartialEq)]
pub struct NaInfo {
    /// Original number of observations before removal.
    pub n_original: usize,

    /// Mask indicating which rows had NaN (true = removed).
    pub na_mask: Vec<bool>,

    /// Indices of rows that were kept.
    pub kept_indices: Vec<usize>,

    /// Number of rows removed.
    pub n_removed: usize,

    /// The action that was applied.
    pub action: NaAction,
}

impl NaInfo {
    fn complete(n_observations: usize, action: NaAction) -> Self {
        Self {
            n_original: n_observations,
            na_mask: vec![false; n_observations],
            kept_indices: (0..n_observations).collect(),
            n_removed: 0,
            action,
        }
    }

    /// Check if any rows were removed.
    pub fn has_removed(&self) -> bool {
        self.n_removed > 0
    }

    /// Check if this info requires expansion (i.e., was created with `Exclude`).
    pub fn needs_expansion(&self) -> bool {
        self.action == NaAction::Exclude && self.n_removed > 0
    }

    /// Expand a vector to original length, inserting NaN at removed positions.
    pub fn expand(&self, clean_values: &Col<f64>) -> Col<f64> {
        if !self.needs_expansion() {
            return clean_values.clone();
        }

        let mut expanded = Col::zeros(self.n_original);
        let mut clean_idx = 0;
        for (orig_idx, &had_na) in self.na_mask.iter().enumerate() {
            if had_na {
                expanded[orig_idx] = f64::NAN;
            } else {
                expanded[orig_idx] = clean_values[clean_idx];
                clean_idx += 1;
            }
        }
        expanded
    }
}

/// Handler for missing value processing.
pub struct NaHandler;

impl NaHandler {
    /// Apply `action` to the rows of `data`, looking for NaN in `columns`.
    ///
    /// Names that are absent or refer to categorical columns are skipped; the
    /// design matrix builder reports missing columns with a better message.
    pub fn process(
        data: &Dataset,
        columns: &[&str],
        action: NaAction,
    ) -> Result<(Dataset, NaInfo), NaError> {
        let n_rows = data.n_rows();
        let na_mask = Self::find_na_rows(data, columns);
        let n_na = na_mask.iter().filter(|&&v| v).count();

        if n_na == 0 {
            return Ok((data.clone(), NaInfo::complete(n_rows, action)));
        }

        match action {
            NaAction::Fail => Err(NaError::NaValuesPresent { n_na }),
            NaAction::Omit | NaAction::Exclude => {
                if n_na == n_rows {
                    return Err(NaError::AllNa);
                }

                let kept_indices: Vec<usize> = na_mask
                    .iter()
                    .enumerate()
                    .filter_map(|(i, &had_na)| (!had_na).then_some(i))
                    .collect();

                tracing::debug!(n_removed = n_na, n_rows, "dropped rows with missing values");

                let clean = data.take_rows(&kept_indices);
                let info = NaInfo {
                    n_original: n_rows,
                    na_mask,
                    kept_indices,
                    n_removed: n_na,
                    action,
                };
                Ok((clean, info))
            }
        }
    }

    /// Mask of rows with a NaN in any of the named numeric columns.
    pub fn find_na_rows(data: &Dataset, columns: &[&str]) -> Vec<bool> {
        let mut mask = vec![false; data.n_rows()];
        for name in columns {
            if let Some(Column::Numeric(values)) = data.column(name) {
                for (flag, value) in mask.iter_mut().zip(values) {
                    *flag |= value.is_nan();
                }
            }
        }
        mask
    }
}
