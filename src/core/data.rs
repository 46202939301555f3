//! Tabular observation data keyed by column name.
//!
//! A [`Dataset`] is the input to every fit and predict call. Columns are either
//! numeric (`f64`) or categorical (`String`); every column has the same number of
//! rows. Columns that no term references are carried along and ignored.
//!
//! # Example
//!
//! ```
//! use linmod::core::Dataset;
//!
//! let data = Dataset::builder()
//!     .numeric("x", vec![1.0, 2.0, 3.0])
//!     .categorical("g", ["a", "b", "a"])
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(data.n_rows(), 3);
//! ```

use std::collections::BTreeMap;
use thiserror::Error;

/// Semantic kind of a column, used when resolving untyped variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Real-valued column.
    Numeric,
    /// Discrete column of labels.
    Categorical,
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnKind::Numeric => write!(f, "numeric"),
            ColumnKind::Categorical => write!(f, "categorical"),
        }
    }
}

/// A single homogeneous column.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Numeric(Vec<f64>),
    Categorical(Vec<String>),
}

impl Column {
    /// Number of rows in the column.
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(values) => values.len(),
            Column::Categorical(values) => values.len(),
        }
    }

    /// Returns true if the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Kind of values stored in the column.
    pub fn kind(&self) -> ColumnKind {
        match self {
            Column::Numeric(_) => ColumnKind::Numeric,
            Column::Categorical(_) => ColumnKind::Categorical,
        }
    }

    /// Values rendered as level labels.
    ///
    /// Numeric values are formatted with `Display`, so `1.0` becomes `"1"`.
    pub fn labels(&self) -> Vec<String> {
        match self {
            Column::Numeric(values) => values.iter().map(|v| format!("{v}")).collect(),
            Column::Categorical(values) => values.clone(),
        }
    }

    fn take(&self, indices: &[usize]) -> Column {
        match self {
            Column::Numeric(values) => Column::Numeric(indices.iter().map(|&i| values[i]).collect()),
            Column::Categorical(values) => {
                Column::Categorical(indices.iter().map(|&i| values[i].clone()).collect())
            }
        }
    }
}

/// Errors raised while assembling or reading a dataset.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DataError {
    #[error("variable {{ {0} }} not found within data")]
    MissingColumn(String),

    #[error("column '{column}' has {got} rows but the dataset has {expected}")]
    RowCountMismatch {
        column: String,
        expected: usize,
        got: usize,
    },

    #[error("column '{column}' is not {expected}")]
    WrongKind { column: String, expected: ColumnKind },
}

/// A table of observations, one row per observation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: BTreeMap<String, Column>,
    n_rows: usize,
}

impl Dataset {
    /// Create an empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for assembling a dataset column by column.
    pub fn builder() -> DatasetBuilder {
        DatasetBuilder::default()
    }

    /// Number of observations.
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of columns.
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Column names in sorted order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// Look up a column, failing if it is absent.
    pub fn require(&self, name: &str) -> Result<&Column, DataError> {
        self.columns
            .get(name)
            .ok_or_else(|| DataError::MissingColumn(name.to_string()))
    }

    /// Numeric values of a column.
    pub fn numeric(&self, name: &str) -> Result<&[f64], DataError> {
        match self.require(name)? {
            Column::Numeric(values) => Ok(values),
            Column::Categorical(_) => Err(DataError::WrongKind {
                column: name.to_string(),
                expected: ColumnKind::Numeric,
            }),
        }
    }

    /// Insert or replace a column.
    ///
    /// The first column inserted into an empty dataset fixes the row count.
    pub fn insert(&mut self, name: impl Into<String>, column: Column) -> Result<(), DataError> {
        let name = name.into();
        let replacing_only = self.columns.len() == 1 && self.columns.contains_key(&name);
        if self.columns.is_empty() || replacing_only {
            self.n_rows = column.len();
        } else if column.len() != self.n_rows {
            return Err(DataError::RowCountMismatch {
                column: name,
                expected: self.n_rows,
                got: column.len(),
            });
        }
        self.columns.insert(name, column);
        Ok(())
    }

    /// A new dataset holding only the given rows, in the given order.
    pub fn take_rows(&self, indices: &[usize]) -> Dataset {
        Dataset {
            columns: self
                .columns
                .iter()
                .map(|(name, column)| (name.clone(), column.take(indices)))
                .collect(),
            n_rows: indices.len(),
        }
    }
}

/// Builder for [`Dataset`]; row-count validation happens in [`DatasetBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct DatasetBuilder {
    columns: Vec<(String, Column)>,
}

impl DatasetBuilder {
    /// Add a numeric column.
    pub fn numeric(mut self, name: impl Into<String>, values: impl Into<Vec<f64>>) -> Self {
        self.columns
            .push((name.into(), Column::Numeric(values.into())));
        self
    }

    /// Add a categorical column.
    pub fn categorical<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.columns
            .push((name.into(), Column::Categorical(values)));
        self
    }

    /// Build the dataset, checking all columns have equal length.
    pub fn build(self) -> Result<Dataset, DataError> {
        let mut data = Dataset::new();
        for (name, column) in self.columns {
            data.insert(name, column)?;
        }
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_lookup() {
        let data = Dataset::builder()
            .numeric("x", vec![1.0, 2.0])
            .categorical("g", ["a", "b"])
            .build()
            .unwrap();

        assert_eq!(data.n_rows(), 2);
        assert_eq!(data.n_columns(), 2);
        assert_eq!(data.numeric("x").unwrap(), &[1.0, 2.0]);
        assert_eq!(data.column("g").unwrap().kind(), ColumnKind::Categorical);
        assert_eq!(data.column_names().collect::<Vec<_>>(), vec!["g", "x"]);
    }

    #[test]
    fn test_row_count_mismatch() {
        let result = Dataset::builder()
            .numeric("x", vec![1.0, 2.0])
            .numeric("y", vec![1.0])
            .build();

        assert!(matches!(result, Err(DataError::RowCountMismatch { .. })));
    }

    #[test]
    fn test_missing_and_wrong_kind() {
        let data = Dataset::builder()
            .categorical("g", ["a"])
            .build()
            .unwrap();

        assert!(matches!(data.numeric("z"), Err(DataError::MissingColumn(_))));
        assert!(matches!(data.numeric("g"), Err(DataError::WrongKind { .. })));
    }

    #[test]
    fn test_numeric_labels() {
        let column = Column::Numeric(vec![1.0, 2.5]);
        assert_eq!(column.labels(), vec!["1".to_string(), "2.5".to_string()]);
    }

    #[test]
    fn test_take_rows() {
        let data = Dataset::builder()
            .numeric("x", vec![1.0, 2.0, 3.0])
            .categorical("g", ["a", "b", "c"])
            .build()
            .unwrap();

        let subset = data.take_rows(&[2, 0]);
        assert_eq!(subset.n_rows(), 2);
        assert_eq!(subset.numeric("x").unwrap(), &[3.0, 1.0]);
        assert_eq!(
            subset.column("g").unwrap(),
            &Column::Categorical(vec!["c".into(), "a".into()])
        );
    }
}
