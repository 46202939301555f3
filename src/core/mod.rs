//! Core types for regression analysis.

mod data;
mod na_action;
mod options;
mod prediction;
mod result;

pub use data::{Column, ColumnKind, DataError, Dataset, DatasetBuilder};
pub use na_action::{NaAction, NaError, NaHandler, NaInfo};
pub use options::{OptionsError, RegressionOptions, RegressionOptionsBuilder};
pub use prediction::{BandMethod, IntervalType, PredictionResult};
pub use result::RegressionResult;
