//! Formula-driven linear regression.
//!
//! Models are written as term expressions, turned into design matrices and
//! fit by ordinary least squares with full coefficient inference, prediction
//! bands and ANOVA.
//!
//! # Example
//!
//! ```
//! use linmod::prelude::*;
//!
//! let data = Dataset::builder()
//!     .numeric("x", vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
//!     .categorical("g", ["a", "b", "a", "b", "a", "b"])
//!     .numeric("y", vec![1.1, 3.9, 3.2, 6.1, 4.8, 8.2])
//!     .build()
//!     .unwrap();
//!
//! let fitted = LinearModel::new(var("x") + var("g"), var("y")).fit(&data)?;
//! let table = fitted.coefficient_table();
//! assert_eq!(table.names(), vec!["Intercept", "x", "g::b"]);
//!
//! let new_data = Dataset::builder()
//!     .numeric("x", vec![7.0])
//!     .categorical("g", ["a"])
//!     .build()
//!     .unwrap();
//! let predicted = fitted.predict_with_interval(&new_data, IntervalType::Prediction, 0.95)?;
//! assert_eq!(predicted.label, "Predicted y");
//!
//! let anova = anova_terms(&fitted)?;
//! assert!(anova.term("x").is_some());
//! # Ok::<(), ModelError>(())
//! ```

pub mod anova;
pub mod core;
pub mod design;
pub mod diagnostics;
pub mod inference;
pub mod model;
pub mod solvers;
pub mod terms;
pub mod utils;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::anova::{anova_terms, compare_models, AnovaTable, NestedComparison};
    pub use crate::core::{
        BandMethod, Column, Dataset, IntervalType, NaAction, RegressionOptions, RegressionResult,
    };
    pub use crate::design::{DesignMatrix, EncodingCache};
    pub use crate::diagnostics::{partial_regression, ResidualDiagnostics};
    pub use crate::model::{
        BandRequest, CoefficientTable, FittedLinearModel, Level, LinearModel, ModelError, PredictionTable,
    };
    pub use crate::solvers::{FittedRegressor, OlsRegressor, Regressor};
    pub use crate::terms::{cat, constant, identity, quant, var, Expr, Transformable};
}

pub use crate::model::{FittedLinearModel, LinearModel, ModelError};
