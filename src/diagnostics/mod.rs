//! Regression diagnostics for fitted linear models.
//!
//! - **Residuals**: standardized, internally and externally studentized
//! - **Influence**: leverage and Cook's distance
//! - **Partial regression**: added-variable data per term
//!
//! # Example
//!
//! ```
//! use linmod::core::Dataset;
//! use linmod::diagnostics::ResidualDiagnostics;
//! use linmod::model::LinearModel;
//! use linmod::terms::var;
//!
//! let data = Dataset::builder()
//!     .numeric("x", vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
//!     .numeric("y", vec![1.2, 1.9, 3.1, 3.9, 5.2, 5.8])
//!     .build()
//!     .unwrap();
//! let fitted = LinearModel::new(var("x"), var("y")).fit(&data).unwrap();
//!
//! let diagnostics = ResidualDiagnostics::new(&fitted);
//! assert_eq!(diagnostics.leverage.nrows(), 6);
//! let _outliers = diagnostics.outliers(3.0);
//! ```

mod partial;
mod residuals;

pub use partial::{partial_regression, PartialRegression};
pub use residuals::{
    cooks_distance, externally_studentized_residuals, high_leverage_points, influential_cooks,
    residual_outliers, standardized_residuals, studentized_residuals, ResidualDiagnostics,
};
