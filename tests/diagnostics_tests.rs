//! Diagnostics integration tests.

mod common;

use approx::assert_relative_eq;
use linmod::core::{Dataset, NaAction, RegressionOptions};
use linmod::design::DesignError;
use linmod::diagnostics::{partial_regression, ResidualDiagnostics};
use linmod::model::{LinearModel, ModelError};
use linmod::terms::{cat, quant, var, Transformable};

// ============================================================================
// Partial regression
// ============================================================================

#[test]
fn test_partial_slope_equals_full_coefficient() {
    let data = common::linear_data(35, 3, 0.5, 1.5, 8);
    let fitted = LinearModel::new(var("x1") + var("x2") + var("x3"), var("y"))
        .fit(&data)
        .unwrap();

    for name in ["x1", "x2", "x3"] {
        let partial = partial_regression(&fitted, &var(name).into()).unwrap();
        assert_eq!(partial.term, name);
        assert_relative_eq!(partial.slope, fitted.coefficient(name).unwrap(), epsilon = 1e-8);
    }
}

#[test]
fn test_partial_residuals_are_centered() {
    let data = common::grouped_data();
    let fitted = LinearModel::new(quant("x") + cat("g"), quant("y")).fit(&data).unwrap();
    let partial = partial_regression(&fitted, &quant("x").into()).unwrap();

    assert_eq!(partial.x_residuals.len(), data.n_rows());
    assert_eq!(partial.y_residuals.len(), data.n_rows());
    // Both residual vectors are orthogonal to the intercept column
    assert_relative_eq!(partial.x_residuals.iter().sum::<f64>(), 0.0, epsilon = 1e-9);
    assert_relative_eq!(partial.y_residuals.iter().sum::<f64>(), 0.0, epsilon = 1e-9);
}

#[test]
fn test_partial_regression_errors() {
    let data = common::grouped_data();
    let fitted = LinearModel::new(quant("x") + cat("g"), quant("y")).fit(&data).unwrap();

    let multi = partial_regression(&fitted, &cat("g").into());
    assert!(matches!(multi, Err(ModelError::MultiColumnTerm { columns: 2, .. })));

    let absent = partial_regression(&fitted, &quant("x").log().into());
    assert!(matches!(
        absent,
        Err(ModelError::Design(DesignError::UnsupportedTerm(_)))
    ));
}

// ============================================================================
// Residual diagnostics
// ============================================================================

#[test]
fn test_leverage_sums_to_parameter_count() {
    let data = common::linear_data(25, 2, 1.0, 1.0, 31);
    let fitted = LinearModel::new(var("x1") + var("x2"), var("y")).fit(&data).unwrap();
    let diagnostics = ResidualDiagnostics::new(&fitted);

    let trace: f64 = diagnostics.leverage.iter().sum();
    assert_relative_eq!(trace, 3.0, epsilon = 1e-9);
    for i in 0..25 {
        let h = diagnostics.leverage[i];
        assert!(h > 0.0 && h < 1.0);
    }
}

#[test]
fn test_scaled_residuals_are_consistent() {
    let data = common::linear_data(30, 1, 0.0, 2.0, 14);
    let fitted = LinearModel::new(var("x1"), var("y")).fit(&data).unwrap();
    let result = fitted.result();
    let diagnostics = ResidualDiagnostics::new(&fitted);
    let s = result.mse.sqrt();
    let p = result.n_parameters as f64;

    for i in 0..30 {
        let e = result.residuals[i];
        let h = diagnostics.leverage[i];
        assert_relative_eq!(diagnostics.standardized[i], e / s, epsilon = 1e-10);
        assert_relative_eq!(diagnostics.studentized[i], e / (s * (1.0 - h).sqrt()), epsilon = 1e-10);

        let r = diagnostics.studentized[i];
        assert_relative_eq!(
            diagnostics.cooks_distance[i],
            r * r / p * h / (1.0 - h),
            epsilon = 1e-10
        );
        // Deleting a row never changes the sign of its residual
        assert!(diagnostics.externally_studentized[i] * e >= 0.0);
    }
}

#[test]
fn test_outlier_is_flagged() {
    let mut y: Vec<f64> = (0..20).map(|i| 1.0 + 0.5 * i as f64).collect();
    for (i, value) in common::noise(20, 3).into_iter().enumerate() {
        y[i] += 0.1 * value;
    }
    y[7] += 6.0;
    let data = Dataset::builder()
        .numeric("x", (0..20).map(f64::from).collect::<Vec<_>>())
        .numeric("y", y)
        .build()
        .unwrap();
    let fitted = LinearModel::new(quant("x"), quant("y")).fit(&data).unwrap();
    let diagnostics = ResidualDiagnostics::new(&fitted);

    assert_eq!(diagnostics.outliers(3.0), vec![7]);
    assert!(diagnostics.influential(None).contains(&7));
}

// ============================================================================
// Missing values
// ============================================================================

fn with_missing() -> Dataset {
    Dataset::builder()
        .numeric("x", vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
        .numeric("y", vec![2.1, 3.9, f64::NAN, 8.2, 9.8, 12.1])
        .build()
        .unwrap()
}

#[test]
fn test_omit_drops_missing_rows() {
    let fitted = LinearModel::new(quant("x"), quant("y")).fit(&with_missing()).unwrap();
    let result = fitted.result();

    assert_eq!(result.n_observations, 5);
    assert_eq!(result.n_na_removed(), 1);
    assert_eq!(result.residuals_expanded().nrows(), 5);
    assert_eq!(fitted.training_data().n_rows(), 5);
}

#[test]
fn test_exclude_pads_residuals() {
    let options = RegressionOptions::builder()
        .na_action(NaAction::Exclude)
        .build()
        .unwrap();
    let fitted = LinearModel::new(quant("x"), quant("y"))
        .with_options(options)
        .fit(&with_missing())
        .unwrap();
    let result = fitted.result();

    let residuals = result.residuals_expanded();
    let fitted_values = result.fitted_expanded();
    assert_eq!(residuals.nrows(), 6);
    assert!(residuals[2].is_nan());
    assert!(fitted_values[2].is_nan());
    assert_relative_eq!(residuals[3], result.residuals[2], epsilon = 1e-15);
}

#[test]
fn test_fail_rejects_missing_values() {
    let options = RegressionOptions::builder()
        .na_action(NaAction::Fail)
        .build()
        .unwrap();
    let result = LinearModel::new(quant("x"), quant("y"))
        .with_options(options)
        .fit(&with_missing());
    assert!(matches!(result, Err(ModelError::Na(_))));
}
