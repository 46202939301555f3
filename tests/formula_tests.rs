//! Term algebra and formula-level model behaviour.

mod common;

use approx::assert_relative_eq;
use linmod::core::Dataset;
use linmod::design::EncodingCache;
use linmod::model::{LinearModel, ModelError};
use linmod::terms::{cat, constant, identity, quant, var, Expr, Transformable};

#[test]
fn test_distribution_of_products() {
    let expr = (constant(1.0) + var("a")) * (constant(1.0) + var("b"));
    assert_eq!(expr.to_string(), "1 + b + a + {a}{b}");
    assert_eq!(expr.constant(), Some(1.0));
    assert_eq!(expr.non_constant_terms().len(), 3);
}

#[test]
fn test_subtraction_removes_terms() {
    let full = quant("x") + quant("z") + quant("x") * quant("z");
    let reduced = full.clone() - quant("x") * quant("z");
    assert_eq!(reduced, quant("z") + quant("x"));
    assert_ne!(reduced, full);
}

#[test]
fn test_reduce_is_idempotent() {
    let expr = cat("g") * quant("x") + quant("x").log() + constant(1.0);
    let once = expr.reduce();
    let twice = once.to_expr().reduce();

    assert_eq!(once, twice);
    assert_eq!(once.categorical.len(), 1);
    assert_eq!(once.quantitative.len(), 2);
    assert!(once.constant.is_some());
}

#[test]
fn test_dof_after_fit() {
    let data = common::grouped_data();
    let expr = quant("x") + cat("g") + cat("g") * quant("x");
    assert_eq!(expr.dof(&EncodingCache::default()), None);

    let fitted = LinearModel::new(expr.clone(), quant("y")).fit(&data).unwrap();
    assert_eq!(expr.dof(fitted.encoding_cache()), Some(1 + 2 + 2));
    assert_eq!(fitted.design().ncols(), 5);
}

#[test]
fn test_transformed_terms_fit() {
    let x: Vec<f64> = (1..=8).map(f64::from).collect();
    let y: Vec<f64> = x.iter().map(|v| 0.5 + 3.0 * v.ln() - 0.25 * v * v).collect();
    let data = Dataset::builder().numeric("x", x).numeric("y", y).build().unwrap();

    let fitted = LinearModel::new(var("x").log() + var("x").pow(2.0), var("y"))
        .fit(&data)
        .unwrap();

    assert_eq!(fitted.coefficient_names(), vec!["Intercept", "log(x)", "x^2"]);
    assert_relative_eq!(fitted.coefficient("log(x)").unwrap(), 3.0, epsilon = 1e-8);
    assert_relative_eq!(fitted.coefficient("x^2").unwrap(), -0.25, epsilon = 1e-9);
}

#[test]
fn test_shift_and_scale() {
    let data = Dataset::builder()
        .numeric("x", vec![0.0, 1.0, 2.0, 3.0, 4.0])
        .numeric("y", vec![1.0, 3.0, 5.0, 7.0, 9.0])
        .build()
        .unwrap();
    // y = 4 * ((x + 1) * 0.5) - 1
    let fitted = LinearModel::new(quant("x").shift(1.0).scale(0.5), quant("y"))
        .fit(&data)
        .unwrap();
    let name = &fitted.coefficient_names()[1];
    assert_relative_eq!(fitted.coefficient(name).unwrap(), 4.0, epsilon = 1e-10);
    assert_relative_eq!(fitted.coefficient("Intercept").unwrap(), -1.0, epsilon = 1e-10);
}

#[test]
fn test_identity_collapses_response() {
    let data = Dataset::builder()
        .numeric("x", vec![1.0, 2.0, 3.0, 4.0, 5.0])
        .numeric("a", vec![1.0, 2.0, 3.0, 4.0, 5.0])
        .numeric("b", vec![1.0, 2.0, 3.0, 4.0, 5.0])
        .build()
        .unwrap();

    let fails = LinearModel::new(var("x"), var("a") + var("b")).fit(&data);
    assert!(matches!(fails, Err(ModelError::MultiColumnResponse { columns: 2 })));

    let fitted = LinearModel::new(var("x"), identity(var("a") + var("b"))).fit(&data).unwrap();
    assert_relative_eq!(fitted.coefficient("x").unwrap(), 2.0, epsilon = 1e-10);
}

#[test]
fn test_numeric_column_as_categorical() {
    let data = Dataset::builder()
        .numeric("dose", vec![10.0, 2.0, 10.0, 2.0, 5.0, 5.0])
        .numeric("y", vec![9.0, 2.1, 9.2, 1.9, 5.0, 5.2])
        .build()
        .unwrap();
    let fitted = LinearModel::new(cat("dose"), quant("y")).fit(&data).unwrap();

    assert_eq!(fitted.levels("dose").unwrap().levels, vec!["2", "5", "10"]);
    assert_eq!(fitted.coefficient_names(), vec!["Intercept", "dose::5", "dose::10"]);
    assert_relative_eq!(fitted.coefficient("Intercept").unwrap(), 2.0, epsilon = 1e-10);
}

#[test]
fn test_fit_leaves_model_untouched() {
    let model = LinearModel::new(var("x"), var("y"));
    let before = model.clone();
    let _ = model.fit(&common::exact_line()).unwrap();
    let _ = model.fit(&Dataset::new());
    assert_eq!(model, before);
    assert!(matches!(model.explanatory(), Expr::Var(_)));
}
