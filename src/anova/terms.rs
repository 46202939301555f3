use super::{extra_ss_f, f_test_pvalue, term_source, AnovaRow, AnovaTable, ERROR, REGRESSION, TOTAL};
use crate::model::{FittedLinearModel, ModelError};
use crate::terms::Expr;

/// Marginal ANOVA of every term of a fitted model.
///
/// Each term row compares the full model with a refit that drops only that
/// term, on the same training rows and with the same intercept. The term DF
/// is the number of coefficients the term removes and its sum of squares is
/// the rise in SSE.
///
/// # Example
///
/// ```
/// use linmod::anova::anova_terms;
/// use linmod::core::Dataset;
/// use linmod::model::LinearModel;
/// use linmod::terms::var;
///
/// let data = Dataset::builder()
///     .numeric("a", vec![-1.0, -1.0, -1.0, -1.0, 1.0, 1.0, 1.0, 1.0])
///     .numeric("b", vec![-1.0, -1.0, 1.0, 1.0, -1.0, -1.0, 1.0, 1.0])
///     .numeric("y", vec![1.0, 2.0, 4.0, 3.0, 6.0, 5.0, 9.0, 8.0])
///     .build()
///     .unwrap();
///
/// let fitted = LinearModel::new(var("a") + var("b"), var("y")).fit(&data).unwrap();
/// let table = anova_terms(&fitted).unwrap();
///
/// let explained: f64 = table.terms().map(|row| row.ss).sum();
/// assert!((explained - table.regression().unwrap().ss).abs() < 1e-9);
/// ```
pub fn anova_terms(fitted: &FittedLinearModel) -> Result<AnovaTable, ModelError> {
    let result = fitted.result();
    let mse = result.mse;
    let df_error = result.residual_df();

    let mut rows = Vec::new();
    rows.push(AnovaRow {
        source: REGRESSION.to_string(),
        df: result.model_df(),
        ss: result.ssr,
        ms: mean_square(result.ssr, result.model_df()),
        f_value: result.f_statistic,
        p_value: result.f_pvalue,
    });

    let terms = fitted.explanatory().terms();
    for (k, term) in terms.iter().enumerate() {
        if matches!(term, Expr::Constant(_)) {
            continue;
        }
        let remaining: Vec<Expr> = terms
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != k)
            .map(|(_, t)| t.clone())
            .collect();
        let reduced = fitted.refit(Expr::from_terms(remaining))?;

        let df = result.n_parameters.saturating_sub(reduced.result().n_parameters);
        let ss = reduced.result().sse - result.sse;
        let f_value = extra_ss_f(ss, df, mse);
        tracing::debug!(term = %term, df, ss, "marginal refit");

        rows.push(AnovaRow {
            source: term_source(&term.to_string()),
            df,
            ss,
            ms: mean_square(ss, df),
            f_value,
            p_value: f_test_pvalue(f_value, df as f64, df_error as f64),
        });
    }

    rows.push(AnovaRow {
        source: ERROR.to_string(),
        df: df_error,
        ss: result.sse,
        ms: mse,
        f_value: f64::NAN,
        p_value: f64::NAN,
    });
    rows.push(AnovaRow {
        source: TOTAL.to_string(),
        df: result.n_observations.saturating_sub(1),
        ss: result.sst,
        ms: f64::NAN,
        f_value: f64::NAN,
        p_value: f64::NAN,
    });

    Ok(AnovaTable { rows })
}

fn mean_square(ss: f64, df: usize) -> f64 {
    if df == 0 {
        f64::NAN
    } else {
        ss / df as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Dataset;
    use crate::model::LinearModel;
    use crate::terms::{cat, quant};

    #[test]
    fn test_term_rows_match_refits() {
        let data = Dataset::builder()
            .numeric("x", vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0])
            .categorical("g", ["a", "b", "c", "a", "b", "c", "a", "b"])
            .numeric("y", vec![1.2, 2.9, 4.1, 3.8, 6.2, 7.1, 6.8, 9.3])
            .build()
            .unwrap();
        let fitted = LinearModel::new(quant("x") + cat("g"), quant("y")).fit(&data).unwrap();
        let table = anova_terms(&fitted).unwrap();

        let without_g = LinearModel::new(quant("x"), quant("y")).fit(&data).unwrap();
        let g = table.term("g").unwrap();
        assert_eq!(g.df, 2);
        assert!((g.ss - (without_g.result().sse - fitted.result().sse)).abs() < 1e-10);

        assert!(table.error().unwrap().f_value.is_nan());
        assert!(table.total().unwrap().ms.is_nan());
        assert_eq!(table.total().unwrap().df, 7);
        assert_eq!(table.rows.len(), 5);
    }
}
