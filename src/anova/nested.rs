use super::{extra_ss_f, f_test_pvalue};
use crate::model::{FittedLinearModel, ModelError};
use crate::terms::Expr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Extra sum of squares F-test of a reduced model against a full model.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NestedComparison {
    /// Formula of the larger model.
    pub full_model: String,
    /// Formula of the model whose terms the full model contains.
    pub reduced_model: String,
    pub full_df: usize,
    pub reduced_df: usize,
    pub full_sse: f64,
    pub reduced_sse: f64,
    /// Difference in parameter counts.
    pub df: usize,
    /// `SSE_reduced - SSE_full`.
    pub ss: f64,
    pub f_statistic: f64,
    pub p_value: f64,
}

/// Compare two fitted models, one of which contains the other.
///
/// Which model is the full one is detected from the term sets. The responses
/// must be equal, the observation counts must match, and one model's terms
/// (intercept included) must be a subset of the other's.
pub fn compare_models(
    first: &FittedLinearModel,
    second: &FittedLinearModel,
) -> Result<NestedComparison, ModelError> {
    if first.response() != second.response() {
        return Err(ModelError::ResponseMismatch {
            full: first.response().to_string(),
            reduced: second.response().to_string(),
        });
    }

    let n_first = first.result().n_observations;
    let n_second = second.result().n_observations;
    if n_first != n_second {
        return Err(ModelError::ObservationMismatch {
            full: n_first,
            reduced: n_second,
        });
    }

    let (full, reduced) = if contains(first, second) {
        (first, second)
    } else if contains(second, first) {
        (second, first)
    } else {
        return Err(ModelError::NotNested);
    };

    let full_result = full.result();
    let reduced_result = reduced.result();
    let df = full_result
        .n_parameters
        .saturating_sub(reduced_result.n_parameters);
    let ss = reduced_result.sse - full_result.sse;
    let f_statistic = extra_ss_f(ss, df, full_result.mse);

    Ok(NestedComparison {
        full_model: full.to_string(),
        reduced_model: reduced.to_string(),
        full_df: full_result.residual_df(),
        reduced_df: reduced_result.residual_df(),
        full_sse: full_result.sse,
        reduced_sse: reduced_result.sse,
        df,
        ss,
        f_statistic,
        p_value: f_test_pvalue(f_statistic, df as f64, full_result.residual_df() as f64),
    })
}

/// Whether `outer` has every term and the intercept of `inner`.
fn contains(outer: &FittedLinearModel, inner: &FittedLinearModel) -> bool {
    if inner.has_intercept() && !outer.has_intercept() {
        return false;
    }
    let outer_terms = outer.explanatory().non_constant_terms();
    inner
        .explanatory()
        .non_constant_terms()
        .iter()
        .all(|term: &Expr| outer_terms.contains(term))
}
