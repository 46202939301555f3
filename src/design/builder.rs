//! Evaluation of term expressions into numeric design matrices.

use super::error::DesignError;
use super::levels::{resolve_levels, EncodingCache};
use crate::core::Dataset;
use crate::terms::{Categorical, Expr, Interaction};
use faer::{Col, Mat};

/// Numeric matrix with one named column per encoded term column.
#[derive(Debug, Clone)]
pub struct DesignMatrix {
    pub names: Vec<String>,
    pub values: Mat<f64>,
}

impl DesignMatrix {
    /// A matrix with `n_rows` rows and no columns.
    pub fn empty(n_rows: usize) -> Self {
        Self {
            names: Vec::new(),
            values: Mat::zeros(n_rows, 0),
        }
    }

    fn from_columns(n_rows: usize, columns: Columns) -> Self {
        let values = Mat::from_fn(n_rows, columns.len(), |i, j| columns[j].1[i]);
        Self {
            names: columns.into_iter().map(|(name, _)| name).collect(),
            values,
        }
    }

    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.values.ncols()
    }

    /// Copy of column `j`.
    pub fn column(&self, j: usize) -> Col<f64> {
        Col::from_fn(self.nrows(), |i| self.values[(i, j)])
    }

    /// Copy of the column called `name`.
    pub fn column_by_name(&self, name: &str) -> Option<Col<f64>> {
        self.names.iter().position(|n| n == name).map(|j| self.column(j))
    }

    /// Reorder to exactly `names`; absent columns are zero and extra columns are dropped.
    pub fn align(&self, names: &[String]) -> DesignMatrix {
        let positions: Vec<Option<usize>> = names
            .iter()
            .map(|name| self.names.iter().position(|n| n == name))
            .collect();
        let values = Mat::from_fn(self.nrows(), names.len(), |i, j| match positions[j] {
            Some(source) => self.values[(i, source)],
            None => 0.0,
        });
        DesignMatrix {
            names: names.to_vec(),
            values,
        }
    }
}

/// How categorical levels and interaction collapses are decided.
#[derive(Debug)]
pub enum EvalMode<'a> {
    /// Resolve levels from the data and record every decision in the cache.
    Fit(&'a mut EncodingCache),
    /// Replay the decisions of a fit; all levels of each factor are encoded.
    Predict(&'a EncodingCache),
}

impl EvalMode<'_> {
    fn is_fit(&self) -> bool {
        matches!(self, EvalMode::Fit(_))
    }
}

type Columns = Vec<(String, Vec<f64>)>;

/// Evaluate an interpreted expression against `data`.
///
/// In fit mode top-level categorical terms drop their first level. Inside an
/// interaction every level is kept; a fitted interaction then loses its
/// all-zero columns and, when more than one column survives, its first.
/// In predict mode nothing is dropped; align the result to the fitted
/// column names with [`DesignMatrix::align`].
pub fn evaluate(expr: &Expr, data: &Dataset, mode: &mut EvalMode<'_>) -> Result<DesignMatrix, DesignError> {
    let columns = eval(expr, data, mode, true)?;
    Ok(DesignMatrix::from_columns(data.n_rows(), columns))
}

fn eval(expr: &Expr, data: &Dataset, mode: &mut EvalMode<'_>, top_level: bool) -> Result<Columns, DesignError> {
    let n = data.n_rows();
    match expr {
        Expr::Constant(c) if c.0 == 0.0 => Ok(Vec::new()),
        Expr::Constant(c) => {
            let name = if c.0 == 1.0 {
                "Intercept".to_string()
            } else {
                c.to_string()
            };
            Ok(vec![(name, vec![c.0; n])])
        }
        Expr::Var(v) => Err(DesignError::UnresolvedTerm(v.name.clone())),
        Expr::Quantitative(q) => {
            let values = data.numeric(&q.name)?;
            let transformed = values.iter().map(|&v| q.transformation.apply(v)).collect();
            Ok(vec![(q.to_string(), transformed)])
        }
        Expr::Categorical(c) => eval_categorical(c, data, mode, top_level),
        Expr::Interaction(i) => eval_interaction(i, data, mode, top_level),
        Expr::Combination(c) => {
            let mut columns = Vec::new();
            for term in &c.terms {
                columns.extend(eval(term, data, mode, top_level)?);
            }
            Ok(columns)
        }
        Expr::Identity(inner) => {
            let mut sum = vec![0.0; n];
            for (_, values) in eval(inner, data, mode, top_level)? {
                for (total, v) in sum.iter_mut().zip(values) {
                    *total += v;
                }
            }
            Ok(vec![(expr.to_string(), sum)])
        }
    }
}

fn eval_categorical(
    c: &Categorical,
    data: &Dataset,
    mode: &mut EvalMode<'_>,
    top_level: bool,
) -> Result<Columns, DesignError> {
    let labels = data.require(&c.name)?.labels();
    let id = c.factor_id();

    let levels = match mode {
        EvalMode::Fit(cache) => match cache.levels(&id).cloned() {
            Some(levels) => levels,
            None => {
                let resolved = resolve_levels(&labels, c.levels.as_deref());
                cache.insert_levels(id, resolved.clone());
                resolved
            }
        },
        EvalMode::Predict(cache) => cache
            .levels(&id)
            .cloned()
            .ok_or_else(|| DesignError::UnfittedFactor(c.name.clone()))?,
    };

    let codes = labels
        .iter()
        .map(|label| levels.encode(&c.name, label))
        .collect::<Result<Vec<_>, _>>()?;

    let mut columns: Columns = levels
        .levels
        .iter()
        .enumerate()
        .map(|(k, level)| {
            let indicator = codes.iter().map(|&code| if code == k { 1.0 } else { 0.0 }).collect();
            (format!("{}::{}", c.name, level), indicator)
        })
        .collect();

    if top_level && mode.is_fit() && !columns.is_empty() {
        columns.remove(0);
    }
    Ok(columns)
}

fn braced(label: &str) -> String {
    if label.starts_with('{') {
        label.to_string()
    } else {
        format!("{{{label}}}")
    }
}

fn eval_interaction(
    interaction: &Interaction,
    data: &Dataset,
    mode: &mut EvalMode<'_>,
    top_level: bool,
) -> Result<Columns, DesignError> {
    let mut product: Option<Columns> = None;
    for factor in &interaction.factors {
        let columns = eval(factor, data, mode, false)?;
        product = Some(match product {
            None => columns.into_iter().map(|(name, v)| (braced(&name), v)).collect(),
            Some(prior) => {
                let mut crossed = Vec::with_capacity(prior.len() * columns.len());
                for (prior_name, prior_values) in &prior {
                    for (name, values) in &columns {
                        let values = prior_values.iter().zip(values).map(|(a, b)| a * b).collect();
                        crossed.push((format!("{prior_name}{}", braced(name)), values));
                    }
                }
                crossed
            }
        });
    }
    let mut product = product.unwrap_or_default();

    let transformation = interaction.transformation;
    let transform = |columns: Columns| -> Columns {
        columns
            .into_iter()
            .map(|(name, values)| {
                let values = values.into_iter().map(|v| transformation.apply(v)).collect();
                (transformation.label(&name), values)
            })
            .collect()
    };

    if !top_level {
        return Ok(transform(product));
    }

    match mode {
        EvalMode::Fit(cache) => {
            product.retain(|(_, values)| values.iter().any(|&v| v != 0.0));
            match product.len() {
                0 => Ok(product),
                1 => {
                    cache.mark_collapsed(interaction.clone());
                    Ok(transform(product))
                }
                _ => {
                    product.remove(0);
                    Ok(product)
                }
            }
        }
        EvalMode::Predict(cache) if cache.is_collapsed(interaction) => Ok(transform(product)),
        EvalMode::Predict(_) => Ok(product),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terms::{cat, quant, Transformable};

    fn data() -> Dataset {
        Dataset::builder()
            .numeric("x", vec![1.0, 2.0, 3.0, 4.0])
            .numeric("z", vec![0.5, 0.0, 1.0, 2.0])
            .categorical("g", ["a", "b", "c", "a"])
            .build()
            .unwrap()
    }

    #[test]
    fn test_quantitative_transform() {
        let mut cache = EncodingCache::default();
        let expr: Expr = quant("x").pow(2.0).into();
        let design = evaluate(&expr, &data(), &mut EvalMode::Fit(&mut cache)).unwrap();

        assert_eq!(design.names, vec!["x^2"]);
        assert_eq!(design.values[(3, 0)], 16.0);
    }

    #[test]
    fn test_categorical_fit_drops_first_level() {
        let mut cache = EncodingCache::default();
        let expr: Expr = cat("g").into();
        let design = evaluate(&expr, &data(), &mut EvalMode::Fit(&mut cache)).unwrap();

        assert_eq!(design.names, vec!["g::b", "g::c"]);
        assert_eq!(design.values[(1, 0)], 1.0);
        assert_eq!(design.values[(3, 0)], 0.0);
    }

    #[test]
    fn test_predict_keeps_all_levels_and_aligns() {
        let mut cache = EncodingCache::default();
        let expr: Expr = cat("g").into();
        let fitted = evaluate(&expr, &data(), &mut EvalMode::Fit(&mut cache)).unwrap();

        let new_data = Dataset::builder().categorical("g", ["c", "a"]).build().unwrap();
        let design = evaluate(&expr, &new_data, &mut EvalMode::Predict(&cache)).unwrap();
        assert_eq!(design.names, vec!["g::a", "g::b", "g::c"]);

        let aligned = design.align(&fitted.names);
        assert_eq!(aligned.names, fitted.names);
        assert_eq!(aligned.values[(0, 1)], 1.0);
        assert_eq!(aligned.values[(1, 0)], 0.0);
    }

    #[test]
    fn test_quantitative_interaction_is_collapsed() {
        let mut cache = EncodingCache::default();
        let Expr::Interaction(interaction) = quant("x") * quant("z") else {
            panic!("expected interaction");
        };
        let expr = Expr::Interaction(interaction.clone().log());
        let design = evaluate(&expr, &data(), &mut EvalMode::Fit(&mut cache)).unwrap();

        assert_eq!(design.names, vec!["log({x}{z})"]);
        assert!((design.values[(2, 0)] - 3.0_f64.ln()).abs() < 1e-12);
        assert!(cache.is_collapsed(&interaction.log()));
    }

    #[test]
    fn test_unresolved_var_fails() {
        let mut cache = EncodingCache::default();
        let expr: Expr = crate::terms::var("x").into();
        let result = evaluate(&expr, &data(), &mut EvalMode::Fit(&mut cache));
        assert!(matches!(result, Err(DesignError::UnresolvedTerm(_))));
    }
}
