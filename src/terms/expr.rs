//! Symbolic model terms.
//!
//! An [`Expr`] is a closed sum of term kinds. Untyped [`Var`]s are resolved
//! against a dataset by [`Expr::interpret`]; the resolved tree is what the
//! design matrix builder evaluates.

use super::transform::{Transform, Transformation};
use crate::core::{Column, Dataset};
use crate::design::{DesignError, EncodingCache, FactorId};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A fixed numeric column. A non-zero constant in an explanatory expression
/// requests an intercept.
#[derive(Debug, Clone, Copy)]
pub struct Constant(pub f64);

impl Constant {
    fn key(&self) -> u64 {
        if self.0 == 0.0 {
            0.0_f64.to_bits()
        } else {
            self.0.to_bits()
        }
    }
}

impl PartialEq for Constant {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Constant {}

impl Hash for Constant {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

/// A variable whose kind is decided by the column it names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Var {
    pub name: String,
    pub transformation: Transformation,
}

/// A numeric column, transformed as `f((x + shift) * coefficient)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Quantitative {
    pub name: String,
    pub transformation: Transformation,
}

/// How a categorical column is turned into numeric columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Encoding {
    /// One indicator column per level.
    #[default]
    OneHot,
}

/// A discrete column.
///
/// Without declared levels the levels are inferred from the data at fit time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Categorical {
    pub name: String,
    pub levels: Option<Vec<String>>,
    pub encoding: Encoding,
}

impl Categorical {
    /// Categorical term with inferred levels.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            levels: None,
            encoding: Encoding::OneHot,
        }
    }

    /// Declare the level set and its order.
    pub fn with_levels<I, S>(mut self, levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.levels = Some(levels.into_iter().map(Into::into).collect());
        self
    }

    /// Key of this factor in an [`EncodingCache`].
    pub fn factor_id(&self) -> FactorId {
        FactorId {
            column: self.name.clone(),
            declared: self.levels.clone(),
        }
    }
}

/// Elementwise product of two or more factors.
///
/// Equality and hashing ignore factor order, so `a:b == b:a`.
#[derive(Debug, Clone)]
pub struct Interaction {
    pub factors: Vec<Expr>,
    pub transformation: Transformation,
}

impl Interaction {
    /// Interaction of the given factors with no transformation.
    pub fn new(factors: Vec<Expr>) -> Self {
        Self {
            factors,
            transformation: Transformation::default(),
        }
    }

    /// Label of the untransformed product, `{a}{b}`.
    pub fn product_label(&self) -> String {
        self.factors.iter().map(|f| braced(&f.to_string())).collect()
    }
}

impl PartialEq for Interaction {
    fn eq(&self, other: &Self) -> bool {
        self.transformation == other.transformation && same_members(&self.factors, &other.factors)
    }
}

impl Eq for Interaction {}

impl Hash for Interaction {
    fn hash<H: Hasher>(&self, state: &mut H) {
        unordered_hash(&self.factors, state);
        self.transformation.hash(state);
    }
}

/// Additive group of terms. Order is kept for evaluation but ignored by equality.
#[derive(Debug, Clone, Default)]
pub struct Combination {
    pub terms: Vec<Expr>,
}

impl PartialEq for Combination {
    fn eq(&self, other: &Self) -> bool {
        same_members(&self.terms, &other.terms)
    }
}

impl Eq for Combination {}

impl Hash for Combination {
    fn hash<H: Hasher>(&self, state: &mut H) {
        unordered_hash(&self.terms, state);
    }
}

/// A model term expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Constant(Constant),
    Var(Var),
    Quantitative(Quantitative),
    Categorical(Categorical),
    Interaction(Interaction),
    Combination(Combination),
    /// Collapses the columns of the inner expression into their row sums.
    Identity(Box<Expr>),
}

/// Result of [`Expr::reduce`]: the distinct base variables of an expression.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReducedTerms {
    pub quantitative: Vec<Quantitative>,
    pub categorical: Vec<Categorical>,
    pub constant: Option<Constant>,
    pub unresolved: Vec<Var>,
}

impl ReducedTerms {
    /// Rebuild an additive expression from the partition.
    pub fn to_expr(&self) -> Expr {
        let mut terms: Vec<Expr> = Vec::new();
        terms.extend(self.constant.map(Expr::Constant));
        terms.extend(self.quantitative.iter().cloned().map(Expr::Quantitative));
        terms.extend(self.categorical.iter().cloned().map(Expr::Categorical));
        terms.extend(self.unresolved.iter().cloned().map(Expr::Var));
        Expr::from_terms(terms)
    }

    fn collect(&mut self, expr: &Expr) {
        match expr {
            Expr::Constant(c) => {
                if c.0 != 0.0 && self.constant.is_none() {
                    self.constant = Some(*c);
                }
            }
            Expr::Var(v) => push_unique(&mut self.unresolved, v),
            Expr::Quantitative(q) => push_unique(&mut self.quantitative, q),
            Expr::Categorical(c) => push_unique(&mut self.categorical, c),
            Expr::Interaction(i) => i.factors.iter().for_each(|f| self.collect(f)),
            Expr::Combination(c) => c.terms.iter().for_each(|t| self.collect(t)),
            Expr::Identity(inner) => self.collect(inner),
        }
    }
}

impl Expr {
    /// Build an expression from additive terms, unwrapping a single term.
    pub fn from_terms(mut terms: Vec<Expr>) -> Expr {
        if terms.len() == 1 {
            terms.remove(0)
        } else {
            Expr::Combination(Combination { terms })
        }
    }

    /// The empty expression (no columns).
    pub fn empty() -> Expr {
        Expr::Combination(Combination::default())
    }

    /// Elementary additive terms in declaration order.
    pub fn terms(&self) -> Vec<Expr> {
        match self {
            Expr::Combination(c) => c.terms.clone(),
            Expr::Constant(c) if c.0 == 0.0 => Vec::new(),
            other => vec![other.clone()],
        }
    }

    /// Additive terms other than constants.
    pub fn non_constant_terms(&self) -> Vec<Expr> {
        self.terms()
            .into_iter()
            .filter(|t| !matches!(t, Expr::Constant(_)))
            .collect()
    }

    /// The non-zero constant among the additive terms, if any.
    pub fn constant(&self) -> Option<f64> {
        self.terms().iter().find_map(|t| match t {
            Expr::Constant(c) if c.0 != 0.0 => Some(c.0),
            _ => None,
        })
    }

    /// Partition into distinct quantitative and categorical variables.
    pub fn reduce(&self) -> ReducedTerms {
        let mut reduced = ReducedTerms::default();
        reduced.collect(self);
        reduced
    }

    /// Degrees of freedom the expression consumes.
    ///
    /// Categorical terms need their level count from `cache` or from declared
    /// levels; `None` is returned while that is unknown or a [`Var`] is unresolved.
    pub fn dof(&self, cache: &EncodingCache) -> Option<usize> {
        match self {
            Expr::Constant(c) => Some(usize::from(c.0 != 0.0)),
            Expr::Var(_) => None,
            Expr::Quantitative(_) | Expr::Identity(_) => Some(1),
            Expr::Categorical(c) => {
                let n_levels = match cache.levels(&c.factor_id()) {
                    Some(levels) => levels.len(),
                    None => c.levels.as_ref()?.len(),
                };
                Some(n_levels.saturating_sub(1))
            }
            Expr::Interaction(i) => i.factors.iter().map(|f| f.dof(cache)).product(),
            Expr::Combination(c) => c.terms.iter().map(|t| t.dof(cache)).sum(),
        }
    }

    /// Resolve every [`Var`] against `data`, checking every referenced column exists.
    pub fn interpret(&self, data: &Dataset) -> Result<Expr, DesignError> {
        Ok(match self {
            Expr::Constant(c) => Expr::Constant(*c),
            Expr::Var(v) => match data.require(&v.name)? {
                Column::Numeric(_) => Expr::Quantitative(Quantitative {
                    name: v.name.clone(),
                    transformation: v.transformation,
                }),
                Column::Categorical(_) if v.transformation.is_identity() => {
                    Expr::Categorical(Categorical::new(v.name.clone()))
                }
                Column::Categorical(_) => {
                    return Err(DesignError::UnsupportedTerm(self.to_string()));
                }
            },
            Expr::Quantitative(q) => {
                data.require(&q.name)?;
                Expr::Quantitative(q.clone())
            }
            Expr::Categorical(c) => {
                data.require(&c.name)?;
                Expr::Categorical(c.clone())
            }
            Expr::Interaction(i) => Expr::Interaction(Interaction {
                factors: i
                    .factors
                    .iter()
                    .map(|f| f.interpret(data))
                    .collect::<Result<_, _>>()?,
                transformation: i.transformation,
            }),
            Expr::Combination(c) => Expr::Combination(Combination {
                terms: c
                    .terms
                    .iter()
                    .map(|t| t.interpret(data))
                    .collect::<Result<_, _>>()?,
            }),
            Expr::Identity(inner) => Expr::Identity(Box::new(inner.interpret(data)?)),
        })
    }

    /// Column names referenced by the expression, first occurrence first.
    pub fn variables(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_variables(&mut names);
        names
    }

    fn collect_variables(&self, names: &mut Vec<String>) {
        match self {
            Expr::Constant(_) => {}
            Expr::Var(v) => push_unique(names, &v.name),
            Expr::Quantitative(q) => push_unique(names, &q.name),
            Expr::Categorical(c) => push_unique(names, &c.name),
            Expr::Interaction(i) => i.factors.iter().for_each(|f| f.collect_variables(names)),
            Expr::Combination(c) => c.terms.iter().for_each(|t| t.collect_variables(names)),
            Expr::Identity(inner) => inner.collect_variables(names),
        }
    }

    /// The transformation of a single transformable term.
    pub fn transformation(&self) -> Option<&Transformation> {
        match self {
            Expr::Var(v) => Some(&v.transformation),
            Expr::Quantitative(q) => Some(&q.transformation),
            Expr::Interaction(i) => Some(&i.transformation),
            _ => None,
        }
    }

    /// Map a value on the transformed scale back to the raw scale.
    pub fn untransform(&self, v: f64) -> f64 {
        self.transformation().map_or(v, |t| t.untransform(v))
    }

    /// Name of the term on the raw scale, e.g. `y` for `log(y)`.
    pub fn untransform_name(&self) -> String {
        match self {
            Expr::Var(v) => v.name.clone(),
            Expr::Quantitative(q) => q.name.clone(),
            Expr::Interaction(i) => i.product_label(),
            other => other.to_string(),
        }
    }
}

/// Untyped variable resolved by [`Expr::interpret`].
pub fn var(name: impl Into<String>) -> Var {
    Var {
        name: name.into(),
        transformation: Transformation::default(),
    }
}

/// Quantitative (numeric) variable.
pub fn quant(name: impl Into<String>) -> Quantitative {
    Quantitative {
        name: name.into(),
        transformation: Transformation::default(),
    }
}

/// Categorical variable with levels inferred from the data.
pub fn cat(name: impl Into<String>) -> Categorical {
    Categorical::new(name)
}

/// Constant term; `constant(1.0)` requests an intercept.
pub fn constant(value: f64) -> Constant {
    Constant(value)
}

/// Explicit collapse of a multi-column expression into one summed column.
pub fn identity(expr: impl Into<Expr>) -> Expr {
    Expr::Identity(Box::new(expr.into()))
}

/// Terms that carry a [`Transformation`].
///
/// A second function replaces the first, except powers which compose.
/// `shift` and `scale` act on the raw value.
pub trait Transformable: Sized {
    fn transformation_mut(&mut self) -> &mut Transformation;

    fn with_transform(mut self, function: Transform) -> Self {
        let t = self.transformation_mut();
        *t = t.with_function(function);
        self
    }

    fn log(self) -> Self {
        self.with_transform(Transform::Log)
    }

    fn log10(self) -> Self {
        self.with_transform(Transform::Log10)
    }

    fn log2(self) -> Self {
        self.with_transform(Transform::Log2)
    }

    fn exp(self) -> Self {
        self.with_transform(Transform::Exp)
    }

    fn sqrt(self) -> Self {
        self.with_transform(Transform::Sqrt)
    }

    fn pow(self, p: f64) -> Self {
        self.with_transform(Transform::Power(p))
    }

    /// Add `s` to the raw value before the function.
    fn shift(mut self, s: f64) -> Self {
        self.transformation_mut().shift += s;
        self
    }

    /// Multiply the shifted value by `c` before the function.
    fn scale(mut self, c: f64) -> Self {
        self.transformation_mut().coefficient *= c;
        self
    }
}

impl Transformable for Var {
    fn transformation_mut(&mut self) -> &mut Transformation {
        &mut self.transformation
    }
}

impl Transformable for Quantitative {
    fn transformation_mut(&mut self) -> &mut Transformation {
        &mut self.transformation
    }
}

impl Transformable for Interaction {
    fn transformation_mut(&mut self) -> &mut Transformation {
        &mut self.transformation
    }
}

fn braced(label: &str) -> String {
    if label.starts_with('{') {
        label.to_string()
    } else {
        format!("{{{label}}}")
    }
}

fn push_unique<T: Clone + PartialEq>(items: &mut Vec<T>, item: &T) {
    if !items.contains(item) {
        items.push(item.clone());
    }
}

fn same_members(a: &[Expr], b: &[Expr]) -> bool {
    a.len() == b.len() && a.iter().all(|x| b.contains(x)) && b.iter().all(|x| a.contains(x))
}

fn unordered_hash<H: Hasher>(items: &[Expr], state: &mut H) {
    let mut hashes: Vec<u64> = items
        .iter()
        .map(|item| {
            let mut hasher = DefaultHasher::new();
            item.hash(&mut hasher);
            hasher.finish()
        })
        .collect();
    hashes.sort_unstable();
    hashes.hash(state);
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.transformation.label(&self.name))
    }
}

impl fmt::Display for Quantitative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.transformation.label(&self.name))
    }
}

impl fmt::Display for Categorical {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Display for Interaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.transformation.label(&self.product_label()))
    }
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return f.write_str("0");
        }
        for (i, term) in self.terms.iter().enumerate() {
            if i > 0 {
                f.write_str(" + ")?;
            }
            write!(f, "{term}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Constant(c) => fmt::Display::fmt(c, f),
            Expr::Var(v) => fmt::Display::fmt(v, f),
            Expr::Quantitative(q) => fmt::Display::fmt(q, f),
            Expr::Categorical(c) => fmt::Display::fmt(c, f),
            Expr::Interaction(i) => fmt::Display::fmt(i, f),
            Expr::Combination(c) => fmt::Display::fmt(c, f),
            Expr::Identity(inner) => write!(f, "identity({inner})"),
        }
    }
}
