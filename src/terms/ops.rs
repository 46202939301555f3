//! `+`, `-` and `*` over terms.
//!
//! `+` unions additive terms in order, dropping duplicates and zero constants.
//! `-` removes terms; subtracting any constant removes the constant.
//! `*` distributes over sums; a non-zero constant factor is the identity.

use super::expr::{Categorical, Combination, Constant, Expr, Interaction, Quantitative, Var};
use std::ops::{Add, Mul, Sub};

impl From<Constant> for Expr {
    fn from(c: Constant) -> Self {
        Expr::Constant(c)
    }
}

impl From<f64> for Expr {
    fn from(v: f64) -> Self {
        Expr::Constant(Constant(v))
    }
}

impl From<Var> for Expr {
    fn from(v: Var) -> Self {
        Expr::Var(v)
    }
}

impl From<Quantitative> for Expr {
    fn from(q: Quantitative) -> Self {
        Expr::Quantitative(q)
    }
}

impl From<Categorical> for Expr {
    fn from(c: Categorical) -> Self {
        Expr::Categorical(c)
    }
}

impl From<Interaction> for Expr {
    fn from(i: Interaction) -> Self {
        Expr::Interaction(i)
    }
}

impl From<Combination> for Expr {
    fn from(c: Combination) -> Self {
        Expr::from_terms(c.terms)
    }
}

fn is_constant(expr: &Expr) -> bool {
    matches!(expr, Expr::Constant(_))
}

fn push_term(terms: &mut Vec<Expr>, term: Expr) {
    let skip = match &term {
        Expr::Constant(c) => c.0 == 0.0 || terms.iter().any(is_constant),
        _ => terms.contains(&term),
    };
    if !skip {
        terms.push(term);
    }
}

fn additive(expr: Expr) -> Vec<Expr> {
    match expr {
        Expr::Combination(c) => c.terms,
        other => other.terms(),
    }
}

fn factors(term: &Expr) -> Vec<Expr> {
    match term {
        Expr::Interaction(i) if i.transformation.is_identity() => i.factors.clone(),
        other => vec![other.clone()],
    }
}

fn multiply_terms(left: &Expr, right: &Expr) -> Expr {
    match (left, right) {
        (Expr::Constant(a), Expr::Constant(b)) => Expr::Constant(Constant(a.0 * b.0)),
        (Expr::Constant(_), term) | (term, Expr::Constant(_)) => term.clone(),
        _ => {
            let mut merged: Vec<Expr> = Vec::new();
            for factor in factors(left).into_iter().chain(factors(right)) {
                if !merged.contains(&factor) {
                    merged.push(factor);
                }
            }
            if merged.len() == 1 {
                merged.remove(0)
            } else {
                Expr::Interaction(Interaction::new(merged))
            }
        }
    }
}

/// Union of additive terms.
pub fn add_exprs(left: Expr, right: Expr) -> Expr {
    let mut terms = Vec::new();
    for term in additive(left).into_iter().chain(additive(right)) {
        push_term(&mut terms, term);
    }
    Expr::from_terms(terms)
}

/// `left` without the additive terms of `right`.
pub fn sub_exprs(left: Expr, right: Expr) -> Expr {
    let removals = additive(right);
    let terms = additive(left)
        .into_iter()
        .filter(|t| !removals.iter().any(|r| r == t || (is_constant(r) && is_constant(t))))
        .collect();
    Expr::from_terms(terms)
}

/// Distributed product; every pair of additive terms forms an interaction.
pub fn mul_exprs(left: Expr, right: Expr) -> Expr {
    let left = additive(left);
    let right = additive(right);
    let mut terms = Vec::new();
    for l in &left {
        for r in &right {
            push_term(&mut terms, multiply_terms(l, r));
        }
    }
    Expr::from_terms(terms)
}

macro_rules! term_ops {
    ($($ty:ty),*) => {
        $(
            impl<R: Into<Expr>> Add<R> for $ty {
                type Output = Expr;

                fn add(self, rhs: R) -> Expr {
                    add_exprs(self.into(), rhs.into())
                }
            }

            impl<R: Into<Expr>> Sub<R> for $ty {
                type Output = Expr;

                fn sub(self, rhs: R) -> Expr {
                    sub_exprs(self.into(), rhs.into())
                }
            }

            impl<R: Into<Expr>> Mul<R> for $ty {
                type Output = Expr;

                fn mul(self, rhs: R) -> Expr {
                    mul_exprs(self.into(), rhs.into())
                }
            }
        )*
    };
}

term_ops!(Expr, Constant, Var, Quantitative, Categorical, Interaction, Combination);

impl Add<Expr> for f64 {
    type Output = Expr;

    fn add(self, rhs: Expr) -> Expr {
        add_exprs(self.into(), rhs)
    }
}

impl Sub<Expr> for f64 {
    type Output = Expr;

    fn sub(self, rhs: Expr) -> Expr {
        sub_exprs(self.into(), rhs)
    }
}

impl Mul<Expr> for f64 {
    type Output = Expr;

    fn mul(self, rhs: Expr) -> Expr {
        mul_exprs(self.into(), rhs)
    }
}
