//! Term algebra for model formulas.
//!
//! Terms are built with the constructor functions and combined with `+`, `-`
//! and `*`:
//!
//! ```
//! use linmod::terms::{cat, quant, Transformable};
//!
//! let expr = quant("x").log() + cat("group") * quant("z");
//! assert_eq!(expr.to_string(), "log(x) + {group}{z}");
//! ```

mod expr;
mod ops;
mod transform;

pub use expr::{
    cat, constant, identity, quant, var, Categorical, Combination, Constant, Encoding, Expr,
    Interaction, Quantitative, ReducedTerms, Transformable, Var,
};
pub use transform::{Transform, Transformation};
