//! Design matrix construction from interpreted term expressions.

mod builder;
mod error;
mod levels;

pub use builder::{evaluate, DesignMatrix, EvalMode};
pub use error::DesignError;
pub use levels::{resolve_levels, EncodingCache, FactorId, FactorLevels, OTHER_LEVEL};
