//! Internal numeric helpers shared by the solver, inference and diagnostics.

mod matrix;

pub use matrix::{
    augmented_inverse, center_columns, center_vector, gram, invert_symmetric,
    quadratic_form, solve_normal_equations, xt_y,
};
