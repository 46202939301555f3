//! Matrix utility functions.

use crate::solvers::RegressionError;
use faer::{Col, Mat};

/// Center a matrix by subtracting column means.
pub fn center_columns(x: &Mat<f64>) -> (Mat<f64>, Col<f64>) {
    let n_rows = x.nrows();
    let n_cols = x.ncols();

    let mut means = Col::zeros(n_cols);
    let mut centered = Mat::zeros(n_rows, n_cols);

    for j in 0..n_cols {
        let sum: f64 = (0..n_rows).map(|i| x[(i, j)]).sum();
        means[j] = sum / n_rows as f64;

        for i in 0..n_rows {
            centered[(i, j)] = x[(i, j)] - means[j];
        }
    }

    (centered, means)
}

/// Center a vector by subtracting the mean.
pub fn center_vector(y: &Col<f64>) -> (Col<f64>, f64) {
    let n = y.nrows();
    let mean: f64 = y.iter().sum::<f64>() / n as f64;

    let centered = Col::from_fn(n, |i| y[i] - mean);

    (centered, mean)
}

/// Gram matrix `X'X`.
pub fn gram(x: &Mat<f64>) -> Mat<f64> {
    let p = x.ncols();
    let mut xtx = Mat::zeros(p, p);
    for a in 0..p {
        for b in a..p {
            let dot: f64 = (0..x.nrows()).map(|i| x[(i, a)] * x[(i, b)]).sum();
            xtx[(a, b)] = dot;
            xtx[(b, a)] = dot;
        }
    }
    xtx
}

/// Cross product `X'y`.
pub fn xt_y(x: &Mat<f64>, y: &Col<f64>) -> Col<f64> {
    Col::from_fn(x.ncols(), |j| (0..x.nrows()).map(|i| x[(i, j)] * y[i]).sum())
}

/// Quadratic form `v' A v`.
pub fn quadratic_form(v: &Col<f64>, a: &Mat<f64>) -> f64 {
    let p = v.nrows();
    let mut total = 0.0;
    for i in 0..p {
        let mut row = 0.0;
        for j in 0..p {
            row += a[(i, j)] * v[j];
        }
        total += v[i] * row;
    }
    total
}

/// Solve the normal equations `(X'X) β = X'y` exactly.
///
/// Returns the solution together with `(X'X)⁻¹`. See [`invert_symmetric`]
/// for how singularity is judged.
pub fn solve_normal_equations(
    xtx: &Mat<f64>,
    xty: &Col<f64>,
    tolerance: f64,
) -> Result<(Col<f64>, Mat<f64>), RegressionError> {
    let inverse = invert_symmetric(xtx, tolerance)?;
    let p = xtx.ncols();
    let beta = Col::from_fn(p, |i| (0..p).map(|j| inverse[(i, j)] * xty[j]).sum());
    Ok((beta, inverse))
}

/// Inverse of a symmetric positive semi-definite matrix via QR.
///
/// The matrix is first scaled to unit diagonal, `S = D^-1/2 A D^-1/2`, so the
/// rank test does not depend on column units or order. It is singular when a
/// diagonal entry is not positive or a diagonal entry of R from the QR of `S`
/// is below `tolerance` relative to the largest one.
pub fn invert_symmetric(matrix: &Mat<f64>, tolerance: f64) -> Result<Mat<f64>, RegressionError> {
    let n = matrix.nrows();
    if n == 0 {
        return Ok(Mat::zeros(0, 0));
    }

    let scale: Vec<f64> = (0..n).map(|i| matrix[(i, i)].sqrt()).collect();
    if scale.iter().any(|s| !(*s > 0.0) || !s.is_finite()) {
        return Err(RegressionError::SingularMatrix);
    }
    let scaled = Mat::from_fn(n, n, |i, j| matrix[(i, j)] / (scale[i] * scale[j]));

    let qr = scaled.qr();
    let q = qr.compute_Q();
    let r = qr.R();

    let max_pivot = (0..n).map(|i| r[(i, i)].abs()).fold(0.0_f64, f64::max);
    if !(max_pivot > 0.0) {
        return Err(RegressionError::SingularMatrix);
    }
    for i in 0..n {
        if r[(i, i)].abs() < tolerance * max_pivot {
            return Err(RegressionError::SingularMatrix);
        }
    }

    // Solve R * X = Q' for each column of identity to get S⁻¹
    let mut inv = Mat::zeros(n, n);
    let qt = q.transpose();

    for col in 0..n {
        for i in (0..n).rev() {
            let mut sum = qt[(i, col)];
            for j in (i + 1)..n {
                sum -= r[(i, j)] * inv[(j, col)];
            }
            inv[(i, col)] = sum / r[(i, i)];
        }
    }

    Ok(Mat::from_fn(n, n, |i, j| inv[(i, j)] / (scale[i] * scale[j])))
}

/// Expand `(Xc'Xc)⁻¹` of centered data into `(X_aug'X_aug)⁻¹` for `[1 | X]`.
///
/// With `C = (Xc'Xc)⁻¹` and column means `m`, the inverse is
/// `[[1/n + m'Cm, -(Cm)'], [-Cm, C]]`.
pub fn augmented_inverse(centered_inverse: &Mat<f64>, means: &Col<f64>, n: usize) -> Mat<f64> {
    let p = centered_inverse.nrows();
    let cm = Col::from_fn(p, |i| (0..p).map(|j| centered_inverse[(i, j)] * means[j]).sum::<f64>());
    let mcm: f64 = (0..p).map(|i| means[i] * cm[i]).sum();

    Mat::from_fn(p + 1, p + 1, |i, j| match (i, j) {
        (0, 0) => 1.0 / n as f64 + mcm,
        (0, j) => -cm[j - 1],
        (i, 0) => -cm[i - 1],
        (i, j) => centered_inverse[(i - 1, j - 1)],
    })
}
