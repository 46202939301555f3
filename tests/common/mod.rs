//! Common test utilities and data generators.

#![allow(dead_code)]

use linmod::core::Dataset;

/// Deterministic values in [-1, 1) from a linear congruential generator.
pub fn noise(n: usize, seed: u64) -> Vec<f64> {
    let mut state = seed;
    (0..n)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            ((state >> 33) as f64) / (u32::MAX as f64) * 2.0 - 1.0
        })
        .collect()
}

/// `{x: 1..=5, y: 2x}`.
pub fn exact_line() -> Dataset {
    Dataset::builder()
        .numeric("x", vec![1.0, 2.0, 3.0, 4.0, 5.0])
        .numeric("y", vec![2.0, 4.0, 6.0, 8.0, 10.0])
        .build()
        .unwrap()
}

/// `y = intercept + 1·x1 + 2·x2 + ... + noise_std · noise` with numeric columns `x1..xk`.
pub fn linear_data(n: usize, n_features: usize, intercept: f64, noise_std: f64, seed: u64) -> Dataset {
    let mut builder = Dataset::builder();
    let mut y = vec![intercept; n];
    for j in 0..n_features {
        let column = noise(n, seed + 1 + j as u64)
            .into_iter()
            .map(|v| 5.0 * v)
            .collect::<Vec<_>>();
        for (yi, xi) in y.iter_mut().zip(&column) {
            *yi += (j + 1) as f64 * xi;
        }
        builder = builder.numeric(format!("x{}", j + 1), column);
    }
    for (yi, e) in y.iter_mut().zip(noise(n, seed)) {
        *yi += noise_std * e;
    }
    builder.numeric("y", y).build().unwrap()
}

/// Balanced 2×2 design with factors coded ±1.
pub fn orthogonal_two_factor() -> Dataset {
    Dataset::builder()
        .numeric("a", vec![-1.0, -1.0, -1.0, -1.0, 1.0, 1.0, 1.0, 1.0])
        .numeric("b", vec![-1.0, -1.0, 1.0, 1.0, -1.0, -1.0, 1.0, 1.0])
        .numeric("y", vec![10.0, 12.0, 15.0, 17.0, 20.0, 22.0, 31.0, 29.0])
        .build()
        .unwrap()
}

/// Three groups with a numeric covariate.
pub fn grouped_data() -> Dataset {
    let groups = ["control", "low", "high"];
    let shift = [0.0, 1.5, 4.0];
    let e = noise(15, 7);
    let mut g = Vec::new();
    let mut x = Vec::new();
    let mut y = Vec::new();
    for i in 0..15 {
        let k = i % 3;
        let xi = i as f64 / 2.0;
        g.push(groups[k]);
        x.push(xi);
        y.push(1.0 + 0.8 * xi + shift[k] + 0.3 * e[i]);
    }
    Dataset::builder()
        .categorical("g", g)
        .numeric("x", x)
        .numeric("y", y)
        .build()
        .unwrap()
}
