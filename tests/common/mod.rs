#![allow(dead_code)]

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Features uniform in [-1, 1], labels `X w* + noise`.
pub fn regression_data(n: usize, d: usize, seed: u64) -> (Array2<f64>, Array1<f64>, Array1<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let features = Array2::from_shape_fn((n, d), |_| rng.gen_range(-1.0..1.0));
    let w_star: Array1<f64> = (0..d).map(|k| (k as f64 + 1.0) * if k % 2 == 0 { 1.0 } else { -1.0 }).collect();
    let noise: Array1<f64> = (0..n).map(|_| rng.gen_range(-0.1..0.1)).collect();
    let labels = features.dot(&w_star) + noise;
    (features, labels, w_star)
}

/// Labels in {-1, +1} from a noisy linear rule.
pub fn classification_data(n: usize, d: usize, seed: u64) -> (Array2<f64>, Array1<f64>) {
    let (features, targets, _) = regression_data(n, d, seed);
    let mut rng = StdRng::seed_from_u64(seed + 1);
    let labels = targets.mapv(|t| {
        let flip = rng.gen_range(0.0..1.0) < 0.1;
        let y = if t >= 0.0 { 1.0 } else { -1.0 };
        if flip {
            -y
        } else {
            y
        }
    });
    (features, labels)
}

/// Dense Gaussian elimination with partial pivoting.
pub fn solve_linear(mut a: Array2<f64>, mut b: Array1<f64>) -> Array1<f64> {
    let d = b.len();
    for col in 0..d {
        let pivot = (col..d)
            .max_by(|&i, &j| a[[i, col]].abs().partial_cmp(&a[[j, col]].abs()).unwrap())
            .unwrap();
        for k in 0..d {
            a.swap([col, k], [pivot, k]);
        }
        b.swap(col, pivot);
        for row in col + 1..d {
            let factor = a[[row, col]] / a[[col, col]];
            for k in col..d {
                a[[row, k]] -= factor * a[[col, k]];
            }
            b[row] -= factor * b[col];
        }
    }
    let mut x = Array1::zeros(d);
    for row in (0..d).rev() {
        let tail: f64 = (row + 1..d).map(|k| a[[row, k]] * x[k]).sum();
        x[row] = (b[row] - tail) / a[[row, row]];
    }
    x
}

/// Minimizer of `(1/2n) ‖y − X w‖² + (λ/2) ‖w‖²`.
pub fn ridge_solution(features: &Array2<f64>, labels: &Array1<f64>, lambda: f64) -> Array1<f64> {
    let n = labels.len() as f64;
    let d = features.ncols();
    let gram = features.t().dot(features) / n + Array2::<f64>::eye(d) * lambda;
    let rhs = features.t().dot(labels) / n;
    solve_linear(gram, rhs)
}

pub fn max_abs_diff(a: &Array1<f64>, b: &Array1<f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).fold(0.0, f64::max)
}
