//! Dynamic time warping, kept as a reference baseline for comparing
//! trajectory distances. Not part of the retrieval contract.

use super::haversine;
use crate::types::Point;

/// Accumulated dynamic time warping cost between two trajectories.
///
/// Classic quadratic DP; the first row and column act as an impassable
/// border so the warp path is anchored at the origin.
pub fn distance(x: &[Point], y: &[Point]) -> f64 {
    let m = x.len();
    let n = y.len();
    let mut dtw = vec![0.0f64; m * n];
    for i in 1..m {
        dtw[i * n] = f64::MAX;
    }
    for j in 1..n {
        dtw[j] = f64::MAX;
    }
    for i in 1..m {
        for j in 1..n {
            let cost = haversine(&x[i], &y[j]);
            dtw[i * n + j] = cost
                + dtw[(i - 1) * n + j]
                    .min(dtw[i * n + j - 1])
                    .min(dtw[(i - 1) * n + j - 1]);
        }
    }
    dtw[m * n - 1]
}
