//! Discrete Fréchet distance between point sequences.
//!
//! The distance is the minimum over all monotone couplings of the maximum
//! pairwise haversine distance along the coupling. Two entry points are
//! provided: [`distance`] computes the value itself, [`within`] only
//! decides whether the value is below a bound and short-circuits as soon as
//! the answer is known.
//!
//! Both are undefined on empty inputs; callers must pass non-empty
//! trajectories.

use super::haversine;
use crate::types::Point;

/// Computes the discrete Fréchet distance between two trajectories.
///
/// Fills the full `|ta| * |tb|` matrix bottom-up; each pairwise distance is
/// evaluated exactly once.
///
/// # Examples
///
/// ```
/// use geodex::{distance::dfd, Point};
///
/// let a = vec![Point::new(0.0, 0.0), Point::new(0.0, 1.0)];
/// assert_eq!(dfd::distance(&a, &a), 0.0);
/// ```
pub fn distance(ta: &[Point], tb: &[Point]) -> f64 {
    let s = ta.len();
    let t = tb.len();
    let mut f = vec![0.0f64; s * t];

    f[0] = haversine(&ta[0], &tb[0]);
    for j in 1..t {
        f[j] = f[j - 1].max(haversine(&ta[0], &tb[j]));
    }
    for i in 1..s {
        f[i * t] = f[(i - 1) * t].max(haversine(&ta[i], &tb[0]));
        for j in 1..t {
            let reach = f[(i - 1) * t + j - 1]
                .min(f[(i - 1) * t + j])
                .min(f[i * t + j - 1]);
            f[i * t + j] = reach.max(haversine(&ta[i], &tb[j]));
        }
    }
    f[s * t - 1]
}

const UNKNOWN: i8 = 0;
const TRUE: i8 = 1;
const FALSE: i8 = -1;

/// Decides whether the discrete Fréchet distance is at most `bound`.
///
/// Memoised top-down over a tri-state byte matrix. A cell whose pairwise
/// distance exceeds the bound is settled false without recursing; otherwise
/// its predecessors are tried diagonal first, then up, then left, and the
/// OR short-circuits on the first reachable one. Equivalent to
/// `distance(ta, tb) <= bound` but usually far cheaper.
///
/// # Examples
///
/// ```
/// use geodex::{distance::dfd, Point};
///
/// let a = vec![Point::new(0.0, 0.0), Point::new(0.0, 1.0)];
/// let b = vec![Point::new(0.0, 2.0), Point::new(0.0, 3.0)];
/// let d = dfd::distance(&a, &b);
/// assert!(dfd::within(d, &a, &b));
/// assert!(!dfd::within(d - 1.0, &a, &b));
/// ```
pub fn within(bound: f64, ta: &[Point], tb: &[Point]) -> bool {
    let mut ca = vec![UNKNOWN; ta.len() * tb.len()];
    within_cell(bound, ta, tb, &mut ca, ta.len() - 1, tb.len() - 1) == TRUE
}

fn within_cell(bound: f64, ta: &[Point], tb: &[Point], ca: &mut [i8], i: usize, j: usize) -> i8 {
    let t = tb.len();
    if ca[i * t + j] == UNKNOWN {
        ca[i * t + j] = if haversine(&ta[i], &tb[j]) <= bound {
            if i == 0 && j == 0 {
                TRUE
            } else if j == 0 {
                within_cell(bound, ta, tb, ca, i - 1, 0)
            } else if i == 0 {
                within_cell(bound, ta, tb, ca, 0, j - 1)
            } else if within_cell(bound, ta, tb, ca, i - 1, j - 1) == TRUE
                || within_cell(bound, ta, tb, ca, i - 1, j) == TRUE
                || within_cell(bound, ta, tb, ca, i, j - 1) == TRUE
            {
                TRUE
            } else {
                FALSE
            }
        } else {
            FALSE
        };
    }
    ca[i * t + j]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(lats: &[f64]) -> Vec<Point> {
        lats.iter().map(|&lat| Point::new(0.0, lat)).collect()
    }

    #[test]
    fn test_identical_trajectories() {
        let a = line(&[0.0, 1.0, 2.0]);
        assert_eq!(distance(&a, &a), 0.0);
    }

    #[test]
    fn test_parallel_segments() {
        let a = line(&[0.0, 1.0]);
        let b = line(&[2.0, 3.0]);
        let expected = haversine(&Point::new(0.0, 1.0), &Point::new(0.0, 2.0));
        assert_eq!(distance(&a, &b), expected);
    }

    #[test]
    fn test_symmetric() {
        let a = line(&[0.0, 0.5, 1.0, 2.5]);
        let b = line(&[0.1, 1.4, 2.0]);
        assert_eq!(distance(&a, &b), distance(&b, &a));
    }

    #[test]
    fn test_lower_bound_by_closest_points() {
        // DFD is at least the distance from any point of A to its nearest
        // point of B.
        let a = line(&[0.0, 1.0, 5.0]);
        let b = line(&[0.2, 1.1, 4.0]);
        let d = distance(&a, &b);
        for p in &a {
            let nearest = b
                .iter()
                .map(|q| haversine(p, q))
                .fold(f64::INFINITY, f64::min);
            assert!(d >= nearest);
        }
    }

    #[test]
    fn test_within_matches_distance() {
        let a = line(&[0.0, 0.7, 1.3, 2.0]);
        let b = line(&[0.1, 1.0, 1.9]);
        let d = distance(&a, &b);
        assert!(within(d, &a, &b));
        assert!(within(d + 1.0, &a, &b));
        assert!(!within(d - 1.0, &a, &b));
        assert!(!within(0.0, &a, &b));
    }

    #[test]
    fn test_within_single_points() {
        let a = vec![Point::new(0.0, 0.0)];
        let b = vec![Point::new(0.0, 1.0)];
        let d = haversine(&a[0], &b[0]);
        assert!(within(d, &a, &b));
        assert!(!within(d / 2.0, &a, &b));
    }

    #[test]
    fn test_crossing_trajectories() {
        // One trajectory reversed: the coupling has to stretch end to end.
        let a = line(&[0.0, 1.0, 2.0]);
        let b: Vec<Point> = a.iter().rev().copied().collect();
        let expected = haversine(&Point::new(0.0, 0.0), &Point::new(0.0, 2.0));
        assert_eq!(distance(&a, &b), expected);
        assert!(within(expected, &a, &b));
    }
}
