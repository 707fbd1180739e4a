//! Subtrajectory motif search: the pair of subtrajectories of two
//! trajectories minimising the discrete Fréchet distance, subject to a
//! minimum length.
//!
//! Three implementations share one contract. [`brute_force`] recomputes the
//! distance from scratch for every subrange pair and exists as the oracle;
//! [`brute_force_dp`] shares the pairwise distance matrix and grows the
//! Fréchet matrix incrementally per start; [`execute`] adds lower-bounded
//! candidate ordering and end-bound tightening and is the variant meant for
//! real inputs. All three return the same minimum distance (the returned
//! subranges may differ when several pairs are optimal).

use crate::distance::{dfd, haversine};
use crate::types::Point;
use std::cmp::Ordering;

/// A motif: closed-open subranges `[i, ie)` of the first trajectory and
/// `[j, je)` of the second, and the discrete Fréchet distance between them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotifPair {
    /// Start index into the first trajectory.
    pub i: usize,
    /// Start index into the second trajectory.
    pub j: usize,
    /// End index (exclusive) into the first trajectory.
    pub ie: usize,
    /// End index (exclusive) into the second trajectory.
    pub je: usize,
    /// Discrete Fréchet distance between the two subranges.
    pub d: f64,
}

/// Start candidate with its lower bound, ordered for the bounding search.
struct Candidate {
    i: usize,
    j: usize,
    lb: f64,
}

fn pairwise(ta: &[Point], tb: &[Point]) -> Vec<f64> {
    let t = tb.len();
    let mut g = vec![0.0f64; ta.len() * t];
    for (i, pa) in ta.iter().enumerate() {
        for (j, pb) in tb.iter().enumerate() {
            g[i * t + j] = haversine(pa, pb);
        }
    }
    g
}

/// Exhaustive motif search; every subrange pair gets a fresh distance
/// computation. Quadratic in both lengths on top of the quadratic DFD, so
/// only usable as a test oracle.
pub fn brute_force(ta: &[Point], tb: &[Point], e: usize) -> Option<MotifPair> {
    let s = ta.len();
    let t = tb.len();
    if e == 0 || s < e || t < e {
        return None;
    }

    let mut bsf = f64::MAX;
    let mut bpair = None;

    for i in 0..=s - e {
        for j in 0..=t - e {
            for ie in i + e..=s {
                for je in j + e..=t {
                    let d = dfd::distance(&ta[i..ie], &tb[j..je]);
                    if d < bsf {
                        bsf = d;
                        bpair = Some(MotifPair { i, j, ie, je, d });
                    }
                }
            }
        }
    }

    bpair
}

/// Motif search that shares the pairwise distance matrix across all starts
/// and grows the Fréchet matrix incrementally within each start.
pub fn brute_force_dp(ta: &[Point], tb: &[Point], e: usize) -> Option<MotifPair> {
    let s = ta.len();
    let t = tb.len();
    if e == 0 || s < e || t < e {
        return None;
    }

    let g = pairwise(ta, tb);
    let mut f = vec![0.0f64; s * t];

    let mut bsf = f64::MAX;
    let mut bpair = None;

    for i in 0..=s - e {
        for j in 0..=t - e {
            f[i * t + j] = g[i * t + j];
            for k in j + 1..t {
                f[i * t + k] = g[i * t + k].max(f[i * t + k - 1]);
            }
            for k in i + 1..s {
                f[k * t + j] = g[k * t + j].max(f[(k - 1) * t + j]);
            }

            if e == 1 && g[i * t + j] < bsf {
                bsf = g[i * t + j];
                bpair = Some(MotifPair {
                    i,
                    j,
                    ie: i + 1,
                    je: j + 1,
                    d: bsf,
                });
            }

            for ie in i + 1..s {
                for je in j + 1..t {
                    let reach = f[(ie - 1) * t + je - 1]
                        .min(f[ie * t + je - 1])
                        .min(f[(ie - 1) * t + je]);
                    let v = g[ie * t + je].max(reach);
                    f[ie * t + je] = v;
                    if ie >= i + e - 1 && je >= j + e - 1 && v < bsf {
                        bsf = v;
                        bpair = Some(MotifPair {
                            i,
                            j,
                            ie: ie + 1,
                            je: je + 1,
                            d: bsf,
                        });
                    }
                }
            }
        }
    }

    bpair
}

/// Bounding-based branch-and-bound motif search.
///
/// Precomputes the pairwise matrix and, for each row and column, the
/// minimum of the next row/column (`cMin`/`rMin`): any subrange extending
/// past row `i` must couple something in row `i + 1`, so those minima lower
/// bound every extension. Each start candidate gets a lower bound from its
/// own cell, the cross minima, and the band of rows/columns any motif of
/// length `e` must traverse. Candidates are explored in ascending bound
/// order (stable, so ties keep `(i, j)` insertion order — an observable
/// contract of the search); exploration stops when the best distance found
/// is at most the next bound, and each start's DP tightens its end bounds
/// whenever no strictly larger subrange could improve on the best pair.
///
/// Returns `None` when either trajectory is shorter than `e`.
///
/// # Examples
///
/// ```
/// use geodex::{motif, Point};
///
/// let a: Vec<Point> = (0..4).map(|i| Point::new(0.0, i as f64)).collect();
/// let pair = motif::execute(&a, &a, 2).unwrap();
/// assert_eq!(pair.d, 0.0);
/// assert!(pair.ie - pair.i >= 2 && pair.je - pair.j >= 2);
/// ```
pub fn execute(ta: &[Point], tb: &[Point], e: usize) -> Option<MotifPair> {
    let s = ta.len();
    let t = tb.len();
    if e == 0 || s < e || t < e {
        return None;
    }

    let g = pairwise(ta, tb);

    let mut c_min = vec![f64::MAX; s];
    for i in 0..s.saturating_sub(1) {
        for j in 0..t {
            let d = g[(i + 1) * t + j];
            if d < c_min[i] {
                c_min[i] = d;
            }
        }
    }
    let mut r_min = vec![f64::MAX; t];
    for i in 0..s {
        for j in 0..t.saturating_sub(1) {
            let d = g[i * t + j + 1];
            if d < r_min[j] {
                r_min[j] = d;
            }
        }
    }

    let mut candidates = Vec::with_capacity((s - e + 1) * (t - e + 1));
    for i in 0..=s - e {
        for j in 0..=t - e {
            let lb_cell = g[i * t + j];

            // The cross minima only bound motifs that actually extend past
            // the start cell.
            let lb_cross = if e >= 2 {
                c_min[i].max(r_min[j])
            } else {
                f64::MIN
            };

            let mut lb_row_band = f64::MIN;
            for jj in j..j + e - 1 {
                if r_min[jj] > lb_row_band {
                    lb_row_band = r_min[jj];
                }
            }
            let mut lb_col_band = f64::MIN;
            for ii in i..i + e - 1 {
                if c_min[ii] > lb_col_band {
                    lb_col_band = c_min[ii];
                }
            }

            let lb = lb_cell.max(lb_cross).max(lb_row_band).max(lb_col_band);
            candidates.push(Candidate { i, j, lb });
        }
    }
    candidates.sort_by(|a, b| a.lb.partial_cmp(&b.lb).unwrap_or(Ordering::Equal));

    let mut f = vec![0.0f64; s * t];
    let mut bsf = f64::MAX;
    // Best pair tracked with inclusive scan indices; converted on return.
    let mut best: Option<(usize, usize, usize, usize)> = None;

    for a in &candidates {
        if bsf <= a.lb {
            break;
        }

        // Seed the start row and column so F holds true subtrajectory
        // distances for this start.
        f[a.i * t + a.j] = g[a.i * t + a.j];
        for k in a.j + 1..t {
            f[a.i * t + k] = g[a.i * t + k].max(f[a.i * t + k - 1]);
        }
        for k in a.i + 1..s {
            f[k * t + a.j] = g[k * t + a.j].max(f[(k - 1) * t + a.j]);
        }

        if e == 1 && g[a.i * t + a.j] < bsf {
            bsf = g[a.i * t + a.j];
            best = Some((a.i, a.j, a.i, a.j));
        }

        let mut i_end = s;
        let mut j_end = t;
        let mut ie = a.i + 1;
        while ie < i_end {
            let mut je = a.j + 1;
            while je < j_end {
                let reach = f[(ie - 1) * t + je - 1]
                    .min(f[ie * t + je - 1])
                    .min(f[(ie - 1) * t + je]);
                let v = g[ie * t + je].max(reach);
                f[ie * t + je] = v;
                if ie >= a.i + e - 1 && je >= a.j + e - 1 && v < bsf {
                    bsf = v;
                    best = Some((a.i, a.j, ie, je));
                }
                je += 1;
            }
            // After a full row: if the best pair cannot be beaten by any
            // strictly larger subrange, stop growing past it.
            if let Some((_, _, bie, bje)) = best {
                if bsf <= c_min[bie].max(r_min[bje]) {
                    i_end = bie;
                    j_end = bje;
                }
            }
            ie += 1;
        }
    }

    best.map(|(i, j, ie, je)| MotifPair {
        i,
        j,
        ie: ie + 1,
        je: je + 1,
        d: bsf,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn line(lats: &[f64]) -> Vec<Point> {
        lats.iter().map(|&lat| Point::new(0.0, lat)).collect()
    }

    fn jagged(rng: &mut StdRng, len: usize) -> Vec<Point> {
        (0..len)
            .map(|_| Point::new(rng.gen::<f64>() * 0.2, rng.gen::<f64>() * 0.2 + 47.0))
            .collect()
    }

    #[test]
    fn test_identical_trajectories_zero_motif() {
        let a = line(&[0.0, 1.0, 2.0, 3.0]);
        let pair = execute(&a, &a, 2).unwrap();
        assert_eq!(pair.d, 0.0);
        assert!(pair.ie - pair.i >= 2);
        assert!(pair.je - pair.j >= 2);
    }

    #[test]
    fn test_too_short_returns_none() {
        let a = line(&[0.0, 1.0]);
        let b = line(&[0.0, 1.0, 2.0]);
        assert!(execute(&a, &b, 3).is_none());
        assert!(brute_force(&a, &b, 3).is_none());
        assert!(brute_force_dp(&a, &b, 3).is_none());
        assert!(execute(&a, &b, 0).is_none());
    }

    #[test]
    fn test_shared_segment_found() {
        // B repeats the middle of A, offset elsewhere.
        let a = line(&[0.0, 1.0, 2.0, 3.0, 4.0]);
        let b = line(&[10.0, 1.0, 2.0, 3.0, 20.0]);
        let pair = execute(&a, &b, 3).unwrap();
        assert_eq!(pair.d, 0.0);
        assert_eq!(&a[pair.i..pair.ie], &b[pair.j..pair.je]);
    }

    #[test]
    fn test_variants_agree_on_lines() {
        let a = line(&[0.0, 0.5, 1.1, 2.0, 2.2, 3.0]);
        let b = line(&[0.4, 1.0, 1.5, 2.6, 3.1]);
        for e in [2usize, 3, 4] {
            let bf = brute_force(&a, &b, e).unwrap();
            let dp = brute_force_dp(&a, &b, e).unwrap();
            let bb = execute(&a, &b, e).unwrap();
            assert_eq!(bf.d, dp.d, "e = {e}");
            assert_eq!(bf.d, bb.d, "e = {e}");
        }
    }

    #[test]
    fn test_variants_agree_on_random_inputs() {
        let mut rng = StdRng::seed_from_u64(1729);
        for round in 0..8 {
            let a = jagged(&mut rng, 7);
            let b = jagged(&mut rng, 6);
            for e in [2usize, 3] {
                let bf = brute_force(&a, &b, e).unwrap();
                let dp = brute_force_dp(&a, &b, e).unwrap();
                let bb = execute(&a, &b, e).unwrap();
                assert_eq!(bf.d, dp.d, "round {round}, e = {e}");
                assert_eq!(bf.d, bb.d, "round {round}, e = {e}");
            }
        }
    }

    #[test]
    fn test_single_point_motif_variants_agree() {
        let mut rng = StdRng::seed_from_u64(99);
        let a = jagged(&mut rng, 5);
        let b = jagged(&mut rng, 5);
        let bf = brute_force(&a, &b, 1).unwrap();
        let dp = brute_force_dp(&a, &b, 1).unwrap();
        let bb = execute(&a, &b, 1).unwrap();
        assert_eq!(bf.d, dp.d);
        assert_eq!(bf.d, bb.d);
    }

    #[test]
    fn test_pair_bounds_hold() {
        let mut rng = StdRng::seed_from_u64(7);
        let a = jagged(&mut rng, 9);
        let b = jagged(&mut rng, 8);
        let e = 3;
        let pair = execute(&a, &b, e).unwrap();
        assert!(pair.ie <= a.len());
        assert!(pair.je <= b.len());
        assert!(pair.ie - pair.i >= e);
        assert!(pair.je - pair.j >= e);
        // The reported distance is the actual DFD of the reported ranges.
        assert_eq!(pair.d, dfd::distance(&a[pair.i..pair.ie], &b[pair.j..pair.je]));
    }

    #[test]
    fn test_minimum_length_respected() {
        let a = line(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        let b = line(&[0.1, 1.1, 2.1, 3.1, 4.1, 5.1]);
        for e in [2usize, 4, 6] {
            let pair = execute(&a, &b, e).unwrap();
            assert!(pair.ie - pair.i >= e);
            assert!(pair.je - pair.j >= e);
        }
    }
}
