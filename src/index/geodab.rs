//! The Geodab index: geohash-normalised trajectories fingerprinted with
//! winnowed k-grams.
//!
//! Two refinements over the plain geohash index. Points are first snapped
//! to geohash cell centres and run-length compressed, so jittery samples of
//! the same path normalise to the same sequence. A window of `k`
//! consecutive normalised points is then hashed into a 32-bit fingerprint,
//! and winnowing keeps only the minimum fingerprint of every window of
//! `w = t - k + 1` consecutive k-grams, bounding the expected fingerprint
//! density by `2 / (w + 1)` of the input length.

use super::{FingerprintStore, TrajectoryIndex};
use crate::geohash;
use crate::types::{IndexConfig, Point, Query, Record, Response};
use roaring::RoaringBitmap;
use std::io::Cursor;

/// Snaps a point to the centre of its geohash cell at `bits` precision.
pub fn normalize_point(p: &Point, bits: u32) -> Point {
    let d = geohash::decode_tagged(geohash::encode(p.lat(), p.lon(), bits));
    Point::new(d.lng, d.lat)
}

/// Snaps every point to its cell centre and removes consecutive duplicates,
/// keeping the first of each run. Idempotent: normalising a normalised
/// sequence is the identity.
pub fn normalize(points: &[Point], bits: u32) -> Vec<Point> {
    let mut normalized: Vec<Point> = Vec::with_capacity(points.len());
    for p in points {
        let snapped = normalize_point(p, bits);
        if normalized.last() != Some(&snapped) {
            normalized.push(snapped);
        }
    }
    normalized
}

/// Picks the minimum of every `w`-wide window of fingerprint hashes,
/// leftmost minimum winning ties, and collapses the picks into a bitmap.
pub(crate) fn winnow(hashes: &[u32], w: usize) -> RoaringBitmap {
    let mut selected = RoaringBitmap::new();
    if hashes.len() < w {
        return selected;
    }
    for i in 0..=hashes.len() - w {
        let mut m = i;
        for j in i + 1..i + w {
            if hashes[j] < hashes[m] {
                m = j;
            }
        }
        selected.insert(hashes[m]);
    }
    selected
}

/// An inverted index over winnowed k-gram fingerprints of normalised
/// trajectories.
///
/// # Examples
///
/// ```
/// use geodex::{GeodabIndex, Point, Query, Record, TrajectoryIndex};
///
/// let trajectory: Vec<Point> = (0..12)
///     .map(|i| Point::new(8.54 + 0.001 * i as f64, 47.37))
///     .collect();
/// let record = Record::new("tracks/0001.txt", trajectory);
///
/// let mut index = GeodabIndex::new(40, 6, 3);
/// index.add(vec![record.clone()]);
///
/// let response = index.query(Query::new(0, record, 0.1));
/// assert_eq!(response.results.len(), 1);
/// assert_eq!(response.results[0].distance, 0.0);
/// ```
pub struct GeodabIndex {
    bits: u32,
    window: usize,
    kgram: usize,
    store: FingerprintStore,
}

impl GeodabIndex {
    /// Creates an index normalising at `bits` bits of geohash precision,
    /// with winnow window parameter `t` and k-gram length `k`.
    ///
    /// # Panics
    ///
    /// Panics if `bits` is not in `1..=61`, `k` is zero, or `t < k`.
    pub fn new(bits: u32, t: usize, k: usize) -> Self {
        assert!(
            (1..=61).contains(&bits),
            "Geohash precision must be between 1 and 61 bits"
        );
        assert!(k > 0, "k-gram length must be nonzero");
        assert!(t >= k, "Winnow window must be at least the k-gram length");
        Self {
            bits,
            window: t,
            kgram: k,
            store: FingerprintStore::default(),
        }
    }

    /// Creates an index from a validated [`IndexConfig`].
    pub fn from_config(config: &IndexConfig) -> Self {
        Self::new(config.geohash_bits, config.window, config.kgram)
    }

    /// Number of records in the index.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns true if no record has been ingested.
    pub fn is_empty(&self) -> bool {
        self.store.len() == 0
    }

    /// The fingerprint set of an already-normalised point sequence.
    pub fn extract(&self, points: &[Point]) -> RoaringBitmap {
        let hashes = self.kgram_hashes(points);
        winnow(&hashes, self.window - self.kgram + 1)
    }

    /// One 32-bit hash per window of `k` consecutive points: the high half
    /// locates the window (low 16 geohash bits of the mean point), the low
    /// half fingerprints its shape (low 16 Murmur3 bits of the raw
    /// coordinates).
    fn kgram_hashes(&self, points: &[Point]) -> Vec<u32> {
        let k = self.kgram;
        if points.len() < k {
            return Vec::new();
        }
        let mut hashes = Vec::with_capacity(points.len() - k + 1);
        let mut buf = Vec::with_capacity(k * 16);
        for window in points.windows(k) {
            buf.clear();
            let mut lat = 0.0;
            let mut lon = 0.0;
            for p in window {
                buf.extend_from_slice(&p.lon().to_bits().to_le_bytes());
                buf.extend_from_slice(&p.lat().to_bits().to_le_bytes());
                lat += p.lat();
                lon += p.lon();
            }
            let shape = murmur3::murmur3_32(&mut Cursor::new(buf.as_slice()), 0)
                .expect("reading from an in-memory buffer cannot fail");
            lat /= k as f64;
            lon /= k as f64;
            let cell = (geohash::encode(lat, lon, 16) & 0xffff) as u32;
            hashes.push((cell << 16) | (shape & 0xffff));
        }
        hashes
    }
}

impl TrajectoryIndex for GeodabIndex {
    fn add(&mut self, records: Vec<Record>) {
        for record in records {
            let points = normalize(&record.trajectory, self.bits);
            let fingerprints = self.extract(&points);
            self.store.insert(record, fingerprints);
        }
    }

    fn query(&self, query: Query) -> Response {
        let points = normalize(&query.record.trajectory, self.bits);
        let fingerprints = self.extract(&points);
        self.store.query(query, fingerprints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_winnow_selects_leftmost_minima() {
        // k = 2, t = 4 -> w = 3: windows [5,2,7] [2,7,1] [7,1,6] [1,6,3]
        // select 2, 1, 1, 1.
        let selected = winnow(&[5, 2, 7, 1, 6, 3], 3);
        assert_eq!(selected.len(), 2);
        assert!(selected.contains(1));
        assert!(selected.contains(2));
    }

    #[test]
    fn test_winnow_short_input() {
        assert!(winnow(&[3, 1], 3).is_empty());
        assert!(winnow(&[], 1).is_empty());
    }

    #[test]
    fn test_winnow_window_one_keeps_all() {
        let selected = winnow(&[4, 2, 9], 1);
        assert_eq!(selected.len(), 3);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let points: Vec<Point> = (0..20)
            .map(|i| Point::new(8.54 + 0.0001 * i as f64, 47.37 + 0.00007 * i as f64))
            .collect();
        let once = normalize(&points, 40);
        let twice = normalize(&once, 40);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_normalize_compresses_runs() {
        // All samples fall in one coarse cell, so the run collapses to a
        // single centre point.
        let points: Vec<Point> = (0..5)
            .map(|i| Point::new(8.54 + 0.00001 * i as f64, 47.37))
            .collect();
        let normalized = normalize(&points, 20);
        assert_eq!(normalized.len(), 1);
    }

    #[test]
    fn test_normalize_snaps_to_cell_centres() {
        let p = Point::new(8.5417, 47.3769);
        let snapped = normalize_point(&p, 40);
        let d = geohash::decode_tagged(geohash::encode(p.lat(), p.lon(), 40));
        assert_eq!(snapped.lon(), d.lng);
        assert_eq!(snapped.lat(), d.lat);
    }

    #[test]
    fn test_extract_deterministic() {
        let index = GeodabIndex::new(40, 6, 3);
        let points: Vec<Point> = (0..15)
            .map(|i| Point::new(8.54 + 0.001 * i as f64, 47.37))
            .collect();
        let normalized = normalize(&points, 40);
        assert_eq!(index.extract(&normalized), index.extract(&normalized));
        assert!(!index.extract(&normalized).is_empty());
    }

    #[test]
    fn test_self_query_matches_exactly() {
        let trajectory: Vec<Point> = (0..20)
            .map(|i| Point::new(8.54 + 0.0005 * i as f64, 47.37 + 0.0002 * i as f64))
            .collect();
        let record = Record::new("tracks/a.txt", trajectory);
        let mut index = GeodabIndex::new(40, 8, 4);
        index.add(vec![record.clone()]);

        let response = index.query(Query::new(0, record, 0.0));
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].distance, 0.0);
    }

    #[test]
    fn test_jittered_trajectory_still_retrieved() {
        // Jitter far below the cell size normalises away entirely.
        let base: Vec<Point> = (0..30)
            .map(|i| Point::new(8.54 + 0.002 * i as f64, 47.37 + 0.001 * i as f64))
            .collect();
        let jittered: Vec<Point> = base
            .iter()
            .map(|p| Point::new(p.lon() + 1e-9, p.lat() - 1e-9))
            .collect();

        let mut index = GeodabIndex::new(30, 6, 3);
        index.add(vec![Record::new("base", base)]);

        let response = index.query(Query::new(0, Record::new("probe", jittered), 0.5));
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].record.id, "base");
        assert_eq!(response.results[0].distance, 0.0);
    }

    #[test]
    fn test_from_config() {
        let config = IndexConfig::default()
            .with_geohash_bits(40)
            .with_window(6)
            .with_kgram(3);
        let index = GeodabIndex::from_config(&config);
        assert!(index.is_empty());
    }
}
