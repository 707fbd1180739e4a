//! The plain geohash fingerprint index: one fingerprint per point.

use super::{FingerprintStore, TrajectoryIndex};
use crate::geohash;
use crate::types::{Point, Query, Record, Response};
use roaring::RoaringBitmap;

// Keeps fingerprints in the dense low part of the bitmap space. The exact
// mask is part of the fingerprint format; changing it invalidates any
// stored fingerprint set.
const FINGERPRINT_MASK: u64 = 0x0FFF_FFFF;

/// An inverted index whose record fingerprints are the geohash cells of the
/// trajectory's points.
///
/// # Examples
///
/// ```
/// use geodex::{GeohashIndex, Point, Query, Record, TrajectoryIndex};
///
/// let trajectory = vec![Point::new(8.54, 47.37), Point::new(8.55, 47.38)];
/// let record = Record::new("tracks/0001.txt", trajectory.clone());
///
/// let mut index = GeohashIndex::new(28);
/// index.add(vec![record.clone()]);
///
/// let response = index.query(Query::new(0, record, 0.1));
/// assert_eq!(response.results.len(), 1);
/// assert_eq!(response.results[0].distance, 0.0);
/// ```
pub struct GeohashIndex {
    bits: u32,
    store: FingerprintStore,
}

impl GeohashIndex {
    /// Creates an index quantising points to `bits` bits of geohash
    /// precision.
    ///
    /// # Panics
    ///
    /// Panics if `bits` is not in `1..=61`.
    pub fn new(bits: u32) -> Self {
        assert!(
            (1..=61).contains(&bits),
            "Geohash precision must be between 1 and 61 bits"
        );
        Self {
            bits,
            store: FingerprintStore::default(),
        }
    }

    /// Number of records in the index.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns true if no record has been ingested.
    pub fn is_empty(&self) -> bool {
        self.store.len() == 0
    }

    /// The fingerprint set of a point sequence: the masked geohash of every
    /// point.
    pub fn extract(&self, points: &[Point]) -> RoaringBitmap {
        let mut fingerprints = RoaringBitmap::new();
        for p in points {
            let cell = (geohash::encode(p.lat(), p.lon(), self.bits) & FINGERPRINT_MASK) as u32;
            fingerprints.insert(cell);
        }
        fingerprints
    }
}

impl TrajectoryIndex for GeohashIndex {
    fn add(&mut self, records: Vec<Record>) {
        for record in records {
            let fingerprints = self.extract(&record.trajectory);
            self.store.insert(record, fingerprints);
        }
    }

    fn query(&self, query: Query) -> Response {
        let fingerprints = self.extract(&query.record.trajectory);
        self.store.query(query, fingerprints)
    }
}
