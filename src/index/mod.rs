//! Retrieval indexes over trajectory records.
//!
//! Two fingerprint indexes share one contract: [`GeohashIndex`] fingerprints
//! every quantised point, [`GeodabIndex`] adds normalisation and winnowed
//! k-gram fingerprints. [`QuadTree`] is the raw point index underneath
//! range and radius lookups.

pub mod geodab;
pub mod geohash;
pub mod quadtree;

pub use geodab::GeodabIndex;
pub use geohash::GeohashIndex;
pub use quadtree::QuadTree;

use crate::distance::jaccard;
use crate::types::{Query, Record, Response, SearchResult};
use roaring::RoaringBitmap;
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;

/// A retrieval index over trajectory records.
///
/// Ingest is a single-writer operation that must complete before the first
/// query; after that the index is immutable and `query` is safe to call
/// concurrently. Re-adding a record id replaces its fingerprint bitmap
/// (last write wins).
pub trait TrajectoryIndex {
    /// Ingest a batch of records.
    fn add(&mut self, records: Vec<Record>);

    /// Retrieve the records within the query's distance threshold, sorted
    /// by ascending distance. Deterministic for a sealed index.
    fn query(&self, query: Query) -> Response;
}

/// Shared storage for both fingerprint indexes: the record slots, their
/// fingerprint bitmaps, and the inverted index from fingerprint to slots.
///
/// Invariant: `slot ∈ postings[f]` iff `f ∈ bitmaps[slot]` for the latest
/// bitmap written to the slot (stale postings from a replaced record are
/// harmless because identity-equal records produce identical bitmaps).
#[derive(Default)]
pub(crate) struct FingerprintStore {
    records: Vec<Arc<Record>>,
    bitmaps: Vec<RoaringBitmap>,
    slots: FxHashMap<String, usize>,
    postings: FxHashMap<u32, FxHashSet<usize>>,
}

impl FingerprintStore {
    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn insert(&mut self, record: Record, fingerprints: RoaringBitmap) {
        let record = Arc::new(record);
        let slot = match self.slots.get(record.id.as_str()) {
            Some(&slot) => {
                self.records[slot] = record;
                slot
            }
            None => {
                let slot = self.records.len();
                self.slots.insert(record.id.clone(), slot);
                self.records.push(record);
                self.bitmaps.push(RoaringBitmap::new());
                slot
            }
        };
        for fingerprint in fingerprints.iter() {
            self.postings.entry(fingerprint).or_default().insert(slot);
        }
        self.bitmaps[slot] = fingerprints;
    }

    /// Union the postings of every query fingerprint into a deduplicated
    /// candidate set, Jaccard-score each candidate once, keep those within
    /// the threshold, and sort ascending.
    pub(crate) fn query(&self, query: Query, fingerprints: RoaringBitmap) -> Response {
        let mut seen: FxHashSet<usize> = FxHashSet::default();
        let mut results = Vec::new();
        for fingerprint in fingerprints.iter() {
            let Some(slots) = self.postings.get(&fingerprint) else {
                continue;
            };
            for &slot in slots {
                if seen.insert(slot) {
                    let distance = jaccard::distance(&fingerprints, &self.bitmaps[slot]);
                    if distance <= query.distance {
                        results.push(SearchResult {
                            record: self.records[slot].clone(),
                            distance,
                        });
                    }
                }
            }
        }
        results.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Response { query, results }
    }
}
