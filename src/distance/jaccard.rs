//! Jaccard distance over compressed fingerprint bitmaps.

use roaring::RoaringBitmap;

/// Jaccard distance `1 - |A ∩ B| / |A ∪ B|` between two fingerprint sets.
///
/// Cardinalities come straight from the compressed bitmaps, so neither set
/// is materialised. The distance is in `[0, 1]` for non-empty inputs and is
/// 1 exactly when the sets are disjoint.
///
/// # Examples
///
/// ```
/// use geodex::distance::jaccard::distance;
/// use roaring::RoaringBitmap;
///
/// let a: RoaringBitmap = (0..10).collect();
/// let b: RoaringBitmap = (5..15).collect();
/// assert_eq!(distance(&a, &a), 0.0);
/// assert!((distance(&a, &b) - (1.0 - 5.0 / 15.0)).abs() < 1e-12);
/// ```
pub fn distance(a: &RoaringBitmap, b: &RoaringBitmap) -> f64 {
    let intersection = a.intersection_len(b) as f64;
    let union = a.union_len(b) as f64;
    1.0 - intersection / union
}
