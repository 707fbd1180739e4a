//! Core value types for the trajectory engine.
//!
//! Everything in this module is created at ingest or query time and is
//! immutable afterwards. `Point` wraps `geo::Point` and adds the bitwise
//! equality and hashing the indexes rely on.

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A geographic point with longitude/latitude coordinates in degrees.
///
/// Wraps `geo::Point` with `lon()`/`lat()` accessors. Unlike the underlying
/// `geo` type, equality and hashing are **bitwise** on both coordinates, so
/// points can key hash sets (duplicate suppression in the quadtree, run
/// length compression during normalisation).
///
/// # Examples
///
/// ```
/// use geodex::Point;
///
/// let nyc = Point::new(-74.0060, 40.7128);
/// assert_eq!(nyc.lon(), -74.0060);
/// assert_eq!(nyc.lat(), 40.7128);
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Point {
    inner: geo::Point<f64>,
}

impl Point {
    /// Create a new point from longitude and latitude in degrees.
    #[inline]
    pub fn new(lon: f64, lat: f64) -> Self {
        Self {
            inner: geo::Point::new(lon, lat),
        }
    }

    /// Get the longitude in degrees.
    #[inline]
    pub fn lon(&self) -> f64 {
        self.inner.x()
    }

    /// Get the latitude in degrees.
    #[inline]
    pub fn lat(&self) -> f64 {
        self.inner.y()
    }

    /// Get the x coordinate (alias for longitude).
    #[inline]
    pub fn x(&self) -> f64 {
        self.inner.x()
    }

    /// Get the y coordinate (alias for latitude).
    #[inline]
    pub fn y(&self) -> f64 {
        self.inner.y()
    }

    /// Access the inner `geo::Point`.
    #[inline]
    pub fn inner(&self) -> &geo::Point<f64> {
        &self.inner
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.lon().to_bits() == other.lon().to_bits()
            && self.lat().to_bits() == other.lat().to_bits()
    }
}

impl Eq for Point {}

impl Hash for Point {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.lon().to_bits().hash(state);
        self.lat().to_bits().hash(state);
    }
}

impl From<geo::Point<f64>> for Point {
    fn from(point: geo::Point<f64>) -> Self {
        Self { inner: point }
    }
}

impl From<Point> for geo::Point<f64> {
    fn from(point: Point) -> Self {
        point.inner
    }
}

impl From<(f64, f64)> for Point {
    fn from((lon, lat): (f64, f64)) -> Self {
        Self::new(lon, lat)
    }
}

/// An ordered, finite sequence of points. Order is semantic.
pub type Trajectory = Vec<Point>;

/// A 2D axis-aligned bounding box over lon/lat degrees.
///
/// `p1` is the lower-left corner and `p2` the upper-right corner
/// (`p1.lon <= p2.lon`, `p1.lat <= p2.lat`); `width` and `height` are cached
/// at construction. Both `contains` and `overlap` are inclusive on all
/// bounds.
///
/// # Examples
///
/// ```
/// use geodex::{BBox, Point};
///
/// let bbox = BBox::new(Point::new(-74.0, 40.7), Point::new(-73.9, 40.8));
/// assert!(bbox.contains(&Point::new(-73.95, 40.75)));
/// assert!(!bbox.contains(&Point::new(-73.85, 40.75)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    /// Lower-left corner.
    pub p1: Point,
    /// Upper-right corner.
    pub p2: Point,
    /// Cached `p2.lon - p1.lon`.
    pub width: f64,
    /// Cached `p2.lat - p1.lat`.
    pub height: f64,
}

impl BBox {
    /// Create a bounding box from its lower-left and upper-right corners.
    pub fn new(p1: Point, p2: Point) -> Self {
        Self {
            p1,
            p2,
            width: p2.lon() - p1.lon(),
            height: p2.lat() - p1.lat(),
        }
    }

    /// Returns true if the box contains the point (inclusive on all bounds).
    pub fn contains(&self, p: &Point) -> bool {
        self.p1.lon() <= p.lon()
            && self.p1.lat() <= p.lat()
            && self.p2.lon() >= p.lon()
            && self.p2.lat() >= p.lat()
    }

    /// Returns true if the two boxes intersect (inclusive on shared edges).
    pub fn overlap(&self, bbox: &BBox) -> bool {
        self.p1.lon() <= bbox.p1.lon() + bbox.width
            && self.p1.lon() + self.width >= bbox.p1.lon()
            && self.p1.lat() <= bbox.p1.lat() + bbox.height
            && self.p1.lat() + self.height >= bbox.p1.lat()
    }
}

/// A trajectory bound to an opaque identifier.
///
/// The identifier (a file path in the reference pipeline, but any opaque
/// handle works) is the hashing and equality key: two records are equal iff
/// their identifiers are equal. The record exclusively owns its trajectory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// Opaque identity of the record.
    pub id: String,
    /// The owned point sequence.
    pub trajectory: Trajectory,
}

impl Record {
    /// Create a record from an identifier and its trajectory.
    pub fn new(id: impl Into<String>, trajectory: Trajectory) -> Self {
        Self {
            id: id.into(),
            trajectory,
        }
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Record {}

impl Hash for Record {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// A similarity query: a probe record plus the maximum Jaccard distance at
/// which a corpus record still qualifies as a match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    /// Explicit query identity, used to name the response sink.
    pub id: u32,
    /// The probe record.
    pub record: Record,
    /// Maximum Jaccard distance for a match.
    pub distance: f64,
}

impl Query {
    /// Create a query.
    pub fn new(id: u32, record: Record, distance: f64) -> Self {
        Self {
            id,
            record,
            distance,
        }
    }
}

/// A single retrieval match: a corpus record and its Jaccard distance to the
/// query fingerprint set.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The matched corpus record.
    pub record: Arc<Record>,
    /// Jaccard distance between the query and record fingerprint sets.
    pub distance: f64,
}

/// The answer to a [`Query`]: matches sorted by ascending distance.
///
/// Duplicates are impossible by construction of the retrieval loop.
#[derive(Debug, Clone)]
pub struct Response {
    /// The query this response answers.
    pub query: Query,
    /// Matches in non-decreasing distance order.
    pub results: Vec<SearchResult>,
}

/// Tuning knobs for the fingerprint indexes and the quadtree.
///
/// Designed to be loadable from JSON/TOML with per-field defaults, and to
/// validate as a whole before an index is built.
///
/// # Example
///
/// ```
/// use geodex::IndexConfig;
///
/// let config = IndexConfig::default();
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Geohash precision in bits used for quantisation and fingerprints
    /// (1-61).
    #[serde(default = "IndexConfig::default_geohash_bits")]
    pub geohash_bits: u32,

    /// Winnow window parameter `t`: the number of consecutive points a
    /// selected fingerprint is guaranteed to cover. Must be >= `kgram`.
    #[serde(default = "IndexConfig::default_window")]
    pub window: usize,

    /// k-gram length: the number of consecutive normalised points hashed
    /// into one fingerprint.
    #[serde(default = "IndexConfig::default_kgram")]
    pub kgram: usize,

    /// Pending-bucket capacity of quadtree nodes, counted in unique points.
    #[serde(default = "IndexConfig::default_node_capacity")]
    pub node_capacity: usize,
}

impl IndexConfig {
    const fn default_geohash_bits() -> u32 {
        28
    }

    const fn default_window() -> usize {
        8
    }

    const fn default_kgram() -> usize {
        4
    }

    const fn default_node_capacity() -> usize {
        64
    }

    pub fn with_geohash_bits(mut self, bits: u32) -> Self {
        self.geohash_bits = bits;
        self
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    pub fn with_kgram(mut self, kgram: usize) -> Self {
        self.kgram = kgram;
        self
    }

    pub fn with_node_capacity(mut self, capacity: usize) -> Self {
        self.node_capacity = capacity;
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.geohash_bits < 1 || self.geohash_bits > 61 {
            return Err("Geohash precision must be between 1 and 61 bits".to_string());
        }
        if self.kgram == 0 {
            return Err("k-gram length must be greater than zero".to_string());
        }
        if self.window < self.kgram {
            return Err("Winnow window must be at least the k-gram length".to_string());
        }
        if self.node_capacity == 0 {
            return Err("Node capacity must be greater than zero".to_string());
        }
        Ok(())
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            geohash_bits: Self::default_geohash_bits(),
            window: Self::default_window(),
            kgram: Self::default_kgram(),
            node_capacity: Self::default_node_capacity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;

    #[test]
    fn test_point_accessors() {
        let point = Point::new(-74.0060, 40.7128);
        assert_eq!(point.lon(), -74.0060);
        assert_eq!(point.lat(), 40.7128);
        assert_eq!(point.x(), point.lon());
        assert_eq!(point.y(), point.lat());
    }

    #[test]
    fn test_point_bitwise_equality() {
        let a = Point::new(1.5, 2.5);
        let b = Point::new(1.5, 2.5);
        let c = Point::new(1.5, 2.5000001);
        assert_eq!(a, b);
        assert_ne!(a, c);

        let mut set = FxHashSet::default();
        set.insert(a);
        set.insert(b);
        set.insert(c);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_bbox_contains_inclusive() {
        let bbox = BBox::new(Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        assert!(bbox.contains(&Point::new(5.0, 5.0)));
        assert!(bbox.contains(&Point::new(0.0, 0.0)));
        assert!(bbox.contains(&Point::new(10.0, 10.0)));
        assert!(!bbox.contains(&Point::new(-1.0, 5.0)));
        assert!(!bbox.contains(&Point::new(5.0, 10.1)));
    }

    #[test]
    fn test_bbox_overlap() {
        let a = BBox::new(Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        let b = BBox::new(Point::new(5.0, 5.0), Point::new(15.0, 15.0));
        let c = BBox::new(Point::new(20.0, 20.0), Point::new(30.0, 30.0));
        let edge = BBox::new(Point::new(10.0, 0.0), Point::new(20.0, 10.0));

        assert!(a.overlap(&b));
        assert!(b.overlap(&a));
        assert!(!a.overlap(&c));
        // Shared edges count as overlap.
        assert!(a.overlap(&edge));
    }

    #[test]
    fn test_bbox_cached_dimensions() {
        let bbox = BBox::new(Point::new(-74.0, 40.7), Point::new(-73.9, 40.8));
        assert!((bbox.width - 0.1).abs() < 1e-12);
        assert!((bbox.height - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_record_identity() {
        let a = Record::new("files/a.txt", vec![Point::new(0.0, 0.0)]);
        let b = Record::new("files/a.txt", vec![Point::new(1.0, 1.0)]);
        let c = Record::new("files/c.txt", vec![Point::new(0.0, 0.0)]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_config_from_json_with_defaults() {
        let config: IndexConfig =
            serde_json::from_str(r#"{ "geohash_bits": 40, "kgram": 3 }"#).unwrap();
        assert_eq!(config.geohash_bits, 40);
        assert_eq!(config.kgram, 3);
        // Omitted fields fall back to their defaults.
        assert_eq!(config.window, IndexConfig::default().window);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        assert!(IndexConfig::default().validate().is_ok());
        assert!(IndexConfig::default()
            .with_geohash_bits(62)
            .validate()
            .is_err());
        assert!(IndexConfig::default()
            .with_window(2)
            .with_kgram(4)
            .validate()
            .is_err());
        assert!(IndexConfig::default()
            .with_node_capacity(0)
            .validate()
            .is_err());
    }
}
