//! A point-carrying quadtree over a static, known-in-advance bounding box.
//!
//! Insertions are sequential; after ingest the tree is immutable and search
//! can run from any number of threads. Node capacity is counted in
//! **unique** points, so duplicate points accumulate in one bucket instead
//! of forcing a split that could never separate them.

use crate::distance::haversine;
use crate::types::{BBox, Point};
use rustc_hash::FxHashSet;
use std::hash::Hash;

struct Entry<T> {
    point: Point,
    object: T,
}

struct Node<T> {
    bbox: BBox,
    children: Option<Box<[Node<T>; 4]>>,
    points: FxHashSet<Point>,
    entries: Vec<Entry<T>>,
}

// Midpoint stepped one ulp toward the far side, so sibling boxes tile the
// parent without a shared edge (BBox::contains is inclusive on both bounds).
fn next_after(x: f64, toward: f64) -> f64 {
    if toward > x {
        x.next_up()
    } else if toward < x {
        x.next_down()
    } else {
        toward
    }
}

impl<T> Node<T> {
    fn new(bbox: BBox) -> Self {
        Self {
            bbox,
            children: None,
            points: FxHashSet::default(),
            entries: Vec::new(),
        }
    }

    fn insert(&mut self, entry: Entry<T>, capacity: usize) {
        if !self.bbox.contains(&entry.point) {
            return;
        }
        match &mut self.children {
            None => self.insert_or_split(entry, capacity),
            Some(children) => {
                // The children tile this box disjointly, so exactly one
                // contains the point.
                if let Some(child) = children
                    .iter_mut()
                    .find(|child| child.bbox.contains(&entry.point))
                {
                    child.insert(entry, capacity);
                }
            }
        }
    }

    fn insert_or_split(&mut self, entry: Entry<T>, capacity: usize) {
        if self.points.len() < capacity {
            self.points.insert(entry.point);
            self.entries.push(entry);
            return;
        }

        let x1 = self.bbox.p1.lon();
        let x2 = self.bbox.p1.lon() + self.bbox.width / 2.0;
        let x4 = self.bbox.p2.lon();
        let x3 = next_after(x2, x4);
        let y1 = self.bbox.p1.lat();
        let y2 = self.bbox.p1.lat() + self.bbox.height / 2.0;
        let y4 = self.bbox.p2.lat();
        let y3 = next_after(y2, y4);

        let nw = Node::new(BBox::new(Point::new(x1, y3), Point::new(x2, y4)));
        let ne = Node::new(BBox::new(Point::new(x3, y3), Point::new(x4, y4)));
        let sw = Node::new(BBox::new(Point::new(x1, y1), Point::new(x2, y2)));
        let se = Node::new(BBox::new(Point::new(x3, y1), Point::new(x4, y2)));
        self.children = Some(Box::new([nw, ne, sw, se]));

        let pending = std::mem::take(&mut self.entries);
        self.points = FxHashSet::default();
        for e in pending {
            self.insert(e, capacity);
        }
        self.insert(entry, capacity);
    }
}

impl<T: Clone + Eq + Hash> Node<T> {
    fn search_box(&self, bbox: &BBox, results: &mut FxHashSet<T>) {
        if !bbox.overlap(&self.bbox) {
            return;
        }
        match &self.children {
            None => {
                for e in &self.entries {
                    if bbox.contains(&e.point) {
                        results.insert(e.object.clone());
                    }
                }
            }
            Some(children) => {
                for child in children.iter() {
                    child.search_box(bbox, results);
                }
            }
        }
    }

    fn search_radius(&self, point: &Point, range: f64, bbox: &BBox, results: &mut FxHashSet<T>) {
        if !bbox.overlap(&self.bbox) {
            return;
        }
        match &self.children {
            None => {
                for e in &self.entries {
                    if bbox.contains(&e.point) && haversine(point, &e.point) <= range {
                        results.insert(e.object.clone());
                    }
                }
            }
            Some(children) => {
                for child in children.iter() {
                    child.search_radius(point, range, bbox, results);
                }
            }
        }
    }
}

/// A static 2D point index for range and radius queries.
///
/// # Examples
///
/// ```
/// use geodex::{BBox, Point, QuadTree};
///
/// let span = BBox::new(Point::new(-180.0, -90.0), Point::new(180.0, 90.0));
/// let mut tree = QuadTree::new(span, 16);
/// tree.insert(Point::new(-74.0060, 40.7128), "nyc");
/// tree.insert(Point::new(2.3522, 48.8566), "paris");
///
/// let query = BBox::new(Point::new(-80.0, 35.0), Point::new(-70.0, 45.0));
/// let hits = tree.search(&query);
/// assert!(hits.contains("nyc"));
/// assert!(!hits.contains("paris"));
/// ```
pub struct QuadTree<T> {
    root: Node<T>,
    capacity: usize,
}

impl<T> QuadTree<T> {
    /// Creates a quadtree spanning `bbox`, with `capacity` unique points
    /// buffered per node before it splits.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(bbox: BBox, capacity: usize) -> Self {
        assert!(capacity > 0, "Quadtree node capacity must be nonzero");
        Self {
            root: Node::new(bbox),
            capacity,
        }
    }

    /// Inserts an object at a point. Points outside the tree's span are
    /// silently discarded.
    pub fn insert(&mut self, point: Point, object: T) {
        self.root.insert(Entry { point, object }, self.capacity);
    }
}

impl<T: Clone + Eq + Hash> QuadTree<T> {
    /// Returns every stored object whose point lies in the query box.
    pub fn search(&self, bbox: &BBox) -> FxHashSet<T> {
        let mut results = FxHashSet::default();
        self.root.search_box(bbox, &mut results);
        results
    }

    /// Returns every stored object within `range` metres of `point`.
    ///
    /// `bbox` is a caller-supplied degree-extent box around the point used
    /// to prune the descent; [`crate::util::radius_bbox`] computes one from
    /// a metre radius. Objects must pass both the box test and the
    /// haversine test to be returned.
    pub fn search_radius(&self, point: &Point, range: f64, bbox: &BBox) -> FxHashSet<T> {
        let mut results = FxHashSet::default();
        self.root.search_radius(point, range, bbox, &mut results);
        results
    }

    /// Radius search with the pruning box derived from `range` itself.
    pub fn search_around(&self, point: &Point, range: f64) -> FxHashSet<T> {
        self.search_radius(point, range, &crate::util::radius_bbox(point, range))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> BBox {
        BBox::new(Point::new(-180.0, -90.0), Point::new(180.0, 90.0))
    }

    #[test]
    fn test_search_box() {
        let mut tree = QuadTree::new(world(), 4);
        tree.insert(Point::new(-74.0060, 40.7128), "nyc");
        tree.insert(Point::new(-118.2437, 34.0522), "la");
        tree.insert(Point::new(2.3522, 48.8566), "paris");

        let east_coast = BBox::new(Point::new(-80.0, 35.0), Point::new(-70.0, 45.0));
        let hits = tree.search(&east_coast);
        assert_eq!(hits.len(), 1);
        assert!(hits.contains("nyc"));
    }

    #[test]
    fn test_split_preserves_entries() {
        let mut tree = QuadTree::new(world(), 2);
        let points: Vec<Point> = (0..50)
            .map(|i| Point::new(i as f64 * 0.5 - 12.0, i as f64 * 0.3 - 7.0))
            .collect();
        for (i, p) in points.iter().enumerate() {
            tree.insert(*p, i);
        }

        let hits = tree.search(&world());
        assert_eq!(hits.len(), 50);
    }

    #[test]
    fn test_duplicate_points_do_not_split_forever() {
        let mut tree = QuadTree::new(world(), 2);
        let p = Point::new(8.5417, 47.3769);
        for i in 0..100 {
            tree.insert(p, i);
        }
        let hits = tree.search(&world());
        assert_eq!(hits.len(), 100);
    }

    #[test]
    fn test_outside_span_discarded() {
        let mut tree = QuadTree::new(
            BBox::new(Point::new(0.0, 0.0), Point::new(10.0, 10.0)),
            4,
        );
        tree.insert(Point::new(20.0, 20.0), "outside");
        assert!(tree.search(&world()).is_empty());
    }

    #[test]
    fn test_boundary_point_found_once_after_split() {
        // A point exactly on the split midpoint must land in exactly one
        // child once the root splits.
        let mut tree = QuadTree::new(
            BBox::new(Point::new(0.0, 0.0), Point::new(10.0, 10.0)),
            2,
        );
        tree.insert(Point::new(5.0, 5.0), "mid");
        tree.insert(Point::new(1.0, 1.0), "a");
        tree.insert(Point::new(9.0, 9.0), "b");
        tree.insert(Point::new(2.0, 8.0), "c");

        let all = tree.search(&BBox::new(Point::new(0.0, 0.0), Point::new(10.0, 10.0)));
        assert_eq!(all.len(), 4);

        let mid_only = tree.search(&BBox::new(Point::new(5.0, 5.0), Point::new(5.0, 5.0)));
        assert_eq!(mid_only.len(), 1);
        assert!(mid_only.contains("mid"));
    }

    #[test]
    fn test_radius_search() {
        let mut tree = QuadTree::new(world(), 4);
        tree.insert(Point::new(-74.0060, 40.7128), "nyc");
        tree.insert(Point::new(-73.9442, 40.6782), "brooklyn");
        tree.insert(Point::new(-118.2437, 34.0522), "la");

        let center = Point::new(-74.0060, 40.7128);
        let hits = tree.search_around(&center, 20_000.0);
        assert_eq!(hits.len(), 2);
        assert!(hits.contains("nyc"));
        assert!(hits.contains("brooklyn"));
    }
}
