//! Bounding-box helpers and random trajectory generators.

use crate::types::{BBox, Point, Record, Trajectory};
use rand::Rng;

/// Approximate metres per degree of latitude.
const METERS_PER_DEGREE: f64 = 111_000.0;

/// Bounding box of a point set, or `None` if it is empty.
pub fn points_bbox(points: &[Point]) -> Option<BBox> {
    let first = points.first()?;
    let mut min_x = first.lon();
    let mut min_y = first.lat();
    let mut max_x = first.lon();
    let mut max_y = first.lat();
    for point in &points[1..] {
        min_x = min_x.min(point.lon());
        min_y = min_y.min(point.lat());
        max_x = max_x.max(point.lon());
        max_y = max_y.max(point.lat());
    }
    Some(BBox::new(
        Point::new(min_x, min_y),
        Point::new(max_x, max_y),
    ))
}

/// Bounding box of a pair of points in any order.
pub fn pair_bbox(a: &Point, b: &Point) -> BBox {
    BBox::new(
        Point::new(a.lon().min(b.lon()), a.lat().min(b.lat())),
        Point::new(a.lon().max(b.lon()), a.lat().max(b.lat())),
    )
}

/// Bounding box spanning every point of every record, or `None` if no
/// record holds a point.
pub fn dataset_bbox(records: &[Record]) -> Option<BBox> {
    let mut acc: Option<(f64, f64, f64, f64)> = None;
    for record in records {
        for point in &record.trajectory {
            let (min_x, min_y, max_x, max_y) =
                acc.get_or_insert((point.lon(), point.lat(), point.lon(), point.lat()));
            *min_x = min_x.min(point.lon());
            *min_y = min_y.min(point.lat());
            *max_x = max_x.max(point.lon());
            *max_y = max_y.max(point.lat());
        }
    }
    acc.map(|(min_x, min_y, max_x, max_y)| {
        BBox::new(Point::new(min_x, min_y), Point::new(max_x, max_y))
    })
}

/// Degree-extent box around a point covering a metre radius.
///
/// The latitude offset is `radius / 111km`; the longitude offset grows with
/// the cosine of the latitude. Used to prune quadtree radius searches, so
/// erring large is fine.
pub fn radius_bbox(center: &Point, radius_meters: f64) -> BBox {
    let lat_offset = radius_meters / METERS_PER_DEGREE;
    let lon_offset = radius_meters / (METERS_PER_DEGREE * center.lat().to_radians().cos());
    BBox::new(
        Point::new(center.lon() - lon_offset, center.lat() - lat_offset),
        Point::new(center.lon() + lon_offset, center.lat() + lat_offset),
    )
}

/// A uniformly random point inside the box.
pub fn random_point<R: Rng>(bounds: &BBox, rng: &mut R) -> Point {
    Point::new(
        bounds.p1.lon() + rng.gen::<f64>() * bounds.width,
        bounds.p1.lat() + rng.gen::<f64>() * bounds.height,
    )
}

/// A random box spanned by two random points inside `bounds`.
pub fn random_bbox<R: Rng>(bounds: &BBox, rng: &mut R) -> BBox {
    pair_bbox(&random_point(bounds, rng), &random_point(bounds, rng))
}

/// A random trajectory of 10 to 99 points inside a fixed unit-kilometre
/// style box, for quick tests.
pub fn random_trajectory<R: Rng>(rng: &mut R) -> Trajectory {
    let size = 10 + rng.gen_range(0..90);
    let bbox = BBox::new(Point::new(0.0, 0.0), Point::new(1000.0, 1000.0));
    (0..size).map(|_| random_point(&bbox, rng)).collect()
}

/// A random walk of `size` points: each step moves `distance` from the
/// previous point at a heading that drifts by up to five units either way,
/// wrapped back into `bounds` at the edges.
pub fn random_walk<R: Rng>(
    bounds: &BBox,
    mut angle: f64,
    distance: f64,
    size: usize,
    rng: &mut R,
) -> Trajectory {
    let mut points = Vec::with_capacity(size);
    points.push(random_point(bounds, rng));
    for i in 1..size {
        let prev = &points[i - 1];
        let x = bounds.p1.lon()
            + (prev.lon() - bounds.p1.lon() + angle.cos() * distance).rem_euclid(bounds.width);
        let y = bounds.p1.lat()
            + (prev.lat() - bounds.p1.lat() + angle.sin() * distance).rem_euclid(bounds.height);
        angle += rng.gen::<f64>() * 10.0 - 5.0;
        points.push(Point::new(x, y));
    }
    points
}
