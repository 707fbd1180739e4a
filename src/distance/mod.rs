//! Distance functions: great-circle point distance, set distance over
//! fingerprint bitmaps, and the trajectory distances built on top of them.

pub mod dfd;
pub mod dtw;
pub mod jaccard;

use crate::types::Point;

/// Mean Earth radius in metres used by the haversine formula.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two points in metres, by the haversine
/// formula on a sphere of radius [`EARTH_RADIUS_M`].
///
/// The `min(1, sqrt(a))` clamp keeps `asin` in range when rounding pushes
/// `a` past 1 for near-antipodal points. Symmetric and non-negative;
/// `haversine(p, p)` is zero only up to floating-point rounding.
///
/// # Examples
///
/// ```
/// use geodex::{distance::haversine, Point};
///
/// let equator = Point::new(0.0, 0.0);
/// let pole = Point::new(0.0, 90.0);
/// assert_eq!(haversine(&equator, &equator), 0.0);
/// assert!((haversine(&equator, &pole) - 10_007_543.0).abs() < 1.0);
/// ```
pub fn haversine(p1: &Point, p2: &Point) -> f64 {
    let lat1 = p1.lat().to_radians();
    let lat2 = p2.lat().to_radians();
    let dlat = lat2 - lat1;
    let dlon = p2.lon().to_radians() - p1.lon().to_radians();
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().min(1.0).asin();
    EARTH_RADIUS_M * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_zero() {
        let p = Point::new(-74.0060, 40.7128);
        assert_eq!(haversine(&p, &p), 0.0);
    }

    #[test]
    fn test_haversine_quarter_meridian() {
        let d = haversine(&Point::new(0.0, 0.0), &Point::new(0.0, 90.0));
        assert!((d - 10_007_543.0).abs() < 1.0, "got {d}");
    }

    #[test]
    fn test_haversine_symmetric() {
        let a = Point::new(-74.0060, 40.7128);
        let b = Point::new(2.3522, 48.8566);
        assert_eq!(haversine(&a, &b), haversine(&b, &a));
    }

    #[test]
    fn test_haversine_antipodal_clamp() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(180.0, 0.0);
        let d = haversine(&a, &b);
        assert!(d.is_finite());
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_M).abs() < 1.0);
    }
}
