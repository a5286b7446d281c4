//! # Geographic Utilities
//!
//! Distance helpers shared by route construction and trimming. All
//! distances are haversine meters computed by the `geo` crate, which keeps
//! the arc-length arithmetic consistent across the whole pipeline: the
//! total length used for the degeneracy check and the per-segment walk used
//! by the trimmer must agree, or a tolerance right at the boundary could
//! pass one and fail the other.

use geo::{Distance, Haversine, Point};

use crate::GpsPoint;

/// Calculate the haversine distance between two GPS points in meters.
///
/// # Arguments
///
/// * `p1` - First point
/// * `p2` - Second point
///
/// # Returns
///
/// Distance in meters along the great circle through both points.
pub fn haversine_distance(p1: &GpsPoint, p2: &GpsPoint) -> f64 {
    let point1 = Point::new(p1.longitude, p1.latitude);
    let point2 = Point::new(p2.longitude, p2.latitude);
    Haversine::distance(point1, point2)
}

/// Total arc length of a polyline in meters.
///
/// Sums the haversine distance over consecutive point pairs. Polylines with
/// fewer than two points have zero length.
pub fn polyline_length(points: &[GpsPoint]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    points
        .windows(2)
        .map(|pair| haversine_distance(&pair[0], &pair[1]))
        .sum()
}

/// Linear interpolation between two points.
///
/// For the short segments of recorded GPS tracks the straight chord in
/// latitude/longitude space stays within centimeters of the great circle,
/// which is well inside GPS receiver noise.
pub fn interpolate(from: &GpsPoint, to: &GpsPoint, ratio: f64) -> GpsPoint {
    GpsPoint::new(
        from.latitude + ratio * (to.latitude - from.latitude),
        from.longitude + ratio * (to.longitude - from.longitude),
    )
}
