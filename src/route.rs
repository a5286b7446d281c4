//! # Route Geometry and Trimming
//!
//! A parsed event's point sequence becomes a [`RouteGeometry`]: bare
//! coordinates in recorded order, with elevation and time annotations
//! dropped. Before a route is shared, [`trim_route`] clips a fixed arc
//! length from each end so the exact start and end locations stay private
//! while the shape of the ride or run is preserved.
//!
//! Trimming walks the polyline by accumulated haversine distance, the same
//! metric [`RouteGeometry::total_length`] reports, and interpolates a cut
//! point inside the segment where the threshold falls. The end cut is the
//! same walk over the reversed point order.

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{Result, SummaryError};
use crate::event::{ActivityEvent, TrackPoint};
use crate::geo_utils;
use crate::{Bounds, GpsPoint};

// ============================================================================
// Geometry
// ============================================================================

/// An ordered route polyline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteGeometry {
    pub points: Vec<GpsPoint>,
}

impl RouteGeometry {
    pub fn new(points: Vec<GpsPoint>) -> Self {
        Self { points }
    }

    /// Project an event's track points into a route polyline.
    ///
    /// Elevation and time annotations are dropped; point order is
    /// preserved. Fails with [`SummaryError::EmptyRoute`] when the event
    /// holds fewer than two points, since no line exists to share.
    pub fn from_event(event: &ActivityEvent) -> Result<Self> {
        if event.points.len() < 2 {
            return Err(SummaryError::EmptyRoute {
                point_count: event.points.len(),
            });
        }
        Ok(Self {
            points: event.points.iter().map(TrackPoint::position).collect(),
        })
    }

    /// Total arc length in meters.
    pub fn total_length(&self) -> f64 {
        geo_utils::polyline_length(&self.points)
    }

    /// Center of the route's bounding box.
    pub fn center(&self) -> GpsPoint {
        match Bounds::from_points(&self.points) {
            Some(bounds) => bounds.center(),
            None => GpsPoint::new(0.0, 0.0),
        }
    }

    /// Render as a GeoJSON `Feature` holding a `LineString`.
    ///
    /// GeoJSON coordinate order is `[longitude, latitude]`.
    pub fn to_geojson(&self) -> Value {
        let coordinates: Vec<[f64; 2]> = self
            .points
            .iter()
            .map(|p| [p.longitude, p.latitude])
            .collect();
        json!({
            "type": "Feature",
            "properties": {},
            "geometry": {
                "type": "LineString",
                "coordinates": coordinates,
            }
        })
    }
}

/// A route with a fixed arc length clipped from each end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrimmedRoute {
    pub geometry: RouteGeometry,
    /// The tolerance the trim was performed with, in meters.
    pub tolerance_m: f64,
}

// ============================================================================
// Trimming
// ============================================================================

/// Clip `tolerance_m` meters of arc length from both ends of a route.
///
/// The result starts at the interpolated point `tolerance_m` meters along
/// the polyline, keeps every original vertex strictly between the two cut
/// points, and ends `tolerance_m` meters before the original end.
///
/// # Arguments
///
/// * `route` - The route to trim
/// * `tolerance_m` - Arc length to remove from each end, in meters
///
/// # Errors
///
/// [`SummaryError::DegenerateTrim`] when `2 * tolerance_m` reaches the
/// route's total length, meaning nothing would remain.
///
/// # Edge cases
///
/// A zero or negative tolerance returns the route unchanged. Consecutive
/// duplicate points (zero-length segments) are walked over without
/// producing a division by zero.
pub fn trim_route(route: &RouteGeometry, tolerance_m: f64) -> Result<TrimmedRoute> {
    if tolerance_m <= 0.0 {
        return Ok(TrimmedRoute {
            geometry: route.clone(),
            tolerance_m,
        });
    }

    let total_m = route.total_length();
    if 2.0 * tolerance_m >= total_m {
        return Err(SummaryError::DegenerateTrim {
            tolerance_m,
            total_m,
        });
    }

    let points = &route.points;
    let (start_segment, new_start) = point_along(points, tolerance_m);

    let reversed: Vec<GpsPoint> = points.iter().rev().copied().collect();
    let (reversed_segment, new_end) = point_along(&reversed, tolerance_m);
    // Segment m of the reversed walk covers original segment n-2-m.
    let end_segment = points.len() - 2 - reversed_segment;

    // 2T < total keeps the cut points ordered in exact arithmetic, but the
    // two walks accumulate rounding independently; re-check before slicing.
    let inverted = start_segment > end_segment
        || (start_segment == end_segment
            && geo_utils::haversine_distance(&points[start_segment], &new_start)
                > geo_utils::haversine_distance(&points[end_segment], &new_end));
    if inverted {
        return Err(SummaryError::DegenerateTrim {
            tolerance_m,
            total_m,
        });
    }

    let mut trimmed = Vec::with_capacity(end_segment - start_segment + 2);
    trimmed.push(new_start);
    trimmed.extend_from_slice(&points[start_segment + 1..=end_segment]);
    trimmed.push(new_end);

    debug!(
        "[Route] trimmed {:.1}m from each end: {} -> {} points, {:.1}m -> {:.1}m",
        tolerance_m,
        points.len(),
        trimmed.len(),
        total_m,
        total_m - 2.0 * tolerance_m
    );

    Ok(TrimmedRoute {
        geometry: RouteGeometry::new(trimmed),
        tolerance_m,
    })
}

/// Find the point `target_m` meters of accumulated arc length along a
/// polyline.
///
/// Returns the index of the segment the point falls on (its start vertex)
/// and the interpolated point itself. A target landing exactly on a vertex
/// is attributed to the following segment at ratio zero, so callers taking
/// vertices after the returned index never duplicate the cut point.
///
/// Callers guarantee `points.len() >= 2`; a target at or past the total
/// length clamps to the final vertex.
fn point_along(points: &[GpsPoint], target_m: f64) -> (usize, GpsPoint) {
    let mut accumulated = 0.0;

    for i in 0..points.len() - 1 {
        let segment = geo_utils::haversine_distance(&points[i], &points[i + 1]);
        if accumulated + segment > target_m {
            let ratio = if segment > 0.0 {
                (target_m - accumulated) / segment
            } else {
                0.0
            };
            return (i, geo_utils::interpolate(&points[i], &points[i + 1], ratio));
        }
        accumulated += segment;
    }

    (points.len() - 2, points[points.len() - 1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
        (a - b).abs() < tolerance
    }

    /// Straight northward line: `n` points, ~`spacing_m` meters apart.
    fn straight_route(n: usize, spacing_m: f64) -> RouteGeometry {
        let degrees_per_meter = 1.0 / 111_194.9;
        RouteGeometry::new(
            (0..n)
                .map(|i| GpsPoint::new(51.0 + i as f64 * spacing_m * degrees_per_meter, -0.1278))
                .collect(),
        )
    }

    fn event_with_points(points: Vec<TrackPoint>) -> ActivityEvent {
        ActivityEvent::new(
            points,
            None,
            DateTime::from_timestamp(1_715_504_400, 0).unwrap(),
            "run".to_string(),
        )
    }

    #[test]
    fn test_from_event_projects_in_order() {
        let mut first = TrackPoint::new(51.50, -0.12);
        first.elevation = Some(12.0);
        first.time = DateTime::from_timestamp(1_715_504_400, 0);
        let second = TrackPoint::new(51.51, -0.13);
        let event = event_with_points(vec![first, second]);

        let route = RouteGeometry::from_event(&event).unwrap();
        assert_eq!(
            route.points,
            vec![GpsPoint::new(51.50, -0.12), GpsPoint::new(51.51, -0.13)]
        );
    }

    #[test]
    fn test_from_event_ignores_annotations() {
        let mut annotated = TrackPoint::new(51.50, -0.12);
        annotated.elevation = Some(250.0);
        annotated.time = DateTime::from_timestamp(1_715_504_400, 0);
        let bare = TrackPoint::new(51.50, -0.12);

        let with_annotations =
            RouteGeometry::from_event(&event_with_points(vec![annotated, TrackPoint::new(51.51, -0.12)]))
                .unwrap();
        let without =
            RouteGeometry::from_event(&event_with_points(vec![bare, TrackPoint::new(51.51, -0.12)]))
                .unwrap();
        assert_eq!(with_annotations, without);
    }

    #[test]
    fn test_from_event_rejects_short_routes() {
        let err = RouteGeometry::from_event(&event_with_points(Vec::new())).unwrap_err();
        assert!(matches!(err, SummaryError::EmptyRoute { point_count: 0 }));

        let err =
            RouteGeometry::from_event(&event_with_points(vec![TrackPoint::new(51.5, -0.1)]))
                .unwrap_err();
        assert!(matches!(err, SummaryError::EmptyRoute { point_count: 1 }));
    }

    #[test]
    fn test_total_length_straight_line() {
        let route = straight_route(5, 100.0);
        assert!(approx_eq(route.total_length(), 400.0, 0.5));
    }

    #[test]
    fn test_geojson_feature_shape() {
        let route = RouteGeometry::new(vec![
            GpsPoint::new(51.5, -0.12),
            GpsPoint::new(51.6, -0.13),
        ]);
        let feature = route.to_geojson();
        assert_eq!(feature["type"], "Feature");
        assert_eq!(feature["geometry"]["type"], "LineString");
        // Longitude first.
        assert_eq!(feature["geometry"]["coordinates"][0][0], -0.12);
        assert_eq!(feature["geometry"]["coordinates"][0][1], 51.5);
        assert_eq!(
            feature["geometry"]["coordinates"]
                .as_array()
                .unwrap()
                .len(),
            2
        );
    }

    #[test]
    fn test_trim_zero_tolerance_is_identity() {
        let route = straight_route(5, 100.0);
        let trimmed = trim_route(&route, 0.0).unwrap();
        assert_eq!(trimmed.geometry, route);

        let trimmed = trim_route(&route, -10.0).unwrap();
        assert_eq!(trimmed.geometry, route);
    }

    #[test]
    fn test_trim_clips_both_ends() {
        let route = straight_route(5, 100.0);
        let trimmed = trim_route(&route, 50.0).unwrap();

        // Cut points interpolated mid-segment, interior vertices kept.
        assert_eq!(trimmed.geometry.points.len(), 5);
        assert_eq!(&trimmed.geometry.points[1..4], &route.points[1..4]);
        assert!(approx_eq(trimmed.geometry.total_length(), 300.0, 0.5));

        let start_inset =
            geo_utils::haversine_distance(&route.points[0], &trimmed.geometry.points[0]);
        assert!(approx_eq(start_inset, 50.0, 0.5));
        let end_inset = geo_utils::haversine_distance(
            &route.points[4],
            trimmed.geometry.points.last().unwrap(),
        );
        assert!(approx_eq(end_inset, 50.0, 0.5));
    }

    #[test]
    fn test_trim_strictly_shrinks() {
        let route = straight_route(5, 100.0);
        for tolerance in [0.5, 10.0, 199.0] {
            let trimmed = trim_route(&route, tolerance).unwrap();
            assert!(
                trimmed.geometry.total_length() < route.total_length(),
                "tolerance {} did not shrink",
                tolerance
            );
            assert!(trimmed.geometry.points.len() >= 2);
        }
    }

    #[test]
    fn test_trim_two_point_route() {
        let route = straight_route(2, 1000.0);
        let trimmed = trim_route(&route, 200.0).unwrap();
        assert_eq!(trimmed.geometry.points.len(), 2);
        assert!(approx_eq(trimmed.geometry.total_length(), 600.0, 1.0));
    }

    #[test]
    fn test_trim_rejects_degenerate_tolerance() {
        let route = straight_route(5, 100.0);
        // Exactly half and beyond half both leave nothing to share.
        let exact_half = route.total_length() / 2.0;
        for tolerance in [exact_half, 200.5, 10_000.0] {
            let err = trim_route(&route, tolerance).unwrap_err();
            assert!(
                matches!(err, SummaryError::DegenerateTrim { .. }),
                "tolerance {} should be degenerate",
                tolerance
            );
        }
    }

    #[test]
    fn test_trim_just_under_half_survives() {
        let route = straight_route(5, 100.0);
        let trimmed = trim_route(&route, 199.9).unwrap();
        assert!(trimmed.geometry.points.len() >= 2);
        assert!(approx_eq(trimmed.geometry.total_length(), 0.2, 0.05));
    }

    #[test]
    fn test_trim_walks_over_duplicate_points() {
        let a = GpsPoint::new(51.0, -0.1278);
        let route = RouteGeometry::new(vec![
            a,
            a, // recorder stood still
            GpsPoint::new(51.0 + 100.0 / 111_194.9, -0.1278),
        ]);
        let trimmed = trim_route(&route, 30.0).unwrap();
        assert_eq!(trimmed.geometry.points.len(), 2);
        assert!(approx_eq(trimmed.geometry.total_length(), 40.0, 0.5));
    }

    #[test]
    fn test_retrim_with_zero_is_noop() {
        let route = straight_route(10, 100.0);
        let trimmed = trim_route(&route, 150.0).unwrap();
        let again = trim_route(&trimmed.geometry, 0.0).unwrap();
        assert_eq!(again.geometry, trimmed.geometry);
    }

    #[test]
    fn test_center_is_bounding_box_center() {
        let route = straight_route(5, 100.0);
        let center = route.center();
        let bounds = Bounds::from_points(&route.points).unwrap();
        assert_eq!(center, bounds.center());
    }
}
