//! # Canonical Activity Events
//!
//! Every parser, whatever its input format, produces the same
//! [`ActivityEvent`] shape. All downstream derivations (metadata, summary,
//! route, geohash) read only this type, so adding a format never touches
//! the derivation code.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::geo_utils;
use crate::taxonomy::{ActivityType, ActivityTypeTaxonomy};
use crate::GpsPoint;

// ============================================================================
// Event Model
// ============================================================================

/// A single recorded track point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    pub latitude: f64,
    pub longitude: f64,
    /// Elevation in meters, when the sample carries one.
    pub elevation: Option<f64>,
    /// Instant the sample was recorded.
    pub time: Option<DateTime<Utc>>,
}

impl TrackPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            elevation: None,
            time: None,
        }
    }

    /// Position without the elevation/time annotations.
    pub fn position(&self) -> GpsPoint {
        GpsPoint::new(self.latitude, self.longitude)
    }
}

/// Format-agnostic representation of one parsed activity file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEvent {
    /// Recorded track points in file order.
    pub points: Vec<TrackPoint>,
    /// Activity name, when the file carries one.
    pub name: Option<String>,
    /// Instant the recording started.
    pub start_date: DateTime<Utc>,
    /// The format's own activity type string, unmapped.
    pub activity_type_raw: String,
    /// Descriptive statistics keyed by display name.
    pub raw_stats: Map<String, Value>,
}

impl ActivityEvent {
    /// Assemble an event from parsed parts, deriving the descriptive
    /// statistics from the point sequence.
    pub fn new(
        points: Vec<TrackPoint>,
        name: Option<String>,
        start_date: DateTime<Utc>,
        activity_type_raw: String,
    ) -> Self {
        let raw_stats = derive_raw_stats(&points);
        Self {
            points,
            name,
            start_date,
            activity_type_raw,
            raw_stats,
        }
    }
}

// ============================================================================
// Derived Statistics
// ============================================================================

/// Derive display statistics from a point sequence.
///
/// Keys and units:
/// * `"Distance"` - haversine track length, meters (always present)
/// * `"Duration"` - seconds between first and last timestamped point
/// * `"Ascent"` - sum of positive elevation deltas, meters
/// * `"Start Position"` / `"End Position"` - first/last coordinates as
///   `{latitudeDegrees, longitudeDegrees}` objects
///
/// Keys whose inputs are missing (no timestamps, no elevation, no points)
/// are omitted rather than written as null.
pub fn derive_raw_stats(points: &[TrackPoint]) -> Map<String, Value> {
    let mut stats = Map::new();

    let positions: Vec<GpsPoint> = points.iter().map(TrackPoint::position).collect();
    stats.insert(
        "Distance".to_string(),
        json!(geo_utils::polyline_length(&positions)),
    );

    let first_time = points.iter().find_map(|p| p.time);
    let last_time = points.iter().rev().find_map(|p| p.time);
    if let (Some(first), Some(last)) = (first_time, last_time) {
        let seconds = (last - first).num_milliseconds() as f64 / 1000.0;
        stats.insert("Duration".to_string(), json!(seconds));
    }

    let mut ascent = 0.0;
    let mut previous_elevation: Option<f64> = None;
    let mut saw_elevation = false;
    for point in points {
        if let Some(elevation) = point.elevation {
            if let Some(previous) = previous_elevation {
                let delta = elevation - previous;
                if delta > 0.0 {
                    ascent += delta;
                }
            }
            previous_elevation = Some(elevation);
            saw_elevation = true;
        }
    }
    if saw_elevation {
        stats.insert("Ascent".to_string(), json!(ascent));
    }

    if let (Some(first), Some(last)) = (points.first(), points.last()) {
        stats.insert("Start Position".to_string(), position_value(first));
        stats.insert("End Position".to_string(), position_value(last));
    }

    stats
}

fn position_value(point: &TrackPoint) -> Value {
    json!({
        "latitudeDegrees": point.latitude,
        "longitudeDegrees": point.longitude,
    })
}

// ============================================================================
// Metadata Extraction
// ============================================================================

/// Normalized metadata for the activity-record workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityMetadata {
    /// Normalized activity category.
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    /// Display title; empty when the file carries no name.
    pub title: String,
    /// Start instant as whole epoch seconds, floored.
    pub recorded_at: i64,
}

/// Extract record metadata from a parsed event.
///
/// Works for any event, including one with an empty point sequence: the
/// fields depend only on the type string, the name and the start instant.
pub fn extract_metadata(
    event: &ActivityEvent,
    taxonomy: &dyn ActivityTypeTaxonomy,
) -> ActivityMetadata {
    ActivityMetadata {
        activity_type: taxonomy.map(&event.activity_type_raw),
        title: event.name.clone().unwrap_or_default(),
        recorded_at: event.start_date.timestamp(),
    }
}
