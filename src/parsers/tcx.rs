//! TCX decoding via `quick-xml`'s serde support. The document is mapped
//! onto a minimal mirror of the Training Center schema: laps, tracks and
//! trackpoints, plus the `Sport` attribute and the optional `Notes`
//! element. Trackpoints without a `Position` (heart-rate-only samples)
//! are skipped.
//!
//! A TCX file may hold several activities; like the canonical event model,
//! this parser takes the first and ignores the rest.

use chrono::{DateTime, Utc};
use log::debug;
use quick_xml::de::from_str;
use serde::Deserialize;

use super::ActivityParser;
use crate::error::{Result, SummaryError};
use crate::event::{ActivityEvent, TrackPoint};
use crate::format::{ActivityFormat, Payload};

// ============================================================================
// Schema Mirror
// ============================================================================

#[derive(Debug, Deserialize)]
struct TrainingCenterDatabase {
    #[serde(rename = "Activities")]
    activities: Option<Activities>,
}

#[derive(Debug, Deserialize)]
struct Activities {
    #[serde(rename = "Activity", default)]
    activities: Vec<TcxActivity>,
}

#[derive(Debug, Deserialize)]
struct TcxActivity {
    #[serde(rename = "@Sport", default)]
    sport: String,
    #[serde(rename = "Id")]
    id: Option<String>,
    #[serde(rename = "Lap", default)]
    laps: Vec<TcxLap>,
    #[serde(rename = "Notes")]
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TcxLap {
    #[serde(rename = "@StartTime")]
    start_time: Option<String>,
    #[serde(rename = "Track", default)]
    tracks: Vec<TcxTrack>,
}

#[derive(Debug, Deserialize)]
struct TcxTrack {
    #[serde(rename = "Trackpoint", default)]
    trackpoints: Vec<TcxTrackpoint>,
}

#[derive(Debug, Deserialize)]
struct TcxTrackpoint {
    #[serde(rename = "Time")]
    time: Option<String>,
    #[serde(rename = "Position")]
    position: Option<TcxPosition>,
    #[serde(rename = "AltitudeMeters")]
    altitude_meters: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct TcxPosition {
    #[serde(rename = "LatitudeDegrees")]
    latitude_degrees: f64,
    #[serde(rename = "LongitudeDegrees")]
    longitude_degrees: f64,
}

// ============================================================================
// Parser
// ============================================================================

pub struct TcxActivityParser;

impl ActivityParser for TcxActivityParser {
    fn format(&self) -> ActivityFormat {
        ActivityFormat::Tcx
    }

    fn parse(&self, payload: &Payload) -> Result<ActivityEvent> {
        let text = match payload {
            Payload::Text(text) => text,
            Payload::Binary(_) => return Err(parse_error("expected a text payload, got bytes")),
        };

        // Some exporters pad the XML declaration with leading whitespace.
        let document: TrainingCenterDatabase =
            from_str(text.trim()).map_err(|e| parse_error(e.to_string()))?;

        let activities = document
            .activities
            .map(|wrapper| wrapper.activities)
            .unwrap_or_default();
        if activities.len() > 1 {
            debug!(
                "[Tcx] file contains {} activities, using the first",
                activities.len()
            );
        }
        let activity = activities
            .into_iter()
            .next()
            .ok_or_else(|| parse_error("no activity element found"))?;

        let mut points = Vec::new();
        let mut skipped = 0usize;
        for lap in &activity.laps {
            for track in &lap.tracks {
                for trackpoint in &track.trackpoints {
                    let position = match &trackpoint.position {
                        Some(position) => position,
                        None => {
                            skipped += 1;
                            continue;
                        }
                    };
                    let time = match &trackpoint.time {
                        Some(time) => Some(parse_time(time)?),
                        None => None,
                    };
                    points.push(TrackPoint {
                        latitude: position.latitude_degrees,
                        longitude: position.longitude_degrees,
                        elevation: trackpoint.altitude_meters,
                        time,
                    });
                }
            }
        }
        if skipped > 0 {
            debug!("[Tcx] skipped {} trackpoints without a position", skipped);
        }

        let lap_start = match activity.laps.first().and_then(|lap| lap.start_time.as_deref()) {
            Some(raw) => Some(parse_time(raw)?),
            None => None,
        };
        let start_date = lap_start
            // By Garmin convention the Id element is the start instant, but
            // some apps write opaque ids there; fall through quietly.
            .or_else(|| {
                activity
                    .id
                    .as_deref()
                    .and_then(|id| parse_time(id.trim()).ok())
            })
            .or_else(|| points.iter().find_map(|p| p.time))
            .ok_or_else(|| parse_error("no start time present in file"))?;

        Ok(ActivityEvent::new(
            points,
            activity.notes,
            start_date,
            activity.sport,
        ))
    }
}

fn parse_time(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| parse_error(format!("bad timestamp '{}': {}", raw, e)))
}

fn parse_error(message: impl Into<String>) -> SummaryError {
    SummaryError::FormatParse {
        format: ActivityFormat::Tcx,
        message: message.into(),
    }
}
