//! GPX decoding via the `gpx` crate. Track points across all tracks and
//! segments are flattened into one sequence in document order; the first
//! track supplies the name and type, with the file-level metadata name as
//! fallback.

use chrono::{DateTime, Utc};
use gpx::read;
use std::io::Cursor;

use super::ActivityParser;
use crate::error::{Result, SummaryError};
use crate::event::{ActivityEvent, TrackPoint};
use crate::format::{ActivityFormat, Payload};

pub struct GpxActivityParser;

impl ActivityParser for GpxActivityParser {
    fn format(&self) -> ActivityFormat {
        ActivityFormat::Gpx
    }

    fn parse(&self, payload: &Payload) -> Result<ActivityEvent> {
        let text = match payload {
            Payload::Text(text) => text,
            Payload::Binary(_) => return Err(parse_error("expected a text payload, got bytes")),
        };

        let mut cursor = Cursor::new(text.as_bytes());
        let mut document = read(&mut cursor).map_err(|e| parse_error(e.to_string()))?;

        let (metadata_name, metadata_time) = match document.metadata.take() {
            Some(metadata) => (metadata.name, metadata.time),
            None => (None, None),
        };
        let track_name = document.tracks.first().and_then(|t| t.name.clone());
        let activity_type_raw = document
            .tracks
            .first()
            .and_then(|t| t.type_.clone())
            .unwrap_or_default();

        let mut points = Vec::new();
        for track in document.tracks {
            for segment in track.segments {
                for waypoint in segment.points {
                    let time = match waypoint.time {
                        Some(time) => Some(time_to_utc(time)?),
                        None => None,
                    };
                    let position = waypoint.point();
                    points.push(TrackPoint {
                        latitude: position.y(),
                        longitude: position.x(),
                        elevation: waypoint.elevation,
                        time,
                    });
                }
            }
        }

        let start_date = match metadata_time {
            Some(time) => time_to_utc(time)?,
            None => points
                .iter()
                .find_map(|p| p.time)
                .ok_or_else(|| parse_error("no timestamp present in file"))?,
        };

        // The track's own name beats the export tool's file-level name.
        let name = track_name.or(metadata_name);

        Ok(ActivityEvent::new(
            points,
            name,
            start_date,
            activity_type_raw,
        ))
    }
}

fn time_to_utc(time: gpx::Time) -> Result<DateTime<Utc>> {
    let iso = time.format().map_err(|e| parse_error(e.to_string()))?;
    DateTime::parse_from_rfc3339(&iso)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| parse_error(e.to_string()))
}

fn parse_error(message: impl Into<String>) -> SummaryError {
    SummaryError::FormatParse {
        format: ActivityFormat::Gpx,
        message: message.into(),
    }
}
