//! FIT decoding: binary record streams from Garmin devices and most watch
//! vendors. Positions arrive as 32-bit semicircles and are converted to
//! degrees; samples without a position (sensor-only records, pool lengths)
//! are skipped.

use chrono::{DateTime, Utc};
use fitparser::de::from_bytes;
use fitparser::profile::MesgNum;
use log::debug;

use super::ActivityParser;
use crate::error::{Result, SummaryError};
use crate::event::{ActivityEvent, TrackPoint};
use crate::format::{ActivityFormat, Payload};

/// Degrees per semicircle: FIT encodes angles as `i32` over the full
/// circle, so one semicircle is `180 / 2^31` degrees.
const DEGREES_PER_SEMICIRCLE: f64 = 180.0 / 2_147_483_648.0;

pub struct FitActivityParser;

impl ActivityParser for FitActivityParser {
    fn format(&self) -> ActivityFormat {
        ActivityFormat::Fit
    }

    fn parse(&self, payload: &Payload) -> Result<ActivityEvent> {
        let bytes = match payload {
            Payload::Binary(bytes) => bytes.as_slice(),
            Payload::Text(_) => return Err(parse_error("expected a binary payload, got text")),
        };

        let records = from_bytes(bytes).map_err(|e| parse_error(e.to_string()))?;

        let mut points = Vec::new();
        let mut skipped = 0usize;
        let mut sport: Option<String> = None;
        let mut session_start: Option<DateTime<Utc>> = None;
        let mut workout_name: Option<String> = None;

        for record in &records {
            match record.kind() {
                MesgNum::Record => {
                    let mut latitude: Option<f64> = None;
                    let mut longitude: Option<f64> = None;
                    let mut elevation: Option<f64> = None;
                    let mut time: Option<DateTime<Utc>> = None;

                    for field in record.fields() {
                        match field.name() {
                            "position_lat" => {
                                latitude =
                                    fit_value_to_f64(field.value()).map(semicircles_to_degrees);
                            }
                            "position_long" => {
                                longitude =
                                    fit_value_to_f64(field.value()).map(semicircles_to_degrees);
                            }
                            "altitude" => {
                                // enhanced_altitude wins when both appear
                                if elevation.is_none() {
                                    elevation = fit_value_to_f64(field.value());
                                }
                            }
                            "enhanced_altitude" => {
                                if let Some(value) = fit_value_to_f64(field.value()) {
                                    elevation = Some(value);
                                }
                            }
                            "timestamp" => {
                                if let fitparser::Value::Timestamp(ts) = field.value() {
                                    time = Some(ts.with_timezone(&Utc));
                                }
                            }
                            _ => {}
                        }
                    }

                    match (latitude, longitude) {
                        (Some(latitude), Some(longitude)) => points.push(TrackPoint {
                            latitude,
                            longitude,
                            elevation,
                            time,
                        }),
                        _ => skipped += 1,
                    }
                }
                MesgNum::Session => {
                    for field in record.fields() {
                        match field.name() {
                            "sport" => {
                                if let fitparser::Value::String(value) = field.value() {
                                    sport = Some(value.clone());
                                }
                            }
                            "start_time" => {
                                if let fitparser::Value::Timestamp(ts) = field.value() {
                                    session_start = Some(ts.with_timezone(&Utc));
                                }
                            }
                            _ => {}
                        }
                    }
                }
                MesgNum::Workout => {
                    for field in record.fields() {
                        if field.name() == "wkt_name" {
                            if let fitparser::Value::String(value) = field.value() {
                                workout_name = Some(value.clone());
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        if skipped > 0 {
            debug!("[Fit] skipped {} records without a position", skipped);
        }

        let start_date = session_start
            .or_else(|| points.iter().find_map(|p| p.time))
            .ok_or_else(|| parse_error("no start time present in file"))?;

        Ok(ActivityEvent::new(
            points,
            workout_name,
            start_date,
            sport.unwrap_or_default(),
        ))
    }
}

fn semicircles_to_degrees(semicircles: f64) -> f64 {
    semicircles * DEGREES_PER_SEMICIRCLE
}

/// Widen any numeric FIT value to `f64`. Strings and enums map to `None`.
fn fit_value_to_f64(value: &fitparser::Value) -> Option<f64> {
    match value {
        fitparser::Value::Float32(v) => Some(*v as f64),
        fitparser::Value::Float64(v) => Some(*v),
        fitparser::Value::SInt8(v) => Some(*v as f64),
        fitparser::Value::UInt8(v) => Some(*v as f64),
        fitparser::Value::UInt8z(v) => Some(*v as f64),
        fitparser::Value::SInt16(v) => Some(*v as f64),
        fitparser::Value::UInt16(v) => Some(*v as f64),
        fitparser::Value::UInt16z(v) => Some(*v as f64),
        fitparser::Value::SInt32(v) => Some(*v as f64),
        fitparser::Value::UInt32(v) => Some(*v as f64),
        fitparser::Value::UInt32z(v) => Some(*v as f64),
        fitparser::Value::SInt64(v) => Some(*v as f64),
        fitparser::Value::UInt64(v) => Some(*v as f64),
        fitparser::Value::UInt64z(v) => Some(*v as f64),
        fitparser::Value::Byte(v) => Some(*v as f64),
        fitparser::Value::Array(values) => values.iter().find_map(fit_value_to_f64),
        _ => None,
    }
}

fn parse_error(message: impl Into<String>) -> SummaryError {
    SummaryError::FormatParse {
        format: ActivityFormat::Fit,
        message: message.into(),
    }
}
