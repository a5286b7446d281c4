//! # Summarizer Facade
//!
//! Owns the pipeline wiring for the common case: route a file name, remove
//! the gzip layer if present, parse into a canonical event, then hand out
//! the derived artifacts. Parsing is the only stateful step; every
//! derivation is a pure read of the held event, so they can be called in
//! any order and any number of times.
//!
//! The shared artifacts (`geojson`, `geohash`) are derived from the
//! *trimmed* route, so nothing that leaves the device pins the start or
//! end location.

use log::debug;
use std::path::Path;
use tokio::io::{AsyncBufRead, BufReader};

use crate::decompress;
use crate::error::{Result, SummaryError};
use crate::event::{extract_metadata, ActivityEvent, ActivityMetadata};
use crate::format::{classify, ActivityFormat, Payload};
use crate::geohash;
use crate::parsers::ParserSet;
use crate::route::{trim_route, RouteGeometry, TrimmedRoute};
use crate::summary::{sanitize_stats, SummaryRecord};
use crate::taxonomy::{ActivityTypeTaxonomy, KeywordTaxonomy};
use crate::SummarizerConfig;

pub struct Summarizer {
    config: SummarizerConfig,
    parsers: ParserSet,
    taxonomy: Box<dyn ActivityTypeTaxonomy>,
    event: Option<ActivityEvent>,
}

impl Summarizer {
    pub fn new() -> Self {
        Self::with_config(SummarizerConfig::default())
    }

    pub fn with_config(config: SummarizerConfig) -> Self {
        Self::with_parts(config, ParserSet::default(), Box::new(KeywordTaxonomy))
    }

    /// Full injection point for custom parser sets and taxonomies.
    pub fn with_parts(
        config: SummarizerConfig,
        parsers: ParserSet,
        taxonomy: Box<dyn ActivityTypeTaxonomy>,
    ) -> Self {
        Self {
            config,
            parsers,
            taxonomy,
            event: None,
        }
    }

    pub fn config(&self) -> &SummarizerConfig {
        &self.config
    }

    /// The most recently parsed event, if any.
    pub fn event(&self) -> Option<&ActivityEvent> {
        self.event.as_ref()
    }

    // ========================================================================
    // Parsing
    // ========================================================================

    /// Open a file and parse it; the file name selects the decode path.
    pub async fn parse_from_path(&mut self, path: impl AsRef<Path>) -> Result<&ActivityEvent> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string)
            .ok_or_else(|| SummaryError::UnsupportedFormat {
                filename: path.display().to_string(),
            })?;

        // Routing needs only the name; don't open files we cannot parse.
        classify(&filename)?;

        let file = tokio::fs::File::open(path).await?;
        self.parse_from_source(&filename, BufReader::new(file))
            .await
    }

    /// Parse an activity from any async byte source.
    ///
    /// `filename` is used only for routing; the reader supplies the bytes.
    /// On success the parsed event replaces any previously held one.
    pub async fn parse_from_source<R>(
        &mut self,
        filename: &str,
        reader: R,
    ) -> Result<&ActivityEvent>
    where
        R: AsyncBufRead + Unpin,
    {
        let class = classify(filename)?;
        debug!(
            "[Pipeline] {} routed to {} parser (compressed: {})",
            filename, class.format, class.compressed
        );

        // The dispatch table, row by row. `classify` already rejected the
        // gzip+GPX combination, but the match must stay exhaustive.
        let payload = match (class.format, class.compressed) {
            (ActivityFormat::Fit, true) => {
                Payload::Binary(decompress::inflate_bytes(reader).await?)
            }
            (ActivityFormat::Fit, false) => Payload::Binary(decompress::read_bytes(reader).await?),
            (ActivityFormat::Tcx, true) => {
                Payload::Text(decompress::inflate_text(reader, ActivityFormat::Tcx).await?)
            }
            (ActivityFormat::Tcx, false) => {
                Payload::Text(decompress::read_text(reader, ActivityFormat::Tcx).await?)
            }
            (ActivityFormat::Gpx, false) => {
                Payload::Text(decompress::read_text(reader, ActivityFormat::Gpx).await?)
            }
            (ActivityFormat::Gpx, true) => {
                return Err(SummaryError::UnsupportedFormat {
                    filename: filename.to_string(),
                })
            }
        };

        let event = self.parsers.for_format(class.format).parse(&payload)?;
        debug!(
            "[Pipeline] parsed {} event: {} points",
            class.format,
            event.points.len()
        );

        Ok(self.event.insert(event))
    }

    // ========================================================================
    // Derivations
    // ========================================================================

    fn parsed_event(&self) -> Result<&ActivityEvent> {
        self.event.as_ref().ok_or(SummaryError::NoEventParsed)
    }

    /// Normalized metadata for the activity record.
    pub fn metadata(&self) -> Result<ActivityMetadata> {
        Ok(extract_metadata(
            self.parsed_event()?,
            self.taxonomy.as_ref(),
        ))
    }

    /// Privacy-sanitized statistics record.
    pub fn summary(&self) -> Result<SummaryRecord> {
        Ok(sanitize_stats(self.parsed_event()?))
    }

    /// The untrimmed route polyline.
    pub fn route_geometry(&self) -> Result<RouteGeometry> {
        RouteGeometry::from_event(self.parsed_event()?)
    }

    /// The route with the configured tolerance clipped from each end.
    pub fn trimmed_route(&self) -> Result<TrimmedRoute> {
        let route = self.route_geometry()?;
        trim_route(&route, self.config.trim_tolerance_m)
    }

    /// GeoJSON `Feature` of the trimmed route.
    pub fn geojson(&self) -> Result<serde_json::Value> {
        Ok(self.trimmed_route()?.geometry.to_geojson())
    }

    /// Geohash fingerprint of the trimmed route's bounding-box center.
    pub fn geohash(&self) -> Result<String> {
        Ok(geohash::encode_route(&self.trimmed_route()?.geometry))
    }
}

impl Default for Summarizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Straight northward GPX track: 8 points, ~111 m apart (~778 m total).
    const GPX_SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="unit-test" xmlns="http://www.topografix.com/GPX/1/1">
  <metadata><time>2024-05-12T09:00:00Z</time></metadata>
  <trk>
    <name>Evening Ride</name>
    <type>cycling</type>
    <trkseg>
      <trkpt lat="51.5000" lon="-0.1278"><time>2024-05-12T09:00:00Z</time></trkpt>
      <trkpt lat="51.5010" lon="-0.1278"><time>2024-05-12T09:00:30Z</time></trkpt>
      <trkpt lat="51.5020" lon="-0.1278"><time>2024-05-12T09:01:00Z</time></trkpt>
      <trkpt lat="51.5030" lon="-0.1278"><time>2024-05-12T09:01:30Z</time></trkpt>
      <trkpt lat="51.5040" lon="-0.1278"><time>2024-05-12T09:02:00Z</time></trkpt>
      <trkpt lat="51.5050" lon="-0.1278"><time>2024-05-12T09:02:30Z</time></trkpt>
      <trkpt lat="51.5060" lon="-0.1278"><time>2024-05-12T09:03:00Z</time></trkpt>
      <trkpt lat="51.5070" lon="-0.1278"><time>2024-05-12T09:03:30Z</time></trkpt>
    </trkseg>
  </trk>
</gpx>"#;

    #[test]
    fn test_derivations_need_a_parsed_event() {
        let summarizer = Summarizer::new();
        assert!(matches!(
            summarizer.metadata().unwrap_err(),
            SummaryError::NoEventParsed
        ));
        assert!(matches!(
            summarizer.summary().unwrap_err(),
            SummaryError::NoEventParsed
        ));
        assert!(matches!(
            summarizer.route_geometry().unwrap_err(),
            SummaryError::NoEventParsed
        ));
        assert!(matches!(
            summarizer.geohash().unwrap_err(),
            SummaryError::NoEventParsed
        ));
    }

    #[tokio::test]
    async fn test_parse_and_derive() {
        let mut summarizer = Summarizer::new();
        let event = summarizer
            .parse_from_source("evening.gpx", GPX_SAMPLE.as_bytes())
            .await
            .unwrap();
        assert_eq!(event.points.len(), 8);

        let metadata = summarizer.metadata().unwrap();
        assert_eq!(metadata.title, "Evening Ride");
        assert_eq!(metadata.activity_type.as_str(), "ride");
        assert_eq!(metadata.recorded_at, 1_715_504_400);

        let summary = summarizer.summary().unwrap();
        assert!(!summary.content.contains_key("Start Position"));
        assert!(summary.content.contains_key("Distance"));

        let hash = summarizer.geohash().unwrap();
        assert_eq!(hash.len(), crate::GEOHASH_PRECISION);
    }

    #[tokio::test]
    async fn test_shared_artifacts_use_trimmed_route() {
        let mut summarizer = Summarizer::new();
        summarizer
            .parse_from_source("evening.gpx", GPX_SAMPLE.as_bytes())
            .await
            .unwrap();

        let full = summarizer.route_geometry().unwrap();
        let trimmed = summarizer.trimmed_route().unwrap();
        assert!(trimmed.geometry.total_length() < full.total_length());

        let expected = crate::geohash::encode_route(&trimmed.geometry);
        assert_eq!(summarizer.geohash().unwrap(), expected);

        let feature = summarizer.geojson().unwrap();
        let coordinates = feature["geometry"]["coordinates"].as_array().unwrap();
        assert_eq!(coordinates.len(), trimmed.geometry.points.len());
    }

    #[tokio::test]
    async fn test_custom_tolerance_changes_trim() {
        let mut summarizer = Summarizer::with_config(SummarizerConfig {
            trim_tolerance_m: 50.0,
        });
        summarizer
            .parse_from_source("evening.gpx", GPX_SAMPLE.as_bytes())
            .await
            .unwrap();

        let trimmed = summarizer.trimmed_route().unwrap();
        let full = summarizer.route_geometry().unwrap();
        let removed = full.total_length() - trimmed.geometry.total_length();
        assert!((removed - 100.0).abs() < 1.0);
    }

    #[tokio::test]
    async fn test_unsupported_name_fails_before_reading() {
        let mut summarizer = Summarizer::new();
        let err = summarizer
            .parse_from_source("track.kml", &b"whatever"[..])
            .await
            .unwrap_err();
        assert!(matches!(err, SummaryError::UnsupportedFormat { .. }));
        assert!(summarizer.event().is_none());
    }

    #[tokio::test]
    async fn test_parse_failure_reports_format() {
        let mut summarizer = Summarizer::new();
        let err = summarizer
            .parse_from_source("broken.gpx", &b"<gpx"[..])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SummaryError::FormatParse {
                format: ActivityFormat::Gpx,
                ..
            }
        ));
    }
}
