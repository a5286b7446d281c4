//! # Activity Summarizer
//!
//! Turns recorded activity files (FIT, GPX, TCX, optionally gzip-compressed)
//! into the artifacts a sharing workflow needs: normalized metadata, a
//! privacy-sanitized statistics summary, a trimmed route geometry and a
//! compact geohash fingerprint of where the activity took place.
//!
//! ## Pipeline
//!
//! 1. **Route** the file name onto a decode path ([`format::classify`])
//! 2. **Inflate** the payload if a gzip layer is present ([`decompress`])
//! 3. **Parse** into a canonical [`ActivityEvent`] ([`parsers`])
//! 4. **Derive** metadata, summary, trimmed route and geohash from the event
//!
//! Every derivation is a pure function over the parsed event; only file
//! acquisition and decompression are async. The [`Summarizer`] facade wires
//! the stages together for the common case.
//!
//! ## Quick Start
//!
//! ```rust
//! use activity_summarizer::{trim_route, GpsPoint, RouteGeometry};
//!
//! // A straight ~2 km track heading north, one point every ~20 m.
//! let points: Vec<GpsPoint> = (0..100)
//!     .map(|i| GpsPoint::new(51.5074 + i as f64 * 0.00018, -0.1278))
//!     .collect();
//!
//! let route = RouteGeometry::new(points);
//! let trimmed = trim_route(&route, 200.0).expect("route is long enough");
//!
//! // 200 m clipped from each end.
//! assert!(trimmed.geometry.total_length() < route.total_length() - 350.0);
//! ```

pub mod decompress;
pub mod error;
pub mod event;
pub mod format;
pub mod geo_utils;
pub mod geohash;
pub mod parsers;
pub mod route;
pub mod summarizer;
pub mod summary;
pub mod taxonomy;

pub use error::{Result, SummaryError};
pub use event::{extract_metadata, ActivityEvent, ActivityMetadata, TrackPoint};
pub use format::{classify, ActivityFormat, FileClass, Payload};
pub use geohash::GEOHASH_PRECISION;
pub use parsers::{
    ActivityParser, FitActivityParser, GpxActivityParser, ParserSet, TcxActivityParser,
};
pub use route::{trim_route, RouteGeometry, TrimmedRoute};
pub use summarizer::Summarizer;
pub use summary::{sanitize_stats, SummaryRecord, DENIED_STAT_KEYS};
pub use taxonomy::{ActivityType, ActivityTypeTaxonomy, KeywordTaxonomy};

use serde::{Deserialize, Serialize};

// ============================================================================
// Core Types
// ============================================================================

/// A GPS coordinate point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check whether the point holds finite, in-range coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// Axis-aligned bounding box over a set of points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Compute the bounding box of a point set. Returns `None` for an empty
    /// slice.
    pub fn from_points(points: &[GpsPoint]) -> Option<Bounds> {
        if points.is_empty() {
            return None;
        }

        let mut bounds = Bounds {
            min_lat: f64::MAX,
            max_lat: f64::MIN,
            min_lng: f64::MAX,
            max_lng: f64::MIN,
        };

        for point in points {
            bounds.min_lat = bounds.min_lat.min(point.latitude);
            bounds.max_lat = bounds.max_lat.max(point.latitude);
            bounds.min_lng = bounds.min_lng.min(point.longitude);
            bounds.max_lng = bounds.max_lng.max(point.longitude);
        }

        Some(bounds)
    }

    /// Center of the bounding box.
    pub fn center(&self) -> GpsPoint {
        GpsPoint::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }
}

/// Configuration for the summarization pipeline.
#[derive(Debug, Clone)]
pub struct SummarizerConfig {
    /// Arc-length distance in meters removed from each end of a shared
    /// route, hiding exact start and end locations. Zero or negative
    /// disables trimming. Default: 200.0
    pub trim_tolerance_m: f64,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            trim_tolerance_m: 200.0,
        }
    }
}
