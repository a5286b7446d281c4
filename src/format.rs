//! # Format Routing
//!
//! Maps file names onto the closed set of supported decode paths. Routing
//! looks only at dot-separated name segments, never at file content: the
//! last segment may be a compression marker (`gz`), and the segment before
//! it (or the last segment itself) must be a known format. Matching is
//! ASCII case-insensitive, so `RIDE.FIT.GZ` routes like `ride.fit.gz`.
//!
//! The supported rows are:
//!
//! | name shape   | format | compressed |
//! |--------------|--------|------------|
//! | `*.fit`      | fit    | no         |
//! | `*.fit.gz`   | fit    | yes        |
//! | `*.gpx`      | gpx    | no         |
//! | `*.tcx`      | tcx    | no         |
//! | `*.tcx.gz`   | tcx    | yes        |
//!
//! Everything else, including gzip-wrapped GPX, is rejected with
//! [`SummaryError::UnsupportedFormat`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SummaryError};

/// Name segment that marks a gzip layer.
const GZIP_SUFFIX: &str = "gz";

// ============================================================================
// Formats
// ============================================================================

/// The activity file formats this crate can decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityFormat {
    /// Garmin FIT, a binary record stream.
    Fit,
    /// GPS Exchange Format, XML text.
    Gpx,
    /// Garmin Training Center XML text.
    Tcx,
}

impl ActivityFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityFormat::Fit => "fit",
            ActivityFormat::Gpx => "gpx",
            ActivityFormat::Tcx => "tcx",
        }
    }

    /// Whether the parser for this format consumes raw bytes rather than text.
    pub fn is_binary(&self) -> bool {
        matches!(self, ActivityFormat::Fit)
    }
}

impl fmt::Display for ActivityFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fit" => Ok(ActivityFormat::Fit),
            "gpx" => Ok(ActivityFormat::Gpx),
            "tcx" => Ok(ActivityFormat::Tcx),
            other => Err(format!("unknown activity format: {}", other)),
        }
    }
}

// ============================================================================
// Routing
// ============================================================================

/// A routed input: which parser to use and whether a gzip layer sits on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileClass {
    pub format: ActivityFormat,
    pub compressed: bool,
}

/// Classify a file name into a decode path.
///
/// A compressed name needs at least three segments (`base.format.gz`), so a
/// bare `fit.gz` is a base named `fit` with an unknown `gz` extension and is
/// rejected rather than treated as a compressed FIT file.
pub fn classify(filename: &str) -> Result<FileClass> {
    let segments: Vec<&str> = filename.split('.').collect();
    if segments.len() < 2 {
        return Err(SummaryError::UnsupportedFormat {
            filename: filename.to_string(),
        });
    }

    let last = segments[segments.len() - 1].to_ascii_lowercase();
    let (format_segment, compressed) = if last == GZIP_SUFFIX && segments.len() >= 3 {
        (segments[segments.len() - 2].to_ascii_lowercase(), true)
    } else {
        (last, false)
    };

    let format = ActivityFormat::from_str(&format_segment).map_err(|_| {
        SummaryError::UnsupportedFormat {
            filename: filename.to_string(),
        }
    })?;

    // No decode row exists for gzip-wrapped GPX.
    if compressed && format == ActivityFormat::Gpx {
        return Err(SummaryError::UnsupportedFormat {
            filename: filename.to_string(),
        });
    }

    Ok(FileClass { format, compressed })
}

// ============================================================================
// Payloads
// ============================================================================

/// A fully materialized parser input, after any gzip layer has been removed.
///
/// FIT parsers receive [`Payload::Binary`]; the XML formats receive
/// [`Payload::Text`]. The router and the parser agree on which variant to
/// expect, and a parser handed the wrong one fails with a parse error
/// instead of panicking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Binary(Vec<u8>),
    Text(String),
}

impl Payload {
    pub fn len(&self) -> usize {
        match self {
            Payload::Binary(bytes) => bytes.len(),
            Payload::Text(text) => text.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
