//! # Error Types
//!
//! All fallible operations in this crate return [`SummaryError`] through the
//! crate-wide [`Result`] alias. Stage attribution is deliberate: a failure
//! names the pipeline stage that produced it (routing, decompression,
//! parsing, trimming), so callers can report it without re-deriving context.

use crate::format::ActivityFormat;

/// Errors produced by the summarization pipeline.
#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    /// The file name does not match any supported format/compression row.
    #[error("unsupported file type '{filename}': expected fit, fit.gz, gpx, tcx or tcx.gz")]
    UnsupportedFormat { filename: String },

    /// The gzip layer could not be removed from a compressed payload.
    #[error("gzip decompression failed: {message}")]
    Decompression { message: String },

    /// The decompressed payload could not be decoded by the format's parser.
    #[error("failed to parse {format} data: {message}")]
    FormatParse {
        format: ActivityFormat,
        message: String,
    },

    /// A route operation needs at least two points.
    #[error("route requires at least 2 points, got {point_count}")]
    EmptyRoute { point_count: usize },

    /// Trimming would consume the entire route.
    #[error(
        "trim tolerance {tolerance_m:.1}m removes the whole route ({total_m:.1}m total)"
    )]
    DegenerateTrim { tolerance_m: f64, total_m: f64 },

    /// A derivation was requested before any file was parsed.
    #[error("no activity event has been parsed yet")]
    NoEventParsed,

    /// Underlying I/O failure while acquiring a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, SummaryError>;
