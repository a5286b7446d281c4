//! # Format Parsers
//!
//! One [`ActivityParser`] per supported format, each turning a fully
//! decompressed [`Payload`] into a canonical [`ActivityEvent`]. Parsers
//! are synchronous and pure; anything async (file reads, gzip) has already
//! happened by the time one runs.
//!
//! [`ParserSet`] holds the parser for each format and is a seam: tests and
//! embedders can swap a single format's parser without touching routing or
//! the derivation stages.

mod fit;
mod gpx;
mod tcx;

pub use self::fit::FitActivityParser;
pub use self::gpx::GpxActivityParser;
pub use self::tcx::TcxActivityParser;

use crate::error::Result;
use crate::event::ActivityEvent;
use crate::format::{ActivityFormat, Payload};

/// A decode capability for one activity file format.
pub trait ActivityParser: Send + Sync {
    /// The format this parser decodes.
    fn format(&self) -> ActivityFormat;

    /// Decode a decompressed payload into a canonical event.
    fn parse(&self, payload: &Payload) -> Result<ActivityEvent>;
}

/// The parser for every supported format.
pub struct ParserSet {
    fit: Box<dyn ActivityParser>,
    gpx: Box<dyn ActivityParser>,
    tcx: Box<dyn ActivityParser>,
}

impl ParserSet {
    /// Replace the parser for whichever format `parser` reports.
    pub fn with_parser(mut self, parser: Box<dyn ActivityParser>) -> Self {
        match parser.format() {
            ActivityFormat::Fit => self.fit = parser,
            ActivityFormat::Gpx => self.gpx = parser,
            ActivityFormat::Tcx => self.tcx = parser,
        }
        self
    }

    /// Look up the parser for a format. Total: every format has one.
    pub fn for_format(&self, format: ActivityFormat) -> &dyn ActivityParser {
        match format {
            ActivityFormat::Fit => self.fit.as_ref(),
            ActivityFormat::Gpx => self.gpx.as_ref(),
            ActivityFormat::Tcx => self.tcx.as_ref(),
        }
    }
}

impl Default for ParserSet {
    fn default() -> Self {
        Self {
            fit: Box::new(FitActivityParser),
            gpx: Box::new(GpxActivityParser),
            tcx: Box::new(TcxActivityParser),
        }
    }
}

impl std::fmt::Debug for ParserSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParserSet").finish_non_exhaustive()
    }
}
