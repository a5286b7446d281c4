//! # Activity Type Taxonomy
//!
//! The three file formats report what kind of activity was recorded in
//! three different vocabularies: FIT sport enums ("running", "cycling"),
//! TCX `Sport` attributes ("Running", "Biking") and free-text GPX track
//! types. [`ActivityTypeTaxonomy`] collapses all of them onto one closed
//! set so downstream records carry a stable category.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Canonical Types
// ============================================================================

/// Closed set of normalized activity categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    Run,
    Ride,
    Swim,
    Walk,
    Hike,
    Row,
    Ski,
    /// Anything the taxonomy cannot place.
    Other,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Run => "run",
            ActivityType::Ride => "ride",
            ActivityType::Swim => "swim",
            ActivityType::Walk => "walk",
            ActivityType::Hike => "hike",
            ActivityType::Row => "row",
            ActivityType::Ski => "ski",
            ActivityType::Other => "other",
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "run" => Ok(ActivityType::Run),
            "ride" => Ok(ActivityType::Ride),
            "swim" => Ok(ActivityType::Swim),
            "walk" => Ok(ActivityType::Walk),
            "hike" => Ok(ActivityType::Hike),
            "row" => Ok(ActivityType::Row),
            "ski" => Ok(ActivityType::Ski),
            "other" => Ok(ActivityType::Other),
            other => Err(format!("unknown activity type: {}", other)),
        }
    }
}

impl Default for ActivityType {
    fn default() -> Self {
        ActivityType::Other
    }
}

// ============================================================================
// Taxonomy
// ============================================================================

/// Maps a format-specific type string onto the closed [`ActivityType`] set.
///
/// Implementations must be total: a string the taxonomy cannot place maps
/// to [`ActivityType::Other`], never to an error.
pub trait ActivityTypeTaxonomy: Send + Sync {
    fn map(&self, raw: &str) -> ActivityType;
}

/// Keyword containment over the lowercased input.
///
/// `"Running"`, `"trail_running"` and `"virtual run"` all land on
/// [`ActivityType::Run`]; the stems cover the spellings the three formats
/// actually emit. First matching rule wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordTaxonomy;

/// Stem → category rules, checked in order.
static KEYWORD_RULES: &[(&str, ActivityType)] = &[
    ("run", ActivityType::Run),
    ("jog", ActivityType::Run),
    ("ride", ActivityType::Ride),
    ("cycl", ActivityType::Ride), // cycle, cycling
    ("bik", ActivityType::Ride),  // bike, biking (TCX "Biking")
    ("swim", ActivityType::Swim),
    ("walk", ActivityType::Walk),
    ("hik", ActivityType::Hike), // hike, hiking
    ("row", ActivityType::Row),
    ("ski", ActivityType::Ski),
];

impl ActivityTypeTaxonomy for KeywordTaxonomy {
    fn map(&self, raw: &str) -> ActivityType {
        let needle = raw.to_lowercase();
        for (stem, activity_type) in KEYWORD_RULES {
            if needle.contains(stem) {
                return *activity_type;
            }
        }
        ActivityType::Other
    }
}
