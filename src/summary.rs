//! # Summary Sanitization
//!
//! Builds the shareable statistics record from a parsed event. The start
//! and end coordinates reveal where an activity began and ended (usually a
//! home address), so those stats are stripped before anything leaves the
//! device. Everything else passes through untouched, and the event itself
//! is never modified.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::event::ActivityEvent;

/// Stat keys removed from shared summaries. Matched exactly and
/// case-sensitively against the stat display names.
pub const DENIED_STAT_KEYS: [&str; 2] = ["Start Position", "End Position"];

const SUMMARY_TYPE: &str = "summary";
const METRIC_UNIT: &str = "metric";

/// Privacy-sanitized statistics, ready for the summary workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    /// Record discriminator, always `"summary"`.
    #[serde(rename = "type")]
    pub type_tag: String,
    /// Unit system of the contained values, always `"metric"`.
    pub unit: String,
    /// The retained statistics.
    pub content: Map<String, Value>,
}

/// Copy the event's statistics, dropping the denied keys.
pub fn sanitize_stats(event: &ActivityEvent) -> SummaryRecord {
    let content: Map<String, Value> = event
        .raw_stats
        .iter()
        .filter(|(key, _)| !DENIED_STAT_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    SummaryRecord {
        type_tag: SUMMARY_TYPE.to_string(),
        unit: METRIC_UNIT.to_string(),
        content,
    }
}
