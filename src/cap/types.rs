// src/cap/types.rs
use chrono::{DateTime, FixedOffset};

use crate::severity::SeverityLevel;

/// One alert for one region, expanded from a CAP `area` block and the
/// textual metadata of its parent `info` block. Transient: lives only for
/// the duration of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertRecord {
    pub region_name: String,
    pub geocode: Option<String>,
    pub event_type: String,
    pub headline: String,
    pub description: String,
    pub instruction: String,
    pub reference_url: String,
    pub category: Option<String>,
    pub urgency: Option<String>,
    pub certainty: Option<String>,
    pub sender: Option<String>,
    pub effective_at: Option<String>,
    /// Absent when the source field was missing or unparseable.
    pub onset: Option<DateTime<FixedOffset>>,
    pub expires: Option<DateTime<FixedOffset>>,
    pub severity: SeverityLevel,
    /// Untouched CAP polygon text, decoded only at assembly time.
    pub raw_polygon_text: String,
}

impl AlertRecord {
    pub fn priority(&self) -> u8 {
        self.severity.priority()
    }
}
