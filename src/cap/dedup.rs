//! # Region Deduplicator
//! Collapses surviving alerts to one per region name, by precedence:
//! higher severity priority, then later onset, then first encountered.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::cap::types::AlertRecord;
use crate::severity::SeverityLevel;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DedupMode {
    /// Keep one alert per region name (precedence rule below).
    #[default]
    OnePerRegion,
    /// Emit every surviving record.
    All,
}

impl FromStr for DedupMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "one-per-region" => Ok(DedupMode::OnePerRegion),
            "all" => Ok(DedupMode::All),
            other => Err(format!(
                "unknown dedup mode {other:?}, expected one-per-region or all"
            )),
        }
    }
}

impl fmt::Display for DedupMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DedupMode::OnePerRegion => f.write_str("one-per-region"),
            DedupMode::All => f.write_str("all"),
        }
    }
}

/// True when `candidate` outranks `incumbent` for the same region.
/// `None` onsets sort before any concrete onset, so a dated alert beats an
/// undated one at equal priority.
fn outranks(candidate: &AlertRecord, incumbent: &AlertRecord) -> bool {
    (candidate.priority(), candidate.onset) > (incumbent.priority(), incumbent.onset)
}

/// Apply the dedup policy. Output preserves first-encounter order of
/// regions (the assembler re-sorts by priority afterwards), which keeps the
/// whole run deterministic for identical input.
pub fn dedup_regions(mode: DedupMode, records: Vec<AlertRecord>) -> Vec<AlertRecord> {
    let mut kept: Vec<AlertRecord> = Vec::with_capacity(records.len());
    match mode {
        DedupMode::All => {
            kept.extend(
                records
                    .into_iter()
                    .filter(|r| r.severity != SeverityLevel::None),
            );
        }
        DedupMode::OnePerRegion => {
            let mut by_region: HashMap<String, usize> = HashMap::new();
            for record in records {
                // Unresolved severities never compete for a region slot.
                if record.severity == SeverityLevel::None {
                    continue;
                }
                match by_region.get(&record.region_name) {
                    Some(&idx) => {
                        if outranks(&record, &kept[idx]) {
                            kept[idx] = record;
                        }
                    }
                    None => {
                        by_region.insert(record.region_name.clone(), kept.len());
                        kept.push(record);
                    }
                }
            }
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset};

    fn record(region: &str, level: SeverityLevel, onset: Option<&str>) -> AlertRecord {
        AlertRecord {
            region_name: region.to_string(),
            geocode: None,
            event_type: String::new(),
            headline: String::new(),
            description: String::new(),
            instruction: String::new(),
            reference_url: String::new(),
            category: None,
            urgency: None,
            certainty: None,
            sender: None,
            effective_at: None,
            onset: onset.map(|s| DateTime::<FixedOffset>::parse_from_rfc3339(s).unwrap()),
            expires: None,
            severity: level,
            raw_polygon_text: "40.5,0.5 41.0,0.5 41.0,1.0".to_string(),
        }
    }

    #[test]
    fn higher_priority_wins_the_region() {
        let out = dedup_regions(
            DedupMode::OnePerRegion,
            vec![
                record("Tarragona", SeverityLevel::Amarillo, None),
                record("Tarragona", SeverityLevel::Rojo, None),
            ],
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].severity, SeverityLevel::Rojo);
    }

    #[test]
    fn later_onset_breaks_priority_ties() {
        let out = dedup_regions(
            DedupMode::OnePerRegion,
            vec![
                record(
                    "Tarragona",
                    SeverityLevel::Amarillo,
                    Some("2025-06-01T10:00:00+02:00"),
                ),
                record(
                    "Tarragona",
                    SeverityLevel::Amarillo,
                    Some("2025-06-01T14:00:00+02:00"),
                ),
            ],
        );
        assert_eq!(out.len(), 1);
        assert_eq!(
            out[0].onset.unwrap().to_rfc3339(),
            "2025-06-01T14:00:00+02:00"
        );
    }

    #[test]
    fn equal_records_keep_the_first_encountered() {
        let mut a = record(
            "Tarragona",
            SeverityLevel::Naranja,
            Some("2025-06-01T10:00:00+02:00"),
        );
        a.headline = "first".into();
        let mut b = a.clone();
        b.headline = "second".into();
        let out = dedup_regions(DedupMode::OnePerRegion, vec![a, b]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].headline, "first");
    }

    #[test]
    fn all_mode_keeps_every_resolved_record() {
        let out = dedup_regions(
            DedupMode::All,
            vec![
                record("Tarragona", SeverityLevel::Amarillo, None),
                record("Tarragona", SeverityLevel::Rojo, None),
                record("Tarragona", SeverityLevel::None, None),
            ],
        );
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn unresolved_severity_never_claims_a_region() {
        let out = dedup_regions(
            DedupMode::OnePerRegion,
            vec![record("Girona", SeverityLevel::None, None)],
        );
        assert!(out.is_empty());
    }
}
