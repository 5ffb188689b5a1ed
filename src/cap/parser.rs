//! # CAP Record Parser
//! Deserializes one CAP 1.2 XML document and expands the authoritative
//! `info` block into per-area [`AlertRecord`]s.
//!
//! Language selection happens once per document: the `info` block whose
//! `language` equals the configured target wins; otherwise the first block
//! is used. A document that is not well-formed XML, or whose root does not
//! carry the CAP 1.2 namespace, yields `MalformedDocument` — the caller
//! logs it and moves on to the next document.

use chrono::{DateTime, FixedOffset};
use metrics::{counter, histogram};
use quick_xml::de::from_str;
use serde::Deserialize;

use crate::cap::types::AlertRecord;
use crate::error::PipelineError;
use crate::severity;

pub const CAP_NAMESPACE: &str = "urn:oasis:names:tc:emergency:cap:1.2";

#[derive(Debug, Deserialize)]
struct Alert {
    #[serde(rename = "@xmlns")]
    xmlns: Option<String>,
    sender: Option<String>,
    #[serde(rename = "info", default)]
    info: Vec<Info>,
}

#[derive(Debug, Deserialize)]
struct Info {
    language: Option<String>,
    category: Option<String>,
    event: Option<String>,
    urgency: Option<String>,
    certainty: Option<String>,
    effective: Option<String>,
    onset: Option<String>,
    expires: Option<String>,
    headline: Option<String>,
    description: Option<String>,
    instruction: Option<String>,
    web: Option<String>,
    #[serde(rename = "parameter", default)]
    parameter: Vec<NamedValue>,
    #[serde(rename = "area", default)]
    area: Vec<Area>,
}

#[derive(Debug, Deserialize)]
struct NamedValue {
    #[serde(rename = "valueName")]
    value_name: Option<String>,
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Area {
    #[serde(rename = "areaDesc")]
    area_desc: Option<String>,
    #[serde(rename = "polygon", default)]
    polygon: Vec<String>,
    #[serde(rename = "geocode", default)]
    geocode: Vec<NamedValue>,
}

/// CAP instants are RFC 3339 with an explicit offset. Unparseable values
/// degrade to `None` (governed by the activity-filter decision table).
fn parse_instant(field: &str, raw: Option<&str>) -> Option<DateTime<FixedOffset>> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => Some(dt),
        Err(err) => {
            tracing::warn!(field, value = raw, error = %err, "unparseable CAP instant");
            None
        }
    }
}

fn select_info<'a>(blocks: &'a [Info], target_language: &str) -> Option<&'a Info> {
    blocks
        .iter()
        .find(|i| {
            i.language
                .as_deref()
                .is_some_and(|l| l.eq_ignore_ascii_case(target_language))
        })
        .or_else(|| blocks.first())
}

/// Parse one CAP document into zero or more alert records.
pub fn parse_document(
    name: &str,
    bytes: &[u8],
    target_language: &str,
) -> Result<Vec<AlertRecord>, PipelineError> {
    let t0 = std::time::Instant::now();

    let malformed = |reason: String| PipelineError::MalformedDocument {
        name: name.to_string(),
        reason,
    };

    let xml = std::str::from_utf8(bytes).map_err(|e| malformed(format!("invalid utf-8: {e}")))?;
    let alert: Alert = from_str(xml).map_err(|e| malformed(format!("xml parse error: {e}")))?;

    match alert.xmlns.as_deref() {
        Some(CAP_NAMESPACE) => {}
        other => {
            return Err(malformed(format!(
                "unexpected root namespace {:?}",
                other.unwrap_or("<none>")
            )))
        }
    }

    let Some(info) = select_info(&alert.info, target_language) else {
        tracing::warn!(document = name, "CAP document has no info block");
        return Ok(Vec::new());
    };

    let level = severity::resolve(info.parameter.iter().map(|p| {
        (
            p.value_name.as_deref().unwrap_or_default(),
            p.value.as_deref().unwrap_or_default(),
        )
    }));

    let onset = parse_instant("onset", info.onset.as_deref());
    let expires = parse_instant("expires", info.expires.as_deref());

    let mut records = Vec::with_capacity(info.area.len());
    for area in &info.area {
        let Some(polygon) = area.polygon.iter().find(|p| !p.trim().is_empty()) else {
            continue;
        };
        if area.polygon.len() > 1 {
            tracing::warn!(
                document = name,
                polygons = area.polygon.len(),
                "area carries multiple polygons, keeping the first"
            );
        }
        records.push(AlertRecord {
            region_name: area.area_desc.clone().unwrap_or_default(),
            geocode: area
                .geocode
                .iter()
                .find_map(|g| g.value.clone())
                .filter(|v| !v.is_empty()),
            event_type: info.event.clone().unwrap_or_default(),
            headline: info.headline.clone().unwrap_or_default(),
            description: info.description.clone().unwrap_or_default(),
            instruction: info.instruction.clone().unwrap_or_default(),
            reference_url: info.web.clone().unwrap_or_default(),
            category: info.category.clone(),
            urgency: info.urgency.clone(),
            certainty: info.certainty.clone(),
            sender: alert.sender.clone(),
            effective_at: info.effective.clone(),
            onset,
            expires,
            severity: level,
            raw_polygon_text: polygon.trim().to_string(),
        });
    }

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("cap_parse_ms").record(ms);
    counter!("cap_records_total").increment(records.len() as u64);
    Ok(records)
}
