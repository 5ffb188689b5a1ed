//! # Feature Assembler
//! Turns surviving, deduplicated [`AlertRecord`]s into GeoJSON Features and
//! orders the final collection.
//!
//! Ordering is a rendering contract: features are sorted ascending by
//! priority so a renderer drawing in array order paints higher-severity
//! polygons last, on top.

use serde::Serialize;

use crate::cap::types::AlertRecord;
use crate::error::PipelineError;
use crate::geometry;
use crate::locale::Localizer;
use crate::severity::SeverityLevel;

const DATE_FORMAT: &str = "%d/%m/%Y %H:%M";

#[derive(Debug, Clone, Serialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// One outer ring of `[lon, lat]` pairs, explicitly closed.
    pub coordinates: Vec<Vec<[f64; 2]>>,
}

/// Rendering hints consumed by the map layer as-is.
#[derive(Debug, Clone, Serialize)]
pub struct Style {
    pub color: String,
    pub fill_opacity: f64,
    pub weight: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureProperties {
    pub region_name: String,
    pub severity_level: SeverityLevel,
    pub priority: u8,
    pub style: Style,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geocode: Option<String>,
    pub event_type: String,
    pub headline: String,
    pub description: String,
    pub instruction: String,
    pub reference_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urgency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certainty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub onset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolvedFeature {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub geometry: Geometry,
    pub properties: FeatureProperties,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub features: Vec<ResolvedFeature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<ResolvedFeature>) -> Self {
        Self {
            kind: "FeatureCollection",
            features,
        }
    }
}

/// Collapse whitespace and decode HTML entities in CAP free text before it
/// lands in the reader-facing summary.
pub fn clean_text(s: &str) -> String {
    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    let decoded = html_escape::decode_html_entities(s).to_string();
    re_ws.replace_all(&decoded, " ").trim().to_string()
}

fn build_summary(record: &AlertRecord, loc: &Localizer) -> String {
    let mut parts: Vec<String> = Vec::new();
    for text in [&record.headline, &record.region_name] {
        let t = clean_text(text);
        if !t.is_empty() {
            parts.push(t);
        }
    }
    parts.push(loc.level_label(record.severity).to_string());
    for text in [&record.event_type, &record.description, &record.instruction] {
        let t = clean_text(text);
        if !t.is_empty() {
            parts.push(t);
        }
    }
    match (record.onset, record.expires) {
        (Some(o), Some(e)) => parts.push(format!(
            "{} {} {} {}",
            loc.text("summary.from"),
            o.format(DATE_FORMAT),
            loc.text("summary.until"),
            e.format(DATE_FORMAT)
        )),
        (Some(o), None) => parts.push(format!("{} {}", loc.text("summary.from"), o.format(DATE_FORMAT))),
        (None, Some(e)) => {
            parts.push(format!("{} {}", loc.text("summary.until"), e.format(DATE_FORMAT)))
        }
        (None, None) => {}
    }
    if !record.reference_url.is_empty() {
        parts.push(format!(
            "{}: {}",
            loc.text("summary.more_info"),
            record.reference_url
        ));
    }
    parts.join(". ")
}

/// Assemble one GeoJSON Feature. Fails with `MalformedGeometry` when the
/// polygon text cannot be decoded; the caller skips the area and continues.
pub fn assemble(record: &AlertRecord, loc: &Localizer) -> Result<ResolvedFeature, PipelineError> {
    debug_assert!(record.severity != SeverityLevel::None);
    let ring = geometry::decode_polygon(&record.raw_polygon_text)?;
    let color = record.severity.color().unwrap_or_default().to_string();

    Ok(ResolvedFeature {
        kind: "Feature",
        geometry: Geometry {
            kind: "Polygon",
            coordinates: vec![ring],
        },
        properties: FeatureProperties {
            region_name: record.region_name.clone(),
            severity_level: record.severity,
            priority: record.priority(),
            style: Style {
                color,
                fill_opacity: 0.4,
                weight: 2,
            },
            summary: build_summary(record, loc),
            geocode: record.geocode.clone(),
            event_type: record.event_type.clone(),
            headline: record.headline.clone(),
            description: record.description.clone(),
            instruction: record.instruction.clone(),
            reference_url: record.reference_url.clone(),
            category: record.category.clone(),
            urgency: record.urgency.clone(),
            certainty: record.certainty.clone(),
            sender: record.sender.clone(),
            effective_at: record.effective_at.clone(),
            onset: record.onset.map(|d| d.to_rfc3339()),
            expires: record.expires.map(|d| d.to_rfc3339()),
        },
    })
}

/// Stable sort ascending by priority; equal priorities keep pipeline order.
pub fn sort_for_rendering(features: &mut [ResolvedFeature]) {
    features.sort_by_key(|f| f.properties.priority);
}
