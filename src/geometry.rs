//! # Coordinate Decoder
//! Turns CAP polygon text (whitespace-separated `"lat,lon"` tokens) into a
//! closed GeoJSON ring of `[lon, lat]` pairs.
//!
//! The decoder transposes axis order (CAP is lat,lon; GeoJSON is lon,lat),
//! closes the ring when the source left it open, and rejects rings with
//! fewer than 3 distinct vertices. It never clips or simplifies: oversized
//! rings and coordinates outside the expected bounding box are flagged via
//! logs/metrics but kept, since legitimate polygons can straddle the border.

use metrics::counter;
use std::collections::HashSet;

use crate::error::PipelineError;

/// Spain's expected bounding box; outside coordinates are flagged, not dropped.
pub const SPAIN_LAT_RANGE: (f64, f64) = (36.0, 43.5);
pub const SPAIN_LON_RANGE: (f64, f64) = (-9.5, 3.5);

/// Sanity threshold: rings above this size are flagged for observability.
pub const RING_VERTEX_FLAG_THRESHOLD: usize = 200;

fn in_spain_bbox(lon: f64, lat: f64) -> bool {
    lat >= SPAIN_LAT_RANGE.0
        && lat <= SPAIN_LAT_RANGE.1
        && lon >= SPAIN_LON_RANGE.0
        && lon <= SPAIN_LON_RANGE.1
}

/// Decode CAP polygon text into a closed `[lon, lat]` ring (length >= 4).
pub fn decode_polygon(text: &str) -> Result<Vec<[f64; 2]>, PipelineError> {
    let mut ring: Vec<[f64; 2]> = Vec::new();
    for token in text.split_whitespace() {
        let mut parts = token.splitn(3, ',');
        let (lat_s, lon_s) = match (parts.next(), parts.next(), parts.next()) {
            (Some(lat), Some(lon), None) => (lat, lon),
            _ => {
                return Err(PipelineError::MalformedGeometry(format!(
                    "token {token:?} is not a lat,lon pair"
                )))
            }
        };
        let lat: f64 = lat_s.parse().map_err(|_| {
            PipelineError::MalformedGeometry(format!("non-numeric latitude in {token:?}"))
        })?;
        let lon: f64 = lon_s.parse().map_err(|_| {
            PipelineError::MalformedGeometry(format!("non-numeric longitude in {token:?}"))
        })?;
        // CAP order is lat,lon; GeoJSON wants lon,lat.
        ring.push([lon, lat]);
    }

    let distinct: HashSet<(u64, u64)> = ring
        .iter()
        .map(|p| (p[0].to_bits(), p[1].to_bits()))
        .collect();
    if distinct.len() < 3 {
        return Err(PipelineError::MalformedGeometry(format!(
            "only {} distinct vertices, need at least 3",
            distinct.len()
        )));
    }

    if ring.first() != ring.last() {
        let first = ring[0];
        ring.push(first);
    }

    if ring.len() > RING_VERTEX_FLAG_THRESHOLD {
        tracing::warn!(vertices = ring.len(), "oversized polygon ring");
        counter!("cap_geometry_flagged_total").increment(1);
    }
    if let Some(p) = ring.iter().find(|p| !in_spain_bbox(p[0], p[1])) {
        tracing::warn!(lon = p[0], lat = p[1], "ring vertex outside Spain bounding box");
        counter!("cap_geometry_flagged_total").increment(1);
    }

    Ok(ring)
}

/// Re-encode a ring back into CAP polygon text (`"lat,lon"` tokens).
/// Inverse of [`decode_polygon`] up to the explicit closing vertex.
pub fn encode_polygon(ring: &[[f64; 2]]) -> String {
    ring.iter()
        .map(|p| format!("{},{}", p[1], p[0]))
        .collect::<Vec<_>>()
        .join(" ")
}
