// tests/pipeline_e2e.rs
use chrono::{DateTime, Duration, TimeZone, Utc};
use meteoalerta::{
    ActivityPolicy, CapDocument, DedupMode, Pipeline, PipelineConfig, PipelineError,
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap()
}

fn cap_doc(name: &str, level: &str, onset: &str, expires: &str, areas: &str) -> CapDocument {
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<alert xmlns="urn:oasis:names:tc:emergency:cap:1.2">
  <sender>es-aemet</sender>
  <info>
    <language>es-ES</language>
    <category>Met</category>
    <event>Tormentas</event>
    <onset>{onset}</onset>
    <expires>{expires}</expires>
    <headline>Aviso de tormentas</headline>
    <web>https://www.aemet.es/es/eltiempo/prediccion/avisos</web>
    <parameter><valueName>AEMET-Meteoalerta nivel</valueName><value>{level}</value></parameter>
    {areas}
  </info>
</alert>"#
    );
    CapDocument {
        name: name.to_string(),
        bytes: xml.into_bytes(),
    }
}

fn area(desc: &str, polygon: &str) -> String {
    format!("<area><areaDesc>{desc}</areaDesc><polygon>{polygon}</polygon></area>")
}

fn config(dedup: DedupMode) -> PipelineConfig {
    PipelineConfig {
        target_language: "es-ES".to_string(),
        activity: ActivityPolicy::ActiveNow,
        dedup,
    }
}

#[test]
fn active_rojo_alert_yields_one_closed_feature() {
    let onset = (now() - Duration::hours(1)).to_rfc3339();
    let expires = (now() + Duration::hours(1)).to_rfc3339();
    let doc = cap_doc(
        "tarragona.xml",
        "rojo",
        &onset,
        &expires,
        &area("Sur de Tarragona", "40.5,0.5 41.0,0.5 41.0,1.0 40.5,1.0"),
    );

    let out = Pipeline::new(config(DedupMode::OnePerRegion))
        .run(&[doc], now())
        .unwrap();

    assert_eq!(out.features.len(), 1);
    let f = &out.features[0];
    assert_eq!(f.properties.priority, 3);
    assert_eq!(f.properties.region_name, "Sur de Tarragona");
    // 4 source vertices plus the explicit closing repeat.
    assert_eq!(f.geometry.coordinates[0].len(), 5);
    assert_eq!(f.geometry.coordinates[0][0], f.geometry.coordinates[0][4]);
}

#[test]
fn unrecognized_level_is_excluded_entirely() {
    let onset = (now() - Duration::hours(1)).to_rfc3339();
    let expires = (now() + Duration::hours(1)).to_rfc3339();
    let doc = cap_doc(
        "verde.xml",
        "verde",
        &onset,
        &expires,
        &area("Girona", "42.0,2.5 42.2,2.5 42.2,2.8"),
    );

    let out = Pipeline::new(config(DedupMode::OnePerRegion))
        .run(&[doc], now())
        .unwrap();
    assert!(out.features.is_empty());
}

#[test]
fn malformed_sibling_does_not_abort_the_run() {
    let onset = (now() - Duration::hours(1)).to_rfc3339();
    let expires = (now() + Duration::hours(1)).to_rfc3339();
    let bad = CapDocument {
        name: "broken.xml".into(),
        bytes: b"<alert><info>".to_vec(),
    };
    let good = cap_doc(
        "ok.xml",
        "amarillo",
        &onset,
        &expires,
        &area("Lleida", "41.5,0.5 41.8,0.5 41.8,1.0"),
    );

    let out = Pipeline::new(config(DedupMode::OnePerRegion))
        .run(&[bad, good], now())
        .unwrap();
    assert_eq!(out.features.len(), 1);
    assert_eq!(out.features[0].properties.region_name, "Lleida");
}

#[test]
fn empty_document_set_is_no_input() {
    let err = Pipeline::new(config(DedupMode::OnePerRegion))
        .run(&[], now())
        .unwrap_err();
    assert!(matches!(err, PipelineError::NoInputAvailable));
}

#[test]
fn every_polygon_bearing_area_becomes_a_feature() {
    let onset = (now() - Duration::hours(1)).to_rfc3339();
    let expires = (now() + Duration::hours(1)).to_rfc3339();
    let areas = format!(
        "{}{}<area><areaDesc>Sin poligono</areaDesc></area>",
        area("Zona A", "40.5,0.5 41.0,0.5 41.0,1.0"),
        area("Zona B", "41.5,0.5 41.8,0.5 41.8,1.0")
    );
    let doc = cap_doc("multi.xml", "naranja", &onset, &expires, &areas);

    let out = Pipeline::new(config(DedupMode::All))
        .run(&[doc], now())
        .unwrap();
    assert_eq!(out.features.len(), 2);
}

#[test]
fn window_bounds_are_inclusive_through_the_pipeline() {
    let expires = (now() + Duration::hours(1)).to_rfc3339();
    // onset exactly at the evaluation instant.
    let starts_now = cap_doc(
        "starts-now.xml",
        "amarillo",
        &now().to_rfc3339(),
        &expires,
        &area("Zona A", "40.5,0.5 41.0,0.5 41.0,1.0"),
    );
    // expires exactly at the evaluation instant.
    let ends_now = cap_doc(
        "ends-now.xml",
        "amarillo",
        &(now() - Duration::hours(2)).to_rfc3339(),
        &now().to_rfc3339(),
        &area("Zona B", "41.5,0.5 41.8,0.5 41.8,1.0"),
    );

    let out = Pipeline::new(config(DedupMode::All))
        .run(&[starts_now, ends_now], now())
        .unwrap();
    assert_eq!(out.features.len(), 2);
}

#[test]
fn upcoming_window_policy_keeps_tomorrows_alert() {
    let onset = (now() + Duration::days(1)).to_rfc3339();
    let expires = (now() + Duration::days(1) + Duration::hours(6)).to_rfc3339();
    let doc = cap_doc(
        "tomorrow.xml",
        "naranja",
        &onset,
        &expires,
        &area("Huesca", "42.0,-0.5 42.3,-0.5 42.3,0.0"),
    );

    let active_now = Pipeline::new(config(DedupMode::All))
        .run(std::slice::from_ref(&doc), now())
        .unwrap();
    assert!(active_now.features.is_empty());

    let mut cfg = config(DedupMode::All);
    cfg.activity = ActivityPolicy::UpcomingWindow { days: 2 };
    let upcoming = Pipeline::new(cfg).run(&[doc], now()).unwrap();
    assert_eq!(upcoming.features.len(), 1);
}
