// src/cap/mod.rs
pub mod dedup;
pub mod parser;
pub mod types;

use chrono::{DateTime, Utc};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;

use crate::cap::types::AlertRecord;
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::feature::{self, FeatureCollection, ResolvedFeature};
use crate::locale::Localizer;
use crate::severity::SeverityLevel;
use crate::source::CapDocument;

/// One-time metrics registration (so series show up on whatever recorder
/// the embedder installs).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("cap_documents_total", "CAP documents handed to the parser.");
        describe_counter!(
            "cap_malformed_documents_total",
            "Documents skipped as malformed XML / wrong namespace."
        );
        describe_counter!("cap_records_total", "Alert records expanded from areas.");
        describe_counter!(
            "cap_severity_excluded_total",
            "Records excluded with an unresolved severity level."
        );
        describe_counter!(
            "cap_window_filtered_total",
            "Records outside the activity time window."
        );
        describe_counter!("cap_dedup_total", "Records removed by region dedup.");
        describe_counter!(
            "cap_geometry_errors_total",
            "Areas skipped with unparseable polygon text."
        );
        describe_counter!(
            "cap_geometry_flagged_total",
            "Rings flagged as oversized or outside the expected bbox."
        );
        describe_histogram!("cap_parse_ms", "Per-document parse time in milliseconds.");
        describe_gauge!("cap_last_run_ts", "Unix ts when the pipeline last ran.");
    });
}

/// The CAP normalization pipeline. Construct once with an explicit
/// configuration; each [`run`](Pipeline::run) is a stateless batch
/// transform of one document set.
pub struct Pipeline {
    config: PipelineConfig,
    localizer: Localizer,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            localizer: Localizer::es_es().clone(),
        }
    }

    pub fn with_localizer(config: PipelineConfig, localizer: Localizer) -> Self {
        Self { config, localizer }
    }

    /// Run the full transform: parse every document, filter, dedup,
    /// assemble, order. `now` is the single evaluation instant for the
    /// whole run.
    ///
    /// Per-document and per-area failures are logged and skipped; the only
    /// fatal condition is an empty document set.
    pub fn run(
        &self,
        documents: &[CapDocument],
        now: DateTime<Utc>,
    ) -> Result<FeatureCollection, PipelineError> {
        ensure_metrics_described();

        if documents.is_empty() {
            return Err(PipelineError::NoInputAvailable);
        }

        let mut records: Vec<AlertRecord> = Vec::new();
        for doc in documents {
            counter!("cap_documents_total").increment(1);
            match parser::parse_document(&doc.name, &doc.bytes, &self.config.target_language) {
                Ok(mut rs) => records.append(&mut rs),
                Err(err) => {
                    tracing::warn!(document = %doc.name, error = %err, "skipping malformed document");
                    counter!("cap_malformed_documents_total").increment(1);
                }
            }
        }
        let parsed = records.len();

        // Unresolved severity is a normal exclusion, not an error.
        records.retain(|r| {
            let keep = r.severity != SeverityLevel::None;
            if !keep {
                tracing::debug!(region = %r.region_name, "excluding record without warning level");
                counter!("cap_severity_excluded_total").increment(1);
            }
            keep
        });

        let before_window = records.len();
        records.retain(|r| self.config.activity.is_relevant(now, r.onset, r.expires));
        counter!("cap_window_filtered_total").increment((before_window - records.len()) as u64);

        let before_dedup = records.len();
        let records = dedup::dedup_regions(self.config.dedup, records);
        counter!("cap_dedup_total").increment((before_dedup - records.len()) as u64);

        let mut features: Vec<ResolvedFeature> = Vec::with_capacity(records.len());
        for record in &records {
            match feature::assemble(record, &self.localizer) {
                Ok(f) => features.push(f),
                Err(err) => {
                    tracing::warn!(region = %record.region_name, error = %err, "skipping area with bad geometry");
                    counter!("cap_geometry_errors_total").increment(1);
                }
            }
        }
        feature::sort_for_rendering(&mut features);

        gauge!("cap_last_run_ts").set(now.timestamp() as f64);
        tracing::info!(
            documents = documents.len(),
            parsed,
            emitted = features.len(),
            policy = %self.config.activity,
            dedup = %self.config.dedup,
            "pipeline run complete"
        );

        Ok(FeatureCollection::new(features))
    }
}
