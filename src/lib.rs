// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod activity;
pub mod cap;
pub mod config;
pub mod error;
pub mod feature;
pub mod geometry;
pub mod locale;
pub mod severity;
pub mod source;

// ---- Re-exports for stable public API ----
pub use crate::activity::ActivityPolicy;
pub use crate::cap::dedup::DedupMode;
pub use crate::cap::types::AlertRecord;
pub use crate::cap::Pipeline;
pub use crate::config::{AppConfig, PipelineConfig};
pub use crate::error::PipelineError;
pub use crate::feature::{FeatureCollection, ResolvedFeature};
pub use crate::severity::SeverityLevel;
pub use crate::source::{ArchiveSource, CapDocument};
