//! meteoalerta — Binary Entrypoint
//! Loads configuration, fetches the current warnings bundle, runs the
//! normalization pipeline once, and writes the GeoJSON artifact.

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use meteoalerta::cap::Pipeline;
use meteoalerta::config;
use meteoalerta::source::{dir::DirectorySource, opendata::OpendataSource, ArchiveSource};

const ENV_API_KEY: &str = "AEMET_API_KEY";

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("meteoalerta=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op in prod environments. This is where
    // AEMET_API_KEY and METEOALERTA_CONFIG_PATH come from locally.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = config::load_default()?;

    // Opendata when configured (key required), unpacked bundle dir otherwise.
    let source: Box<dyn ArchiveSource> = match &cfg.opendata {
        Some(od) => {
            let api_key =
                std::env::var(ENV_API_KEY).context("AEMET_API_KEY is required for opendata")?;
            Box::new(OpendataSource::new(od.url.clone(), api_key))
        }
        None => Box::new(DirectorySource::new(cfg.input_dir.clone())),
    };

    tracing::info!(source = source.name(), "fetching warnings bundle");
    let documents = source.fetch_documents().await?;

    let pipeline = Pipeline::new(cfg.pipeline);
    let now = chrono::Utc::now();
    let collection = pipeline.run(&documents, now)?;

    let json = serde_json::to_string_pretty(&collection).context("serializing GeoJSON")?;
    std::fs::write(&cfg.output_path, json)
        .with_context(|| format!("writing {}", cfg.output_path.display()))?;

    tracing::info!(
        features = collection.features.len(),
        output = %cfg.output_path.display(),
        "GeoJSON written"
    );
    Ok(())
}
