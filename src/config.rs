// src/config.rs
//! Explicit configuration for the pipeline and its glue. Nothing here is
//! read from ambient globals at run time: the binary loads a config once
//! and passes the structs in.
//!
//! Load order: $METEOALERTA_CONFIG_PATH, then config/meteoalerta.toml,
//! then built-in defaults.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::activity::ActivityPolicy;
use crate::cap::dedup::DedupMode;

const ENV_PATH: &str = "METEOALERTA_CONFIG_PATH";
const DEFAULT_PATH: &str = "config/meteoalerta.toml";

/// What the core pipeline needs: nothing about files or networks.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub target_language: String,
    pub activity: ActivityPolicy,
    pub dedup: DedupMode,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_language: "es-ES".to_string(),
            activity: ActivityPolicy::default(),
            dedup: DedupMode::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpendataConfig {
    pub url: String,
}

/// Full application configuration: pipeline policy plus the glue paths.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub pipeline: PipelineConfig,
    pub input_dir: PathBuf,
    pub output_path: PathBuf,
    pub opendata: Option<OpendataConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            pipeline: PipelineConfig::default(),
            input_dir: PathBuf::from("data/avisos"),
            output_path: PathBuf::from("avisos.geojson"),
            opendata: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    target_language: Option<String>,
    activity: Option<String>,
    dedup: Option<String>,
    input_dir: Option<PathBuf>,
    output_path: Option<PathBuf>,
    opendata: Option<OpendataConfig>,
}

fn from_raw(raw: RawConfig) -> Result<AppConfig> {
    let mut cfg = AppConfig::default();
    if let Some(lang) = raw.target_language {
        cfg.pipeline.target_language = lang;
    }
    if let Some(s) = raw.activity {
        cfg.pipeline.activity = s.parse().map_err(|e: String| anyhow!(e))?;
    }
    if let Some(s) = raw.dedup {
        cfg.pipeline.dedup = s.parse().map_err(|e: String| anyhow!(e))?;
    }
    if let Some(p) = raw.input_dir {
        cfg.input_dir = p;
    }
    if let Some(p) = raw.output_path {
        cfg.output_path = p;
    }
    cfg.opendata = raw.opendata;
    Ok(cfg)
}

pub fn load_from(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading config from {}", path.display()))?;
    let raw: RawConfig = toml::from_str(&content)
        .with_context(|| format!("parsing config {}", path.display()))?;
    from_raw(raw)
}

/// Load config using env var + fallback; absent files mean defaults.
pub fn load_default() -> Result<AppConfig> {
    if let Ok(p) = std::env::var(ENV_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_from(&pb);
        }
        return Err(anyhow!("{ENV_PATH} points to non-existent path"));
    }
    let default = PathBuf::from(DEFAULT_PATH);
    if default.exists() {
        return load_from(&default);
    }
    Ok(AppConfig::default())
}
