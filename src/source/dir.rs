// src/source/dir.rs
use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::source::{ArchiveSource, CapDocument};

/// Reads the per-region XML files of an already-unpacked warnings bundle.
/// Files are yielded in name order so a run over the same directory is
/// deterministic.
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait::async_trait]
impl ArchiveSource for DirectorySource {
    async fn fetch_documents(&self) -> Result<Vec<CapDocument>> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .with_context(|| format!("reading bundle directory {}", self.dir.display()))?;

        let mut paths: Vec<PathBuf> = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_xml = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("xml"));
            if is_xml {
                paths.push(path);
            }
        }
        paths.sort();

        let mut docs = Vec::with_capacity(paths.len());
        for path in paths {
            let bytes = tokio::fs::read(&path)
                .await
                .with_context(|| format!("reading {}", path.display()))?;
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string();
            docs.push(CapDocument { name, bytes });
        }
        Ok(docs)
    }

    fn name(&self) -> &'static str {
        "bundle-dir"
    }
}
