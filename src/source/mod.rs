// src/source/mod.rs
pub mod dir;
pub mod opendata;

use anyhow::Result;

/// One XML document extracted from the warnings bundle. The pipeline does
/// not care how the bytes were obtained (network, filesystem, in-memory).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapDocument {
    pub name: String,
    pub bytes: Vec<u8>,
}

#[async_trait::async_trait]
pub trait ArchiveSource {
    async fn fetch_documents(&self) -> Result<Vec<CapDocument>>;
    fn name(&self) -> &'static str;
}
