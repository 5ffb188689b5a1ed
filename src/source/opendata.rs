// src/source/opendata.rs
//! AEMET opendata retrieval. The API answers with a small JSON envelope
//! pointing at the actual payload URL; both requests carry the static
//! `api_key` query parameter. Retrieval only: timeouts/retries and archive
//! unpacking stay outside the pipeline.

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::source::{ArchiveSource, CapDocument};

#[derive(Debug, Deserialize)]
struct Envelope {
    estado: Option<i64>,
    datos: Option<String>,
    descripcion: Option<String>,
}

pub struct OpendataSource {
    url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpendataSource {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    async fn resolve_payload_url(&self) -> Result<String> {
        let envelope: Envelope = self
            .client
            .get(&self.url)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await
            .context("opendata envelope request")?
            .json()
            .await
            .context("decoding opendata envelope")?;

        if envelope.estado != Some(200) {
            bail!(
                "opendata answered estado={:?}: {}",
                envelope.estado,
                envelope.descripcion.unwrap_or_default()
            );
        }
        envelope
            .datos
            .filter(|u| !u.is_empty())
            .context("opendata envelope carries no datos url")
    }
}

#[async_trait::async_trait]
impl ArchiveSource for OpendataSource {
    async fn fetch_documents(&self) -> Result<Vec<CapDocument>> {
        let payload_url = self.resolve_payload_url().await?;
        let bytes = self
            .client
            .get(&payload_url)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await
            .context("opendata payload request")?
            .bytes()
            .await
            .context("reading opendata payload")?;

        let name = payload_url
            .rsplit('/')
            .next()
            .unwrap_or("opendata.xml")
            .to_string();
        tracing::info!(url = %payload_url, bytes = bytes.len(), "fetched opendata payload");
        Ok(vec![CapDocument {
            name,
            bytes: bytes.to_vec(),
        }])
    }

    fn name(&self) -> &'static str {
        "aemet-opendata"
    }
}
