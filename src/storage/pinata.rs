//! Pinata-compatible pinning client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};

use super::{ContentStore, PinMetadata};
use crate::config::PinningConfig;
use crate::error::{Error, Result};

pub struct PinataStore {
    client: Client,
    config: PinningConfig,
}

impl PinataStore {
    pub fn new(config: PinningConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl ContentStore for PinataStore {
    async fn pin(&self, data: Vec<u8>, metadata: PinMetadata) -> Result<String> {
        debug!(
            filename = %metadata.filename,
            size = metadata.size,
            sha256 = %metadata.sha256,
            "pinning file"
        );
        let part = Part::bytes(data)
            .file_name(metadata.filename.clone())
            .mime_str(&metadata.content_type)
            .map_err(|e| Error::PinningFailed(format!("invalid content type: {e}")))?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(format!(
                "{}/pinning/pinFileToIPFS",
                self.config.api_url.trim_end_matches('/')
            ))
            .bearer_auth(&self.config.token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::PinningFailed(format!("pin request failed: {e}")))?;

        // Quota and auth problems arrive as plain status codes
        if !response.status().is_success() {
            return Err(Error::PinningFailed(format!(
                "pinning service returned {}",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| Error::PinningFailed(format!("malformed pinning response: {e}")))?;
        let cid = body
            .get("IpfsHash")
            .and_then(Value::as_str)
            .filter(|cid| !cid.is_empty())
            .ok_or_else(|| Error::PinningFailed("response missing IpfsHash".to_string()))?;

        info!(%cid, filename = %metadata.filename, "file pinned");
        Ok(cid.to_string())
    }

    fn retrieval_url(&self, content_id: &str) -> String {
        format!(
            "{}/ipfs/{}",
            self.config.gateway_url.trim_end_matches('/'),
            content_id
        )
    }
}
