//! Pin-then-anchor upload pipeline
//!
//! Makes a file durably retrievable by content address, then anchors that
//! address on-ledger. The two halves fail differently: a pinned identifier
//! stays valid even when the anchor write fails, so the retry path runs the
//! anchor alone instead of uploading the bytes again.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument, warn};

use crate::error::{Error, Result};
use crate::gateway::{ContractGateway, OperationGuard};
use crate::storage::{ContentStore, PinMetadata};

/// Ledger side of the pipeline
#[async_trait]
pub trait AnchorSink: Send + Sync {
    /// Record a content identifier on-ledger; returns the transaction hash
    async fn anchor(&self, content_id: &str, display_name: &str) -> Result<String>;
}

#[async_trait]
impl AnchorSink for ContractGateway {
    async fn anchor(&self, content_id: &str, display_name: &str) -> Result<String> {
        self.record_file(content_id, display_name).await
    }
}

/// Display record for a completed upload. Lives in the caller's UI state
/// only; nothing here is persisted.
#[derive(Clone, Debug)]
pub struct UploadedFile {
    pub name: String,
    pub content_id: String,
    pub transaction_hash: String,
    pub retrieval_url: String,
}

pub struct UploadPipeline {
    store: Arc<dyn ContentStore>,
    sink: Arc<dyn AnchorSink>,
    guard: OperationGuard,
}

impl UploadPipeline {
    pub fn new(store: Arc<dyn ContentStore>, sink: Arc<dyn AnchorSink>) -> Self {
        Self {
            store,
            sink,
            guard: OperationGuard::new(),
        }
    }

    /// Pin only; returns the content identifier
    pub async fn pin(&self, filename: &str, content_type: &str, data: Vec<u8>) -> Result<String> {
        let metadata = PinMetadata::for_bytes(filename, content_type, &data);
        self.store.pin(data, metadata).await
    }

    /// Anchor an already-pinned identifier. This is the retry path after a
    /// partial upload failure: the pin outcome stays valid, so only this
    /// step runs again.
    pub async fn anchor(&self, content_id: &str, display_name: &str) -> Result<String> {
        let _permit = self.guard.acquire("upload")?;
        self.sink.anchor(content_id, display_name).await
    }

    /// Pin, then anchor. An anchor failure reports the pinned identifier so
    /// the caller can retry `anchor` alone.
    #[instrument(skip(self, data), fields(size = data.len()))]
    pub async fn upload_and_anchor(
        &self,
        filename: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<UploadedFile> {
        let _permit = self.guard.acquire("upload")?;

        let metadata = PinMetadata::for_bytes(filename, content_type, &data);
        let content_id = self.store.pin(data, metadata).await?;

        match self.sink.anchor(&content_id, filename).await {
            Ok(transaction_hash) => {
                info!(%content_id, %transaction_hash, "file pinned and anchored");
                Ok(UploadedFile {
                    name: filename.to_string(),
                    retrieval_url: self.store.retrieval_url(&content_id),
                    content_id,
                    transaction_hash,
                })
            }
            Err(source) => {
                warn!(%content_id, "pin succeeded but anchoring failed");
                Err(Error::AnchorFailed {
                    content_id,
                    source: Box::new(source),
                })
            }
        }
    }
}
