//! Content-addressed storage

pub mod pinata;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::error::Result;

/// Bookkeeping attached to a pin request
#[derive(Clone, Debug)]
pub struct PinMetadata {
    pub filename: String,
    pub content_type: String,
    pub size: usize,
    pub sha256: String,
}

impl PinMetadata {
    /// Measure and digest `data` for upload bookkeeping
    pub fn for_bytes(filename: &str, content_type: &str, data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Self {
            filename: filename.to_string(),
            content_type: content_type.to_string(),
            size: data.len(),
            sha256: format!("{:x}", hasher.finalize()),
        }
    }
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Pin `data` durably and return its content identifier
    async fn pin(&self, data: Vec<u8>, metadata: PinMetadata) -> Result<String>;

    /// Public URL where a pinned identifier resolves
    fn retrieval_url(&self, content_id: &str) -> String;
}
