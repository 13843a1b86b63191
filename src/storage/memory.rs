//! In-memory content-addressed store
//!
//! Reference `ContentStore` implementation: addresses objects by the hex
//! SHA-256 of their bytes. Used by tests and local runs; a gateway-backed
//! client drops in behind the same trait.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;

use super::{ContentHash, ContentStore, StorageError};

/// Content-addressed store backed by a process-local map.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    objects: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct objects held.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

fn digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[async_trait]
impl ContentStore for InMemoryStore {
    async fn put(&self, bytes: Vec<u8>) -> Result<ContentHash, StorageError> {
        let hash = digest(&bytes);
        let mut objects = self.objects.write().await;
        objects.entry(hash.clone()).or_insert(bytes);

        tracing::debug!(content_hash = %hash, "Stored object");
        Ok(ContentHash::new(hash))
    }

    async fn get(&self, hash: &ContentHash) -> Result<Vec<u8>, StorageError> {
        let objects = self.objects.read().await;
        objects
            .get(hash.as_str())
            .cloned()
            .ok_or_else(|| StorageError::NotFound(hash.to_string()))
    }
}
