//! Content-addressed storage
//!
//! The store is an external collaborator addressed only by hash: `put`
//! returns the store's own content identifier for the bytes, `get`
//! resolves a previously minted identifier. The core treats hashes as
//! opaque strings; there are no mutable handles.

mod memory;

pub use memory::InMemoryStore;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque content identifier minted by the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ContentHash {
    fn from(hash: String) -> Self {
        Self(hash)
    }
}

/// Storage error
#[derive(Debug, Error)]
pub enum StorageError {
    /// The store could not be reached or refused the request
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// No object is stored under the given hash
    #[error("Content not found: {0}")]
    NotFound(String),
}

/// Client for an external content-addressed object store.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Store bytes, returning their content identifier.
    async fn put(&self, bytes: Vec<u8>) -> Result<ContentHash, StorageError>;

    /// Fetch the bytes stored under `hash`.
    async fn get(&self, hash: &ContentHash) -> Result<Vec<u8>, StorageError>;
}
