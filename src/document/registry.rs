//! Document registry
//!
//! Holds the live documents and serializes lifecycle transitions per
//! document: the check-then-set inside `record_signature` is not safe
//! under interleaving, so every transition runs under that document's own
//! mutex. The mutex guards only the in-memory transition; callers must
//! never hold it across store or ledger I/O, and the registry never
//! awaits anything else while holding it.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use super::{Document, DocumentStatus, LifecycleError};
use crate::storage::ContentHash;

/// Registry of live documents, cheap to clone and share.
#[derive(Clone, Default)]
pub struct DocumentRegistry {
    inner: Arc<RegistryInner>,
}

#[derive(Default)]
struct RegistryInner {
    documents: RwLock<HashMap<Uuid, Arc<Mutex<Document>>>>,
}

impl DocumentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new Draft document.
    pub async fn create(
        &self,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> DocumentStatus {
        let doc = Document::draft(title, description);
        let status = doc.status();

        let mut documents = self.inner.documents.write().await;
        documents.insert(doc.id(), Arc::new(Mutex::new(doc)));

        tracing::info!(document_id = %status.id, title = %status.title, "Created draft document");
        status
    }

    /// Publish a Draft: fix its signer set and initial content hash.
    pub async fn publish(
        &self,
        id: Uuid,
        signers: Vec<String>,
        initial_hash: ContentHash,
    ) -> Result<DocumentStatus, LifecycleError> {
        let handle = self.handle(id).await?;
        let mut doc = handle.lock().await;
        doc.publish(signers, initial_hash)?;

        let status = doc.status();
        tracing::info!(
            document_id = %id,
            signers = status.signers.len(),
            content_hash = %status.content_hash.as_ref().map(|h| h.as_str()).unwrap_or(""),
            "Published document"
        );
        Ok(status)
    }

    /// Record one signature, superseding the content hash, under the
    /// document's lock.
    pub async fn record_signature(
        &self,
        id: Uuid,
        signer: &str,
        new_hash: ContentHash,
    ) -> Result<DocumentStatus, LifecycleError> {
        let handle = self.handle(id).await?;
        let mut doc = handle.lock().await;
        let state = doc.record_signature(signer, new_hash)?;

        let status = doc.status();
        tracing::info!(
            document_id = %id,
            signer = %signer,
            state = ?state,
            signed = status.signed_by.len(),
            required = status.signers.len(),
            "Recorded signature"
        );
        Ok(status)
    }

    /// Read-only signability check for `signer`; no transition happens.
    pub async fn ensure_signable(&self, id: Uuid, signer: &str) -> Result<(), LifecycleError> {
        let handle = self.handle(id).await?;
        let doc = handle.lock().await;
        doc.ensure_can_sign(signer)
    }

    /// Current status snapshot.
    pub async fn status(&self, id: Uuid) -> Result<DocumentStatus, LifecycleError> {
        let handle = self.handle(id).await?;
        let doc = handle.lock().await;
        Ok(doc.status())
    }

    /// Status of every registered document.
    pub async fn list(&self) -> Vec<DocumentStatus> {
        let handles: Vec<Arc<Mutex<Document>>> = {
            let documents = self.inner.documents.read().await;
            documents.values().cloned().collect()
        };

        let mut statuses = Vec::with_capacity(handles.len());
        for handle in handles {
            statuses.push(handle.lock().await.status());
        }
        statuses.sort_by_key(|s| s.created_at);
        statuses
    }

    /// Clone out the per-document handle; the outer map lock is released
    /// before the document mutex is taken.
    async fn handle(&self, id: Uuid) -> Result<Arc<Mutex<Document>>, LifecycleError> {
        let documents = self.inner.documents.read().await;
        documents
            .get(&id)
            .cloned()
            .ok_or(LifecycleError::NotFound(id))
    }
}
