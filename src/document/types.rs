//! Document types and the pure lifecycle state machine.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::LifecycleError;
use crate::storage::ContentHash;

/// Lifecycle state
///
/// `AwaitingSignatures` and `PartiallySigned` differ only in whether any
/// signature has been recorded; both accept further signing transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentState {
    Draft,
    AwaitingSignatures,
    PartiallySigned,
    Completed,
}

/// A co-signed document's authoritative record.
///
/// Title, description, and (once published) the signer set are immutable.
/// `signed_by` grows monotonically; `content_hash` is superseded exactly
/// once per recorded signature.
#[derive(Debug, Clone)]
pub struct Document {
    id: Uuid,
    title: String,
    description: String,
    created_at: DateTime<Utc>,
    state: DocumentState,
    signers: Vec<String>,
    signed_by: BTreeSet<String>,
    content_hash: Option<ContentHash>,
}

impl Document {
    /// Create a Draft: no signers, no content hash yet.
    pub fn draft(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: description.into(),
            created_at: Utc::now(),
            state: DocumentState::Draft,
            signers: Vec::new(),
            signed_by: BTreeSet::new(),
            content_hash: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> DocumentState {
        self.state
    }

    pub fn content_hash(&self) -> Option<&ContentHash> {
        self.content_hash.as_ref()
    }

    /// `true` iff every required signer has signed.
    pub fn is_completed(&self) -> bool {
        !self.signers.is_empty() && self.signers.iter().all(|s| self.signed_by.contains(s))
    }

    /// Draft → AwaitingSignatures: fix the signer set and the initial
    /// content hash.
    ///
    /// Signers are deduplicated preserving first occurrence; an empty
    /// (post-dedup) set is rejected. Publishing twice is rejected.
    pub fn publish(
        &mut self,
        signers: Vec<String>,
        initial_hash: ContentHash,
    ) -> Result<(), LifecycleError> {
        if self.state != DocumentState::Draft {
            return Err(LifecycleError::AlreadyPublished(self.state));
        }

        let mut seen = BTreeSet::new();
        let signers: Vec<String> = signers
            .into_iter()
            .filter(|s| !s.is_empty() && seen.insert(s.clone()))
            .collect();
        if signers.is_empty() {
            return Err(LifecycleError::EmptySignerSet);
        }

        self.signers = signers;
        self.content_hash = Some(initial_hash);
        self.state = DocumentState::AwaitingSignatures;
        Ok(())
    }

    /// Check whether `signer` could record a signature right now, without
    /// changing anything.
    pub fn ensure_can_sign(&self, signer: &str) -> Result<(), LifecycleError> {
        match self.state {
            DocumentState::AwaitingSignatures | DocumentState::PartiallySigned => {}
            state => return Err(LifecycleError::NotAcceptingSignatures(state)),
        }
        if !self.signers.iter().any(|s| s == signer) {
            return Err(LifecycleError::UnknownSigner(signer.to_string()));
        }
        if self.signed_by.contains(signer) {
            return Err(LifecycleError::AlreadySigned(signer.to_string()));
        }
        Ok(())
    }

    /// Record one completed signature and supersede the content hash.
    ///
    /// The membership check, the `signed_by` update, and the hash
    /// supersession happen together; callers needing exclusion across
    /// concurrent signers serialize through [`super::DocumentRegistry`].
    pub fn record_signature(
        &mut self,
        signer: &str,
        new_hash: ContentHash,
    ) -> Result<DocumentState, LifecycleError> {
        self.ensure_can_sign(signer)?;

        self.signed_by.insert(signer.to_string());
        self.content_hash = Some(new_hash);
        self.state = if self.is_completed() {
            DocumentState::Completed
        } else {
            DocumentState::PartiallySigned
        };
        Ok(self.state)
    }

    /// Read-only snapshot of the authoritative record.
    pub fn status(&self) -> DocumentStatus {
        DocumentStatus {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            created_at: self.created_at,
            state: self.state,
            signers: self.signers.clone(),
            signed_by: self.signed_by.iter().cloned().collect(),
            content_hash: self.content_hash.clone(),
            completed: self.is_completed(),
        }
    }
}

/// Snapshot returned by status queries. Wire-facing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStatus {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub state: DocumentState,
    pub signers: Vec<String>,
    pub signed_by: Vec<String>,
    pub content_hash: Option<ContentHash>,
    pub completed: bool,
}
