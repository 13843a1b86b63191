//! Ledger commit intents
//!
//! The immutable ledger is an external collaborator. The core emits one
//! commit intent per commit point (publishing a document, recording a
//! signature) and the collaborator turns it into an on-chain write. The
//! core never sees transaction ids, gas, or chain identifiers, and an
//! intent handed off cannot be cancelled; the result comes back as a
//! one-shot success or failure.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::storage::ContentHash;

/// A single authoritative write for the ledger collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CommitIntent {
    /// Initial publication: document record with its signer set and the
    /// hash of the unsigned PDF.
    #[serde(rename_all = "camelCase")]
    Publish {
        document_id: Uuid,
        content_hash: ContentHash,
        signers: Vec<String>,
    },

    /// One completed signature: the signer and the superseding hash.
    #[serde(rename_all = "camelCase")]
    Signature {
        document_id: Uuid,
        signer: String,
        content_hash: ContentHash,
    },
}

impl CommitIntent {
    pub fn document_id(&self) -> Uuid {
        match self {
            CommitIntent::Publish { document_id, .. } => *document_id,
            CommitIntent::Signature { document_id, .. } => *document_id,
        }
    }

    pub fn content_hash(&self) -> &ContentHash {
        match self {
            CommitIntent::Publish { content_hash, .. } => content_hash,
            CommitIntent::Signature { content_hash, .. } => content_hash,
        }
    }
}

/// Ledger error
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The collaborator refused or failed the write
    #[error("Commit rejected: {0}")]
    CommitRejected(String),
}

/// Client for the external ledger collaborator.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Submit one commit intent. No cancellation once submitted.
    async fn commit(&self, intent: CommitIntent) -> Result<(), LedgerError>;
}

/// Ledger double that records every intent in arrival order.
///
/// Used by tests and local runs to assert on the exact commit sequence.
#[derive(Clone, Default)]
pub struct RecordingLedger {
    intents: Arc<Mutex<Vec<CommitIntent>>>,
}

impl RecordingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all intents committed so far.
    pub async fn intents(&self) -> Vec<CommitIntent> {
        self.intents.lock().await.clone()
    }
}

#[async_trait]
impl LedgerClient for RecordingLedger {
    async fn commit(&self, intent: CommitIntent) -> Result<(), LedgerError> {
        tracing::info!(
            document_id = %intent.document_id(),
            content_hash = %intent.content_hash(),
            "Recorded ledger commit"
        );
        self.intents.lock().await.push(intent);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recording_ledger_keeps_arrival_order() {
        let ledger = RecordingLedger::new();
        let id = Uuid::new_v4();

        ledger
            .commit(CommitIntent::Publish {
                document_id: id,
                content_hash: ContentHash::new("h0"),
                signers: vec!["alice".into(), "bob".into()],
            })
            .await
            .unwrap();
        ledger
            .commit(CommitIntent::Signature {
                document_id: id,
                signer: "alice".into(),
                content_hash: ContentHash::new("h1"),
            })
            .await
            .unwrap();

        let intents = ledger.intents().await;
        assert_eq!(intents.len(), 2);
        assert!(matches!(intents[0], CommitIntent::Publish { .. }));
        assert!(matches!(intents[1], CommitIntent::Signature { .. }));
    }

    #[test]
    fn test_intent_serializes_camel_case() {
        let intent = CommitIntent::Signature {
            document_id: Uuid::nil(),
            signer: "alice".into(),
            content_hash: ContentHash::new("abc"),
        };

        let json = serde_json::to_value(&intent).unwrap();
        assert_eq!(json["type"], "signature");
        assert_eq!(json["documentId"], Uuid::nil().to_string());
        assert_eq!(json["contentHash"], "abc");
    }
}
