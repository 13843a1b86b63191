//! Lifecycle error types
//!
//! Every variant is a caller/protocol misuse: none of these are retried
//! automatically, and a rejected transition leaves the document unchanged.

use thiserror::Error;
use uuid::Uuid;

use super::DocumentState;

/// Lifecycle rejection
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// No document is registered under the given id
    #[error("Document not found: {0}")]
    NotFound(Uuid),

    /// Publish called with an empty signer set
    #[error("Cannot publish with an empty signer set")]
    EmptySignerSet,

    /// Publish called on a document that already left Draft
    #[error("Document already published (state {0:?})")]
    AlreadyPublished(DocumentState),

    /// Signing transition attempted in Draft or Completed
    #[error("Document is not accepting signatures (state {0:?})")]
    NotAcceptingSignatures(DocumentState),

    /// The signer is not part of the document's signer set
    #[error("Unknown signer: {0}")]
    UnknownSigner(String),

    /// The signer has already completed their signature
    #[error("Already signed by {0}")]
    AlreadySigned(String),
}
