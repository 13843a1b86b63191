//! Document model and lifecycle
//!
//! A document's authoritative record is its signer set, completion state,
//! and current content hash. The lifecycle is a strict state machine:
//!
//! `Draft → AwaitingSignatures → PartiallySigned → Completed`
//!
//! `Completed` is terminal. Exactly one content hash is current at any
//! time; each recorded signature supersedes it atomically with the
//! signer-set update.
//!
//! - `types`: the pure state machine (`Document`) and its status view
//! - `registry`: concurrent registry serializing transitions per document
//! - `error`: lifecycle rejection kinds

mod error;
mod registry;
mod types;

pub use error::LifecycleError;
pub use registry::DocumentRegistry;
pub use types::{Document, DocumentState, DocumentStatus};
