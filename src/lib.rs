//! cosign-core
//!
//! Core of a multi-party PDF co-signing system. A document's
//! authoritative record (content hash, signer set, completion state)
//! lives in an immutable external ledger; the bytes themselves live in
//! content-addressed off-ledger storage. This crate owns the pipeline
//! that ties them together: a hand-drawn signature captured in screen
//! coordinates is scaled into the page's native frame, stamped into the
//! PDF, stored under a new content hash, and recorded on the document's
//! lifecycle state machine.
//!
//! # Modules
//!
//! - `geometry`: capture-space → page-space coordinate transform
//! - `capture`: freehand signature pad producing a PNG raster
//! - `pdf`: PDF mutation engine (image embedding, page geometry)
//! - `document`: document model, lifecycle state machine, registry
//! - `storage`: content-addressed store client
//! - `ledger`: ledger commit intents and client
//! - `workflow`: orchestration of one signing attempt

pub mod capture;
pub mod document;
pub mod geometry;
pub mod ledger;
pub mod pdf;
pub mod storage;
pub mod workflow;
