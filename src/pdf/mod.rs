//! PDF mutation engine
//!
//! Loads PDF bytes, stamps a PNG raster at a page-space rectangle on a
//! single page, and reserializes. Everything else in the document is
//! preserved in object terms; input bytes are never mutated, so a failed
//! downstream step can always retry from the original.
//!
//! The document is otherwise opaque to this crate: the only structure
//! read here is the page tree (count, MediaBox) and the only structure
//! written is one image XObject plus its placement content stream.

mod embed;
mod pages;

pub use embed::{embed, embedded_signature_rect};
pub use pages::{page_count, page_size};

use thiserror::Error;

/// PDF mutation error
#[derive(Debug, Error)]
pub enum PdfError {
    /// Input bytes did not parse as a PDF document
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// The 0-based page index does not name a page
    #[error("Page index {index} out of range for document with {page_count} pages")]
    PageIndexOutOfRange { index: usize, page_count: usize },

    /// The raster bytes did not decode as an image
    #[error("Image decode error: {0}")]
    ImageDecodeError(String),

    /// The page objects could not be rewritten
    #[error("Mutation failed: {0}")]
    MutationFailed(String),

    /// The modified document could not be serialized
    #[error("Serialization failed: {0}")]
    Serialize(String),
}
