//! ETag types.
//!
//! - [`ETag`] - Immutable checksum tag (single part, multipart or encrypted)
//! - [`Tagger`] - Capability to report an ETag
//! - [`wrap`] / [`Wrapped`] - Attach one source's checksum to another source
//! - [`TagHandle`] - Shared view of a reader's running MD5

#[cfg(feature = "headers")]
mod headers;
mod tag;
mod tagger;

pub use tag::{ETag, MAX_PARTS};
pub use tagger::{TagHandle, Tagger, Wrapped, wrap};
