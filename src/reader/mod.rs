//! Hashing readers.
//!
//! - [`HashReader`]: hashes, truncates at a declared size and verifies the
//!   SHA-256 of the forwarded bytes
//! - [`ETagReader`]: computes the MD5 of the forwarded bytes and compares it
//!   to an expected [`ETag`](crate::ETag) at end of stream
//!
//! Stacking hashing readers on the same bytes is wasteful, so
//! [`new_reader`] takes an [`Upstream`] and merges new expectations into an
//! existing [`HashReader`] instead of wrapping it again.

mod etag_reader;
mod hash_reader;
pub(crate) mod state;

pub use etag_reader::ETagReader;
pub use hash_reader::{HashReader, new_reader};

/// The upstream of a new hashing reader.
///
/// `R` is the reader type a merge can reuse. It defaults to [`HashReader`];
/// the async factory uses `HashStream`.
#[derive(Debug)]
pub enum Upstream<S, R = HashReader<S>> {
    /// A plain source. It is always wrapped in a new reader.
    Source(S),
    /// An existing, unread reader. New expectations are merged into it and
    /// the same reader is returned.
    Reader(R),
}
