//! The byte source contract consumed by the readers.
//!
//! - [`ChunkSource`] - Finite, lazy sequence of byte chunks
//! - [`ReadSource`] - Adapter from [`std::io::Read`] to [`ChunkSource`]

mod read;

pub use read::ReadSource;

use bytes::Bytes;

use crate::error::IntegrityError;

/// A finite, lazy sequence of byte chunks.
///
/// The end of iteration is the single completion signal. An `Err` item is
/// terminal; readers never pull again after seeing one. Dropping a source
/// closes it.
///
/// Implemented for every iterator with the right item type, including
/// [`HashReader`](crate::HashReader) itself, so readers nest.
pub trait ChunkSource: Iterator<Item = Result<Bytes, IntegrityError>> {}

impl<I> ChunkSource for I where I: Iterator<Item = Result<Bytes, IntegrityError>> {}
