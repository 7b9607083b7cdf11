//! etagrs
//!
//! Streaming content integrity for object storage.
//!
//! `etagrs` provides two things:
//!
//! - [`ETag`], the object-storage entity tag: a plain MD5, a multipart tag
//!   (`md5-of-part-md5s` followed by `-N`) or an opaque encrypted tag
//! - [`HashReader`], a chunk reader that computes MD5 (and SHA-256) while
//!   bytes flow through, stops at a declared size and verifies a SHA-256
//!   reference once the content ends
//!
//! The crate intentionally:
//! - does NOT talk to any storage backend
//! - does NOT manage files or paths
//! - does NOT buffer whole objects
//!
//! It only does one thing: **Read bytes → hash, bound and verify them**
//!
//! # Sync
//!
//! ```no_run
//! use std::fs::File;
//! use etagrs::{HashReader, IntegrityError, ReadSource};
//!
//! fn main() -> Result<(), IntegrityError> {
//!     let file = File::open("object.bin")?;
//!     let mut reader = HashReader::new(ReadSource::new(file), -1, "", "", -1)?;
//!
//!     for chunk in reader.by_ref() {
//!         let chunk = chunk?;
//!         println!("chunk {} bytes", chunk.len());
//!     }
//!     println!("etag {}", reader.etag());
//!     Ok(())
//! }
//! ```
//!
//! # Nesting
//!
//! Hashing the same bytes twice is wasted work. [`new_reader`] merges new
//! expectations into an existing, unread reader instead of wrapping it:
//!
//! ```
//! use bytes::Bytes;
//! use etagrs::{IntegrityError, Upstream, new_reader};
//!
//! let chunks = vec![Ok::<_, IntegrityError>(Bytes::from_static(b"abcd"))];
//! let inner = new_reader(Upstream::Source(chunks.into_iter()), 4, "", "", -1)?;
//! let outer = new_reader(
//!     Upstream::Reader(inner),
//!     -1,
//!     "e2fc714c4727ee9395f324cd2e7f331f",
//!     "",
//!     -1,
//! )?;
//! assert_eq!(outer.size(), 4);
//! assert_eq!(outer.md5_hex(), "e2fc714c4727ee9395f324cd2e7f331f");
//! # Ok::<(), IntegrityError>(())
//! ```
//!
//! # Async (feature = "async-io")
//!
//! ```ignore
//! use futures_util::StreamExt;
//! use etagrs::{HashStream, ReadStream};
//! use futures_io::AsyncRead;
//!
//! async fn demo<R: AsyncRead + Unpin>(reader: R) -> Result<(), etagrs::IntegrityError> {
//!     let mut stream = HashStream::new(ReadStream::new(reader), -1, "", "", -1)?;
//!
//!     while let Some(chunk) = stream.next().await {
//!         chunk?;
//!     }
//!     println!("etag {}", stream.etag());
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod etag;
mod reader;
mod source;

mod hash; // internal md5/sha256 wrappers

#[cfg(feature = "async-io")]
mod async_stream;

//
// Public surface
//

pub use config::{DEFAULT_BUFFER_SIZE, MAX_BUFFER_SIZE, MIN_BUFFER_SIZE, SourceConfig};
pub use error::{IntegrityError, Result};
pub use etag::{ETag, MAX_PARTS, TagHandle, Tagger, Wrapped, wrap};
pub use hash::{Md5Hasher, Sha256Hasher};
pub use reader::{ETagReader, HashReader, Upstream, new_reader};
pub use source::{ChunkSource, ReadSource};

#[cfg(feature = "async-io")]
pub use async_stream::{HashStream, ReadStream, new_stream};
