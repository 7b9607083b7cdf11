//! Async hashing streams.
//!
//! The async counterpart of [`HashReader`](crate::HashReader), built on `futures-core`
//! and `futures-io` so it runs on tokio, async-std, smol or any other
//! futures-compatible runtime.
//!
//! - [`HashStream`] - Hashes, truncates and verifies an async chunk source
//! - [`new_stream`] - Creates a [`HashStream`] or merges into an existing one
//! - [`ReadStream`] - Adapter from [`futures_io::AsyncRead`] to a chunk stream
//!
//! This module requires the `async-io` feature to be enabled.

mod read;
mod stream;

pub use read::ReadStream;
pub use stream::{HashStream, new_stream};
