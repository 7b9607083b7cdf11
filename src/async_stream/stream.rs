//! Async hashing stream.
//!
//! # Example
//!
//! ```ignore
//! use futures_util::StreamExt;
//! use etagrs::{HashStream, ReadStream};
//! use futures_io::AsyncRead;
//!
//! async fn demo<R: AsyncRead + Unpin>(reader: R, sha256_hex: &str) -> Result<(), etagrs::IntegrityError> {
//!     let mut stream = HashStream::new(ReadStream::new(reader), -1, "", sha256_hex, -1)?;
//!
//!     while let Some(chunk) = stream.next().await {
//!         let chunk = chunk?;
//!         println!("chunk {}", chunk.len());
//!     }
//!     println!("etag {}", stream.etag());
//!     Ok(())
//! }
//! ```

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_core::{Stream, ready};
use pin_project_lite::pin_project;

use crate::error::{IntegrityError, Result};
use crate::etag::{ETag, TagHandle, Tagger};
use crate::reader::Upstream;
use crate::reader::state::{References, Verifier};

pin_project! {
    /// A stream that hashes, truncates and verifies the chunks of its
    /// source.
    ///
    /// Behaves exactly like [`HashReader`](crate::HashReader), polled
    /// instead of pulled.
    #[derive(Debug)]
    pub struct HashStream<S> {
        #[pin]
        source: Option<S>,
        state: Verifier,
        finished: bool,
    }
}

/// Creates a hashing stream from a plain source or merges into an existing
/// stream.
///
/// The async counterpart of [`new_reader`](crate::new_reader).
pub fn new_stream<S>(
    upstream: Upstream<S, HashStream<S>>,
    size: i64,
    md5_hex: &str,
    sha256_hex: &str,
    actual_size: i64,
) -> Result<HashStream<S>>
where
    S: Stream<Item = Result<Bytes, IntegrityError>>,
{
    match upstream {
        Upstream::Source(source) => HashStream::new(source, size, md5_hex, sha256_hex, actual_size),
        Upstream::Reader(stream) => stream.merge(size, md5_hex, sha256_hex, actual_size),
    }
}

impl<S> HashStream<S>
where
    S: Stream<Item = Result<Bytes, IntegrityError>>,
{
    /// Wraps `source` in a new stream.
    ///
    /// Fails with [`IntegrityError::Format`] if either reference is not a
    /// lowercase hex string.
    pub fn new(
        source: S,
        size: i64,
        md5_hex: &str,
        sha256_hex: &str,
        actual_size: i64,
    ) -> Result<Self> {
        let refs = References::parse(md5_hex, sha256_hex)?;
        Ok(Self {
            source: Some(source),
            state: Verifier::new(refs, size, actual_size),
            finished: false,
        })
    }

    /// Folds new expectations into this unpolled stream and returns it.
    ///
    /// Same rules as [`HashReader::merge`](crate::HashReader::merge).
    pub fn merge(
        mut self,
        size: i64,
        md5_hex: &str,
        sha256_hex: &str,
        actual_size: i64,
    ) -> Result<Self> {
        let refs = References::parse(md5_hex, sha256_hex)?;
        if self.finished {
            return Err(IntegrityError::InvalidState("hash: reader already closed"));
        }
        self.state.merge(refs, size, actual_size)?;
        Ok(self)
    }
}

impl<S> HashStream<S> {
    /// Returns the declared size, or `-1` if unknown.
    pub fn size(&self) -> i64 {
        self.state.size()
    }

    /// Returns the size of the content before any transformation, or `-1`.
    pub fn actual_size(&self) -> i64 {
        self.state.actual_size()
    }

    /// Returns the ETag of everything forwarded so far.
    pub fn etag(&self) -> ETag {
        self.state.etag()
    }

    /// Returns the SHA-256 of everything forwarded so far, if a SHA-256
    /// reference was supplied.
    pub fn sha256_current(&self) -> Option<[u8; 32]> {
        self.state.sha256_current()
    }

    /// Returns the MD5 reference, empty if none was supplied.
    pub fn md5(&self) -> &[u8] {
        self.state.md5_ref()
    }

    /// Returns the SHA-256 reference, empty if none was supplied.
    pub fn sha256(&self) -> &[u8] {
        self.state.sha256_ref()
    }

    /// Returns the MD5 reference as hex.
    pub fn md5_hex(&self) -> String {
        self.state.md5_hex()
    }

    /// Returns the MD5 reference as base64.
    pub fn md5_base64(&self) -> String {
        self.state.md5_base64()
    }

    /// Returns the SHA-256 reference as hex.
    pub fn sha256_hex(&self) -> String {
        self.state.sha256_hex()
    }

    /// Returns the number of bytes pulled from the source.
    pub fn bytes_consumed(&self) -> u64 {
        self.state.consumed()
    }

    /// Returns the number of bytes forwarded downstream.
    pub fn bytes_forwarded(&self) -> u64 {
        self.state.forwarded()
    }

    /// Returns a handle reporting this stream's running ETag.
    pub fn tagger(&self) -> TagHandle {
        self.state.tagger()
    }

    /// Reports whether the stream is done.
    pub fn is_closed(&self) -> bool {
        self.finished
    }

    /// Drops the source and ends the stream. Idempotent.
    pub fn close(self: Pin<&mut Self>) {
        let mut this = self.project();
        *this.finished = true;
        this.source.set(None);
    }
}

fn finish<S>(
    mut source: Pin<&mut Option<S>>,
    state: &Verifier,
    finished: &mut bool,
) -> Option<Result<Bytes>> {
    *finished = true;
    source.set(None);
    state.verify().err().map(Err)
}

impl<S> Stream for HashStream<S>
where
    S: Stream<Item = Result<Bytes, IntegrityError>>,
{
    type Item = Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        if *this.finished {
            return Poll::Ready(None);
        }

        loop {
            if this.state.limit_reached() {
                return Poll::Ready(finish(this.source.as_mut(), this.state, this.finished));
            }

            let Some(source) = this.source.as_mut().as_pin_mut() else {
                return Poll::Ready(finish(this.source.as_mut(), this.state, this.finished));
            };

            match ready!(source.poll_next(cx)) {
                None => return Poll::Ready(finish(this.source.as_mut(), this.state, this.finished)),
                Some(Err(e)) => {
                    *this.finished = true;
                    this.source.set(None);
                    return Poll::Ready(Some(Err(e)));
                }
                Some(Ok(chunk)) if chunk.is_empty() => continue,
                Some(Ok(chunk)) => {
                    let data = this.state.accept(chunk);
                    if this.state.limit_reached() {
                        this.source.set(None);
                    }
                    return Poll::Ready(Some(Ok(data)));
                }
            }
        }
    }
}

impl<S> Tagger for HashStream<S> {
    fn etag(&self) -> Option<ETag> {
        Some(self.state.etag())
    }
}
