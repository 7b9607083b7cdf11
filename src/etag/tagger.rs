//! The [`Tagger`] capability and the [`wrap`] adapter.
//!
//! A transformation pipeline (content → compress → encrypt) hands its
//! earlier stages to later ones by value, so the stage that hashed the
//! original content is no longer reachable once the pipeline is built.
//! [`wrap`] re-attaches that checksum to the final stage:
//!
//! ```
//! use bytes::Bytes;
//! use etagrs::{HashReader, IntegrityError, Tagger, wrap};
//!
//! let chunks = vec![Ok::<_, IntegrityError>(Bytes::from_static(b"abcd"))];
//! let content = HashReader::new(chunks.into_iter(), -1, "", "", -1)?;
//! let tag = content.tagger();
//!
//! // stand-in for an encrypting stage that takes ownership of `content`
//! let encrypted = content.map(|chunk| chunk.map(|b| Bytes::from(b.iter().map(|x| x ^ 0x5a).collect::<Vec<_>>())));
//!
//! let mut reader = wrap(encrypted, Some(tag));
//! while let Some(chunk) = reader.next() {
//!     chunk?;
//! }
//! assert_eq!(reader.etag().unwrap().to_string(), "e2fc714c4727ee9395f324cd2e7f331f");
//! # Ok::<(), IntegrityError>(())
//! ```

use std::io::{self, Read};
use std::sync::Arc;

use parking_lot::Mutex;

use super::ETag;
use crate::hash::Md5Hasher;

/// Something that can report the ETag of the content it has seen.
pub trait Tagger {
    /// Returns the current ETag, or `None` if there is none.
    fn etag(&self) -> Option<ETag>;
}

impl Tagger for ETag {
    fn etag(&self) -> Option<ETag> {
        Some(self.clone())
    }
}

impl<T: Tagger + ?Sized> Tagger for &T {
    fn etag(&self) -> Option<ETag> {
        (**self).etag()
    }
}

impl<T: Tagger + ?Sized> Tagger for Box<T> {
    fn etag(&self) -> Option<ETag> {
        (**self).etag()
    }
}

impl<T: Tagger + ?Sized> Tagger for Arc<T> {
    fn etag(&self) -> Option<ETag> {
        (**self).etag()
    }
}

/// A read-only view of a reader's running MD5.
///
/// Obtained from [`HashReader::tagger`](crate::HashReader::tagger) (or the
/// async equivalent). The handle stays valid after the reader has been
/// moved into another pipeline stage and reports the digest of everything
/// the reader has forwarded at the time of the call.
#[derive(Debug, Clone)]
pub struct TagHandle {
    md5: Arc<Mutex<Md5Hasher>>,
}

impl TagHandle {
    pub(crate) fn new(md5: Arc<Mutex<Md5Hasher>>) -> Self {
        Self { md5 }
    }
}

impl Tagger for TagHandle {
    fn etag(&self) -> Option<ETag> {
        Some(ETag::from_md5(self.md5.lock().finalize()))
    }
}

/// A byte source whose checksum comes from somewhere else.
///
/// Produced by [`wrap`]. Bytes come from the wrapped source unchanged.
#[derive(Debug)]
pub struct Wrapped<S, T> {
    inner: S,
    tagger: Option<T>,
}

/// Pairs `wrapped` with the checksum capability of `content`.
///
/// The returned value produces exactly the bytes of `wrapped`, while its
/// [`Tagger::etag`] reports `content`'s ETag, or `None` if no tagger is given.
pub fn wrap<S, T: Tagger>(wrapped: S, content: Option<T>) -> Wrapped<S, T> {
    Wrapped {
        inner: wrapped,
        tagger: content,
    }
}

impl<S, T> Wrapped<S, T> {
    /// Returns the wrapped source.
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    /// Consumes the adapter and returns the wrapped source.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S, T: Tagger> Tagger for Wrapped<S, T> {
    fn etag(&self) -> Option<ETag> {
        self.tagger.as_ref().and_then(Tagger::etag)
    }
}

impl<S: Iterator, T> Iterator for Wrapped<S, T> {
    type Item = S::Item;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<S: Read, T> Read for Wrapped<S, T> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

#[cfg(feature = "async-io")]
impl<S, T> futures_core::Stream for Wrapped<S, T>
where
    S: futures_core::Stream + Unpin,
    T: Unpin,
{
    type Item = S::Item;

    fn poll_next(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        std::pin::Pin::new(&mut self.inner).poll_next(cx)
    }
}
