//! MD5-verifying reader.

use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;

use crate::error::{IntegrityError, Result};
use crate::etag::{ETag, TagHandle, Tagger};
use crate::hash::Md5Hasher;
use crate::source::ChunkSource;

/// A reader that computes the ETag of the content it forwards.
///
/// If constructed with an expected ETag, the computed one is compared once
/// the source is exhausted and a mismatch is yielded as a terminal
/// [`IntegrityError::VerifyMismatch`].
///
/// # Example
///
/// ```
/// use bytes::Bytes;
/// use etagrs::{ETag, ETagReader, IntegrityError};
///
/// let expected: ETag = "e2fc714c4727ee9395f324cd2e7f331f".parse()?;
/// let chunks = vec![Ok::<_, IntegrityError>(Bytes::from_static(b"ab")), Ok(Bytes::from_static(b"ce"))];
///
/// let result: Result<Vec<Bytes>, _> = ETagReader::new(chunks.into_iter(), Some(expected)).collect();
/// assert!(matches!(result, Err(IntegrityError::VerifyMismatch { .. })));
/// # Ok::<(), IntegrityError>(())
/// ```
#[derive(Debug)]
pub struct ETagReader<S> {
    source: Option<S>,
    md5: Arc<Mutex<Md5Hasher>>,
    expected: Option<ETag>,
    read: u64,
    finished: bool,
}

impl<S: ChunkSource> ETagReader<S> {
    /// Wraps `source`, optionally verifying it against `expected`.
    pub fn new(source: S, expected: Option<ETag>) -> Self {
        Self {
            source: Some(source),
            md5: Arc::new(Mutex::new(Md5Hasher::new())),
            expected,
            read: 0,
            finished: false,
        }
    }

    fn finish(&mut self) -> Option<Result<Bytes>> {
        self.finished = true;
        self.source = None;

        let expected = self.expected.as_ref()?;
        let computed = self.current();
        if *expected == computed {
            return None;
        }
        tracing::debug!(%expected, %computed, "content etag verification failed");
        Some(Err(IntegrityError::VerifyMismatch {
            expected: expected.clone(),
            computed,
        }))
    }
}

impl<S> ETagReader<S> {
    fn current(&self) -> ETag {
        ETag::from_md5(self.md5.lock().finalize())
    }

    /// Returns the ETag of everything forwarded so far.
    pub fn etag(&self) -> ETag {
        self.current()
    }

    /// Returns the ETag this reader verifies against, if any.
    pub fn expected(&self) -> Option<&ETag> {
        self.expected.as_ref()
    }

    /// Returns the number of bytes forwarded so far.
    pub fn bytes_read(&self) -> u64 {
        self.read
    }

    /// Returns a handle reporting this reader's running ETag.
    pub fn tagger(&self) -> TagHandle {
        TagHandle::new(Arc::clone(&self.md5))
    }

    /// Reports whether the reader is done.
    pub fn is_closed(&self) -> bool {
        self.finished
    }

    /// Drops the source without verifying. Idempotent.
    pub fn close(&mut self) {
        self.finished = true;
        self.source = None;
    }
}

impl<S: ChunkSource> Iterator for ETagReader<S> {
    type Item = Result<Bytes>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let source = self.source.as_mut()?;

        match source.next() {
            None => self.finish(),
            Some(Err(e)) => {
                self.finished = true;
                self.source = None;
                Some(Err(e))
            }
            Some(Ok(chunk)) => {
                self.md5.lock().update(&chunk);
                self.read += chunk.len() as u64;
                Some(Ok(chunk))
            }
        }
    }
}

impl<S> Tagger for ETagReader<S> {
    fn etag(&self) -> Option<ETag> {
        Some(self.current())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunks(parts: &[&'static [u8]]) -> std::vec::IntoIter<Result<Bytes>> {
        parts
            .iter()
            .map(|p| Ok(Bytes::from_static(p)))
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn test_matching_etag() {
        let expected: ETag = "e2fc714c4727ee9395f324cd2e7f331f".parse().unwrap();
        let mut reader = ETagReader::new(chunks(&[b"ab", b"cd"]), Some(expected.clone()));

        let out: Vec<Bytes> = reader.by_ref().collect::<Result<_>>().unwrap();
        assert_eq!(out.concat(), b"abcd");
        assert_eq!(reader.etag(), expected);
        assert_eq!(reader.bytes_read(), 4);
        assert!(reader.is_closed());
    }

    #[test]
    fn test_mismatch_is_terminal() {
        let expected = ETag::from_md5(Md5Hasher::hash(b"abcd"));
        let mut reader = ETagReader::new(chunks(&[b"abce"]), Some(expected.clone()));

        assert!(reader.next().unwrap().is_ok());
        match reader.next() {
            Some(Err(IntegrityError::VerifyMismatch { expected: e, computed })) => {
                assert_eq!(e, expected);
                assert_eq!(computed, ETag::from_md5(Md5Hasher::hash(b"abce")));
            }
            other => panic!("expected verify mismatch, got {other:?}"),
        }
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_without_expectation() {
        let reader = ETagReader::new(chunks(&[b"anything"]), None);
        let handle = reader.tagger();
        assert_eq!(reader.count(), 1);
        assert_eq!(
            handle.etag(),
            Some(ETag::from_md5(Md5Hasher::hash(b"anything")))
        );
    }

    #[test]
    fn test_close_skips_verification() {
        let expected = ETag::from_md5(Md5Hasher::hash(b"abcd"));
        let mut reader = ETagReader::new(chunks(&[b"ab", b"cd"]), Some(expected));
        reader.next();
        reader.close();
        assert!(reader.next().is_none());
        assert_eq!(reader.bytes_read(), 2);
    }
}
