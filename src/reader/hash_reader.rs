//! The synchronous hashing reader.
//!
//! [`HashReader`] wraps a [`ChunkSource`] and is itself a [`ChunkSource`]:
//! every chunk it forwards has been added to the running MD5 (and SHA-256,
//! when a SHA-256 reference was supplied). With a declared size it forwards
//! at most that many bytes and drops its source as soon as the limit is hit.
//!
//! # Example
//!
//! ```
//! use etagrs::{HashReader, ReadSource};
//!
//! let source = ReadSource::new(&b"abcd-more-stuff-to-be-ignored"[..]);
//! let mut reader = HashReader::new(
//!     source,
//!     4,
//!     "",
//!     "88d4266fd4e6338d13b845fcf289579d209c897823b9217da3e161936f031589",
//!     -1,
//! )?;
//!
//! let mut content = Vec::new();
//! for chunk in reader.by_ref() {
//!     content.extend_from_slice(&chunk?);
//! }
//! assert_eq!(content, b"abcd");
//! assert_eq!(reader.etag().to_string(), "e2fc714c4727ee9395f324cd2e7f331f");
//! # Ok::<(), etagrs::IntegrityError>(())
//! ```

use std::io::{self, Read};

use bytes::Bytes;

use super::Upstream;
use super::state::{References, Verifier};
use crate::error::{IntegrityError, Result};
use crate::etag::{ETag, TagHandle, Tagger};
use crate::source::ChunkSource;

/// A reader that hashes, truncates and verifies the chunks of its source.
///
/// Single use: once it has yielded `None` or an error, or has been closed,
/// it yields `None` forever.
#[derive(Debug)]
pub struct HashReader<S> {
    source: Option<S>,
    state: Verifier,
    finished: bool,
    pending: Bytes,
}

/// Creates a hashing reader from a plain source or merges into an existing
/// reader.
///
/// `size` and `actual_size` are `-1` when unknown; `md5_hex` and
/// `sha256_hex` are empty when there is no reference. See
/// [`HashReader::new`] and [`HashReader::merge`] for the two cases.
pub fn new_reader<S: ChunkSource>(
    upstream: Upstream<S>,
    size: i64,
    md5_hex: &str,
    sha256_hex: &str,
    actual_size: i64,
) -> Result<HashReader<S>> {
    match upstream {
        Upstream::Source(source) => HashReader::new(source, size, md5_hex, sha256_hex, actual_size),
        Upstream::Reader(reader) => reader.merge(size, md5_hex, sha256_hex, actual_size),
    }
}

impl<S: ChunkSource> HashReader<S> {
    /// Wraps `source` in a new reader.
    ///
    /// Fails with [`IntegrityError::Format`] if either reference is not a
    /// lowercase hex string. Nothing is read from `source` here.
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
            pending: Bytes::new(),
        })
    }

    /// Folds new expectations into this unread reader and returns it.
    ///
    /// Unset references and sizes are filled in; values already set must
    /// agree with the new ones. Fails with
    ///
    /// - [`IntegrityError::InvalidState`] if anything was read or the reader
    ///   was closed,
    /// - [`IntegrityError::BadDigest`] on conflicting MD5 references,
    /// - [`IntegrityError::Sha256Mismatch`] on conflicting SHA-256 references,
    /// - [`IntegrityError::SizeMismatch`] on conflicting declared sizes.
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

    fn finish(&mut self) -> Option<Result<Bytes>> {
        self.finished = true;
        self.source = None;
        self.state.verify().err().map(Err)
    }
}

impl<S> HashReader<S> {
    /// Returns the declared size, or `-1` if unknown.
    pub fn size(&self) -> i64 {
        self.state.size()
    }

    /// Returns the size of the content before any transformation, or `-1`.
    pub fn actual_size(&self) -> i64 {
        self.state.actual_size()
    }

    /// Returns the ETag of everything forwarded so far.
    ///
    /// Reading more data changes the result.
    pub fn etag(&self) -> ETag {
        self.state.etag()
    }

    /// Alias for [`HashReader::etag`], as raw digest bytes.
    pub fn md5_current(&self) -> Vec<u8> {
        self.state.etag().as_bytes().to_vec()
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

    /// Returns a handle reporting this reader's running ETag.
    ///
    /// The handle outlives moves of the reader into other pipeline stages.
    pub fn tagger(&self) -> TagHandle {
        self.state.tagger()
    }

    /// Reports whether the reader is done, by completion, error or
    /// [`close`](HashReader::close).
    pub fn is_closed(&self) -> bool {
        self.finished
    }

    /// Drops the source and ends the stream. Idempotent.
    ///
    /// No verification happens on close.
    pub fn close(&mut self) {
        self.finished = true;
        self.source = None;
        self.pending = Bytes::new();
    }
}

impl<S: ChunkSource> Iterator for HashReader<S> {
    type Item = Result<Bytes, IntegrityError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            if self.state.limit_reached() {
                return self.finish();
            }

            let Some(source) = self.source.as_mut() else {
                return self.finish();
            };

            match source.next() {
                None => return self.finish(),
                Some(Err(e)) => {
                    self.finished = true;
                    self.source = None;
                    return Some(Err(e));
                }
                Some(Ok(chunk)) if chunk.is_empty() => continue,
                Some(Ok(chunk)) => {
                    let data = self.state.accept(chunk);
                    if self.state.limit_reached() {
                        self.source = None;
                    }
                    return Some(Ok(data));
                }
            }
        }
    }
}

impl<S: ChunkSource> Read for HashReader<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        while self.pending.is_empty() {
            match self.next() {
                None => return Ok(0),
                Some(Err(e)) => return Err(e.into()),
                Some(Ok(chunk)) => self.pending = chunk,
            }
        }

        let n = buf.len().min(self.pending.len());
        buf[..n].copy_from_slice(&self.pending.split_to(n));
        Ok(n)
    }
}

impl<S> Tagger for HashReader<S> {
    fn etag(&self) -> Option<ETag> {
        Some(self.state.etag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    const ABCD_MD5: &str = "e2fc714c4727ee9395f324cd2e7f331f";
    const ABCD_SHA256: &str = "88d4266fd4e6338d13b845fcf289579d209c897823b9217da3e161936f031589";

    /// Yields fixed chunks and counts pulls.
    struct Counted {
        chunks: std::vec::IntoIter<Bytes>,
        pulls: Rc<Cell<usize>>,
        dropped: Rc<Cell<usize>>,
    }

    impl Iterator for Counted {
        type Item = Result<Bytes>;

        fn next(&mut self) -> Option<Self::Item> {
            self.pulls.set(self.pulls.get() + 1);
            self.chunks.next().map(Ok)
        }
    }

    impl Drop for Counted {
        fn drop(&mut self) {
            self.dropped.set(self.dropped.get() + 1);
        }
    }

    fn counted(chunks: &[&'static [u8]]) -> (Counted, Rc<Cell<usize>>, Rc<Cell<usize>>) {
        let pulls = Rc::new(Cell::new(0));
        let dropped = Rc::new(Cell::new(0));
        let source = Counted {
            chunks: chunks
                .iter()
                .map(|c| Bytes::from_static(c))
                .collect::<Vec<_>>()
                .into_iter(),
            pulls: Rc::clone(&pulls),
            dropped: Rc::clone(&dropped),
        };
        (source, pulls, dropped)
    }

    #[test]
    fn test_truncation_stops_pulling() {
        let (source, pulls, dropped) = counted(&[b"abcd-more-stuff", b"never-read"]);
        let mut reader = HashReader::new(source, 4, "", ABCD_SHA256, -1).unwrap();

        assert_eq!(reader.next().unwrap().unwrap(), Bytes::from_static(b"abcd"));
        assert_eq!(pulls.get(), 1);
        assert_eq!(dropped.get(), 1);

        assert!(reader.next().is_none());
        assert!(reader.next().is_none());
        assert_eq!(pulls.get(), 1);
        assert_eq!(reader.bytes_consumed(), 15);
        assert_eq!(reader.bytes_forwarded(), 4);
    }

    #[test]
    fn test_exact_size_does_not_pull_again() {
        let (source, pulls, _) = counted(&[b"ab", b"cd", b"ef"]);
        let mut reader = HashReader::new(source, 4, "", "", -1).unwrap();

        let chunks: Vec<Bytes> = Iterator::by_ref(&mut reader).collect::<Result<_>>().unwrap();
        assert_eq!(chunks.concat(), b"abcd");
        assert_eq!(pulls.get(), 2);
        assert_eq!(reader.etag().to_hex_string(), ABCD_MD5);
    }

    #[test]
    fn test_zero_size_never_pulls() {
        let (source, pulls, dropped) = counted(&[b"abcd"]);
        let mut reader = HashReader::new(source, 0, "", "", -1).unwrap();
        assert!(reader.next().is_none());
        assert_eq!(pulls.get(), 0);
        assert_eq!(dropped.get(), 1);
    }

    #[test]
    fn test_sha256_mismatch_after_last_byte() {
        let bad = "88d4266fd4e6338d13b845fcf289579d209c897823b9217da3e161936f031580";
        let (source, _, _) = counted(&[b"ab", b"cd"]);
        let mut reader = HashReader::new(source, -1, "", bad, -1).unwrap();

        assert_eq!(reader.next().unwrap().unwrap(), Bytes::from_static(b"ab"));
        assert_eq!(reader.next().unwrap().unwrap(), Bytes::from_static(b"cd"));
        match reader.next() {
            Some(Err(IntegrityError::Sha256Mismatch {
                expected,
                calculated,
            })) => {
                assert_eq!(expected, bad);
                assert_eq!(calculated, ABCD_SHA256);
            }
            other => panic!("expected sha256 mismatch, got {other:?}"),
        }
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_upstream_error_passthrough() {
        let source = vec![
            Ok(Bytes::from_static(b"ab")),
            Err(IntegrityError::Io(io::Error::other("boom"))),
            Ok(Bytes::from_static(b"cd")),
        ]
        .into_iter();
        let mut reader = HashReader::new(source, -1, "", ABCD_SHA256, -1).unwrap();

        assert!(reader.next().unwrap().is_ok());
        assert!(matches!(reader.next(), Some(Err(IntegrityError::Io(_)))));
        assert!(reader.next().is_none());
        assert!(reader.is_closed());
    }

    #[test]
    fn test_empty_chunks_are_skipped() {
        let (source, _, _) = counted(&[b"", b"abcd", b""]);
        let reader = HashReader::new(source, -1, "", "", -1).unwrap();
        let chunks: Vec<Bytes> = reader.collect::<Result<_>>().unwrap();
        assert_eq!(chunks, vec![Bytes::from_static(b"abcd")]);
    }

    #[test]
    fn test_close_is_idempotent() {
        let (source, pulls, dropped) = counted(&[b"ab", b"cd"]);
        let mut reader = HashReader::new(source, -1, "", ABCD_SHA256, -1).unwrap();
        reader.next();
        reader.close();
        reader.close();
        assert!(reader.next().is_none());
        assert_eq!(pulls.get(), 1);
        assert_eq!(dropped.get(), 1);
        drop(reader);
        assert_eq!(dropped.get(), 1);
    }

    #[test]
    fn test_close_after_completion() {
        let (source, _, dropped) = counted(&[b"abcd"]);
        let mut reader = HashReader::new(source, -1, "", "", -1).unwrap();
        assert_eq!(Iterator::by_ref(&mut reader).count(), 1);
        reader.close();
        assert_eq!(dropped.get(), 1);
    }

    #[test]
    fn test_merge_rejects_closed_reader() {
        let (source, _, _) = counted(&[b"abcd"]);
        let mut reader = HashReader::new(source, -1, "", "", -1).unwrap();
        reader.close();
        assert!(matches!(
            reader.merge(-1, "", "", -1),
            Err(IntegrityError::InvalidState(_))
        ));
    }

    #[test]
    fn test_io_read_impl() {
        let (source, _, _) = counted(&[b"abcd-more", b"stuff"]);
        let mut reader = HashReader::new(source, 6, "", "", -1).unwrap();

        let mut buf = [0u8; 3];
        assert_eq!(reader.read(&mut buf).unwrap(), 3);
        assert_eq!(&buf, b"abc");

        let mut rest = Vec::new();
        reader.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, b"d-m");
    }

    #[test]
    fn test_io_read_surfaces_mismatch() {
        let (source, _, _) = counted(&[b"abce"]);
        let mut reader = HashReader::new(source, -1, "", ABCD_SHA256, -1).unwrap();
        let mut out = Vec::new();
        let err = reader.read_to_end(&mut out).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert_eq!(out, b"abce");
    }

    #[test]
    fn test_etag_snapshot_changes_with_progress() {
        let (source, _, _) = counted(&[b"ab", b"cd"]);
        let mut reader = HashReader::new(source, -1, ABCD_MD5, "", -1).unwrap();

        let before = reader.etag();
        reader.next();
        let middle = reader.etag();
        reader.next();
        let after = reader.etag();

        assert_ne!(before, middle);
        assert_ne!(middle, after);
        assert_eq!(after.to_hex_string(), ABCD_MD5);
        assert_eq!(reader.md5_current(), after.as_bytes());
        assert_eq!(reader.md5_hex(), ABCD_MD5);
        assert_eq!(Tagger::etag(&reader), Some(after));
    }
}
