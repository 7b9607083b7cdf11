//! Digest and size bookkeeping shared by the sync and async readers.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use parking_lot::Mutex;

use crate::error::{IntegrityError, Result};
use crate::etag::{ETag, TagHandle};
use crate::hash::{Md5Hasher, Sha256Hasher};

/// Reference digests parsed from caller-supplied hex strings.
///
/// An empty string means "no reference".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct References {
    md5: Option<ETag>,
    sha256: Option<Bytes>,
}

impl References {
    pub(crate) fn parse(md5_hex: &str, sha256_hex: &str) -> Result<Self> {
        let md5 = decode_reference(md5_hex, "md5")?.map(ETag::from_raw_bytes);
        let sha256 = decode_reference(sha256_hex, "sha256")?;
        Ok(Self { md5, sha256 })
    }
}

/// Decodes a reference digest, requiring the input to be the canonical
/// lowercase encoding of the decoded bytes.
fn decode_reference(s: &str, what: &str) -> Result<Option<Bytes>> {
    if s.is_empty() {
        return Ok(None);
    }
    match hex::decode(s) {
        Ok(bytes) if hex::encode(&bytes) == s => Ok(Some(Bytes::from(bytes))),
        _ => Err(IntegrityError::format(format!(
            "invalid {what} digest {s:?}: not a lowercase hex string"
        ))),
    }
}

/// Normalizes any negative size to `-1` (unknown).
fn normalize_size(size: i64) -> i64 {
    size.max(-1)
}

/// Running state of one hashing reader.
///
/// Tracks how much was pulled and forwarded, owns the digest contexts and
/// holds the reference values fixed at construction or merge time.
#[derive(Debug)]
pub(crate) struct Verifier {
    consumed: u64,
    forwarded: u64,
    size: i64,
    actual_size: i64,
    refs: References,
    md5: Arc<Mutex<Md5Hasher>>,
    sha256: Option<Sha256Hasher>,
}

impl Verifier {
    pub(crate) fn new(refs: References, size: i64, actual_size: i64) -> Self {
        let sha256 = refs.sha256.as_ref().map(|_| Sha256Hasher::new());
        Self {
            consumed: 0,
            forwarded: 0,
            size: normalize_size(size),
            actual_size: normalize_size(actual_size),
            refs,
            md5: Arc::new(Mutex::new(Md5Hasher::new())),
            sha256,
        }
    }

    /// Folds another set of expectations into this state.
    ///
    /// Every check runs before any field is written, so a failed merge
    /// leaves the state as it was.
    pub(crate) fn merge(&mut self, refs: References, size: i64, actual_size: i64) -> Result<()> {
        let size = normalize_size(size);
        let actual_size = normalize_size(actual_size);

        if self.consumed > 0 {
            return Err(IntegrityError::InvalidState(
                "hash: already read from hash reader",
            ));
        }

        if let (Some(have), Some(want)) = (&self.refs.md5, &refs.md5) {
            if have != want {
                return Err(IntegrityError::BadDigest {
                    expected: have.to_hex_string(),
                    calculated: want.to_hex_string(),
                });
            }
        }

        if let (Some(have), Some(want)) = (&self.refs.sha256, &refs.sha256) {
            if have != want {
                return Err(IntegrityError::Sha256Mismatch {
                    expected: hex::encode(have),
                    calculated: hex::encode(want),
                });
            }
        }

        if self.size >= 0 && size >= 0 && self.size != size {
            return Err(IntegrityError::SizeMismatch {
                want: self.size,
                got: size,
            });
        }

        if self.refs.md5.is_none() {
            self.refs.md5 = refs.md5;
        }
        if self.refs.sha256.is_none() && refs.sha256.is_some() {
            self.refs.sha256 = refs.sha256;
            self.sha256 = Some(Sha256Hasher::new());
        }
        if self.size < 0 {
            self.size = size;
        }
        if self.actual_size < 0 {
            self.actual_size = actual_size;
        }

        tracing::debug!(
            size = self.size,
            actual_size = self.actual_size,
            md5 = self.refs.md5.is_some(),
            sha256 = self.refs.sha256.is_some(),
            "merged expectations into existing hash reader"
        );
        Ok(())
    }

    /// Reports whether the declared size has been forwarded in full.
    pub(crate) fn limit_reached(&self) -> bool {
        self.size >= 0 && self.forwarded >= self.size as u64
    }

    /// Hashes and forwards a chunk, cutting it at the declared size.
    pub(crate) fn accept(&mut self, mut chunk: Bytes) -> Bytes {
        self.consumed += chunk.len() as u64;

        if self.size >= 0 {
            let remaining = (self.size as u64).saturating_sub(self.forwarded);
            if chunk.len() as u64 > remaining {
                chunk.truncate(remaining as usize);
                tracing::debug!(
                    size = self.size,
                    consumed = self.consumed,
                    "declared size reached, closing source"
                );
            }
        }

        self.md5.lock().update(&chunk);
        if let Some(sha256) = self.sha256.as_mut() {
            sha256.update(&chunk);
        }
        self.forwarded += chunk.len() as u64;
        tracing::trace!(len = chunk.len(), forwarded = self.forwarded, "forwarding chunk");
        chunk
    }

    /// Checks the computed SHA-256 against the reference, if there is one.
    ///
    /// The MD5 reference is not compared; callers check `etag()` themselves.
    pub(crate) fn verify(&self) -> Result<()> {
        if self.size >= 0 && self.forwarded < self.size as u64 {
            tracing::debug!(
                size = self.size,
                forwarded = self.forwarded,
                "source ended before the declared size"
            );
        }

        let (Some(expected), Some(sha256)) = (&self.refs.sha256, &self.sha256) else {
            return Ok(());
        };
        let sum = sha256.finalize();
        if expected[..] != sum[..] {
            let err = IntegrityError::Sha256Mismatch {
                expected: hex::encode(expected),
                calculated: hex::encode(sum),
            };
            tracing::debug!(error = %err, "content sha256 verification failed");
            return Err(err);
        }
        Ok(())
    }

    pub(crate) fn consumed(&self) -> u64 {
        self.consumed
    }

    pub(crate) fn forwarded(&self) -> u64 {
        self.forwarded
    }

    pub(crate) fn size(&self) -> i64 {
        self.size
    }

    pub(crate) fn actual_size(&self) -> i64 {
        self.actual_size
    }

    pub(crate) fn etag(&self) -> ETag {
        ETag::from_md5(self.md5.lock().finalize())
    }

    pub(crate) fn tagger(&self) -> TagHandle {
        TagHandle::new(Arc::clone(&self.md5))
    }

    pub(crate) fn sha256_current(&self) -> Option<[u8; 32]> {
        self.sha256.as_ref().map(Sha256Hasher::finalize)
    }

    pub(crate) fn md5_ref(&self) -> &[u8] {
        self.refs.md5.as_ref().map(ETag::as_bytes).unwrap_or_default()
    }

    pub(crate) fn sha256_ref(&self) -> &[u8] {
        self.refs.sha256.as_deref().unwrap_or_default()
    }

    pub(crate) fn md5_hex(&self) -> String {
        hex::encode(self.md5_ref())
    }

    pub(crate) fn md5_base64(&self) -> String {
        STANDARD.encode(self.md5_ref())
    }

    pub(crate) fn sha256_hex(&self) -> String {
        hex::encode(self.sha256_ref())
    }
}
