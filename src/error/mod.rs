//! Error types for etagrs.
//!
//! Every failure carries the conflicting values so callers can report them
//! without re-deriving anything. Construction-time failures are returned by
//! the reader factories; stream-time failures are yielded as the last item
//! of the chunk sequence.

use std::io;

use crate::etag::ETag;

/// Errors produced while parsing tags or verifying streamed content.
#[derive(Debug, thiserror::Error)]
pub enum IntegrityError {
    /// An I/O error from the upstream source, passed through unchanged.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Malformed encoded input: bad hex, bad base64 or a bad part number.
    #[error("malformed input: {0}")]
    Format(String),

    /// The MD5 reference conflicts with another MD5 value.
    #[error("bad digest: expected {expected} does not match calculated {calculated}")]
    BadDigest {
        /// The MD5 already fixed as reference (hex).
        expected: String,
        /// The conflicting MD5 (hex).
        calculated: String,
    },

    /// The SHA-256 reference conflicts with another value or with the content.
    #[error("bad sha256: expected {expected} does not match calculated {calculated}")]
    Sha256Mismatch {
        /// The SHA-256 reference (hex).
        expected: String,
        /// The conflicting or computed SHA-256 (hex).
        calculated: String,
    },

    /// Two declared sizes disagree.
    #[error("size mismatch: got {got}, want {want}")]
    SizeMismatch {
        /// The size already declared on the reader.
        want: i64,
        /// The size supplied by the caller.
        got: i64,
    },

    /// A required `ETag` header is absent.
    #[error("etag: HTTP header does not contain an ETag")]
    MissingHeader,

    /// The operation is not valid for the reader in its current state.
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    /// Invalid configuration parameter.
    #[error("invalid config: {message}")]
    InvalidConfig {
        /// Description of what was invalid.
        message: &'static str,
    },

    /// The MD5 of the content does not match the expected ETag.
    #[error("etag: expected ETag \"{expected}\" does not match computed ETag \"{computed}\"")]
    VerifyMismatch {
        /// The ETag the content was expected to have.
        expected: ETag,
        /// The ETag computed over the content.
        computed: ETag,
    },
}

/// Result alias used throughout the crate.
pub type Result<T, E = IntegrityError> = std::result::Result<T, E>;

impl IntegrityError {
    pub(crate) fn format(message: impl Into<String>) -> Self {
        IntegrityError::Format(message.into())
    }
}

impl From<IntegrityError> for io::Error {
    fn from(e: IntegrityError) -> Self {
        match e {
            IntegrityError::Io(e) => e,
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}
