//! ETag and Content-MD5 helpers for HTTP headers.
//!
//! [`http::HeaderMap`] compares names case-insensitively, so `ETag`, `Etag`
//! and `etag` all address the same entry.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use http::header::ETAG;
use http::{HeaderMap, HeaderValue};

use super::ETag;
use crate::error::{IntegrityError, Result};
use crate::hash::Md5Hasher;

impl ETag {
    /// Decodes the `Content-MD5` header, if present.
    ///
    /// A missing header is not an error and yields `Ok(None)`.
    pub fn from_content_md5(headers: &HeaderMap) -> Result<Option<Self>> {
        let Some(value) = headers.get("content-md5") else {
            return Ok(None);
        };
        if value.is_empty() {
            return Err(IntegrityError::format(
                "etag: content-md5 is set but contains no value",
            ));
        }

        let digest = STANDARD
            .decode(value.as_bytes())
            .map_err(|e| IntegrityError::format(format!("etag: invalid content-md5: {e}")))?;
        if digest.len() != Md5Hasher::SIZE {
            return Err(IntegrityError::format(format!(
                "etag: invalid content-md5 length {}",
                digest.len()
            )));
        }
        Ok(Some(Self::from_raw_bytes(digest)))
    }

    /// Writes the quoted tag as the `ETag` header, replacing any existing
    /// entry.
    pub fn set_header(&self, headers: &mut HeaderMap) -> Result<()> {
        let value = HeaderValue::from_str(&self.to_header_value())
            .map_err(|e| IntegrityError::format(format!("etag: invalid header value: {e}")))?;
        headers.insert(ETAG, value);
        Ok(())
    }

    /// Extracts and parses the `ETag` header.
    ///
    /// Fails with [`IntegrityError::MissingHeader`] if there is none. Callers
    /// talking to S3 compatible peers want `strict = true`.
    pub fn from_headers(headers: &HeaderMap, strict: bool) -> Result<Self> {
        let value = headers.get(ETAG).ok_or(IntegrityError::MissingHeader)?;
        let value = value
            .to_str()
            .map_err(|e| IntegrityError::format(format!("etag: invalid header value: {e}")))?;
        Self::parse(value, strict)
    }
}
