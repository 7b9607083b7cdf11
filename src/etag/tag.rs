//! The ETag value type.

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{IntegrityError, Result};
use crate::hash::Md5Hasher;

/// Highest part number accepted by a strict parse.
pub const MAX_PARTS: u32 = 10_000;

/// An immutable content checksum tag.
///
/// An ETag is an opaque byte string with one of three shapes:
///
/// - single part: exactly 16 bytes, the MD5 of the content
/// - multipart: a 16-byte MD5 followed by an ASCII `-<parts>` suffix
/// - encrypted: any other byte string without a `-`, passed through as-is
///
/// Equality is byte-for-byte.
///
/// # Example
///
/// ```
/// use etagrs::ETag;
///
/// let tag = ETag::parse("\"d41d8cd98f00b204e9800998ecf8427e-5\"", true)?;
/// assert!(tag.is_multipart());
/// assert_eq!(tag.part_count()?, 5);
/// assert_eq!(tag.to_string(), "d41d8cd98f00b204e9800998ecf8427e-5");
/// # Ok::<(), etagrs::IntegrityError>(())
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ETag(Bytes);

impl ETag {
    /// Creates an ETag from raw bytes without any validation.
    ///
    /// Only use this with bytes that are known to be a tag, e.g. an MD5
    /// digest just computed.
    pub fn from_raw_bytes(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    /// Creates a single part ETag from an MD5 digest.
    pub fn from_md5(digest: [u8; 16]) -> Self {
        Self(Bytes::copy_from_slice(&digest))
    }

    /// Returns the raw tag bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the number of raw tag bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the tag holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the hex representation, keeping a multipart suffix readable.
    pub fn to_hex_string(&self) -> String {
        if self.is_multipart() {
            let (digest, suffix) = self.0.split_at(Md5Hasher::SIZE);
            let mut s = hex::encode(digest);
            s.push_str(&String::from_utf8_lossy(suffix));
            s
        } else {
            hex::encode(&self.0)
        }
    }

    /// Returns the quoted form used in HTTP headers.
    pub fn to_header_value(&self) -> String {
        format!("\"{}\"", self.to_hex_string())
    }

    /// Returns the base64 form used in `Content-MD5`.
    ///
    /// Fails for anything other than a single part tag.
    pub fn to_content_md5(&self) -> Result<String> {
        if self.0.len() != Md5Hasher::SIZE {
            return Err(IntegrityError::format(format!(
                "content-md5 requires a 16 byte tag, got {}",
                self.0.len()
            )));
        }
        Ok(STANDARD.encode(&self.0))
    }

    /// Reports whether the tag is opaque (e.g. produced by encryption).
    pub fn is_encrypted(&self) -> bool {
        self.0.len() > Md5Hasher::SIZE && !self.0.contains(&b'-')
    }

    /// Reports whether the tag carries a `-<parts>` multipart suffix.
    pub fn is_multipart(&self) -> bool {
        self.0.len() > Md5Hasher::SIZE && self.0.contains(&b'-')
    }

    /// Returns the number of parts referenced by this tag.
    ///
    /// Single part and encrypted tags count as one part.
    pub fn part_count(&self) -> Result<u32> {
        if !self.is_multipart() {
            return Ok(1);
        }

        let suffix = &self.0[Md5Hasher::SIZE..];
        let dash = suffix
            .iter()
            .position(|&b| b == b'-')
            .ok_or_else(|| IntegrityError::format("etag: missing part number"))?;

        std::str::from_utf8(&suffix[dash + 1..])
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .ok_or_else(|| {
                IntegrityError::format(format!(
                    "etag: invalid part number {:?}",
                    String::from_utf8_lossy(&suffix[dash + 1..])
                ))
            })
    }

    /// Parses an ETag from its textual form.
    ///
    /// Surrounding double quotes are stripped. In strict mode only tags
    /// shaped as `<32 hex>` or `<32 hex>-<1..=10000>` are accepted; otherwise
    /// any even-length hex string without a `-` is accepted as an opaque tag.
    pub fn parse(s: &str, strict: bool) -> Result<Self> {
        let s = s
            .strip_prefix('"')
            .and_then(|rest| rest.strip_suffix('"'))
            .unwrap_or(s);

        let Some(dash) = s.find('-') else {
            let bytes = decode_hex(s)?;
            if strict && bytes.len() != Md5Hasher::SIZE {
                return Err(IntegrityError::format(format!(
                    "etag: invalid length {}",
                    bytes.len()
                )));
            }
            return Ok(Self(Bytes::from(bytes)));
        };

        let (prefix, suffix) = s.split_at(dash);
        if prefix.len() != 2 * Md5Hasher::SIZE {
            return Err(IntegrityError::format(format!(
                "etag: invalid prefix length {}",
                prefix.len()
            )));
        }
        if suffix.len() <= 1 {
            return Err(IntegrityError::format("etag: missing part number"));
        }

        let digest = decode_hex(prefix)?;
        if strict {
            let parts = suffix[1..].parse::<u32>().unwrap_or(0);
            if parts == 0 || parts > MAX_PARTS {
                return Err(IntegrityError::format(format!(
                    "etag: invalid part number {}",
                    &suffix[1..]
                )));
            }
        }

        let mut buf = BytesMut::with_capacity(digest.len() + suffix.len());
        buf.put_slice(&digest);
        buf.put_slice(suffix.as_bytes());
        Ok(Self(buf.freeze()))
    }

    /// Computes a multipart ETag from the ETags of the individual parts.
    ///
    /// Multipart and encrypted entries are skipped. The result is the MD5 of
    /// the concatenated remaining tags followed by `-<n>`, where `n` counts
    /// the entries actually hashed. Returns `None` if nothing was hashed.
    pub fn multipart<'a>(tags: impl IntoIterator<Item = &'a ETag>) -> Option<Self> {
        let mut hasher = Md5Hasher::new();
        let mut n = 0usize;
        for tag in tags {
            if tag.is_multipart() || tag.is_encrypted() {
                continue;
            }
            hasher.update(tag.as_bytes());
            n += 1;
        }
        if n == 0 {
            return None;
        }

        let suffix = format!("-{n}");
        let mut buf = BytesMut::with_capacity(Md5Hasher::SIZE + suffix.len());
        buf.put_slice(&hasher.finalize());
        buf.put_slice(suffix.as_bytes());
        Some(Self(buf.freeze()))
    }
}

fn decode_hex(s: &str) -> Result<Vec<u8>> {
    hex::decode(s).map_err(|e| IntegrityError::format(format!("etag: invalid hex {s:?}: {e}")))
}

impl AsRef<[u8]> for ETag {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for ETag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex_string())
    }
}

impl fmt::Debug for ETag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ETag").field(&self.to_hex_string()).finish()
    }
}

impl FromStr for ETag {
    type Err = IntegrityError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s, false)
    }
}
