//! Incremental digest contexts used by the readers.
//!
//! - [`Md5Hasher`] - MD5, the ETag checksum
//! - [`Sha256Hasher`] - SHA-256, the transport integrity checksum
//!
//! Both contexts are owned by exactly one reader, are created fresh per
//! reader and are never reset. `finalize` takes `&self` so a snapshot of the
//! digest can be taken at any point without disturbing the running state.

mod md5;
mod sha256;

pub use self::md5::Md5Hasher;
pub use self::sha256::Sha256Hasher;
