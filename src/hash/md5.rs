//! MD5 digest context.

use ::md5::{Digest, Md5};

/// A hasher that computes MD5 digests.
#[derive(Debug, Clone, Default)]
pub struct Md5Hasher {
    state: Md5,
}

impl Md5Hasher {
    /// The size of an MD5 digest in bytes.
    pub const SIZE: usize = 16;

    /// Creates a new hasher.
    pub fn new() -> Self {
        Self { state: Md5::new() }
    }

    /// Updates the hasher with more data.
    pub fn update(&mut self, data: &[u8]) {
        self.state.update(data);
    }

    /// Returns the digest of everything hashed so far.
    pub fn finalize(&self) -> [u8; 16] {
        let mut out = [0u8; 16];
        out.copy_from_slice(&self.state.clone().finalize());
        out
    }

    /// Convenience method to hash data in one shot.
    pub fn hash(data: &[u8]) -> [u8; 16] {
        let mut out = [0u8; 16];
        out.copy_from_slice(&Md5::digest(data));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash() {
        assert_eq!(
            hex::encode(Md5Hasher::hash(b"")),
            "d41d8cd98f00b204e9800998ecf8427e"
        );
        assert_eq!(
            hex::encode(Md5Hasher::hash(b"abcd")),
            "e2fc714c4727ee9395f324cd2e7f331f"
        );
    }

    #[test]
    fn test_incremental_hashing() {
        let mut hasher = Md5Hasher::new();
        hasher.update(b"ab");
        hasher.update(b"cd");
        assert_eq!(hasher.finalize(), Md5Hasher::hash(b"abcd"));
    }

    #[test]
    fn test_snapshot_keeps_running_state() {
        let mut hasher = Md5Hasher::new();
        hasher.update(b"ab");
        let partial = hasher.finalize();
        assert_eq!(partial, Md5Hasher::hash(b"ab"));

        hasher.update(b"cd");
        assert_eq!(hasher.finalize(), Md5Hasher::hash(b"abcd"));
    }
}
