//! Configuration for reading byte sources.
//!
//! - [`SourceConfig`] - How many bytes an adapter pulls per chunk
//!
//! # Example
//!
//! ```
//! use etagrs::SourceConfig;
//!
//! let config = SourceConfig::new(64 * 1024)?;
//! assert_eq!(config.buffer_size(), 65536);
//!
//! assert!(SourceConfig::new(0).is_err());
//! # Ok::<(), etagrs::IntegrityError>(())
//! ```

use crate::error::IntegrityError;

/// Default read buffer size (8 KiB).
pub const DEFAULT_BUFFER_SIZE: usize = 8 * 1024;

/// Smallest accepted read buffer size.
pub const MIN_BUFFER_SIZE: usize = 1;

/// Largest accepted read buffer size (16 MiB).
pub const MAX_BUFFER_SIZE: usize = 16 * 1024 * 1024;

/// Configuration for the `Read`/`AsyncRead` chunk source adapters.
///
/// Each chunk handed to a reader is at most `buffer_size` bytes long.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceConfig {
    buffer_size: usize,
}

impl SourceConfig {
    /// Creates a new configuration.
    ///
    /// Returns error if `buffer_size` is outside
    /// `MIN_BUFFER_SIZE..=MAX_BUFFER_SIZE`.
    pub fn new(buffer_size: usize) -> Result<Self, IntegrityError> {
        if buffer_size < MIN_BUFFER_SIZE {
            return Err(IntegrityError::InvalidConfig {
                message: "buffer_size must be non-zero",
            });
        }

        if buffer_size > MAX_BUFFER_SIZE {
            return Err(IntegrityError::InvalidConfig {
                message: "buffer_size cannot be greater than 16 MiB",
            });
        }

        Ok(Self { buffer_size })
    }

    /// Sets the read buffer size.
    ///
    /// Note: This does not validate the configuration. Use
    /// [`SourceConfig::validate`] to check it.
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Returns the read buffer size.
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Validates the current configuration.
    pub fn validate(&self) -> Result<(), IntegrityError> {
        Self::new(self.buffer_size).map(|_| ())
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}
