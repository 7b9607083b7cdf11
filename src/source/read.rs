//! Chunk source over a blocking reader.

use std::io::{ErrorKind, Read};

use bytes::{Bytes, BytesMut};

use crate::config::SourceConfig;
use crate::error::IntegrityError;

/// An iterator that yields chunks read from a [`std::io::Read`].
///
/// Each chunk holds whatever a single successful `read` call returned, so
/// it is at most `buffer_size` bytes long. Interrupted reads are retried.
///
/// # Example
///
/// ```
/// use etagrs::{ReadSource, SourceConfig};
///
/// let config = SourceConfig::new(4)?;
/// let chunks: Vec<_> = ReadSource::with_config(&b"hello world"[..], config)
///     .collect::<Result<_, _>>()?;
/// assert_eq!(chunks.len(), 3);
/// # Ok::<(), etagrs::IntegrityError>(())
/// ```
#[derive(Debug)]
pub struct ReadSource<R> {
    reader: R,
    buffer_size: usize,
    finished: bool,
}

impl<R: Read> ReadSource<R> {
    /// Creates a source with the default configuration.
    pub fn new(reader: R) -> Self {
        Self::with_config(reader, SourceConfig::default())
    }

    /// Creates a source with the given configuration.
    pub fn with_config(reader: R, config: SourceConfig) -> Self {
        Self {
            reader,
            buffer_size: config.buffer_size().max(1),
            finished: false,
        }
    }

    /// Consumes the source and returns the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> Iterator for ReadSource<R> {
    type Item = Result<Bytes, IntegrityError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let mut buf = BytesMut::zeroed(self.buffer_size);
        loop {
            match self.reader.read(&mut buf) {
                Ok(0) => {
                    self.finished = true;
                    return None;
                }
                Ok(n) => {
                    buf.truncate(n);
                    return Some(Ok(buf.freeze()));
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e.into()));
                }
            }
        }
    }
}
