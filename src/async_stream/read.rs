//! Chunk stream over an async reader.

use std::io::ErrorKind;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_core::{Stream, ready};
use futures_io::AsyncRead;
use pin_project_lite::pin_project;

use crate::config::SourceConfig;
use crate::error::IntegrityError;

pin_project! {
    /// A stream that yields chunks read from a [`futures_io::AsyncRead`].
    ///
    /// Each chunk holds whatever a single successful `poll_read` returned.
    /// Interrupted reads are retried.
    ///
    /// For tokio readers, convert with `tokio_util::compat`:
    ///
    /// ```ignore
    /// use tokio_util::compat::TokioAsyncReadCompatExt;
    /// use etagrs::ReadStream;
    ///
    /// let file = tokio::fs::File::open("object.bin").await?;
    /// let source = ReadStream::new(file.compat());
    /// ```
    #[derive(Debug)]
    pub struct ReadStream<R> {
        #[pin]
        reader: R,
        buffer: Vec<u8>,
        finished: bool,
    }
}

impl<R: AsyncRead> ReadStream<R> {
    /// Creates a stream with the default configuration.
    pub fn new(reader: R) -> Self {
        Self::with_config(reader, SourceConfig::default())
    }

    /// Creates a stream with the given configuration.
    pub fn with_config(reader: R, config: SourceConfig) -> Self {
        Self {
            reader,
            buffer: vec![0u8; config.buffer_size().max(1)],
            finished: false,
        }
    }

    /// Consumes the stream and returns the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: AsyncRead> Stream for ReadStream<R> {
    type Item = Result<Bytes, IntegrityError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        if *this.finished {
            return Poll::Ready(None);
        }

        loop {
            match ready!(this.reader.as_mut().poll_read(cx, &mut this.buffer[..])) {
                Ok(0) => {
                    *this.finished = true;
                    return Poll::Ready(None);
                }
                Ok(n) => return Poll::Ready(Some(Ok(Bytes::copy_from_slice(&this.buffer[..n])))),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    *this.finished = true;
                    return Poll::Ready(Some(Err(IntegrityError::Io(e))));
                }
            }
        }
    }
}
