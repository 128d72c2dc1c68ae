use std::io::{ErrorKind, Read};

use bytes::BytesMut;

use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 4 * 1024;
const READ_CHUNK_SIZE: usize = 1024;

/// Yields complete lines from any `Read` stream with a poll timeout.
///
/// Partial lines are buffered internally across polls, so callers only ever
/// see whole lines. The underlying stream is expected to fail reads with
/// `TimedOut`/`WouldBlock` when its poll interval elapses; that surfaces
/// here as `Ok(None)` rather than an error.
pub struct LineReader<R> {
    inner: R,
    buf: BytesMut,
}

impl<R: Read> LineReader<R> {
    /// Wrap a stream.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
        }
    }

    /// Read until one complete line is buffered or the poll interval elapses.
    ///
    /// Returns `Ok(Some(line))` with trailing whitespace trimmed,
    /// `Ok(None)` when the interval passed without completing a line, and
    /// `Err(FrameError::Disconnected)` at end of stream.
    pub fn poll_line(&mut self) -> Result<Option<String>> {
        loop {
            if let Some(line) = self.take_line() {
                tracing::trace!(len = line.len(), "completed serial line");
                return Ok(Some(line));
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::TimedOut => return Ok(None),
                Err(err) if err.kind() == ErrorKind::WouldBlock => return Ok(None),
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                return Err(FrameError::Disconnected);
            }

            self.buf.extend_from_slice(&chunk[..read]);
        }
    }

    /// Split the first buffered line off, if a newline has arrived.
    fn take_line(&mut self) -> Option<String> {
        let pos = self.buf.iter().position(|&b| b == b'\n')?;
        let raw = self.buf.split_to(pos + 1);
        // Serial consoles emit CRLF and occasionally boot-time noise bytes;
        // decode lossily and trim the line ending here.
        let line = String::from_utf8_lossy(&raw[..pos]).trim_end().to_string();
        Some(line)
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> R {
        self.inner
    }
}
