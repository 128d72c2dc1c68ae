use std::io::{ErrorKind, Write};

use crate::codec::ResponseFrame;
use crate::error::{FrameError, Result};

/// Writes encoded replies to any `Write` stream.
pub struct ReplyWriter<W> {
    inner: W,
}

impl<W: Write> ReplyWriter<W> {
    /// Wrap a stream.
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Encode one reply and write it completely, flushing before returning.
    pub fn write_reply(&mut self, reply: &ResponseFrame) -> Result<()> {
        let wire = reply.encode()?;
        self.write_all(&wire)?;
        self.flush()
    }

    // A timed-out write means the UART buffer is full while the display
    // drains it at line rate; the write is retried until it completes. Only
    // a real I/O failure ends the session.
    fn write_all(&mut self, wire: &[u8]) -> Result<()> {
        let mut offset = 0usize;
        while offset < wire.len() {
            match self.inner.write(&wire[offset..]) {
                Ok(0) => return Err(FrameError::Disconnected),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::TimedOut => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
        Ok(())
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::TimedOut => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use bytes::Bytes;

    use super::*;
    use crate::codec::{ResponseFrame, ResponseMode, FAILURE_SENTINEL};

    #[test]
    fn write_text_reply() {
        let mut writer = ReplyWriter::new(Vec::new());
        let reply = ResponseFrame::Text {
            status: 200,
            body: "ready".to_string(),
        };

        writer.write_reply(&reply).unwrap();

        assert_eq!(writer.into_inner(), b"200 ready\n");
    }

    #[test]
    fn write_binary_reply() {
        let mut writer = ReplyWriter::new(Vec::new());
        let reply = ResponseFrame::Binary {
            status: 200,
            body: Bytes::from_static(b"abc"),
        };

        writer.write_reply(&reply).unwrap();

        assert_eq!(writer.into_inner(), b"00000003abc");
    }

    #[test]
    fn write_failure_sentinel() {
        let mut writer = ReplyWriter::new(Vec::new());
        let reply = ResponseFrame::request_failed(ResponseMode::Binary);

        writer.write_reply(&reply).unwrap();

        let wire = writer.into_inner();
        assert_eq!(wire, FAILURE_SENTINEL);
        assert_eq!(wire.len(), 8);
    }

    #[test]
    fn flush_propagates() {
        let sink = FlushTrackingWriter::default();
        let flag = Arc::clone(&sink.flushed);
        let mut writer = ReplyWriter::new(sink);

        writer
            .write_reply(&ResponseFrame::Text {
                status: 200,
                body: "x".to_string(),
            })
            .unwrap();

        assert!(flag.load(Ordering::SeqCst));
    }

    #[test]
    fn handles_interrupted_write_and_flush() {
        let sink = InterruptedWriteThenFlush {
            wrote_once: false,
            flush_interrupted: false,
            data: Vec::new(),
        };
        let mut writer = ReplyWriter::new(sink);

        writer
            .write_reply(&ResponseFrame::Text {
                status: 200,
                body: "retry".to_string(),
            })
            .unwrap();

        assert_eq!(writer.into_inner().data, b"200 retry\n");
    }

    #[test]
    fn timed_out_write_retries_until_the_buffer_drains() {
        let sink = TimedOutThenAccept {
            rejections_left: 3,
            data: Vec::new(),
        };
        let mut writer = ReplyWriter::new(sink);

        writer
            .write_reply(&ResponseFrame::Text {
                status: 200,
                body: "slow".to_string(),
            })
            .unwrap();

        assert_eq!(writer.into_inner().data, b"200 slow\n");
    }

    #[test]
    fn disconnected_when_write_returns_zero() {
        let mut writer = ReplyWriter::new(ZeroWriter);
        let err = writer
            .write_reply(&ResponseFrame::Text {
                status: 200,
                body: "x".to_string(),
            })
            .unwrap_err();
        assert!(matches!(err, FrameError::Disconnected));
    }

    #[test]
    fn short_writes_complete() {
        let sink = OneBytePerWrite { data: Vec::new() };
        let mut writer = ReplyWriter::new(sink);

        writer
            .write_reply(&ResponseFrame::Text {
                status: 404,
                body: "Not Found".to_string(),
            })
            .unwrap();

        assert_eq!(writer.into_inner().data, b"404 Not Found\n");
    }

    #[derive(Default)]
    struct FlushTrackingWriter {
        flushed: Arc<AtomicBool>,
        data: Vec<u8>,
    }

    impl Write for FlushTrackingWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.flushed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    struct InterruptedWriteThenFlush {
        wrote_once: bool,
        flush_interrupted: bool,
        data: Vec<u8>,
    }

    impl Write for InterruptedWriteThenFlush {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if !self.wrote_once {
                self.wrote_once = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            if !self.flush_interrupted {
                self.flush_interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            Ok(())
        }
    }

    struct TimedOutThenAccept {
        rejections_left: u32,
        data: Vec<u8>,
    }

    impl Write for TimedOutThenAccept {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if self.rejections_left > 0 {
                self.rejections_left -= 1;
                return Err(std::io::Error::from(ErrorKind::TimedOut));
            }
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct ZeroWriter;

    impl Write for ZeroWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct OneBytePerWrite {
        data: Vec<u8>,
    }

    impl Write for OneBytePerWrite {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if buf.is_empty() {
                return Ok(0);
            }
            self.data.push(buf[0]);
            Ok(1)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
