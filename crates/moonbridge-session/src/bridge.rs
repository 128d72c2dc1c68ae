use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use moonbridge_frame::codec::{
    decode_line, sanitize_body, Inbound, RequestFrame, ResponseFrame, FAILURE_SENTINEL,
};
use moonbridge_frame::reader::LineReader;
use moonbridge_frame::writer::ReplyWriter;
use moonbridge_host::client::HttpExchange;
use moonbridge_host::dispatch::{dispatch, DispatchOutcome};
use moonbridge_host::target::HostTarget;
use tracing::{info, warn};

use crate::error::Result;

/// Longest reply line echoed to the console before truncation.
pub const PREVIEW_LIMIT: usize = 50;

/// Outcome of one poll of the serial link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    /// No complete line arrived within the poll timeout.
    Idle,
    /// One inbound line was consumed, frame or chatter.
    HandledLine,
}

/// One live serial session: read lines, forward frames, write replies.
///
/// Owns the reader/writer pair of an open port plus the resolved host
/// target. Any serial I/O failure is terminal for the session; the
/// supervisor rediscovers and rebuilds instead of patching a live one.
pub struct Bridge<R, W, C> {
    reader: LineReader<R>,
    writer: ReplyWriter<W>,
    client: C,
    target: HostTarget,
}

impl<R: Read, W: Write, C: HttpExchange> Bridge<R, W, C> {
    pub fn new(reader: R, writer: W, client: C, target: HostTarget) -> Self {
        Self {
            reader: LineReader::new(reader),
            writer: ReplyWriter::new(writer),
            client,
            target,
        }
    }

    /// Poll for one line and handle it end to end.
    ///
    /// Returns [`Activity::Idle`] when the poll timeout lapses without a
    /// complete line; that is the caller's chance to observe its run flag.
    pub fn poll_once(&mut self) -> Result<Activity> {
        let line = match self.reader.poll_line()? {
            Some(line) => line,
            None => return Ok(Activity::Idle),
        };
        self.handle_line(&line)?;
        Ok(Activity::HandledLine)
    }

    /// Drive the session until the run flag clears or the link fails.
    pub fn run(&mut self, running: &AtomicBool) -> Result<()> {
        while running.load(Ordering::SeqCst) {
            self.poll_once()?;
        }
        Ok(())
    }

    fn handle_line(&mut self, line: &str) -> Result<()> {
        match decode_line(line) {
            Ok(Inbound::Log(chatter)) => {
                info!("[LOG] {chatter}");
                Ok(())
            }
            Ok(Inbound::Request(frame)) => {
                info!(">>> {line}");
                self.handle_frame(&frame)
            }
            Err(err) => {
                // The reply-suppression flag lives on a parsed frame; a line
                // that failed to parse carries none, so the 400 is written.
                info!(">>> {line}");
                warn!(error = %err, "malformed request line");
                self.send_reply(&ResponseFrame::malformed(&err), false)
            }
        }
    }

    fn handle_frame(&mut self, frame: &RequestFrame) -> Result<()> {
        match dispatch(&self.client, &self.target, frame) {
            DispatchOutcome::Reply(reply) => self.send_reply(&reply, frame.ignores_reply()),
            DispatchOutcome::Dropped(_) => {
                info!("Request timed out.");
                Ok(())
            }
        }
    }

    /// Write one reply, or only announce it when the frame opted out.
    fn send_reply(&mut self, reply: &ResponseFrame, suppressed: bool) -> Result<()> {
        if suppressed {
            info!("(Ignored) <<< {}", preview(reply));
            return Ok(());
        }
        match self.writer.write_reply(reply) {
            Ok(()) => {
                info!("<<< {}", preview(reply));
                Ok(())
            }
            Err(err) if err.is_session_fatal() => Err(err.into()),
            Err(err) => {
                // Encode-time refusals (an over-long binary body) skip the
                // reply but leave the session up.
                warn!(error = %err, "reply not written");
                Ok(())
            }
        }
    }
}

/// Console form of a reply: the text line as written, or a byte-count
/// placeholder for binary payloads.
fn preview(reply: &ResponseFrame) -> String {
    match reply {
        ResponseFrame::Text { status, body } => {
            truncate(&format!("{status} {}", sanitize_body(body)))
        }
        ResponseFrame::Binary { status: 200, body } => {
            format!("(Binary data of {} bytes)", body.len())
        }
        ResponseFrame::Binary { .. } => String::from_utf8_lossy(FAILURE_SENTINEL).into_owned(),
    }
}

/// Cap a console line at [`PREVIEW_LIMIT`] characters, marking the cut.
/// Anything longer than the cut point loses its tail so the marker fits
/// inside the cap.
fn truncate(text: &str) -> String {
    if text.chars().count() <= PREVIEW_LIMIT - 3 {
        return text.to_string();
    }
    let cut: String = text.chars().take(PREVIEW_LIMIT - 3).collect();
    format!("{cut}...")
}
