use std::fmt;
use std::time::Duration;

use bytes::Bytes;

use crate::error::{FrameError, Result};

/// Marker opening a request line that wants a single-line text reply.
pub const TEXT_MARKER: &str = "HTTP_REQUEST";

/// Marker opening a request line that wants a length-prefixed byte reply.
pub const BINARY_MARKER: &str = "HTTP_BINARY";

/// Effective HTTP timeout for fire-and-forget frames (requested timeout <= 0).
pub const DEFAULT_TIMEOUT_MS: u64 = 1000;

/// Width of the binary reply's ASCII decimal length prefix.
pub const LENGTH_PREFIX_DIGITS: usize = 8;

/// Largest body the fixed-width length prefix can announce.
pub const MAX_BINARY_BODY: usize = 99_999_999;

/// Binary reply announcing a failed transfer: a zero length and no payload.
pub const FAILURE_SENTINEL: &[u8; LENGTH_PREFIX_DIGITS] = b"00000000";

/// Reply encoding requested by a frame's marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    /// One `"{status} {body}"` line terminated by a newline.
    Text,
    /// 8-digit zero-padded length followed by the raw bytes, no newline.
    Binary,
}

/// A parsed request line from the microcontroller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestFrame {
    /// Requested timeout in milliseconds. Non-positive means the caller is
    /// not waiting and no reply may ever be written.
    pub timeout_ms: i64,
    /// Reply encoding requested by the marker.
    pub mode: ResponseMode,
    /// Raw method token. Validated at dispatch, not here.
    pub method: String,
    /// Request path, starting with '/'. May contain spaces.
    pub path: String,
}

impl RequestFrame {
    /// True when no reply may be written for this frame, whatever happens.
    pub fn ignores_reply(&self) -> bool {
        self.timeout_ms <= 0
    }

    /// Timeout to apply to the HTTP call.
    pub fn effective_timeout(&self) -> Duration {
        if self.timeout_ms <= 0 {
            Duration::from_millis(DEFAULT_TIMEOUT_MS)
        } else {
            Duration::from_millis(self.timeout_ms as u64)
        }
    }
}

impl fmt::Display for RequestFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.mode {
            ResponseMode::Text => TEXT_MARKER,
            ResponseMode::Binary => BINARY_MARKER,
        };
        write!(f, "{marker} {} {} {}", self.timeout_ms, self.method, self.path)
    }
}

/// One line read from the serial link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A recognized request frame.
    Request(RequestFrame),
    /// Anything else: firmware chatter, surfaced for logging, never answered.
    Log(String),
}

/// Decode one serial line (trailing whitespace already trimmed).
///
/// Lines not starting with a request marker are [`Inbound::Log`]. Marker
/// lines split into at most 4 space-separated fields; the path is the
/// remainder after the method token and is never re-split, so it may
/// contain spaces.
pub fn decode_line(line: &str) -> Result<Inbound> {
    let mode = if line.starts_with(BINARY_MARKER) {
        ResponseMode::Binary
    } else if line.starts_with(TEXT_MARKER) {
        ResponseMode::Text
    } else {
        return Ok(Inbound::Log(line.to_string()));
    };

    let fields: Vec<&str> = line.splitn(4, ' ').collect();
    if fields.len() < 4 {
        return Err(FrameError::MissingFields {
            found: fields.len(),
        });
    }

    let timeout_ms: i64 = fields[1].parse().map_err(|_| FrameError::InvalidTimeout {
        token: fields[1].to_string(),
    })?;

    let path = fields[3];
    if !path.starts_with('/') {
        return Err(FrameError::InvalidPath {
            path: path.to_string(),
        });
    }

    Ok(Inbound::Request(RequestFrame {
        timeout_ms,
        mode,
        method: fields[2].to_string(),
        path: path.to_string(),
    }))
}

/// An encoded reply, built per request and discarded after writing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseFrame {
    /// Single-line status + body reply.
    Text {
        /// HTTP status code, or a local 400/500.
        status: u16,
        /// Body text; newlines are replaced with spaces at encode time.
        body: String,
    },
    /// Length-prefixed raw byte reply. Any non-200 status collapses to the
    /// failure sentinel at encode time.
    Binary {
        /// HTTP status code of the upstream call.
        status: u16,
        /// Raw response bytes, sent without re-encoding.
        body: Bytes,
    },
}

impl ResponseFrame {
    /// Local reply for a method the dispatcher refuses to forward.
    pub fn unsupported_method() -> Self {
        ResponseFrame::Text {
            status: 400,
            body: "Unsupported request type".to_string(),
        }
    }

    /// Local reply for a marker line that failed to parse.
    pub fn malformed(detail: impl fmt::Display) -> Self {
        ResponseFrame::Text {
            status: 400,
            body: format!("Malformed request {detail}"),
        }
    }

    /// Local reply for a network failure other than a timeout, in the mode
    /// the frame asked for (a failed binary transfer becomes the sentinel).
    pub fn request_failed(mode: ResponseMode) -> Self {
        match mode {
            ResponseMode::Text => ResponseFrame::Text {
                status: 500,
                body: "Request failed".to_string(),
            },
            ResponseMode::Binary => ResponseFrame::Binary {
                status: 500,
                body: Bytes::new(),
            },
        }
    }

    /// Status code carried by this reply.
    pub fn status(&self) -> u16 {
        match self {
            ResponseFrame::Text { status, .. } | ResponseFrame::Binary { status, .. } => *status,
        }
    }

    /// Encode to the exact bytes that go on the serial wire.
    pub fn encode(&self) -> Result<Vec<u8>> {
        match self {
            ResponseFrame::Text { status, body } => {
                let mut line = format!("{status} {}", sanitize_body(body));
                line.push('\n');
                Ok(line.into_bytes())
            }
            ResponseFrame::Binary { status, body } => {
                if *status != 200 {
                    return Ok(FAILURE_SENTINEL.to_vec());
                }
                let prefix = length_prefix(body.len())?;
                let mut out = Vec::with_capacity(LENGTH_PREFIX_DIGITS + body.len());
                out.extend_from_slice(prefix.as_bytes());
                out.extend_from_slice(body);
                Ok(out)
            }
        }
    }
}

/// Replace line-control characters so the reply stays one line.
pub fn sanitize_body(body: &str) -> String {
    body.replace(['\r', '\n'], " ")
}

fn length_prefix(len: usize) -> Result<String> {
    if len > MAX_BINARY_BODY {
        return Err(FrameError::BodyTooLarge {
            size: len,
            max: MAX_BINARY_BODY,
        });
    }
    Ok(format!("{len:0width$}", width = LENGTH_PREFIX_DIGITS))
}
