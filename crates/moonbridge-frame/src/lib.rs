//! Line-oriented request/reply framing for the serial printer bridge.
//!
//! The microcontroller speaks one request per line:
//! - `HTTP_REQUEST <timeoutMillis> <METHOD> <path>` wants a `"{status} {body}"` line back
//! - `HTTP_BINARY <timeoutMillis> <METHOD> <path>` wants an 8-digit length prefix and raw bytes
//! - anything else is firmware chatter, logged and never answered
//!
//! A non-positive timeout marks a fire-and-forget request: the HTTP call
//! still happens (with a 1 s default timeout) but nothing is ever written
//! back, success or failure.

pub mod codec;
pub mod error;
pub mod reader;
pub mod writer;

pub use codec::{
    decode_line, sanitize_body, Inbound, RequestFrame, ResponseFrame, ResponseMode, BINARY_MARKER,
    DEFAULT_TIMEOUT_MS, FAILURE_SENTINEL, LENGTH_PREFIX_DIGITS, MAX_BINARY_BODY, TEXT_MARKER,
};
pub use error::{FrameError, Result};
pub use reader::LineReader;
pub use writer::ReplyWriter;
