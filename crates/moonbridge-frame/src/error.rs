/// Errors from decoding request lines and encoding replies.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// A marker line had fewer than the four required fields.
    #[error("expected 4 fields (marker, timeout, method, path), found {found}")]
    MissingFields { found: usize },

    /// The timeout field did not parse as an integer.
    #[error("invalid timeout value {token:?}")]
    InvalidTimeout { token: String },

    /// The path field did not start with a path separator.
    #[error("path must start with '/', got {path:?}")]
    InvalidPath { path: String },

    /// A binary body exceeded what the fixed-width length prefix can express.
    #[error("binary body too large ({size} bytes, max {max})")]
    BodyTooLarge { size: usize, max: usize },

    /// An I/O error occurred while reading or writing the serial stream.
    #[error("serial I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended; the device was unplugged or the port was closed.
    #[error("serial stream closed")]
    Disconnected,
}

impl FrameError {
    /// True for errors that end the serial session rather than one request.
    pub fn is_session_fatal(&self) -> bool {
        matches!(self, FrameError::Io(_) | FrameError::Disconnected)
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
