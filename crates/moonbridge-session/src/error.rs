use moonbridge_frame::error::FrameError;
use moonbridge_host::error::HostError;
use moonbridge_serial::error::SerialError;

/// Anything that ends one supervisor cycle: failed discovery, a device that
/// would not open, or a serial session that died under us.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The serial link failed mid-session.
    #[error("serial link failed: {0}")]
    Link(#[from] FrameError),

    /// Device discovery or open failed.
    #[error(transparent)]
    Serial(#[from] SerialError),

    /// Host discovery failed.
    #[error(transparent)]
    Host(#[from] HostError),
}

pub type Result<T> = std::result::Result<T, SessionError>;
