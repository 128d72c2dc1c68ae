/// Errors from locating and opening the microcontroller's serial device.
#[derive(Debug, thiserror::Error)]
pub enum SerialError {
    /// The explicitly configured device path does not exist.
    #[error("configured serial device {path} does not exist")]
    NotFound { path: String },

    /// Enumeration found no adapter matching the supported VID/PID list.
    #[error("no supported serial adapter detected; set an explicit device path")]
    NoAdapter,

    /// Enumeration matched more than one adapter; selection must be explicit.
    #[error("multiple supported serial adapters detected ({}); set an explicit device path", .candidates.join(", "))]
    Ambiguous { candidates: Vec<String> },

    /// Device enumeration itself failed.
    #[error("failed to enumerate serial ports: {0}")]
    Enumerate(#[source] serialport::Error),

    /// Opening the device failed.
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        source: serialport::Error,
    },

    /// The open handle could not be duplicated for the reader/writer split.
    #[error("failed to duplicate handle for {path}: {source}")]
    Duplicate {
        path: String,
        source: serialport::Error,
    },
}

pub type Result<T> = std::result::Result<T, SerialError>;
