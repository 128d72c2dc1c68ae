use std::fmt;
use std::time::Duration;

use serialport::SerialPort;
use tracing::info;

use crate::error::{Result, SerialError};

/// Serial console rate fixed by the display firmware.
pub const DEFAULT_BAUD: u32 = 115_200;

/// Poll interval for blocking reads on the open port.
pub const POLL_TIMEOUT: Duration = Duration::from_secs(1);

/// The resolved serial device for one bridge session.
///
/// Invalidated by any I/O error on the open port; the supervisor re-runs
/// discovery rather than reusing a stale endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialEndpoint {
    /// Platform device name (`/dev/ttyUSB0`, `COM6`, ...).
    pub path: String,
    /// Baud rate to open at.
    pub baud: u32,
}

impl SerialEndpoint {
    /// Endpoint at the firmware's fixed default baud rate.
    pub fn new(path: impl Into<String>) -> Self {
        Self::with_baud(path, DEFAULT_BAUD)
    }

    /// Endpoint with an explicit baud rate.
    pub fn with_baud(path: impl Into<String>, baud: u32) -> Self {
        Self {
            path: path.into(),
            baud,
        }
    }

    /// Open the device for one bridge session.
    ///
    /// Reads time out after [`POLL_TIMEOUT`] so the session loop regains
    /// control between lines instead of blocking indefinitely.
    pub fn open(&self) -> Result<Box<dyn SerialPort>> {
        let port = serialport::new(self.path.as_str(), self.baud)
            .timeout(POLL_TIMEOUT)
            .open()
            .map_err(|source| SerialError::Open {
                path: self.path.clone(),
                source,
            })?;
        info!(device = %self.path, baud = self.baud, "opened serial device");
        Ok(port)
    }

    /// Open the device and duplicate the handle so reads and writes can be
    /// owned separately. Both handles drive the same underlying port.
    pub fn open_split(&self) -> Result<(Box<dyn SerialPort>, Box<dyn SerialPort>)> {
        let writer = self.open()?;
        let reader = writer.try_clone().map_err(|source| SerialError::Duplicate {
            path: self.path.clone(),
            source,
        })?;
        Ok((reader, writer))
    }
}

impl fmt::Display for SerialEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {} baud", self.path, self.baud)
    }
}
