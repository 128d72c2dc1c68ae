//! Serial device discovery and port sessions for the printer bridge.
//!
//! The microcontroller shows up as one of two USB-UART adapters (CP210x or
//! CH340). Discovery either takes an explicit device path verbatim or
//! enumerates the system's ports and demands exactly one allow-listed
//! match, never guessing between candidates. The resolved
//! [`SerialEndpoint`] opens with a short read timeout so the bridge loop
//! polls instead of blocking forever.

pub mod endpoint;
pub mod error;
pub mod locate;

pub use endpoint::{SerialEndpoint, DEFAULT_BAUD, POLL_TIMEOUT};
pub use error::{Result, SerialError};
pub use locate::{is_supported_adapter, locate_device, select_port, SUPPORTED_ADAPTERS};
