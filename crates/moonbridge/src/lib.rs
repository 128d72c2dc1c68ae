//! Serial HTTP bridge between an ESP32 touch display and a Klipper printer
//! host.
//!
//! The display firmware cannot speak TCP, so it writes one-line HTTP
//! requests over its USB serial console. moonbridge runs on the machine the
//! display is plugged into, discovers both sides (the USB UART adapter and
//! the Moonraker-compatible API), and relays requests and replies for as
//! long as both stay up.
//!
//! # Crate Structure
//!
//! - [`frame`] — the line protocol: request decoding and reply encoding
//! - [`serial`] — USB adapter discovery and port sessions
//! - [`host`] — printer host discovery and HTTP dispatch
//! - [`session`] — the supervised bridge loop

/// Re-export framing types.
pub mod frame {
    pub use moonbridge_frame::*;
}

/// Re-export serial discovery types.
pub mod serial {
    pub use moonbridge_serial::*;
}

/// Re-export host discovery and dispatch types.
pub mod host {
    pub use moonbridge_host::*;
}

/// Re-export session types.
pub mod session {
    pub use moonbridge_session::*;
}
