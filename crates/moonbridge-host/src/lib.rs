//! Printer-host discovery and request forwarding.
//!
//! The bridge talks to a Moonraker-compatible API over plain blocking HTTP.
//! [`locate::locate_host`] probes a short candidate list and settles on the
//! first host that answers the health check; [`dispatch::dispatch`] forwards
//! one decoded request frame and maps the outcome onto the wire protocol's
//! reply rules. All network traffic goes through the [`client::HttpExchange`]
//! seam so the session loop can be driven entirely by mocks in tests.

pub mod client;
pub mod dispatch;
pub mod error;
pub mod locate;
pub mod target;

pub use client::{HttpExchange, HttpMethod, HttpReply, UreqExchange};
pub use dispatch::{dispatch, DispatchOutcome};
pub use error::{ExchangeError, HostError, Result};
pub use locate::{candidates, locate_host, HostOverrides};
pub use target::HostTarget;
