//! Supervised bridge sessions between the serial link and the printer host.
//!
//! One session owns an open serial port and a resolved host target and runs
//! the poll/dispatch/reply loop in [`bridge`]. The [`supervisor`] wraps
//! sessions in an endless discover-connect-retry cycle: any failure drops
//! the port, waits out a backoff, and rediscovers both sides from scratch.
//! [`StdRuntime`] is the production wiring; tests swap in scripted runtimes
//! through the [`BridgeRuntime`] and [`Pacing`] seams.

pub mod bridge;
pub mod error;
pub mod runtime;
pub mod supervisor;

pub use bridge::{Activity, Bridge, PREVIEW_LIMIT};
pub use error::{Result, SessionError};
pub use runtime::StdRuntime;
pub use supervisor::{
    run, run_cycle, BridgeRuntime, CycleOutcome, Pacing, ThreadPacing, RETRY_BACKOFF,
};
