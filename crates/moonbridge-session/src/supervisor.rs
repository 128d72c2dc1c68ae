use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use moonbridge_host::target::HostTarget;
use moonbridge_serial::endpoint::SerialEndpoint;
use tracing::{error, info, warn};

use crate::error::Result;

/// Default delay before retrying after a failed cycle.
pub const RETRY_BACKOFF: Duration = Duration::from_secs(5);

/// Effects of one discovery+session cycle, mockable for tests.
///
/// Discovery runs from scratch on every cycle: a session that died may mean
/// the device was re-plugged or the host moved, so nothing resolved earlier
/// is trusted across a failure.
pub trait BridgeRuntime {
    fn locate_host(&mut self) -> Result<HostTarget>;
    fn locate_device(&mut self) -> Result<SerialEndpoint>;
    fn run_session(
        &mut self,
        target: HostTarget,
        endpoint: SerialEndpoint,
        running: &AtomicBool,
    ) -> Result<()>;
}

/// Sleep seam so supervisor tests do not wait out real backoffs.
pub trait Pacing {
    fn pause(&mut self, delay: Duration);
}

/// Production pacing: blocks the supervisor thread.
pub struct ThreadPacing;

impl Pacing for ThreadPacing {
    fn pause(&mut self, delay: Duration) {
        thread::sleep(delay);
    }
}

/// How one supervisor cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The run flag cleared and the session ended cleanly.
    Shutdown,
    /// Discovery or the session failed; retry after the backoff.
    Failed,
}

/// Execute exactly one discovery+session attempt.
pub fn run_cycle<RT: BridgeRuntime>(runtime: &mut RT, running: &AtomicBool) -> CycleOutcome {
    let target = match runtime.locate_host() {
        Ok(target) => target,
        Err(err) => {
            warn!(error = %err, "host discovery failed");
            return CycleOutcome::Failed;
        }
    };
    info!(%target, "printer host selected");

    let endpoint = match runtime.locate_device() {
        Ok(endpoint) => endpoint,
        Err(err) => {
            warn!(error = %err, "device discovery failed");
            return CycleOutcome::Failed;
        }
    };
    info!(%endpoint, "serial device selected");

    match runtime.run_session(target, endpoint, running) {
        Ok(()) => CycleOutcome::Shutdown,
        Err(err) => {
            error!(error = %err, "bridge session failed");
            CycleOutcome::Failed
        }
    }
}

/// Supervise the bridge until the run flag clears.
///
/// Every failed cycle waits out the backoff and then restarts from host
/// discovery. The open port is dropped (and with it closed) before the
/// backoff starts, on success and failure alike.
pub fn run<RT: BridgeRuntime, P: Pacing>(
    runtime: &mut RT,
    pacing: &mut P,
    running: &AtomicBool,
    backoff: Duration,
) {
    while running.load(Ordering::SeqCst) {
        match run_cycle(runtime, running) {
            CycleOutcome::Shutdown => break,
            CycleOutcome::Failed => {
                if !running.load(Ordering::SeqCst) {
                    break;
                }
                info!(?backoff, "retrying discovery");
                pacing.pause(backoff);
            }
        }
    }
    info!("bridge stopped");
}
