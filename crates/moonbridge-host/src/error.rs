use std::time::Duration;

use crate::target::HostTarget;

/// Errors from one HTTP exchange attempt.
#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    /// The call did not complete within the allowed time.
    #[error("request timed out after {0:?}")]
    TimedOut(Duration),

    /// Any other transport-level failure: refused, DNS, reset, oversized body.
    #[error("request failed: {0}")]
    Failed(String),
}

/// Errors from resolving the printer host.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// No candidate accepted the health-check probe.
    #[error("no reachable printer host (tried {})", join_targets(.tried))]
    Unreachable { tried: Vec<HostTarget> },
}

fn join_targets(targets: &[HostTarget]) -> String {
    targets
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, HostError>;
