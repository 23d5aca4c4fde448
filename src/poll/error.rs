//! Error types for the poll-until-ready primitive.

use std::time::Duration;

use thiserror::Error;

use super::StateLabels;

/// Errors raised while building a [`super::PollSpec`].
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum PollSpecError {
    /// Raised when no target state was supplied.
    #[error("poll specification needs at least one target state")]
    EmptyTarget,
    /// Raised when the overall timeout is zero.
    #[error("poll timeout must be greater than zero")]
    ZeroTimeout,
    /// Raised when a fixed poll interval of zero was requested.
    #[error("poll interval must be greater than zero")]
    ZeroPollInterval,
    /// Raised when success would never be reached.
    #[error("continuous target occurrence must be at least one")]
    ZeroTargetOccurrence,
    /// Raised when a label is both pending and target.
    #[error("state {0:?} cannot be both pending and target")]
    OverlappingState(String),
}

/// Errors raised by [`super::wait_for_state`].
#[derive(Debug, Error)]
pub enum PollError<RefreshError>
where
    RefreshError: std::error::Error + 'static,
{
    /// Raised when the refresh function itself fails.
    #[error("status refresh failed: {0}")]
    Refresh(#[source] RefreshError),
    /// Raised when the remote object reports a state outside both sets.
    #[error("unexpected state {state:?}, wanted target {expected}")]
    UnexpectedState {
        /// State reported by the last sample.
        state: String,
        /// Target states the wait was looking for.
        expected: StateLabels,
    },
    /// Raised when the remote object stayed absent for too many samples.
    #[error("remote object not found after {checks} checks, wanted target {expected}")]
    NotFound {
        /// Number of consecutive samples that found nothing.
        checks: u32,
        /// Target states the wait was looking for.
        expected: StateLabels,
    },
    /// Raised when the timeout elapses before a target state is observed.
    #[error(
        "timeout after {elapsed:?} waiting for state to become {expected} (last state: {}, last error: {})",
        .last_state.as_deref().unwrap_or("none"),
        .last_error.as_deref().unwrap_or("none")
    )]
    Timeout {
        /// Time spent waiting, including the initial delay.
        elapsed: Duration,
        /// Last state observed, if any sample reported one.
        last_state: Option<String>,
        /// Target states the wait was looking for.
        expected: StateLabels,
        /// Most recent transient read failure, if any.
        last_error: Option<String>,
    },
}

impl<RefreshError> PollError<RefreshError>
where
    RefreshError: std::error::Error + 'static,
{
    /// Returns `true` when the wait ran out of time.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
