//! Poll-until-ready primitive.
//!
//! Provisioning calls against classic infrastructure return before the
//! remote object is usable. [`wait_for_state`] blocks the caller until a
//! status read reports one of the target states, fails on any state that is
//! neither pending nor target, and gives up once the timeout elapses. One
//! sample is in flight at a time; there is no background task and nothing
//! outlives the call.

mod error;
mod labels;
mod schedule;
mod transient;

use std::future::Future;
use std::time::Duration;

use tokio::time::{Instant, sleep, timeout_at};
use tracing::{debug, warn};

pub use error::{PollError, PollSpecError};
pub use labels::StateLabels;
pub use schedule::PollSchedule;
pub use transient::{RetryOnError, retry_on_error, retry_unless};

/// State reported for samples whose status read failed transiently.
pub const RETRY_STATE: &str = "retry";

const DEFAULT_NOT_FOUND_CHECKS: u32 = 20;

/// Keeps `Instant` arithmetic in range for effectively unbounded timeouts.
const MAX_DEADLINE: Duration = Duration::from_secs(30 * 365 * 24 * 60 * 60);

/// Outcome of a single status read.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Sample<T> {
    /// The object was read and reports `state`.
    Found {
        /// Object returned by the read.
        object: T,
        /// State label derived from the object.
        state: String,
    },
    /// The object does not exist yet.
    Missing,
    /// The read failed in a way worth retrying; reported as [`RETRY_STATE`].
    Retry {
        /// Failure text kept for timeout diagnostics.
        reason: String,
    },
}

impl<T> Sample<T> {
    /// Shorthand for [`Sample::Found`].
    pub fn found(object: T, state: impl Into<String>) -> Self {
        Self::Found {
            object,
            state: state.into(),
        }
    }

    /// Returns the state label carried by the sample, if any.
    #[must_use]
    pub fn state(&self) -> Option<&str> {
        match self {
            Self::Found { state, .. } => Some(state.as_str()),
            Self::Missing => None,
            Self::Retry { .. } => Some(RETRY_STATE),
        }
    }
}

/// Performs one read of a remote object's status.
///
/// Implementations must be pure reads: the poller calls them repeatedly and
/// assumes every call is safe to repeat.
pub trait StateRefresh {
    /// Object handed back to the caller on success.
    type Object;
    /// Error raised when the read fails.
    type Error: std::error::Error + 'static;

    /// Reads the current status.
    fn refresh(&mut self) -> impl Future<Output = Result<Sample<Self::Object>, Self::Error>>;
}

/// [`StateRefresh`] backed by an async closure. Built with [`refresh_fn`].
#[derive(Clone, Debug)]
pub struct RefreshFn<F>(F);

/// Wraps an async closure as a [`StateRefresh`].
pub const fn refresh_fn<F>(read: F) -> RefreshFn<F> {
    RefreshFn(read)
}

impl<F, Fut, T, E> StateRefresh for RefreshFn<F>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Sample<T>, E>>,
    E: std::error::Error + 'static,
{
    type Object = T;
    type Error = E;

    fn refresh(&mut self) -> impl Future<Output = Result<Sample<T>, E>> {
        (self.0)()
    }
}

/// Describes one wait: which states to keep polling on, which end it, and
/// how long to keep trying.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PollSpec {
    pending: StateLabels,
    target: StateLabels,
    delay: Duration,
    min_timeout: Duration,
    poll_interval: Option<Duration>,
    timeout: Duration,
    not_found_checks: u32,
    continuous_target_occurrence: u32,
}

impl PollSpec {
    /// Starts a builder for a [`PollSpec`].
    #[must_use]
    pub fn builder() -> PollSpecBuilder {
        PollSpecBuilder::new()
    }

    /// States that keep the wait going.
    #[must_use]
    pub const fn pending(&self) -> &StateLabels {
        &self.pending
    }

    /// States that end the wait successfully.
    #[must_use]
    pub const fn target(&self) -> &StateLabels {
        &self.target
    }

    /// Sleep before the first sample.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Overall time budget, including the initial delay.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Schedule of waits between samples for a fresh wait.
    #[must_use]
    pub const fn schedule(&self) -> PollSchedule {
        PollSchedule::new(self.min_timeout, self.poll_interval)
    }
}

/// Builder for [`PollSpec`]; validation happens in [`PollSpecBuilder::build`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PollSpecBuilder {
    pending: StateLabels,
    target: StateLabels,
    delay: Duration,
    min_timeout: Duration,
    poll_interval: Option<Duration>,
    timeout: Duration,
    not_found_checks: u32,
    continuous_target_occurrence: u32,
}

impl Default for PollSpecBuilder {
    fn default() -> Self {
        Self {
            pending: StateLabels::default(),
            target: StateLabels::default(),
            delay: Duration::ZERO,
            min_timeout: Duration::ZERO,
            poll_interval: None,
            timeout: Duration::ZERO,
            not_found_checks: DEFAULT_NOT_FOUND_CHECKS,
            continuous_target_occurrence: 1,
        }
    }
}

impl PollSpecBuilder {
    /// Creates a builder with no states and a zero timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the pending states.
    #[must_use]
    pub fn pending<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pending = states.into_iter().collect();
        self
    }

    /// Sets the target states.
    #[must_use]
    pub fn target<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target = states.into_iter().collect();
        self
    }

    /// Sets the sleep before the first sample.
    #[must_use]
    pub const fn delay(mut self, value: Duration) -> Self {
        self.delay = value;
        self
    }

    /// Sets the floor applied to backoff waits.
    #[must_use]
    pub const fn min_timeout(mut self, value: Duration) -> Self {
        self.min_timeout = value;
        self
    }

    /// Replaces the backoff with a fixed interval between samples.
    #[must_use]
    pub const fn poll_interval(mut self, value: Option<Duration>) -> Self {
        self.poll_interval = value;
        self
    }

    /// Sets the overall timeout.
    #[must_use]
    pub const fn timeout(mut self, value: Duration) -> Self {
        self.timeout = value;
        self
    }

    /// Sets how many consecutive missing samples are tolerated.
    #[must_use]
    pub const fn not_found_checks(mut self, value: u32) -> Self {
        self.not_found_checks = value;
        self
    }

    /// Sets how many consecutive target samples are needed for success.
    #[must_use]
    pub const fn continuous_target_occurrence(mut self, value: u32) -> Self {
        self.continuous_target_occurrence = value;
        self
    }

    /// Validates and builds the [`PollSpec`].
    ///
    /// # Errors
    ///
    /// Returns [`PollSpecError`] when the target set is empty, a label is
    /// both pending and target, or a timing value would make the wait
    /// meaningless.
    pub fn build(self) -> Result<PollSpec, PollSpecError> {
        if self.target.is_empty() {
            return Err(PollSpecError::EmptyTarget);
        }
        if let Some(label) = self.pending.first_shared(&self.target) {
            return Err(PollSpecError::OverlappingState(label.to_owned()));
        }
        if self.timeout.is_zero() {
            return Err(PollSpecError::ZeroTimeout);
        }
        if self.poll_interval.is_some_and(|interval| interval.is_zero()) {
            return Err(PollSpecError::ZeroPollInterval);
        }
        if self.continuous_target_occurrence == 0 {
            return Err(PollSpecError::ZeroTargetOccurrence);
        }

        Ok(PollSpec {
            pending: self.pending,
            target: self.target,
            delay: self.delay,
            min_timeout: self.min_timeout,
            poll_interval: self.poll_interval,
            timeout: self.timeout,
            not_found_checks: self.not_found_checks,
            continuous_target_occurrence: self.continuous_target_occurrence,
        })
    }
}

/// Polls `refresh` until it reports a target state and returns the object
/// from that sample.
///
/// The clock starts before the initial delay and the deadline bounds
/// everything after it: the delay itself, every read in flight and every
/// sleep between reads. The sleep to the next sample is clipped to whatever
/// time is left, so a wait that never converges takes one final sample at
/// the deadline and then fails.
///
/// # Errors
///
/// - [`PollError::Refresh`] when a read fails (wrap the refresh with
///   [`retry_on_error`] to tolerate transient failures).
/// - [`PollError::UnexpectedState`] on the first state outside both sets.
/// - [`PollError::NotFound`] when the object stays absent for more than the
///   configured number of checks.
/// - [`PollError::Timeout`] when the budget runs out.
pub async fn wait_for_state<R>(
    spec: &PollSpec,
    mut refresh: R,
) -> Result<R::Object, PollError<R::Error>>
where
    R: StateRefresh,
{
    let started = Instant::now();
    let deadline = started + spec.timeout.min(MAX_DEADLINE);
    let mut schedule = spec.schedule();
    let mut samples: u32 = 0;
    let mut not_found: u32 = 0;
    let mut target_seen: u32 = 0;
    let mut last_state: Option<String> = None;
    let mut last_error: Option<String> = None;

    if timeout_at(deadline, sleep(spec.delay)).await.is_err() {
        return Err(timed_out(spec, started, samples, last_state, last_error));
    }

    loop {
        let Ok(read) = timeout_at(deadline, refresh.refresh()).await else {
            return Err(timed_out(spec, started, samples, last_state, last_error));
        };
        let sample = read.map_err(PollError::Refresh)?;
        samples = samples.saturating_add(1);

        match sample {
            Sample::Missing => {
                target_seen = 0;
                not_found = not_found.saturating_add(1);
                debug!(samples, not_found, "remote object not found yet");
                if not_found > spec.not_found_checks {
                    return Err(PollError::NotFound {
                        checks: not_found,
                        expected: spec.target.clone(),
                    });
                }
            }
            Sample::Retry { reason } => {
                target_seen = 0;
                debug!(samples, %reason, "status read will be retried");
                if !spec.pending.contains(RETRY_STATE) {
                    return Err(PollError::UnexpectedState {
                        state: RETRY_STATE.to_owned(),
                        expected: spec.target.clone(),
                    });
                }
                last_state = Some(RETRY_STATE.to_owned());
                last_error = Some(reason);
            }
            Sample::Found { object, state } => {
                not_found = 0;
                debug!(samples, state = %state, "sampled remote state");
                if spec.target.contains(&state) {
                    target_seen = target_seen.saturating_add(1);
                    if target_seen >= spec.continuous_target_occurrence {
                        return Ok(object);
                    }
                } else if spec.pending.contains(&state) {
                    target_seen = 0;
                } else {
                    return Err(PollError::UnexpectedState {
                        state,
                        expected: spec.target.clone(),
                    });
                }
                last_state = Some(state);
            }
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(timed_out(spec, started, samples, last_state, last_error));
        }

        sleep(schedule.next_wait().min(remaining)).await;
    }
}

fn timed_out<E>(
    spec: &PollSpec,
    started: Instant,
    samples: u32,
    last_state: Option<String>,
    last_error: Option<String>,
) -> PollError<E>
where
    E: std::error::Error + 'static,
{
    let elapsed = started.elapsed();
    warn!(
        samples,
        elapsed = ?elapsed,
        last_state = last_state.as_deref().unwrap_or("none"),
        "gave up waiting for target state"
    );
    PollError::Timeout {
        elapsed,
        last_state,
        expected: spec.target.clone(),
        last_error,
    }
}
