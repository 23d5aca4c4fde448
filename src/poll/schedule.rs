//! Wait schedule between successive status samples.

use std::time::Duration;

const INITIAL_BACKOFF: Duration = Duration::from_millis(100);
const MAX_BACKOFF: Duration = Duration::from_secs(10);
const MAX_POLL_INTERVAL: Duration = Duration::from_secs(180);

/// Computes how long to sleep before the next sample.
///
/// Without a fixed interval the wait starts at 100ms and doubles up to 10s,
/// never dropping below `min_timeout`. A fixed interval replaces the backoff
/// entirely and is capped at three minutes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PollSchedule {
    min_timeout: Duration,
    poll_interval: Option<Duration>,
    backoff: Duration,
}

impl PollSchedule {
    /// Creates a schedule positioned before the first wait.
    #[must_use]
    pub const fn new(min_timeout: Duration, poll_interval: Option<Duration>) -> Self {
        Self {
            min_timeout,
            poll_interval,
            backoff: INITIAL_BACKOFF,
        }
    }

    /// Returns the next wait and advances the backoff.
    pub fn next_wait(&mut self) -> Duration {
        if let Some(interval) = self.poll_interval {
            return interval.min(MAX_POLL_INTERVAL);
        }

        let wait = self.backoff.max(self.min_timeout);
        self.backoff = self.backoff.saturating_mul(2).min(MAX_BACKOFF);
        wait
    }
}
