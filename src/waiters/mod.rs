//! Classic infrastructure waits built on [`crate::poll`].
//!
//! Each waiter pairs a status read against [`ClassicApi`] with the pending
//! and target labels the provisioning flow expects, and a default
//! [`WaitTuning`] sized for that resource. Callers may pass their own
//! tuning to shorten or stretch a wait.

use std::time::Duration;

use thiserror::Error;
use tracing::info;

use crate::poll::{
    PollError, PollSpec, PollSpecBuilder, PollSpecError, RETRY_STATE, Sample, refresh_fn,
    retry_unless, wait_for_state,
};
use crate::softlayer::{ClassicApi, Hardware, NetworkStorage, SoftLayerError};

const TEN_SECONDS: Duration = Duration::from_secs(10);
const MINUTE: Duration = Duration::from_secs(60);
const HOUR: Duration = Duration::from_secs(60 * 60);
const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// An order can take longer than any timeout to show up in the account
/// hardware search, so an empty search never ends the wait on its own.
const HARDWARE_NOT_FOUND_CHECKS: u32 = u32::MAX;

/// Timing knobs for a single wait.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WaitTuning {
    /// Sleep before the first status read.
    pub delay: Duration,
    /// Floor applied to the backoff between reads.
    pub min_timeout: Duration,
    /// Fixed interval replacing the backoff, when set.
    pub poll_interval: Option<Duration>,
    /// Overall time budget.
    pub timeout: Duration,
}

impl WaitTuning {
    /// Bare metal servers: up to four hours to provision.
    pub const BARE_METAL_PROVISION: Self =
        Self::new(TEN_SECONDS, MINUTE, Duration::from_secs(4 * 60 * 60));
    /// Network gateways: up to a day to provision.
    pub const NETWORK_GATEWAY_PROVISION: Self = Self::new(TEN_SECONDS, MINUTE, DAY);
    /// Draining active transactions before changes or cancellation.
    pub const ACTIVE_TRANSACTIONS: Self = Self::new(TEN_SECONDS, MINUTE, DAY);
    /// Block and file storage volumes.
    pub const STORAGE_AVAILABLE: Self =
        Self::new(TEN_SECONDS, TEN_SECONDS, Duration::from_secs(45 * 60));
    /// Hardware removal after cancellation.
    pub const HARDWARE_DELETE: Self = Self::new(TEN_SECONDS, TEN_SECONDS, HOUR);

    /// Creates a tuning that backs off between reads.
    #[must_use]
    pub const fn new(delay: Duration, min_timeout: Duration, timeout: Duration) -> Self {
        Self {
            delay,
            min_timeout,
            poll_interval: None,
            timeout,
        }
    }

    /// Replaces the overall timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replaces the initial delay.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Switches to a fixed interval between reads.
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    fn spec<const P: usize, const T: usize>(
        self,
        pending: [&str; P],
        target: [&str; T],
    ) -> PollSpecBuilder {
        PollSpec::builder()
            .pending(pending)
            .target(target)
            .delay(self.delay)
            .min_timeout(self.min_timeout)
            .poll_interval(self.poll_interval)
            .timeout(self.timeout)
    }
}

/// Errors raised by the waiters.
#[derive(Debug, Error)]
pub enum WaitError {
    /// Raised when the tuning produced an invalid poll specification.
    #[error("invalid wait configuration: {0}")]
    Spec(#[from] PollSpecError),
    /// Raised when the wait itself failed.
    #[error("{subject}: {source}")]
    Poll {
        /// Resource being waited on, for example `storage 42`.
        subject: String,
        /// Underlying poll failure.
        #[source]
        source: PollError<SoftLayerError>,
    },
}

impl WaitError {
    fn poll(subject: String) -> impl FnOnce(PollError<SoftLayerError>) -> Self {
        move |source| Self::Poll { subject, source }
    }

    /// Returns `true` when the wait ran out of time.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Poll { source, .. } if source.is_timeout())
    }
}

/// Waits until hardware ordered with `hostname` and `domain` has a provision
/// date.
///
/// Hardware orders do not return an identifier, so the account hardware list
/// is searched by name. An empty search keeps the wait going until the
/// timeout. Read errors are treated as transient, except authentication
/// failures.
///
/// # Errors
///
/// Returns [`WaitError`] on timeout or when the credentials are rejected.
pub async fn wait_for_hardware_provision<A>(
    api: &A,
    hostname: &str,
    domain: &str,
    tuning: WaitTuning,
) -> Result<Hardware, WaitError>
where
    A: ClassicApi + ?Sized,
{
    info!(hostname, domain, "waiting for hardware to be provisioned");
    let spec = tuning
        .spec([RETRY_STATE, "pending"], ["provisioned"])
        .not_found_checks(HARDWARE_NOT_FOUND_CHECKS)
        .build()?;

    let read = refresh_fn(move || async move {
        let matches = api.find_hardware(hostname, domain).await?;
        let sample = match matches.into_iter().next() {
            Some(hardware) if hardware.is_provisioned() => Sample::found(hardware, "provisioned"),
            Some(hardware) => Sample::found(hardware, "pending"),
            None => Sample::Missing,
        };
        Ok::<_, SoftLayerError>(sample)
    });

    let hardware = wait_for_state(&spec, retry_unless(read, SoftLayerError::is_auth_failure))
        .await
        .map_err(WaitError::poll(format!("hardware {hostname}.{domain}")))?;
    info!(hardware_id = hardware.id, "hardware provisioned");
    Ok(hardware)
}

/// Waits until hardware `id` reports zero active transactions.
///
/// Read errors other than authentication failures are retried.
///
/// # Errors
///
/// Returns [`WaitError`] on timeout or when the credentials are rejected.
pub async fn wait_for_no_active_transactions<A>(
    api: &A,
    id: u64,
    tuning: WaitTuning,
) -> Result<Hardware, WaitError>
where
    A: ClassicApi + ?Sized,
{
    info!(hardware_id = id, "waiting for active transactions to finish");
    let spec = tuning.spec([RETRY_STATE, "active"], ["idle"]).build()?;

    let read = refresh_fn(move || async move {
        let hardware = api.get_hardware(id).await?;
        let state = if hardware.is_idle() { "idle" } else { "active" };
        Ok::<_, SoftLayerError>(Sample::found(hardware, state))
    });

    wait_for_state(&spec, retry_unless(read, SoftLayerError::is_auth_failure))
        .await
        .map_err(WaitError::poll(format!("hardware {id}")))
}

/// Waits until storage volume `id` has no active transactions and reports
/// completed provisioning.
///
/// A 404 means the volume is gone and stops the wait; other read errors are
/// retried.
///
/// # Errors
///
/// Returns [`WaitError`] on timeout or when the volume does not exist.
pub async fn wait_for_storage_available<A>(
    api: &A,
    id: u64,
    tuning: WaitTuning,
) -> Result<NetworkStorage, WaitError>
where
    A: ClassicApi + ?Sized,
{
    info!(storage_id = id, "waiting for storage to be available");
    let spec = tuning
        .spec([RETRY_STATE, "provisioning"], ["available"])
        .build()?;

    let read = refresh_fn(move || async move {
        let storage = api.get_network_storage(id).await?;
        let state = if !storage.has_active_transactions() && storage.is_provisioned() {
            "available"
        } else {
            "provisioning"
        };
        Ok::<_, SoftLayerError>(Sample::found(storage, state))
    });

    wait_for_state(&spec, retry_unless(read, SoftLayerError::is_not_found))
        .await
        .map_err(WaitError::poll(format!("storage {id}")))
}

/// Waits until hardware `id` no longer exists.
///
/// A 404 is the target; any other read error stops the wait.
///
/// # Errors
///
/// Returns [`WaitError`] on timeout or on a read error other than 404.
pub async fn wait_for_hardware_deleted<A>(
    api: &A,
    id: u64,
    tuning: WaitTuning,
) -> Result<(), WaitError>
where
    A: ClassicApi + ?Sized,
{
    info!(hardware_id = id, "waiting for hardware to be deleted");
    let spec = tuning.spec(["deleting"], ["deleted"]).build()?;

    let refresh = refresh_fn(move || async move {
        match api.get_hardware(id).await {
            Ok(_) => Ok(Sample::found((), "deleting")),
            Err(err) if err.is_not_found() => Ok(Sample::found((), "deleted")),
            Err(err) => Err(err),
        }
    });

    wait_for_state(&spec, refresh)
        .await
        .map_err(WaitError::poll(format!("hardware {id}")))
}
