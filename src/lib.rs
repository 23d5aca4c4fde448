//! Poll-until-ready waits for IBM Cloud classic infrastructure.
//!
//! Provisioning calls return before the remote object is usable. The
//! [`poll`] module holds a generic wait that samples a status read until it
//! reports a target state, and [`waiters`] applies it to bare metal servers,
//! network gateways, storage volumes and hardware removal through the
//! SoftLayer REST API.

pub mod config;
pub mod poll;
pub mod session;
pub mod softlayer;
pub mod test_support;
pub mod waiters;

pub use config::{ConfigError, ProviderConfig};
pub use poll::{
    PollError, PollSchedule, PollSpec, PollSpecBuilder, PollSpecError, RETRY_STATE, Sample,
    StateLabels, StateRefresh, refresh_fn, retry_on_error, retry_unless, wait_for_state,
};
pub use session::{ClientSession, SessionError};
pub use softlayer::{ClassicApi, Hardware, NetworkStorage, SoftLayerClient, SoftLayerError};
pub use waiters::{
    WaitError, WaitTuning, wait_for_hardware_deleted, wait_for_hardware_provision,
    wait_for_no_active_transactions, wait_for_storage_available,
};
