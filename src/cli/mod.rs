//! Command-line interface definitions for the `provision-wait` binary.
//!
//! This module centralises the clap parser structures so both the main binary
//! and the build script can reuse them when generating the manual page.

use clap::{Args, Parser};

/// Top-level CLI for the `provision-wait` binary.
#[derive(Debug, Parser)]
#[command(
    name = "provision-wait",
    about = "Wait for IBM Cloud classic infrastructure to finish provisioning",
    arg_required_else_help = true
)]
pub(crate) enum Cli {
    /// Wait for a bare metal server or network gateway member to provision.
    #[command(
        name = "hardware",
        about = "Wait for ordered hardware to receive a provision date"
    )]
    Hardware(HardwareCommand),
    /// Wait for hardware to finish its active transactions.
    #[command(
        name = "transactions",
        about = "Wait for hardware to have no active transactions"
    )]
    Transactions(IdCommand),
    /// Wait for a block or file storage volume to become available.
    #[command(name = "storage", about = "Wait for a storage volume to be available")]
    Storage(IdCommand),
    /// Wait for cancelled hardware to disappear.
    #[command(name = "deleted", about = "Wait for hardware to be deleted")]
    Deleted(IdCommand),
}

/// Arguments for `provision-wait hardware`.
#[derive(Debug, Parser)]
pub(crate) struct HardwareCommand {
    /// Host name given when the hardware was ordered.
    #[arg(long, value_name = "HOSTNAME")]
    pub(crate) hostname: String,
    /// Domain given when the hardware was ordered.
    #[arg(long, value_name = "DOMAIN")]
    pub(crate) domain: String,
    /// Use the network gateway timeout (24 hours) instead of the bare metal
    /// timeout (4 hours).
    #[arg(long)]
    pub(crate) gateway: bool,
    #[command(flatten)]
    pub(crate) wait: WaitArgs,
}

/// Arguments for subcommands that wait on a single resource identifier.
#[derive(Debug, Parser)]
pub(crate) struct IdCommand {
    /// Resource identifier.
    #[arg(long, value_name = "ID")]
    pub(crate) id: u64,
    #[command(flatten)]
    pub(crate) wait: WaitArgs,
}

/// Timing overrides shared by every subcommand.
#[derive(Clone, Copy, Debug, Default, Args)]
pub(crate) struct WaitArgs {
    /// Overall timeout in seconds; defaults depend on the resource.
    #[arg(long, value_name = "SECONDS")]
    pub(crate) timeout_secs: Option<u64>,
    /// Seconds to sleep before the first status read.
    #[arg(long, value_name = "SECONDS")]
    pub(crate) delay_secs: Option<u64>,
    /// Fixed seconds between status reads, replacing the backoff.
    #[arg(long, value_name = "SECONDS")]
    pub(crate) poll_interval_secs: Option<u64>,
}
