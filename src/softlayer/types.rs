//! Response shapes for the SoftLayer REST API.
//!
//! Only the fields requested through object masks are modelled; every
//! field except the identifier is optional because masks and account
//! permissions decide what the API returns.

use serde::Deserialize;

const PROVISION_COMPLETE_MARKERS: [&str; 2] =
    ["PROVISION_COMPLETED", "Volume Provisioning has completed"];

/// Bare metal server or network gateway member.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Hardware {
    /// Hardware identifier.
    pub id: u64,
    /// Host name assigned at order time.
    #[serde(default)]
    pub hostname: Option<String>,
    /// Domain assigned at order time.
    #[serde(default)]
    pub domain: Option<String>,
    /// Set once provisioning has finished.
    #[serde(default)]
    pub provision_date: Option<String>,
    /// Number of transactions still running against the hardware.
    #[serde(default)]
    pub active_transaction_count: Option<u32>,
}

impl Hardware {
    /// Returns `true` once SoftLayer has stamped a provision date.
    #[must_use]
    pub const fn is_provisioned(&self) -> bool {
        self.provision_date.is_some()
    }

    /// Returns `true` when the API reported zero active transactions.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self.active_transaction_count, Some(0))
    }
}

/// Block or file storage volume.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStorage {
    /// Storage identifier.
    pub id: u64,
    /// Number of transactions still running against the volume.
    #[serde(default)]
    pub active_transaction_count: Option<u32>,
    /// Free-form provisioning status text.
    #[serde(default)]
    pub volume_status: Option<String>,
}

impl NetworkStorage {
    /// Returns `true` while transactions are still running.
    #[must_use]
    pub fn has_active_transactions(&self) -> bool {
        self.active_transaction_count.unwrap_or(0) > 0
    }

    /// Returns `true` once the volume status reports completed provisioning.
    #[must_use]
    pub fn is_provisioned(&self) -> bool {
        self.volume_status.as_deref().is_some_and(|status| {
            PROVISION_COMPLETE_MARKERS
                .iter()
                .any(|marker| status.contains(marker))
        })
    }
}

/// Error body returned by SoftLayer on non-2xx responses.
#[derive(Clone, Debug, Default, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub(crate) error: Option<String>,
    #[serde(default)]
    pub(crate) code: Option<String>,
}
