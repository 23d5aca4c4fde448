//! Test support utilities shared across unit and integration tests.

use std::collections::{BTreeSet, VecDeque};
use std::env;
use std::ffi::OsString;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use tokio::sync::{Mutex, MutexGuard};

use crate::softlayer::{ApiFuture, ClassicApi, Hardware, NetworkStorage, SoftLayerError};

/// Records a single call made through [`ScriptedClassicApi`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ApiCall {
    /// `get_hardware(id)`.
    GetHardware(u64),
    /// `find_hardware(hostname, domain)`.
    FindHardware {
        /// Host name searched for.
        hostname: String,
        /// Domain searched for.
        domain: String,
    },
    /// `get_network_storage(id)`.
    GetNetworkStorage(u64),
}

/// Queue of scripted responses; the last one repeats once the rest drain.
#[derive(Debug)]
struct Script<T> {
    queue: VecDeque<Result<T, SoftLayerError>>,
}

impl<T> Default for Script<T> {
    fn default() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }
}

impl<T: Clone> Script<T> {
    fn next_response(&mut self, call: &str) -> Result<T, SoftLayerError> {
        let response = if self.queue.len() > 1 {
            self.queue.pop_front()
        } else {
            self.queue.front().cloned()
        };
        response.unwrap_or_else(|| {
            Err(SoftLayerError::Transport {
                message: format!("no scripted response for {call}"),
            })
        })
    }
}

#[derive(Debug, Default)]
struct ScriptState {
    hardware: Script<Hardware>,
    searches: Script<Vec<Hardware>>,
    storage: Script<NetworkStorage>,
    calls: Vec<ApiCall>,
}

/// Scripted [`ClassicApi`] that replays pre-seeded responses in FIFO order.
///
/// Each call kind has its own queue. When a queue is down to its final entry
/// that entry is returned for every further call, which lets tests script
/// "pending, pending, then ready forever". Calling an unscripted method
/// returns a transport error.
#[derive(Clone, Debug, Default)]
pub struct ScriptedClassicApi {
    state: Arc<StdMutex<ScriptState>>,
}

impl ScriptedClassicApi {
    /// Creates an API with empty queues.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut ScriptState) -> T) -> T {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    /// Queues a `get_hardware` response.
    pub fn push_hardware(&self, response: Result<Hardware, SoftLayerError>) {
        self.with_state(|state| state.hardware.queue.push_back(response));
    }

    /// Queues a `find_hardware` response.
    pub fn push_search(&self, response: Result<Vec<Hardware>, SoftLayerError>) {
        self.with_state(|state| state.searches.queue.push_back(response));
    }

    /// Queues a `get_network_storage` response.
    pub fn push_storage(&self, response: Result<NetworkStorage, SoftLayerError>) {
        self.with_state(|state| state.storage.queue.push_back(response));
    }

    /// Returns a snapshot of every call recorded so far.
    #[must_use]
    pub fn calls(&self) -> Vec<ApiCall> {
        self.with_state(|state| state.calls.clone())
    }

    /// Number of calls recorded so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.with_state(|state| state.calls.len())
    }
}

impl ClassicApi for ScriptedClassicApi {
    fn get_hardware(&self, id: u64) -> ApiFuture<'_, Hardware> {
        let response = self.with_state(|state| {
            state.calls.push(ApiCall::GetHardware(id));
            state.hardware.next_response("get_hardware")
        });
        Box::pin(async move { response })
    }

    fn find_hardware<'a>(
        &'a self,
        hostname: &'a str,
        domain: &'a str,
    ) -> ApiFuture<'a, Vec<Hardware>> {
        let response = self.with_state(|state| {
            state.calls.push(ApiCall::FindHardware {
                hostname: hostname.to_owned(),
                domain: domain.to_owned(),
            });
            state.searches.next_response("find_hardware")
        });
        Box::pin(async move { response })
    }

    fn get_network_storage(&self, id: u64) -> ApiFuture<'_, NetworkStorage> {
        let response = self.with_state(|state| {
            state.calls.push(ApiCall::GetNetworkStorage(id));
            state.storage.next_response("get_network_storage")
        });
        Box::pin(async move { response })
    }
}

/// Builds a SoftLayer API error with `status`, for scripting failures.
#[must_use]
pub fn api_error(status: u16, message: &str) -> SoftLayerError {
    SoftLayerError::Api {
        status,
        code: String::from("SoftLayer_Exception"),
        path: String::from("scripted"),
        message: message.to_owned(),
    }
}

/// Hardware record with the given provisioning and transaction state.
#[must_use]
pub fn hardware(id: u64, provisioned: bool, active_transactions: u32) -> Hardware {
    Hardware {
        id,
        hostname: Some(String::from("node")),
        domain: Some(String::from("example.com")),
        provision_date: provisioned.then(|| String::from("2024-05-01T10:00:00Z")),
        active_transaction_count: Some(active_transactions),
    }
}

/// Storage record with the given transaction count and status text.
#[must_use]
pub fn storage(id: u64, active_transactions: u32, volume_status: &str) -> NetworkStorage {
    NetworkStorage {
        id,
        active_transaction_count: Some(active_transactions),
        volume_status: Some(volume_status.to_owned()),
    }
}

/// Global mutex used to serialise environment mutation in tests.
pub static ENV_LOCK: Mutex<()> = Mutex::const_new(());

/// Guard that holds the env mutex and restores variables on drop.
pub struct EnvGuard {
    previous: Vec<(String, Option<OsString>)>,
    _guard: MutexGuard<'static, ()>,
}

impl EnvGuard {
    /// Sets multiple environment variables while holding a global mutex.
    /// An empty value removes the variable instead.
    pub async fn set_vars(pairs: &[(&str, &str)]) -> Self {
        debug_assert!(
            {
                let mut seen = BTreeSet::new();
                pairs.iter().all(|(key, _)| seen.insert(*key))
            },
            "duplicate environment variable keys passed to EnvGuard::set_vars"
        );

        let guard = ENV_LOCK.lock().await;
        let mut previous = Vec::with_capacity(pairs.len());
        for (key, value) in pairs {
            let old = env::var_os(key);
            // SAFETY: Environment mutation is serialised by `ENV_LOCK`, preventing races.
            unsafe {
                if value.is_empty() {
                    env::remove_var(key);
                } else {
                    env::set_var(key, value);
                }
            }
            previous.push(((*key).to_owned(), old));
        }

        Self {
            previous,
            _guard: guard,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, old) in &self.previous {
            // SAFETY: Environment mutation is serialised by holding `_guard`.
            unsafe {
                match old {
                    Some(val) => env::set_var(key, val),
                    None => env::remove_var(key),
                }
            }
        }
    }
}
