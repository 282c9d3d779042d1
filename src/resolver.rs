//! Memoizing name→address resolution.
//!
//! A symbolic name is tried as a deployed contract first and as an account
//! alias second. The first successful resolution is cached for the life of
//! the resolver; concurrent calls for the same name share one in-flight
//! lookup instead of racing duplicates against the engine.

use crate::engine::{Address, ExecutionEngine};
use crate::HarnessError;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;

/// Deduplicating, write-once cache of symbolic name resolutions.
///
/// Construct one per test (or share one deliberately) and hand it to the
/// [`Harness`](crate::Harness); there is no process-wide instance, so cached
/// addresses cannot leak across otherwise hermetic tests.
pub struct AddressResolver {
    engine: Arc<dyn ExecutionEngine>,
    cache: Mutex<HashMap<String, Arc<OnceCell<Address>>>>,
}

impl AddressResolver {
    pub fn new(engine: Arc<dyn ExecutionEngine>) -> Self {
        Self {
            engine,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve `name` to an address, consulting the engine at most once per
    /// name for the resolver's lifetime.
    ///
    /// The per-name cell admits a single initializer; a second concurrent
    /// call parks on the same in-flight lookup and observes its value. A
    /// failed resolution leaves the cell empty, so a later call retries:
    /// resolution commonly precedes the deployment that makes it succeed.
    pub async fn resolve(&self, name: &str) -> crate::Result<Address> {
        let cell = {
            let mut cache = self.cache.lock();
            cache.entry(name.to_string()).or_default().clone()
        };
        cell.get_or_try_init(|| self.lookup(name)).await.cloned()
    }

    async fn lookup(&self, name: &str) -> crate::Result<Address> {
        match self.engine.contract_address(name).await {
            Ok(Some(address)) => {
                debug!(%name, %address, "resolved as contract");
                return Ok(address);
            }
            Ok(None) => debug!(%name, "no contract by that name, trying accounts"),
            Err(e) => debug!(%name, error = %e, "contract lookup failed, trying accounts"),
        }
        match self.engine.account_address(name).await {
            Ok(address) => {
                debug!(%name, %address, "resolved as account");
                Ok(address)
            }
            Err(e) => {
                debug!(%name, error = %e, "account lookup failed");
                Err(HarnessError::NameNotResolved(name.to_string()).into())
            }
        }
    }
}
