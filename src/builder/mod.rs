//! Deferred resource builders.
//!
//! Everything in this module is a pure value holder: templates capture file
//! identifiers, import maps, substitutions and signers, and none of the
//! setters perform I/O. All deferred work (name resolution, source fetching,
//! submission) happens when the [`Harness`](crate::Harness) materializes a
//! template.

pub mod account;
pub mod contract;
pub mod script;
pub mod transaction;

pub use account::Account;
pub use contract::ContractTemplate;
pub use script::ScriptTemplate;
pub use transaction::TransactionTemplate;

use crate::engine::Address;
use crate::resolver::AddressResolver;
use crate::HarnessError;
use futures_util::future::{BoxFuture, Shared};
use futures_util::FutureExt;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// An address value that has not been produced yet.
///
/// The future is boxed and shared: templates are re-submittable, and each
/// submission re-awaits the pending value instead of consuming it.
#[derive(Clone)]
pub struct DeferredAddress {
    inner: Shared<BoxFuture<'static, Result<Address, Arc<anyhow::Error>>>>,
}

impl DeferredAddress {
    pub fn new<F>(fut: F) -> Self
    where
        F: Future<Output = crate::Result<Address>> + Send + 'static,
    {
        Self {
            inner: fut.map(|r| r.map_err(Arc::new)).boxed().shared(),
        }
    }

    pub(crate) async fn wait(&self) -> crate::Result<Address> {
        self.inner
            .clone()
            .await
            .map_err(|e| HarnessError::UnresolvedDependency(e.to_string()).into())
    }
}

impl fmt::Debug for DeferredAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DeferredAddress(..)")
    }
}

/// An import-map or signer value: a concrete address, a symbolic alias
/// resolved at submission time, or a still-pending address.
#[derive(Clone, Debug)]
pub enum AddressRef {
    Address(Address),
    Alias(String),
    Deferred(DeferredAddress),
}

impl AddressRef {
    pub fn alias(name: impl Into<String>) -> Self {
        AddressRef::Alias(name.into())
    }

    pub(crate) async fn resolve(&self, resolver: &AddressResolver) -> crate::Result<Address> {
        match self {
            AddressRef::Address(address) => Ok(address.clone()),
            AddressRef::Alias(name) => resolver.resolve(name).await,
            AddressRef::Deferred(deferred) => deferred.wait().await,
        }
    }
}

impl From<Address> for AddressRef {
    fn from(address: Address) -> Self {
        AddressRef::Address(address)
    }
}

impl From<DeferredAddress> for AddressRef {
    fn from(deferred: DeferredAddress) -> Self {
        AddressRef::Deferred(deferred)
    }
}

impl From<&str> for AddressRef {
    fn from(name: &str) -> Self {
        AddressRef::Alias(name.to_string())
    }
}

impl From<String> for AddressRef {
    fn from(name: String) -> Self {
        AddressRef::Alias(name)
    }
}

impl From<&Account> for AddressRef {
    /// A resolved account contributes its address directly; an unresolved
    /// one falls back to alias resolution at submission time.
    fn from(account: &Account) -> Self {
        match account.try_address() {
            Some(address) => AddressRef::Address(address.clone()),
            None => AddressRef::Alias(account.alias().to_string()),
        }
    }
}
