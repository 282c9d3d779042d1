//! Test doubles for the execution engine.
//!
//! [`ScriptedEngine`] is an in-memory engine: addresses, sources and
//! responses are scripted up front, every call is recorded, and lookup
//! counters let tests assert how often the harness actually reached out.

use super::{Address, EngineResponse, ExecutionEngine, SourceKind};
use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// A recorded `deploy` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeployRecord {
    pub target: Address,
    pub name: String,
    pub source: Option<String>,
}

/// A recorded `send` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SendRecord {
    pub source: String,
    pub signers: Vec<Address>,
}

#[derive(Default)]
struct Inner {
    base_path: Option<PathBuf>,
    contracts: HashMap<String, Address>,
    accounts: HashMap<String, Address>,
    sources: HashMap<(SourceKind, String), String>,
    failing_aliases: Vec<String>,
    contract_lookup_error: Option<String>,
    send_response: Option<EngineResponse>,
    read_only_result: Option<serde_json::Value>,
    contract_lookups: HashMap<String, usize>,
    account_lookups: HashMap<String, usize>,
    deploys: Vec<DeployRecord>,
    sends: Vec<SendRecord>,
    next_account: u64,
}

/// Scripted in-memory [`ExecutionEngine`].
///
/// Unknown aliases are assigned fresh sequential addresses, mirroring the
/// real engine's create-on-first-use behaviour. Unregistered sources are
/// synthesized so tests that only care about call recording need no setup.
#[derive(Default)]
pub struct ScriptedEngine {
    inner: Mutex<Inner>,
    lookup_delay: Option<Duration>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every address lookup, widening the window for tests that race
    /// concurrent resolutions against each other.
    pub fn with_lookup_delay(mut self, delay: Duration) -> Self {
        self.lookup_delay = Some(delay);
        self
    }

    /// Register a deployed contract address.
    pub fn with_contract(self, name: impl Into<String>, address: impl Into<Address>) -> Self {
        self.inner.lock().contracts.insert(name.into(), address.into());
        self
    }

    /// Register a known account address.
    pub fn with_account(self, alias: impl Into<String>, address: impl Into<Address>) -> Self {
        self.inner.lock().accounts.insert(alias.into(), address.into());
        self
    }

    /// Register a raw source file. Import templating replaces `0x{name}`
    /// placeholders with the mapped address, following the engine's source
    /// convention.
    pub fn with_source(
        self,
        kind: SourceKind,
        file: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        self.inner
            .lock()
            .sources
            .insert((kind, file.into()), source.into());
        self
    }

    /// Make account creation fail for `alias`.
    pub fn failing_account(self, alias: impl Into<String>) -> Self {
        self.inner.lock().failing_aliases.push(alias.into());
        self
    }

    /// Make every contract-address lookup return an error instead of `None`.
    pub fn failing_contract_lookups(self, message: impl Into<String>) -> Self {
        self.inner.lock().contract_lookup_error = Some(message.into());
        self
    }

    /// Script the response returned by `send`.
    pub fn respond_to_send(self, response: EngineResponse) -> Self {
        self.inner.lock().send_response = Some(response);
        self
    }

    /// Script the value returned by `execute_read_only`.
    pub fn respond_to_script(self, value: serde_json::Value) -> Self {
        self.inner.lock().read_only_result = Some(value);
        self
    }

    pub fn base_path(&self) -> Option<PathBuf> {
        self.inner.lock().base_path.clone()
    }

    pub fn contract_lookups(&self, name: &str) -> usize {
        self.inner.lock().contract_lookups.get(name).copied().unwrap_or(0)
    }

    pub fn account_lookups(&self, alias: &str) -> usize {
        self.inner.lock().account_lookups.get(alias).copied().unwrap_or(0)
    }

    pub fn deploys(&self) -> Vec<DeployRecord> {
        self.inner.lock().deploys.clone()
    }

    pub fn sends(&self) -> Vec<SendRecord> {
        self.inner.lock().sends.clone()
    }

    async fn delay(&self) {
        if let Some(delay) = self.lookup_delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl ExecutionEngine for ScriptedEngine {
    async fn init_workspace(&self, base_path: &Path) -> crate::Result<()> {
        self.inner.lock().base_path = Some(base_path.to_path_buf());
        Ok(())
    }

    async fn contract_address(&self, name: &str) -> crate::Result<Option<Address>> {
        self.delay().await;
        let mut inner = self.inner.lock();
        *inner.contract_lookups.entry(name.to_string()).or_default() += 1;
        if let Some(message) = &inner.contract_lookup_error {
            anyhow::bail!("{message}");
        }
        Ok(inner.contracts.get(name).cloned())
    }

    async fn account_address(&self, alias: &str) -> crate::Result<Address> {
        self.delay().await;
        let mut inner = self.inner.lock();
        *inner.account_lookups.entry(alias.to_string()).or_default() += 1;
        if inner.failing_aliases.iter().any(|a| a == alias) {
            anyhow::bail!("service account rejected alias '{alias}'");
        }
        if let Some(address) = inner.accounts.get(alias) {
            return Ok(address.clone());
        }
        inner.next_account += 1;
        let address = Address::new(format!("0x{:016x}", inner.next_account));
        inner.accounts.insert(alias.to_string(), address.clone());
        Ok(address)
    }

    async fn fetch_source(
        &self,
        kind: SourceKind,
        file: &str,
        imports: &IndexMap<String, Address>,
    ) -> crate::Result<String> {
        let inner = self.inner.lock();
        let mut source = inner
            .sources
            .get(&(kind, file.to_string()))
            .cloned()
            .unwrap_or_else(|| format!("// scripted {kind} source for {file}\n"));
        for (name, address) in imports {
            source = source.replace(&format!("0x{name}"), address.as_str());
        }
        Ok(source)
    }

    async fn deploy(
        &self,
        target: &Address,
        name: &str,
        _imports: &IndexMap<String, Address>,
        source: Option<&str>,
    ) -> crate::Result<EngineResponse> {
        let mut inner = self.inner.lock();
        inner.deploys.push(DeployRecord {
            target: target.clone(),
            name: name.to_string(),
            source: source.map(str::to_string),
        });
        inner.contracts.insert(name.to_string(), target.clone());
        Ok(EngineResponse::sealed(Some(target.clone())))
    }

    async fn send(&self, source: &str, signers: &[Address]) -> crate::Result<EngineResponse> {
        let mut inner = self.inner.lock();
        inner.sends.push(SendRecord {
            source: source.to_string(),
            signers: signers.to_vec(),
        });
        Ok(inner
            .send_response
            .clone()
            .unwrap_or_else(|| EngineResponse::sealed(None)))
    }

    async fn execute_read_only(&self, _source: &str) -> crate::Result<Option<serde_json::Value>> {
        Ok(self.inner.lock().read_only_result.clone())
    }
}
