//! The execution-engine contract and the wire types shared with it.
//!
//! The engine is a black box: it owns source fetching, import templating,
//! account creation and the actual submission transport. The harness only
//! orchestrates calls into it, so everything here is a trait object seam
//! plus the response shapes the engine's convention dictates.

pub mod testutils;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Status code the engine assigns to a successfully finalized submission.
pub const STATUS_SEALED: u32 = 4;

/// Opaque identifier for a deployed account or contract.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(addr: &str) -> Self {
        Self(addr.to_string())
    }
}

impl From<String> for Address {
    fn from(addr: String) -> Self {
        Self(addr)
    }
}

/// Which template catalogue a source file is fetched from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Contract,
    Transaction,
    Script,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SourceKind::Contract => "contract",
            SourceKind::Transaction => "transaction",
            SourceKind::Script => "script",
        };
        f.write_str(s)
    }
}

/// Outcome of a deployment or transaction submission.
///
/// The field shapes are the engine's convention and pass through the harness
/// verbatim: an empty `error_message` signals success (not a boolean), and
/// `status` keeps the engine's numbering, where [`STATUS_SEALED`] marks a
/// finalized submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineResponse {
    pub error_message: String,
    pub status: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
}

impl EngineResponse {
    /// Sealed response with no error text, as the engine reports success.
    pub fn sealed(address: Option<Address>) -> Self {
        Self {
            error_message: String::new(),
            status: STATUS_SEALED,
            address,
        }
    }
}

/// The external execution engine, as consumed by the harness.
///
/// `init_workspace` must be called once before any other method; the
/// [`Harness`](crate::Harness) constructor takes care of it. Errors returned
/// by these methods carry the engine's own payload and are surfaced to the
/// caller unchanged.
#[async_trait]
pub trait ExecutionEngine: Send + Sync {
    /// Point the engine at the directory holding contract/transaction/script
    /// source files. Process-wide, called once.
    async fn init_workspace(&self, base_path: &Path) -> crate::Result<()>;

    /// Look up the address of a deployed contract, `None` if unknown.
    async fn contract_address(&self, name: &str) -> crate::Result<Option<Address>>;

    /// Look up the address registered for `alias`, creating the account on
    /// first use.
    async fn account_address(&self, alias: &str) -> crate::Result<Address>;

    /// Fetch the source file for `file` from the `kind` catalogue, with each
    /// import name in `imports` templated to its address.
    async fn fetch_source(
        &self,
        kind: SourceKind,
        file: &str,
        imports: &IndexMap<String, Address>,
    ) -> crate::Result<String>;

    /// Deploy a contract to `target`. When `source` is given it is submitted
    /// as-is; otherwise the engine fetches and templates it from `name`.
    async fn deploy(
        &self,
        target: &Address,
        name: &str,
        imports: &IndexMap<String, Address>,
        source: Option<&str>,
    ) -> crate::Result<EngineResponse>;

    /// Submit a transaction signed by `signers`, in order. An empty signer
    /// list is an unsigned submission.
    async fn send(&self, source: &str, signers: &[Address]) -> crate::Result<EngineResponse>;

    /// Execute a read-only script and return its result, if any.
    async fn execute_read_only(&self, source: &str) -> crate::Result<Option<serde_json::Value>>;
}
