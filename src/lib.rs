//! Declarative test harness for Flow smart contracts and transactions.
//!
//! Test code describes contracts, transactions, scripts and accounts as
//! lazily-resolved templates, lets the harness resolve symbolic names to
//! runtime addresses on demand, and submits the assembled program to an
//! external execution engine, asserting on the outcome.
//!
//! Sub-modules:
//! - [`engine`]    — The execution-engine contract and shared wire types.
//! - [`resolver`]  — Memoizing, deduplicating name→address resolution.
//! - [`builder`]   — Account handles and contract/transaction/script templates.
//! - [`harness`]   — Public façade; materializes templates and submits them.
//! - [`emulator`]  — Local emulator process supervisor and its event stream.
//! - [`config`]    — Workspace and emulator configuration.

pub mod builder;
pub mod config;
pub mod emulator;
pub mod engine;
pub mod harness;
pub mod resolver;

pub use builder::{Account, AddressRef, ContractTemplate, DeferredAddress, ScriptTemplate, TransactionTemplate};
pub use config::{EmulatorConfig, HarnessConfig};
pub use emulator::{Emulator, EmulatorEvent, EmulatorEvents, EmulatorState};
pub use engine::{Address, EngineResponse, ExecutionEngine, SourceKind, STATUS_SEALED};
pub use harness::Harness;
pub use resolver::AddressResolver;

use thiserror::Error;

/// Typed failures produced by the harness itself.
///
/// Engine failures are deliberately absent: whatever the execution engine
/// rejects with is propagated to the caller unchanged, never rewrapped.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Neither the contract nor the account lookup produced an address.
    #[error("unable to resolve '{0}' to a contract or account address")]
    NameNotResolved(String),

    /// A deployment targeted an account handle whose address was never resolved.
    #[error("account '{0}' has no resolved address")]
    UnresolvedAccount(String),

    /// A deferred address in a template rejected instead of settling.
    #[error("deferred address failed to settle: {0}")]
    UnresolvedDependency(String),

    /// The account-creation primitive rejected the alias.
    #[error("failed to create account '{alias}': {reason}")]
    AccountCreationFailed { alias: String, reason: String },

    /// `start` was called while an emulator process is already live.
    #[error("emulator is already running")]
    EmulatorRunning,
}

/// Crate-wide result type.
pub type Result<T> = anyhow::Result<T>;
