//! Public façade; materializes templates and submits them to the engine.
//!
//! This is the only place deferred fields are turned into concrete values:
//! import maps and signer lists are settled concurrently, source is fetched
//! and templated in two phases (import names first, literal substitutions
//! second), and the final program goes to the engine. Responses come back
//! in the engine's own shape, untouched.

use crate::builder::{Account, AddressRef, ContractTemplate, ScriptTemplate, TransactionTemplate};
use crate::config::HarnessConfig;
use crate::engine::{Address, EngineResponse, ExecutionEngine, SourceKind};
use crate::resolver::AddressResolver;
use crate::HarnessError;
use futures_util::future;
use indexmap::IndexMap;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Coordinates the resolver, the builders and the execution engine.
pub struct Harness {
    engine: Arc<dyn ExecutionEngine>,
    resolver: Arc<AddressResolver>,
}

impl Harness {
    /// Initialise the engine's workspace at `base_path` and build a harness
    /// with a fresh resolver.
    pub async fn init(
        engine: Arc<dyn ExecutionEngine>,
        base_path: impl AsRef<Path>,
    ) -> crate::Result<Self> {
        engine.init_workspace(base_path.as_ref()).await?;
        let resolver = Arc::new(AddressResolver::new(engine.clone()));
        Ok(Self { engine, resolver })
    }

    /// Initialise from a loaded [`HarnessConfig`].
    pub async fn from_config(
        engine: Arc<dyn ExecutionEngine>,
        config: &HarnessConfig,
    ) -> crate::Result<Self> {
        Self::init(engine, &config.base_path).await
    }

    /// Build a harness over an already-initialised engine, sharing an
    /// externally owned resolver.
    pub fn with_resolver(engine: Arc<dyn ExecutionEngine>, resolver: Arc<AddressResolver>) -> Self {
        Self { engine, resolver }
    }

    pub fn resolver(&self) -> &Arc<AddressResolver> {
        &self.resolver
    }

    /// Create (or look up) the account registered under `alias` and return a
    /// fully resolved handle.
    #[tracing::instrument(skip(self))]
    pub async fn create_account(&self, alias: &str) -> crate::Result<Account> {
        let address = self.engine.account_address(alias).await.map_err(|e| {
            HarnessError::AccountCreationFailed {
                alias: alias.to_string(),
                reason: e.to_string(),
            }
        })?;
        info!(%alias, %address, "account created");
        Ok(Account::resolved(alias, address))
    }

    /// Deploy `contract` to `account`.
    ///
    /// The account must already be resolved; every import value is settled
    /// before the source is fetched and templated.
    #[tracing::instrument(skip_all, fields(contract = contract.file(), account = account.alias()))]
    pub async fn deploy(
        &self,
        account: &Account,
        contract: &ContractTemplate,
    ) -> crate::Result<EngineResponse> {
        let target = account.address()?.clone();
        let imports = self.settle_imports(contract.imports()).await?;
        let source = self
            .engine
            .fetch_source(SourceKind::Contract, contract.file(), &imports)
            .await?;
        let source = apply_substitutions(source, contract.substitutions());
        info!(target = %target, "deploying contract");
        self.engine
            .deploy(&target, contract.file(), &imports, Some(&source))
            .await
    }

    /// Submit `transaction`, settling imports and signers concurrently.
    ///
    /// An empty signer list is a valid unsigned submission. Engine
    /// rejections (missing signature, sealing failure, ...) are returned to
    /// the caller as-is; the harness never retries.
    #[tracing::instrument(skip_all, fields(transaction = transaction.file()))]
    pub async fn send(&self, transaction: &TransactionTemplate) -> crate::Result<EngineResponse> {
        let (imports, signers) = future::try_join(
            self.settle_imports(transaction.imports()),
            self.settle_signers(transaction.signers()),
        )
        .await?;
        let source = self
            .engine
            .fetch_source(SourceKind::Transaction, transaction.file(), &imports)
            .await?;
        let source = apply_substitutions(source, transaction.substitutions());
        info!(signers = signers.len(), "sending transaction");
        self.engine.send(&source, &signers).await
    }

    /// Execute the read-only `script` and return its result, if any.
    #[tracing::instrument(skip_all, fields(script = script.file()))]
    pub async fn execute(&self, script: &ScriptTemplate) -> crate::Result<Option<serde_json::Value>> {
        let imports = self.settle_imports(script.imports()).await?;
        let source = self
            .engine
            .fetch_source(SourceKind::Script, script.file(), &imports)
            .await?;
        let source = apply_substitutions(source, script.substitutions());
        self.engine.execute_read_only(&source).await
    }

    /// One-shot deployment of the contract file `name` with no imports or
    /// substitutions. Convenience adapter over [`deploy`](Self::deploy).
    pub async fn deploy_by_name(
        &self,
        account: &Account,
        name: &str,
    ) -> crate::Result<EngineResponse> {
        self.deploy(account, &ContractTemplate::new(name)).await
    }

    /// One-shot submission of the transaction file `file` signed by
    /// `signers`. Convenience adapter over [`send`](Self::send).
    pub async fn send_by_name<I, A>(&self, file: &str, signers: I) -> crate::Result<EngineResponse>
    where
        I: IntoIterator<Item = A>,
        A: Into<AddressRef>,
    {
        self.send(&TransactionTemplate::new(file).with_signers(signers))
            .await
    }

    async fn settle_imports(
        &self,
        imports: &IndexMap<String, AddressRef>,
    ) -> crate::Result<IndexMap<String, Address>> {
        let resolved =
            future::try_join_all(imports.values().map(|addr| addr.resolve(&self.resolver))).await?;
        Ok(imports.keys().cloned().zip(resolved).collect())
    }

    async fn settle_signers(&self, signers: &[AddressRef]) -> crate::Result<Vec<Address>> {
        future::try_join_all(signers.iter().map(|addr| addr.resolve(&self.resolver))).await
    }
}

/// Apply literal substitutions to already import-templated source.
///
/// Substitutions run in map insertion order, each replacing the first
/// occurrence of its key exactly once, with no recursive re-scan. Running
/// after import templating lets a substitution target text an address
/// interpolation just produced.
fn apply_substitutions(mut source: String, substitutions: &IndexMap<String, String>) -> String {
    for (from, to) in substitutions {
        source = source.replacen(from, to, 1);
    }
    source
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subs<const N: usize>(pairs: [(&str, &str); N]) -> IndexMap<String, String> {
        pairs
            .into_iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect()
    }

    #[test]
    fn substitutions_apply_once_in_insertion_order() {
        // The second key targets text introduced by the first.
        let out = apply_substitutions(
            "let x = PLACEHOLDER".to_string(),
            &subs([("PLACEHOLDER", "getAccount(0x01)"), ("getAccount(0x01)", "getAccount(0xBEEF)")]),
        );
        assert_eq!(out, "let x = getAccount(0xBEEF)");
    }

    #[test]
    fn substitutions_replace_only_the_first_occurrence() {
        let out = apply_substitutions(
            "a b a".to_string(),
            &subs([("a", "z")]),
        );
        assert_eq!(out, "z b a");
    }

    #[test]
    fn substitutions_do_not_rescan_their_own_output() {
        // "x" -> "xx" must not cascade.
        let out = apply_substitutions("x".to_string(), &subs([("x", "xx")]));
        assert_eq!(out, "xx");
    }
}
