//! Deployment and transaction submission through the harness façade.

mod common;

use common::{harness_over, BASE_PATH};
use flow_testing::engine::testutils::ScriptedEngine;
use flow_testing::{
    Account, Address, ContractTemplate, DeferredAddress, EngineResponse, HarnessError,
    ScriptTemplate, SourceKind, TransactionTemplate, STATUS_SEALED,
};
use serde_json::json;
use std::path::PathBuf;
use std::time::Duration;

#[tokio::test]
async fn init_points_the_engine_at_the_workspace() {
    let (_harness, engine) = harness_over(ScriptedEngine::new()).await;
    assert_eq!(engine.base_path(), Some(PathBuf::from(BASE_PATH)));
}

#[tokio::test]
async fn deploy_submits_templated_source_to_the_target_account() {
    let engine = ScriptedEngine::new().with_source(
        SourceKind::Contract,
        "Marketplace",
        "import FungibleToken from 0xFungibleToken\npub contract Marketplace {}\n",
    );
    let (harness, engine) = harness_over(engine).await;

    let alice = harness.create_account("Alice").await.unwrap();
    let token = harness.create_account("TokenHolder").await.unwrap();

    let contract = ContractTemplate::new("Marketplace")
        .with_imports([("FungibleToken", &token)]);
    let result = harness.deploy(&alice, &contract).await.unwrap();

    assert_eq!(result.error_message, "");
    assert_eq!(result.status, STATUS_SEALED);

    let deploys = engine.deploys();
    assert_eq!(deploys.len(), 1);
    assert_eq!(&deploys[0].target, alice.address().unwrap());
    assert_eq!(deploys[0].name, "Marketplace");
    let source = deploys[0].source.as_deref().unwrap();
    assert!(source.contains(&format!(
        "import FungibleToken from {}",
        token.address().unwrap()
    )));
}

#[tokio::test]
async fn deploying_to_an_unresolved_account_fails_fast() {
    let (harness, engine) = harness_over(ScriptedEngine::new()).await;

    let ghost = Account::named("Ghost");
    let err = harness
        .deploy(&ghost, &ContractTemplate::new("HelloWorld"))
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<HarnessError>(),
        Some(HarnessError::UnresolvedAccount(alias)) if alias == "Ghost"
    ));
    assert!(engine.deploys().is_empty());
}

#[tokio::test]
async fn pending_signers_are_settled_before_submission() {
    let (harness, engine) = harness_over(ScriptedEngine::new()).await;

    let (tx, rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        let _ = tx.send(Address::new("0xABC"));
    });
    let pending = DeferredAddress::new(async move { Ok(rx.await?) });

    let transaction = TransactionTemplate::new("transfer").with_signers([pending]);
    let result = harness.send(&transaction).await.unwrap();

    assert_eq!(result.error_message, "");
    let sends = engine.sends();
    assert_eq!(sends.len(), 1);
    assert_eq!(sends[0].signers, [Address::new("0xABC")]);
}

#[tokio::test]
async fn templates_are_resubmittable() {
    let (harness, engine) = harness_over(ScriptedEngine::new()).await;

    let pending = DeferredAddress::new(async { Ok(Address::new("0xABC")) });
    let transaction = TransactionTemplate::new("transfer").with_signers([pending]);

    harness.send(&transaction).await.unwrap();
    harness.send(&transaction).await.unwrap();

    let sends = engine.sends();
    assert_eq!(sends.len(), 2);
    assert_eq!(sends[0].signers, sends[1].signers);
}

#[tokio::test]
async fn unsigned_submissions_are_valid() {
    let (harness, engine) = harness_over(ScriptedEngine::new()).await;

    let result = harness
        .send(&TransactionTemplate::new("tick"))
        .await
        .unwrap();

    assert_eq!(result.error_message, "");
    assert!(engine.sends()[0].signers.is_empty());
}

#[tokio::test]
async fn rejected_deferred_values_abort_the_submission() {
    let (harness, engine) = harness_over(ScriptedEngine::new()).await;

    let poisoned = DeferredAddress::new(async { anyhow::bail!("key service offline") });
    let transaction = TransactionTemplate::new("transfer").with_signers([poisoned]);

    let err = harness.send(&transaction).await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<HarnessError>(),
        Some(HarnessError::UnresolvedDependency(reason)) if reason.contains("key service offline")
    ));
    assert!(engine.sends().is_empty());
}

#[tokio::test]
async fn engine_rejections_pass_through_verbatim() {
    let rejection = EngineResponse {
        error_message: "missing signature for authorizer 0x01".to_string(),
        status: 1,
        address: None,
    };
    let (harness, _engine) =
        harness_over(ScriptedEngine::new().respond_to_send(rejection.clone())).await;

    let result = harness
        .send(&TransactionTemplate::new("transfer"))
        .await
        .unwrap();

    // The engine's convention survives untouched: no translation to a
    // boolean, no reinterpretation of the status code.
    assert_eq!(result, rejection);
}

#[tokio::test]
async fn literal_substitutions_run_after_import_templating() {
    let engine = ScriptedEngine::new().with_source(
        SourceKind::Transaction,
        "setup",
        "import NFT from 0xNFT\nlet collector = getAccount(0x01)\n",
    );
    let (harness, engine) = harness_over(engine).await;
    let nft = harness.create_account("NFT").await.unwrap();

    let transaction = TransactionTemplate::new("setup")
        .with_imports([("NFT", &nft)])
        .with_substitutions([("getAccount(0x01)", "getAccount(0xBEEF)")]);
    harness.send(&transaction).await.unwrap();

    let source = engine.sends()[0].source.clone();
    assert_eq!(source.matches("getAccount(0xBEEF)").count(), 1);
    assert!(!source.contains("getAccount(0x01)"));
    assert!(source.contains(&format!("import NFT from {}", nft.address().unwrap())));
}

#[tokio::test]
async fn account_creation_failures_are_typed() {
    let (harness, _engine) = harness_over(ScriptedEngine::new().failing_account("Eve")).await;

    let err = harness.create_account("Eve").await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<HarnessError>(),
        Some(HarnessError::AccountCreationFailed { alias, .. }) if alias == "Eve"
    ));
}

#[tokio::test]
async fn scripts_execute_read_only() {
    let engine = ScriptedEngine::new().respond_to_script(json!("0.00000000"));
    let (harness, _engine) = harness_over(engine).await;

    let script = ScriptTemplate::new("get-balance").with_imports([("FungibleToken", "FTOwner")]);
    let result = harness.execute(&script).await.unwrap();

    assert_eq!(result, Some(json!("0.00000000")));
}

#[tokio::test]
async fn deploy_by_name_matches_the_template_path() {
    let (harness, engine) = harness_over(ScriptedEngine::new()).await;
    let alice = harness.create_account("Alice").await.unwrap();

    let result = harness.deploy_by_name(&alice, "HelloWorld").await.unwrap();

    assert_eq!(result.error_message, "");
    assert_eq!(engine.deploys()[0].name, "HelloWorld");
}

#[tokio::test]
async fn send_by_name_signs_with_resolved_aliases() {
    let (harness, engine) = harness_over(ScriptedEngine::new()).await;
    let alice = harness.create_account("Alice").await.unwrap();

    harness.send_by_name("transfer", [&alice]).await.unwrap();

    assert_eq!(engine.sends()[0].signers, [alice.address().unwrap().clone()]);
}
