//! Shared fixtures for integration tests.
#![allow(dead_code)] // Each test binary uses a different subset.

use flow_testing::engine::testutils::ScriptedEngine;
use flow_testing::Harness;
use std::sync::Arc;

pub const BASE_PATH: &str = "./cadence";

/// Initialise a harness over a scripted engine, keeping a handle to the
/// engine for call-recording assertions.
pub async fn harness_over(engine: ScriptedEngine) -> (Harness, Arc<ScriptedEngine>) {
    let engine = Arc::new(engine);
    let harness = Harness::init(engine.clone(), BASE_PATH)
        .await
        .expect("workspace init failed");
    (harness, engine)
}
