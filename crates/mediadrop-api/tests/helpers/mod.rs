//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p mediadrop-api`.

#![allow(dead_code)]

pub mod fixtures;
pub mod storage;

use axum_test::TestServer;
use mediadrop_api::setup::build_app;
use mediadrop_api::state::AppState;
use mediadrop_core::Config;
use std::path::Path;
use std::sync::Arc;
use storage::TestStorage;

/// Test application: server, state and owned resources.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub storage: TestStorage,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Canonical upload root, as reported in responses.
    pub fn upload_root(&self) -> &Path {
        self.state.store.root()
    }
}

/// Setup test app with an isolated upload root and default limits.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(|_| {}).await
}

/// Setup test app, letting the caller adjust the configuration first.
pub async fn setup_test_app_with<F>(customize: F) -> TestApp
where
    F: FnOnce(&mut Config),
{
    let storage = TestStorage::new();
    let mut config = Config::with_upload_dir(&storage.upload_dir);
    config.storage.export_dir = Some(storage.export_dir());
    customize(&mut config);

    let (state, router) = build_app(config).await.expect("Failed to build app");
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        state,
        storage,
    }
}
