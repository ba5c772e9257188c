//! In-process test harness: a router over a `MockLedger` and a temporary
//! working directory, plus JSON request helpers.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use porta_api::{create_api_router, ApiConfig, AppState};
use porta_core::{Clock, FixedClock, SystemClock, Timestamp};
use porta_gateway::{AccessToken, AgentLedger, TOKEN_HEADER};
use porta_test_utils::MockLedger;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

pub const TEST_TOKEN: &str = "test-token-123";

pub struct TestApp {
    pub router: Router,
    pub store: MockLedger,
    pub workdir: TempDir,
}

impl TestApp {
    /// Authorization disabled.
    pub fn open() -> Self {
        Self::with_config(|_| {})
    }

    /// Authorization enabled with `TEST_TOKEN`.
    pub fn guarded() -> Self {
        Self::with_config(|config| config.token = AccessToken::new(TEST_TOKEN))
    }

    /// Authorization disabled, ledger clock pinned to `now`.
    pub fn at(now: Timestamp) -> Self {
        Self::build(Arc::new(FixedClock(now)), |_| {})
    }

    pub fn with_config(customize: impl FnOnce(&mut ApiConfig)) -> Self {
        Self::build(Arc::new(SystemClock), customize)
    }

    fn build(clock: Arc<dyn Clock>, customize: impl FnOnce(&mut ApiConfig)) -> Self {
        let workdir = TempDir::new().unwrap();
        let mut config = ApiConfig {
            workdir: workdir.path().to_path_buf(),
            static_dir: workdir.path().join("static"),
            public_url_file: workdir.path().join("ngrok.url"),
            command_timeout: Duration::from_secs(10),
            ..Default::default()
        };
        customize(&mut config);

        let store = MockLedger::new();
        let ledger = AgentLedger::with_clock(Arc::new(store.clone()), clock);
        let state = AppState::with_ledger(config, ledger);

        Self {
            router: create_api_router(state),
            store,
            workdir,
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            builder = builder.header(TOKEN_HEADER, token);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.post_with_token(uri, body, None).await
    }

    pub async fn post_with_token(
        &self,
        uri: &str,
        body: Value,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header(TOKEN_HEADER, token);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let (status, bytes) = self.send_raw(request).await;
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn send_raw(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }
}
