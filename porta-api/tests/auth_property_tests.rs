//! Property-Based Tests for Token Access Control
//!
//! With a token configured, every non-public route answers 401 unless the
//! request carries exactly that token. Missing and wrong tokens share the
//! status and differ in error code. Without a configured token nothing is
//! checked.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use porta_gateway::TOKEN_HEADER;
use proptest::prelude::*;

#[path = "support/app.rs"]
mod test_app;

use test_app::{TestApp, TEST_TOKEN};

// ============================================================================
// FIXED MATRIX
// ============================================================================

#[tokio::test]
async fn test_missing_token_rejected() {
    let app = TestApp::guarded();
    let (status, body) = app.get("/meta", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
    assert_eq!(body["error"], "Missing X-PORTA-TOKEN header");
}

#[tokio::test]
async fn test_empty_token_counts_as_missing() {
    let app = TestApp::guarded();
    let (status, body) = app.get("/meta", Some("")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_wrong_token_rejected_with_distinct_code() {
    let app = TestApp::guarded();
    let (status, body) = app.get("/meta", Some("not-the-token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_TOKEN");
    assert_eq!(body["error"], "Invalid token");
}

#[tokio::test]
async fn test_correct_token_accepted() {
    let app = TestApp::guarded();
    let (status, body) = app.get("/meta", Some(TEST_TOKEN)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["security"], "X-PORTA-TOKEN authentication enabled");
}

#[tokio::test]
async fn test_header_name_is_case_insensitive() {
    let app = TestApp::guarded();
    let request = Request::builder()
        .uri("/meta")
        .header("X-PORTA-TOKEN", TEST_TOKEN)
        .body(Body::empty())
        .unwrap();
    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_post_routes_guarded() {
    let app = TestApp::guarded();
    let body = serde_json::json!({"cmd": "echo hi"});

    let (status, _) = app.post("/run_bash", body.clone()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, json) = app
        .post_with_token("/run_bash", body, Some(TEST_TOKEN))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["stdout"], "hi");
}

#[tokio::test]
async fn test_rejected_request_never_executes() {
    let app = TestApp::guarded();
    let marker = app.workdir.path().join("marker.txt");
    let body = serde_json::json!({"cmd": format!("touch {}", marker.display()), "agent_id": "bot"});

    let (status, _) = app.post_with_token("/run_bash", body, Some("wrong")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(!marker.exists());
    assert_eq!(app.store.operation_count().unwrap(), 0);
}

#[tokio::test]
async fn test_metrics_guarded() {
    let app = TestApp::guarded();
    let (status, _) = app.get("/metrics", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/metrics")
        .header(TOKEN_HEADER, TEST_TOKEN)
        .body(Body::empty())
        .unwrap();
    let (status, bytes) = app.send_raw(request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8_lossy(&bytes).contains("porta_"));
}

#[tokio::test]
async fn test_static_assets_are_public() {
    let app = TestApp::guarded();
    let static_dir = app.workdir.path().join("static");
    std::fs::create_dir_all(&static_dir).unwrap();
    std::fs::write(static_dir.join("app.js"), "console.log(1);").unwrap();

    let request = Request::builder()
        .uri("/static/app.js")
        .body(Body::empty())
        .unwrap();
    let (status, bytes) = app.send_raw(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"console.log(1);");
}

#[tokio::test]
async fn test_prefix_lookalike_is_not_public() {
    let app = TestApp::guarded();
    let (status, _) = app.get("/staticfoo", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_disabled_auth_accepts_everything() {
    let app = TestApp::open();
    let (status, body) = app.get("/meta", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["security"], "authentication disabled");

    let (status, _) = app.get("/meta", Some("anything")).await;
    assert_eq!(status, StatusCode::OK);
}

// ============================================================================
// PROPERTIES
// ============================================================================

fn route_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("/"),
        Just("/meta"),
        Just("/public_url"),
        Just("/metrics"),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Any presented token other than the configured one is rejected.
    #[test]
    fn prop_wrong_token_always_rejected(
        token in "[A-Za-z0-9_.-]{1,48}",
        route in route_strategy(),
    ) {
        prop_assume!(token != TEST_TOKEN);

        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let app = TestApp::guarded();
            let (status, body) = app.get(route, Some(&token)).await;
            prop_assert_eq!(status, StatusCode::UNAUTHORIZED);
            prop_assert_eq!(body["code"].as_str(), Some("INVALID_TOKEN"));
            Ok(())
        })?;
    }

    /// The configured token opens every guarded GET route.
    #[test]
    fn prop_correct_token_always_accepted(route in route_strategy()) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let app = TestApp::guarded();
            let (status, _) = app.get(route, Some(TEST_TOKEN)).await;
            prop_assert_eq!(status, StatusCode::OK);
            Ok(())
        })?;
    }
}
