//! Integration tests for `/write_file`, `/read_file` and `/list_dir`.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::json;

#[path = "support/app.rs"]
mod test_app;

use test_app::TestApp;

#[tokio::test]
async fn test_write_then_read_round_trip() {
    let app = TestApp::open();

    let (status, body) = app
        .post("/write_file", json!({"path": "foo/bar.txt", "content": "hi"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["message"].is_string());
    let written = app.workdir.path().join("foo/bar.txt");
    assert_eq!(body["path"], written.display().to_string());
    assert!(app.workdir.path().join("foo").is_dir());

    let (status, body) = app
        .post("/read_file", json!({"path": "foo/bar.txt"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "hi");
    assert!(body.get("agent_id").is_none());
}

#[tokio::test]
async fn test_write_overwrites_in_full() {
    let app = TestApp::open();
    app.post("/write_file", json!({"path": "note.txt", "content": "a much longer first draft"}))
        .await;
    app.post("/write_file", json!({"path": "note.txt", "content": "short"}))
        .await;

    let (_, body) = app.post("/read_file", json!({"path": "note.txt"})).await;
    assert_eq!(body["content"], "short");
}

#[tokio::test]
async fn test_invalid_paths_rejected() {
    let app = TestApp::open();
    for path in ["../escape.txt", "a/../../b.txt", "/etc/passwd", "/dev/null", "/sys/kernel"] {
        let (status, body) = app
            .post("/write_file", json!({"path": path, "content": "x"}))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "path {}", path);
        assert_eq!(body["code"], "INVALID_PATH");

        let (status, _) = app.post("/read_file", json!({"path": path})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "path {}", path);
    }
    assert!(!app.workdir.path().join("escape.txt").exists());
}

#[tokio::test]
async fn test_read_errors() {
    let app = TestApp::open();
    std::fs::create_dir(app.workdir.path().join("subdir")).unwrap();
    std::fs::write(app.workdir.path().join("blob.bin"), [0xFF, 0xFE, 0x00, 0x80]).unwrap();

    let (status, body) = app.post("/read_file", json!({"path": "missing.txt"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "File not found");

    let (status, body) = app.post("/read_file", json!({"path": "subdir"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "NOT_A_FILE");

    let (status, body) = app.post("/read_file", json!({"path": "blob.bin"})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "DECODE_ERROR");
}

#[tokio::test]
async fn test_list_dir_hidden_and_order() {
    let app = TestApp::open();
    let root = app.workdir.path();
    std::fs::create_dir(root.join("zeta")).unwrap();
    std::fs::create_dir(root.join("Alpha")).unwrap();
    std::fs::create_dir(root.join(".git")).unwrap();
    std::fs::write(root.join("b.txt"), "").unwrap();
    std::fs::write(root.join("A.md"), "").unwrap();
    std::fs::write(root.join(".env"), "").unwrap();

    let (status, body) = app.post("/list_dir", json!({"path": "."})).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Alpha", "zeta", "A.md", "b.txt"]);
    assert_eq!(body["entries"][0]["type"], "dir");
    assert_eq!(body["entries"][3]["type"], "file");

    let (_, body) = app
        .post("/list_dir", json!({"path": ".", "include_hidden": true}))
        .await;
    let names: Vec<&str> = body["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec![".git", "Alpha", "zeta", ".env", "A.md", "b.txt"]);
}

#[tokio::test]
async fn test_list_dir_errors() {
    let app = TestApp::open();
    std::fs::write(app.workdir.path().join("file.txt"), "x").unwrap();

    let (status, body) = app.post("/list_dir", json!({"path": "nope"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Directory not found");

    let (status, body) = app.post("/list_dir", json!({"path": "file.txt"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "NOT_A_DIRECTORY");

    let (status, body) = app.post("/list_dir", json!({"path": "/proc"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_PATH");
}

#[tokio::test]
async fn test_agent_id_echoed_and_recorded() {
    let app = TestApp::open();

    let (status, body) = app
        .post(
            "/write_file",
            json!({"path": "log.txt", "content": "entry", "agent_id": "writer"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["agent_id"], "writer");

    let (_, body) = app
        .post("/read_file", json!({"path": "log.txt", "agent_id": "writer"}))
        .await;
    assert_eq!(body["agent_id"], "writer");

    // A failed read is recorded too.
    app.post("/read_file", json!({"path": "missing", "agent_id": "writer"}))
        .await;

    let (_, body) = app
        .post("/agent/history", json!({"agent_id": "writer"}))
        .await;
    let ops = body["operations"].as_array().unwrap();
    assert_eq!(ops.len(), 3);
    assert_eq!(ops[0]["operation_type"], "read_file");
    assert_eq!(ops[0]["success"], false);
    assert_eq!(ops[2]["operation_type"], "write_file");
    assert_eq!(ops[2]["detail"]["bytes"], 5);
}

#[tokio::test]
async fn test_blank_agent_id_not_recorded() {
    let app = TestApp::open();
    let (status, body) = app
        .post(
            "/write_file",
            json!({"path": "x.txt", "content": "", "agent_id": "  "}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("agent_id").is_none());
    assert_eq!(app.store.operation_count().unwrap(), 0);
    assert_eq!(app.store.agent_count().unwrap(), 0);
}

#[tokio::test]
async fn test_malformed_body_is_invalid_input() {
    let app = TestApp::open();

    let request = Request::builder()
        .method("POST")
        .uri("/read_file")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");

    let (status, body) = app.post("/write_file", json!({"path": "x.txt"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");
}
