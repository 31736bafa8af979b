//! Tests for the plain HTTP surface, served through the full router

use axum_test::TestServer;
use relay::config::RelayConfig;
use relay::server::RelayServerBuilder;
use std::path::Path;

fn create_test_server(dir: &Path) -> TestServer {
    let app = RelayServerBuilder::new()
        .with_config(RelayConfig {
            static_dir: dir.to_path_buf(),
            ..Default::default()
        })
        .build()
        .expect("Failed to build app");

    TestServer::try_new(app).expect("Failed to create test server")
}

#[tokio::test]
async fn test_root_and_index_serve_page() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<p>hello</p>").unwrap();
    let server = create_test_server(dir.path());

    for path in ["/", "/index.html"] {
        let response = server.get(path).await;
        response.assert_status_ok();
        assert_eq!(response.text(), "<p>hello</p>");
    }
}

#[tokio::test]
async fn test_page_is_reread_on_every_request() {
    let dir = tempfile::tempdir().unwrap();
    let index = dir.path().join("index.html");
    let server = create_test_server(dir.path());

    std::fs::write(&index, "v1").unwrap();
    assert_eq!(server.get("/").await.text(), "v1");

    std::fs::write(&index, "v2").unwrap();
    assert_eq!(server.get("/").await.text(), "v2");
}

#[tokio::test]
async fn test_missing_page_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let server = create_test_server(dir.path());

    let response = server.get("/").await;
    response.assert_status_not_found();
    assert_eq!(response.text(), "File not found");
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "x").unwrap();
    let server = create_test_server(dir.path());

    let response = server.get("/admin").await;
    response.assert_status_not_found();
    assert_eq!(response.text(), "Not found");
}

#[tokio::test]
async fn test_post_to_root_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "x").unwrap();
    let server = create_test_server(dir.path());

    let response = server.post("/").await;
    response.assert_status_not_found();
    assert_eq!(response.text(), "Not found");
}
