use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use imghub_domain::config::AppConfig;
use imghub_server::{DOCS_PATH, Server};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

async fn server() -> (TempDir, Server) {
    let tmp = TempDir::new().unwrap();
    let mut cfg = AppConfig::default();
    cfg.storage.root = tmp.path().join("images");
    cfg.server.public_url = "https://img.example.com/".to_owned();
    let server = Server::builder().config(cfg).build().await.unwrap();
    (tmp, server)
}

async fn get(server: &Server, uri: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = server.router().oneshot(request).await.unwrap();
    let status = response.status();
    (status, response.into_body().collect().await.unwrap().to_bytes().to_vec())
}

#[tokio::test]
async fn test_build_creates_storage_root() {
    let (tmp, server) = server().await;

    assert!(tmp.path().join("images").is_dir());
    assert_eq!(server.state().images.public_url(), "https://img.example.com");
}

#[tokio::test]
async fn test_system_and_image_routes_are_mounted() {
    let (_tmp, server) = server().await;

    let (status, body) = get(&server, "/health").await;
    assert_eq!(status, StatusCode::OK);
    let health: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(health["status"], "up");

    let (status, body) = get(&server, "/images").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_slice::<Value>(&body).unwrap(), serde_json::json!({ "images": [] }));

    let (status, _) = get(&server, "/nothing-here.png").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stored_images_are_served_with_public_urls() {
    let (_tmp, server) = server().await;
    server.state().images.storage().save("/cats/cat.gif", b"GIF89a....").await.unwrap();

    let (status, body) = get(&server, "/cats/cat.gif").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"GIF89a....");

    let (_, body) = get(&server, "/images").await;
    let list: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(list["images"][0]["url"], "https://img.example.com/cats/cat.gif");
}

#[tokio::test]
async fn test_docs_are_served() {
    let (_tmp, server) = server().await;

    let (status, body) = get(&server, DOCS_PATH).await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8_lossy(&body).contains("imghub"));
}

#[tokio::test]
async fn test_invalid_configuration_fails_to_build() {
    let tmp = TempDir::new().unwrap();
    let mut cfg = AppConfig::default();
    cfg.storage.root = tmp.path().join("images");
    cfg.fetch.max_concurrent = 0;

    assert!(Server::builder().config(cfg).build().await.is_err());
}
