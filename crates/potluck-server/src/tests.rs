use std::{path::PathBuf, sync::Arc};

use axum::{
  body::Body,
  http::{Request, StatusCode, header},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use potluck_core::store::Directory;
use potluck_store_sqlite::SqliteStore;
use serde_json::Value;
use tower::ServiceExt as _;

use super::*;

fn config() -> ServerConfig {
  ServerConfig {
    host:                "127.0.0.1".to_string(),
    port:                0,
    store_path:          PathBuf::from(":memory:"),
    admin_username:      None,
    admin_password_hash: None,
    cors_origins:        vec![],
  }
}

async fn body_json(resp: axum::response::Response) -> Value {
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  serde_json::from_slice(&bytes).unwrap()
}

// ── Configuration ─────────────────────────────────────────────────────────────

#[test]
fn config_file_fills_defaults() {
  let toml = r#"
    store_path   = "~/.local/share/potluck/potluck.db"
    cors_origins = ["https://potluck.example"]
  "#;
  let cfg: ServerConfig = config::Config::builder()
    .add_source(config::File::from_str(toml, config::FileFormat::Toml))
    .build()
    .unwrap()
    .try_deserialize()
    .unwrap();

  assert_eq!(cfg.host, "127.0.0.1");
  assert_eq!(cfg.port, 8080);
  assert_eq!(cfg.cors_origins, vec!["https://potluck.example".to_string()]);
  assert!(cfg.admin_username.is_none());
}

#[test]
fn config_requires_store_path() {
  let result = config::Config::builder()
    .add_source(config::File::from_str("port = 9000", config::FileFormat::Toml))
    .build()
    .unwrap()
    .try_deserialize::<ServerConfig>();
  assert!(result.is_err());
}

// ── Router ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_and_api_are_mounted() {
  let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
  let router = app(store, &config()).unwrap();

  let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
  let resp = router.clone().oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(body_json(resp).await["status"], "ok");

  let req = Request::builder().uri("/categories").body(Body::empty()).unwrap();
  let resp = router.oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(body_json(resp).await, serde_json::json!([]));
}

#[tokio::test]
async fn configured_origins_are_echoed_on_preflight() {
  let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
  let cfg = ServerConfig { cors_origins: vec!["https://potluck.example".into()], ..config() };
  let router = app(store, &cfg).unwrap();

  let req = Request::builder()
    .method("OPTIONS")
    .uri("/votes")
    .header(header::ORIGIN, "https://potluck.example")
    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
    .body(Body::empty())
    .unwrap();
  let resp = router.oneshot(req).await.unwrap();
  assert_eq!(
    resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
    "https://potluck.example"
  );
}

#[tokio::test]
async fn no_origins_means_permissive_cors() {
  let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
  let router = app(store, &config()).unwrap();

  let req = Request::builder()
    .uri("/health")
    .header(header::ORIGIN, "https://elsewhere.example")
    .body(Body::empty())
    .unwrap();
  let resp = router.oneshot(req).await.unwrap();
  assert_eq!(resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");
}

#[tokio::test]
async fn invalid_origin_is_a_startup_error() {
  let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
  let cfg = ServerConfig { cors_origins: vec!["bad\norigin".into()], ..config() };
  assert!(app(store, &cfg).is_err());
}

// ── Admin bootstrap ───────────────────────────────────────────────────────────

#[tokio::test]
async fn bootstrap_creates_admin_once() {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let cfg = ServerConfig {
    admin_username: Some("root".into()),
    admin_password_hash: Some(potluck_api::hash_password("s3cret").unwrap()),
    ..config()
  };

  let created = bootstrap_admin(&store, &cfg).await.unwrap().unwrap();
  assert!(created.is_admin);
  assert!(bootstrap_admin(&store, &cfg).await.unwrap().is_none());

  let creds = store.find_credentials("root").await.unwrap().unwrap();
  assert_eq!(creds.user.user_id, created.user_id);
}

#[tokio::test]
async fn bootstrap_refuses_name_held_by_regular_user() {
  let store = SqliteStore::open_in_memory().await.unwrap();
  store
    .add_user(potluck_core::directory::NewUser {
      username:      "root".into(),
      password_hash: potluck_api::hash_password("user-pass").unwrap(),
      is_admin:      false,
    })
    .await
    .unwrap()
    .unwrap();

  let cfg = ServerConfig {
    admin_username: Some("root".into()),
    admin_password_hash: Some(potluck_api::hash_password("s3cret").unwrap()),
    ..config()
  };
  let err = bootstrap_admin(&store, &cfg).await.unwrap_err();
  assert!(err.to_string().contains("without admin rights"), "{err}");
  assert!(!store.find_credentials("root").await.unwrap().unwrap().user.is_admin);
}

#[tokio::test]
async fn bootstrap_without_admin_settings_is_a_noop() {
  let store = SqliteStore::open_in_memory().await.unwrap();
  assert!(bootstrap_admin(&store, &config()).await.unwrap().is_none());
}

#[tokio::test]
async fn bootstrap_rejects_partial_or_malformed_settings() {
  let store = SqliteStore::open_in_memory().await.unwrap();

  let partial = ServerConfig { admin_username: Some("root".into()), ..config() };
  assert!(bootstrap_admin(&store, &partial).await.is_err());

  let malformed = ServerConfig {
    admin_username: Some("root".into()),
    admin_password_hash: Some("plaintext".into()),
    ..config()
  };
  assert!(bootstrap_admin(&store, &malformed).await.is_err());
  assert!(store.find_credentials("root").await.unwrap().is_none());
}

#[tokio::test]
async fn bootstrapped_admin_can_create_categories() {
  let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
  let cfg = ServerConfig {
    admin_username: Some("root".into()),
    admin_password_hash: Some(potluck_api::hash_password("s3cret").unwrap()),
    ..config()
  };
  bootstrap_admin(store.as_ref(), &cfg).await.unwrap();
  let router = app(store, &cfg).unwrap();

  let req = Request::builder()
    .method("POST")
    .uri("/categories")
    .header(header::AUTHORIZATION, format!("Basic {}", B64.encode("root:s3cret")))
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from(r#"{"name":"soups"}"#))
    .unwrap();
  let resp = router.oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::CREATED);
  assert_eq!(body_json(resp).await["name"], "soups");
}
