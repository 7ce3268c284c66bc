//! HTTP server assembly for Potluck.
//!
//! Wraps the engagement API with request tracing, CORS, and a health probe,
//! and provides the startup helpers the `server` binary uses.

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context as _;
use argon2::PasswordHash;
use axum::{
  Json, Router,
  http::{
    HeaderValue, Method,
    header::{AUTHORIZATION, CONTENT_TYPE},
  },
  routing::get,
};
use potluck_core::{
  directory::{NewUser, User},
  store::{Directory, ForumStore},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::signal;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `POTLUCK_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                String,
  #[serde(default = "default_port")]
  pub port:                u16,
  pub store_path:          PathBuf,
  /// Administrator account ensured at startup. Set together with
  /// `admin_password_hash`.
  #[serde(default)]
  pub admin_username:      Option<String>,
  /// PHC string produced by `server --hash-password`.
  #[serde(default)]
  pub admin_password_hash: Option<String>,
  /// Allowed browser origins. Empty allows any origin.
  #[serde(default)]
  pub cors_origins:        Vec<String>,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8080 }

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the complete application router for `store`.
pub fn app<S>(store: Arc<S>, config: &ServerConfig) -> anyhow::Result<Router>
where
  S: ForumStore + 'static,
{
  Ok(
    Router::new()
      .route("/health", get(health))
      .merge(potluck_api::api_router(store))
      .layer(cors_layer(&config.cors_origins)?)
      .layer(TraceLayer::new_for_http()),
  )
}

async fn health() -> Json<Value> { Json(json!({ "status": "ok" })) }

fn cors_layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
  if origins.is_empty() {
    return Ok(CorsLayer::permissive());
  }

  let origins = origins
    .iter()
    .map(|o| HeaderValue::from_str(o).with_context(|| format!("invalid CORS origin {o:?}")))
    .collect::<anyhow::Result<Vec<_>>>()?;

  Ok(
    CorsLayer::new()
      .allow_origin(origins)
      .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
      .allow_headers([CONTENT_TYPE, AUTHORIZATION])
      .max_age(Duration::from_secs(60 * 60)),
  )
}

// ─── Startup ──────────────────────────────────────────────────────────────────

/// Ensure the configured administrator account exists.
///
/// Returns the account if it was created by this call. An existing admin
/// account with the same name is left untouched; an existing non-admin account
/// with that name is an error.
pub async fn bootstrap_admin<S>(store: &S, config: &ServerConfig) -> anyhow::Result<Option<User>>
where
  S: Directory,
{
  let (username, password_hash) = match (&config.admin_username, &config.admin_password_hash) {
    (Some(u), Some(h)) => (u, h),
    (None, None) => return Ok(None),
    _ => anyhow::bail!("admin_username and admin_password_hash must be set together"),
  };

  PasswordHash::new(password_hash)
    .map_err(|e| anyhow::anyhow!("admin_password_hash is not a PHC string: {e}"))?;

  if let Some(existing) = store
    .find_credentials(username)
    .await
    .context("failed to look up admin account")?
  {
    if !existing.user.is_admin {
      anyhow::bail!("configured admin account {username:?} exists without admin rights");
    }
    info!(user_id = existing.user.user_id, username = %username, "admin account present");
    return Ok(None);
  }

  let created = store
    .add_user(NewUser {
      username:      username.clone(),
      password_hash: password_hash.clone(),
      is_admin:      true,
    })
    .await
    .context("failed to create admin account")?;

  if let Some(user) = &created {
    info!(user_id = user.user_id, username = %username, "admin account created");
  }
  Ok(created)
}

/// Resolves on Ctrl-C or SIGTERM.
pub async fn shutdown_signal() {
  let ctrl_c = async {
    match signal::ctrl_c().await {
      Ok(()) => info!("received Ctrl-C, shutting down"),
      Err(e) => {
        error!(error = %e, "failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(unix)]
  let terminate = async {
    match signal::unix::signal(signal::unix::SignalKind::terminate()) {
      Ok(mut sigterm) => {
        sigterm.recv().await;
        info!("received SIGTERM, shutting down");
      }
      Err(e) => {
        error!(error = %e, "failed to install SIGTERM handler");
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    _ = ctrl_c => {},
    _ = terminate => {},
  }
}

#[cfg(test)]
mod tests;
