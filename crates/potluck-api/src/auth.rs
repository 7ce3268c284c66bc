//! HTTP Basic-auth extractor, standalone verifier, and password hashing.
//!
//! Credentials are checked against the users table on every request; a
//! verified caller becomes an [`Actor`] that handlers pass to the ledger and
//! linker for ownership checks.

use std::sync::Arc;

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use potluck_core::{Actor, store::Directory};
use rand_core::OsRng;

use crate::error::ApiError;

/// The authenticated caller of a request.
pub struct Authenticated(pub Actor);

/// Produce an argon2 PHC string for `password`.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| ApiError::Internal(format!("argon2 error: {e}")))
}

/// Split a `Basic` authorization header into username and password.
fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
  let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
  let encoded = value.strip_prefix("Basic ")?;
  let decoded = B64.decode(encoded.trim()).ok()?;
  let creds = String::from_utf8(decoded).ok()?;
  let (username, password) = creds.split_once(':')?;
  Some((username.to_string(), password.to_string()))
}

/// Verify the request's credentials against the store.
pub async fn verify_auth<S: Directory>(store: &S, headers: &HeaderMap) -> Result<Actor, ApiError> {
  let (username, password) = basic_credentials(headers).ok_or(ApiError::Unauthenticated)?;

  let creds = store
    .find_credentials(&username)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or(ApiError::Unauthenticated)?;

  let parsed_hash =
    PasswordHash::new(&creds.password_hash).map_err(|_| ApiError::Unauthenticated)?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| ApiError::Unauthenticated)?;

  Ok(creds.user.actor())
}

impl<S> FromRequestParts<Arc<S>> for Authenticated
where
  S: Directory + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, state: &Arc<S>) -> Result<Self, Self::Rejection> {
    let actor = verify_auth(state.as_ref(), &parts.headers).await?;
    Ok(Authenticated(actor))
  }
}
