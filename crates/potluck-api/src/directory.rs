//! Handlers for the supporting directory: users, recipes, categories.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/users` | Body: [`RegisterBody`]; open registration, never admin |
//! | `GET`  | `/users/{user_id}` | |
//! | `POST` | `/recipes` | Body: [`NewRecipeBody`]; authored by the caller |
//! | `GET`  | `/recipes/{recipe_id}` | |
//! | `GET`  | `/categories` | Sorted by name |
//! | `POST` | `/categories` | Body: [`NewCategoryBody`]; admin only |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State, rejection::{JsonRejection, PathRejection}},
  http::StatusCode,
  response::IntoResponse,
};
use potluck_core::{
  directory::{Category, NewUser, Recipe, User},
  store::ForumStore,
};
use serde::Deserialize;
use tracing::info;

use crate::{
  auth::{Authenticated, hash_password},
  error::ApiError,
};

fn store_err(e: impl std::error::Error + Send + Sync + 'static) -> ApiError {
  ApiError::Store(Box::new(e))
}

/// Trimmed, non-empty text field.
fn required(field: &str, value: &str) -> Result<String, ApiError> {
  let value = value.trim();
  if value.is_empty() {
    return Err(ApiError::InvalidArgument(format!("{field} must not be empty")));
  }
  Ok(value.to_string())
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub username: String,
  pub password: String,
}

/// `POST /users`
pub async fn register<S: ForumStore>(
  State(store): State<Arc<S>>,
  body: Result<Json<RegisterBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let Json(body) = body?;
  let username = required("username", &body.username)?;
  if body.password.is_empty() {
    return Err(ApiError::InvalidArgument("password must not be empty".into()));
  }

  let user = store
    .add_user(NewUser {
      username:      username.clone(),
      password_hash: hash_password(&body.password)?,
      is_admin:      false,
    })
    .await
    .map_err(store_err)?
    .ok_or_else(|| ApiError::Conflict(format!("username {username:?} is taken")))?;

  info!(user_id = user.user_id, "user registered");
  Ok((StatusCode::CREATED, Json(user)))
}

/// `GET /users/{user_id}`
pub async fn get_user<S: ForumStore>(
  State(store): State<Arc<S>>,
  path: Result<Path<i64>, PathRejection>,
) -> Result<Json<User>, ApiError> {
  let Path(user_id) = path?;
  let user = store
    .get_user(user_id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| ApiError::NotFound(format!("user {user_id} not found")))?;
  Ok(Json(user))
}

// ─── Recipes ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct NewRecipeBody {
  pub title: String,
}

/// `POST /recipes`
pub async fn create_recipe<S: ForumStore>(
  State(store): State<Arc<S>>,
  Authenticated(actor): Authenticated,
  body: Result<Json<NewRecipeBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let Json(body) = body?;
  let title = required("title", &body.title)?;

  let recipe = store.add_recipe(actor.user_id, title).await.map_err(store_err)?;
  info!(recipe_id = recipe.recipe_id, author_id = actor.user_id, "recipe created");
  Ok((StatusCode::CREATED, Json(recipe)))
}

/// `GET /recipes/{recipe_id}`
pub async fn get_recipe<S: ForumStore>(
  State(store): State<Arc<S>>,
  path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Recipe>, ApiError> {
  let Path(recipe_id) = path?;
  let recipe = store
    .get_recipe(recipe_id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| ApiError::NotFound(format!("recipe {recipe_id} not found")))?;
  Ok(Json(recipe))
}

// ─── Categories ──────────────────────────────────────────────────────────────

/// `GET /categories`
pub async fn list_categories<S: ForumStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Category>>, ApiError> {
  Ok(Json(store.list_categories().await.map_err(store_err)?))
}

#[derive(Debug, Deserialize)]
pub struct NewCategoryBody {
  pub name: String,
}

/// `POST /categories`
pub async fn create_category<S: ForumStore>(
  State(store): State<Arc<S>>,
  Authenticated(actor): Authenticated,
  body: Result<Json<NewCategoryBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  if !actor.is_admin {
    return Err(ApiError::Forbidden(format!(
      "user {} may not create categories",
      actor.user_id
    )));
  }
  let Json(body) = body?;
  let name = required("name", &body.name)?;

  let category = store
    .add_category(name.clone())
    .await
    .map_err(store_err)?
    .ok_or_else(|| ApiError::Conflict(format!("category {name:?} already exists")))?;

  info!(category_id = category.category_id, "category created");
  Ok((StatusCode::CREATED, Json(category)))
}
