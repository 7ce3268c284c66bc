//! Handlers for `/categoryLinks` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/categoryLinks/recipe/{item_id}` | Linked category ids, ascending |
//! | `PUT`    | `/categoryLinks/recipe/{item_id}` | Body: [`ReconcileBody`]; replaces the set |
//! | `POST`   | `/categoryLinks` | Body: [`CategoryLink`]; 201 if new, 200 if present |
//! | `DELETE` | `/categoryLinks/{category_id}/{item_id}` | Remove one link |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State, rejection::{JsonRejection, PathRejection}},
  http::StatusCode,
  response::IntoResponse,
};
use potluck_core::{
  TaxonomyLinker,
  store::ForumStore,
  taxonomy::{CategoryLink, ReconcileResult},
};
use serde::Deserialize;

use crate::{auth::Authenticated, error::ApiError};

/// `GET /categoryLinks/recipe/{item_id}`
pub async fn list<S: ForumStore>(
  State(store): State<Arc<S>>,
  path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<i64>>, ApiError> {
  let Path(item_id) = path?;
  let links = TaxonomyLinker::new(store.as_ref()).get_links(item_id).await?;
  Ok(Json(links.into_iter().collect()))
}

/// `POST /categoryLinks`
pub async fn create<S: ForumStore>(
  State(store): State<Arc<S>>,
  Authenticated(actor): Authenticated,
  body: Result<Json<CategoryLink>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let Json(link) = body?;
  let created = TaxonomyLinker::new(store.as_ref())
    .link(&actor, link.category_id, link.item_id)
    .await?;

  let status = if created { StatusCode::CREATED } else { StatusCode::OK };
  Ok((status, Json(link)))
}

/// `DELETE /categoryLinks/{category_id}/{item_id}`
pub async fn remove<S: ForumStore>(
  State(store): State<Arc<S>>,
  Authenticated(actor): Authenticated,
  path: Result<Path<(i64, i64)>, PathRejection>,
) -> Result<Json<CategoryLink>, ApiError> {
  let Path((category_id, item_id)) = path?;
  TaxonomyLinker::new(store.as_ref()).unlink(&actor, category_id, item_id).await?;
  Ok(Json(CategoryLink { category_id, item_id }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileBody {
  pub category_ids: Vec<i64>,
}

/// `PUT /categoryLinks/recipe/{item_id}`
///
/// A recipe always keeps at least one category; clearing every link goes
/// through `DELETE` one at a time.
pub async fn reconcile<S: ForumStore>(
  State(store): State<Arc<S>>,
  Authenticated(actor): Authenticated,
  path: Result<Path<i64>, PathRejection>,
  body: Result<Json<ReconcileBody>, JsonRejection>,
) -> Result<Json<ReconcileResult>, ApiError> {
  let Path(item_id) = path?;
  let Json(body) = body?;
  if body.category_ids.is_empty() {
    return Err(ApiError::InvalidArgument("categoryIds must not be empty".into()));
  }

  let result = TaxonomyLinker::new(store.as_ref())
    .reconcile(&actor, item_id, body.category_ids)
    .await?;
  Ok(Json(result))
}
