//! Handlers for `/votes` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/votes/recipe/{item_id}` | Every vote on the recipe |
//! | `GET`    | `/votes/recipe/{item_id}/score` | Derived [`Score`] |
//! | `GET`    | `/votes/{voter_id}/{item_id}` | `{"state": ...}` |
//! | `POST`   | `/votes` | Body: [`CastBody`]; 201 if a row was created |
//! | `PUT`    | `/votes/{voter_id}/{item_id}` | Body: [`DirectionBody`] |
//! | `DELETE` | `/votes/{voter_id}/{item_id}` | Retract |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State, rejection::{JsonRejection, PathRejection}},
  http::StatusCode,
  response::IntoResponse,
};
use potluck_core::{
  VoteLedger,
  store::ForumStore,
  vote::{Direction, Score, Vote, VoteResult, VoteState},
};
use serde::{Deserialize, Serialize};

use crate::{auth::Authenticated, error::ApiError};

// ─── Reads ───────────────────────────────────────────────────────────────────

/// `GET /votes/recipe/{item_id}`
pub async fn list<S: ForumStore>(
  State(store): State<Arc<S>>,
  path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<Vote>>, ApiError> {
  let Path(item_id) = path?;
  Ok(Json(VoteLedger::new(store.as_ref()).get_votes(item_id).await?))
}

/// `GET /votes/recipe/{item_id}/score`
pub async fn score<S: ForumStore>(
  State(store): State<Arc<S>>,
  path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Score>, ApiError> {
  let Path(item_id) = path?;
  Ok(Json(VoteLedger::new(store.as_ref()).score(item_id).await?))
}

#[derive(Debug, Serialize)]
pub struct StateBody {
  pub state: VoteState,
}

/// `GET /votes/{voter_id}/{item_id}`
pub async fn state<S: ForumStore>(
  State(store): State<Arc<S>>,
  path: Result<Path<(i64, i64)>, PathRejection>,
) -> Result<Json<StateBody>, ApiError> {
  let Path((voter_id, item_id)) = path?;
  let state = VoteLedger::new(store.as_ref()).vote_state(voter_id, item_id).await?;
  Ok(Json(StateBody { state }))
}

// ─── Cast ────────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /votes`. `direction` is `true` for up.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastBody {
  pub voter_id:  i64,
  pub item_id:   i64,
  pub direction: Direction,
}

/// `POST /votes`
pub async fn cast<S: ForumStore>(
  State(store): State<Arc<S>>,
  Authenticated(actor): Authenticated,
  body: Result<Json<CastBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let Json(body) = body?;
  let result = VoteLedger::new(store.as_ref())
    .cast_vote(&actor, body.voter_id, body.item_id, body.direction)
    .await?;

  let status = if result.created() { StatusCode::CREATED } else { StatusCode::OK };
  Ok((status, Json(result)))
}

// ─── Replace / retract ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DirectionBody {
  pub direction: Direction,
}

/// `PUT /votes/{voter_id}/{item_id}`
pub async fn replace<S: ForumStore>(
  State(store): State<Arc<S>>,
  Authenticated(actor): Authenticated,
  path: Result<Path<(i64, i64)>, PathRejection>,
  body: Result<Json<DirectionBody>, JsonRejection>,
) -> Result<Json<VoteResult>, ApiError> {
  let Path((voter_id, item_id)) = path?;
  let Json(body) = body?;
  let result = VoteLedger::new(store.as_ref())
    .replace_vote(&actor, voter_id, item_id, body.direction)
    .await?;
  Ok(Json(result))
}

/// `DELETE /votes/{voter_id}/{item_id}`
pub async fn retract<S: ForumStore>(
  State(store): State<Arc<S>>,
  Authenticated(actor): Authenticated,
  path: Result<Path<(i64, i64)>, PathRejection>,
) -> Result<Json<VoteResult>, ApiError> {
  let Path((voter_id, item_id)) = path?;
  let result = VoteLedger::new(store.as_ref()).retract_vote(&actor, voter_id, item_id).await?;
  Ok(Json(result))
}
