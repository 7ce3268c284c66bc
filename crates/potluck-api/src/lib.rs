//! JSON engagement API for Potluck.
//!
//! Exposes an axum [`Router`] backed by any [`potluck_core::store::ForumStore`].
//! Handlers validate request shape, resolve the caller through HTTP Basic
//! auth, and delegate to the vote ledger and taxonomy linker. TLS, CORS, and
//! request tracing are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .merge(potluck_api::api_router(store.clone()))
//! ```

pub mod auth;
pub mod directory;
pub mod error;
pub mod links;
pub mod votes;


use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, post},
};
use potluck_core::store::ForumStore;

pub use auth::{Authenticated, hash_password};
pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be merged into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: ForumStore + 'static,
{
  Router::new()
    // Votes
    .route("/votes", post(votes::cast::<S>))
    .route("/votes/recipe/{item_id}", get(votes::list::<S>))
    .route("/votes/recipe/{item_id}/score", get(votes::score::<S>))
    .route(
      "/votes/{voter_id}/{item_id}",
      get(votes::state::<S>).put(votes::replace::<S>).delete(votes::retract::<S>),
    )
    // Category links
    .route("/categoryLinks", post(links::create::<S>))
    .route(
      "/categoryLinks/recipe/{item_id}",
      get(links::list::<S>).put(links::reconcile::<S>),
    )
    .route("/categoryLinks/{category_id}/{item_id}", delete(links::remove::<S>))
    // Directory
    .route("/users", post(directory::register::<S>))
    .route("/users/{user_id}", get(directory::get_user::<S>))
    .route("/recipes", post(directory::create_recipe::<S>))
    .route("/recipes/{recipe_id}", get(directory::get_recipe::<S>))
    .route(
      "/categories",
      get(directory::list_categories::<S>).post(directory::create_category::<S>),
    )
    .with_state(store)
}
