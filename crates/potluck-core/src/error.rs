//! Error types for `potluck-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Malformed input, rejected before the store is written.
  #[error("invalid argument: {0}")]
  InvalidArgument(String),

  #[error("user not found: {0}")]
  UserNotFound(i64),

  #[error("recipe not found: {0}")]
  RecipeNotFound(i64),

  #[error("category not found: {0}")]
  CategoryNotFound(i64),

  #[error("user {voter_id} has no vote on recipe {item_id}")]
  VoteNotFound { voter_id: i64, item_id: i64 },

  #[error("recipe {item_id} is not in category {category_id}")]
  LinkNotFound { category_id: i64, item_id: i64 },

  /// A write lost a race twice in a row.
  #[error("conflict: {0}")]
  Conflict(String),

  #[error("user {actor} may not modify resources owned by user {owner}")]
  Unauthorized { actor: i64, owner: i64 },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend error.
  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }

  pub fn is_not_found(&self) -> bool {
    matches!(
      self,
      Self::UserNotFound(_)
        | Self::RecipeNotFound(_)
        | Self::CategoryNotFound(_)
        | Self::VoteNotFound { .. }
        | Self::LinkNotFound { .. }
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
