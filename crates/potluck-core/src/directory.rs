//! The entities votes and links point at: users, recipes, and categories.
//!
//! The directory only carries what existence and ownership checks need.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::actor::Actor;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub user_id:    i64,
  pub username:   String,
  pub is_admin:   bool,
  pub created_at: DateTime<Utc>,
}

impl User {
  pub fn actor(&self) -> Actor {
    Actor { user_id: self.user_id, is_admin: self.is_admin }
  }
}

/// Input for [`Directory::add_user`](crate::store::Directory::add_user).
#[derive(Debug, Clone)]
pub struct NewUser {
  pub username:      String,
  /// Argon2 PHC string, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
  pub is_admin:      bool,
}

/// A user together with the stored password hash. Never serialised.
#[derive(Debug, Clone)]
pub struct Credentials {
  pub user:          User,
  pub password_hash: String,
}

/// The item that is voted on and categorised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
  pub recipe_id:  i64,
  pub author_id:  i64,
  pub title:      String,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
  pub category_id: i64,
  pub name:        String,
}
