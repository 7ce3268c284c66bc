//! Encoding and decoding helpers between domain types and SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, booleans as `0`/`1`, and vote
//! directions as their sign (`1` or `-1`).

use chrono::{DateTime, Utc};
use potluck_core::{
  directory::{Credentials, Recipe, User},
  vote::{Direction, Vote},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Direction ───────────────────────────────────────────────────────────────

pub fn decode_direction(sign: i64) -> Result<Direction> {
  Direction::from_sign(sign)
    .ok_or_else(|| Error::Decode(format!("vote direction must be 1 or -1, got {sign}")))
}

// ─── Raw rows ────────────────────────────────────────────────────────────────

/// Column values as read from `users`.
pub struct RawUser {
  pub user_id:       i64,
  pub username:      String,
  pub password_hash: String,
  pub is_admin:      bool,
  pub created_at:    String,
}

impl RawUser {
  pub const COLUMNS: &'static str = "user_id, username, password_hash, is_admin, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:       row.get(0)?,
      username:      row.get(1)?,
      password_hash: row.get(2)?,
      is_admin:      row.get(3)?,
      created_at:    row.get(4)?,
    })
  }

  pub fn into_credentials(self) -> Result<Credentials> {
    Ok(Credentials {
      user:          User {
        user_id:    self.user_id,
        username:   self.username,
        is_admin:   self.is_admin,
        created_at: decode_dt(&self.created_at)?,
      },
      password_hash: self.password_hash,
    })
  }

  pub fn into_user(self) -> Result<User> { Ok(self.into_credentials()?.user) }
}

pub struct RawRecipe {
  pub recipe_id:  i64,
  pub author_id:  i64,
  pub title:      String,
  pub created_at: String,
}

impl RawRecipe {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      recipe_id:  row.get(0)?,
      author_id:  row.get(1)?,
      title:      row.get(2)?,
      created_at: row.get(3)?,
    })
  }

  pub fn into_recipe(self) -> Result<Recipe> {
    Ok(Recipe {
      recipe_id:  self.recipe_id,
      author_id:  self.author_id,
      title:      self.title,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawVote {
  pub voter_id:  i64,
  pub recipe_id: i64,
  pub direction: i64,
  pub cast_at:   String,
}

impl RawVote {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      voter_id:  row.get(0)?,
      recipe_id: row.get(1)?,
      direction: row.get(2)?,
      cast_at:   row.get(3)?,
    })
  }

  pub fn into_vote(self) -> Result<Vote> {
    Ok(Vote {
      voter_id:  self.voter_id,
      item_id:   self.recipe_id,
      direction: decode_direction(self.direction)?,
      cast_at:   decode_dt(&self.cast_at)?,
    })
  }
}
