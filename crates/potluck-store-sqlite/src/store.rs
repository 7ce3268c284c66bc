//! [`SqliteStore`] — the SQLite implementation of the Potluck store traits.

use std::{collections::BTreeSet, path::Path};

use chrono::Utc;
use rusqlite::{OptionalExtension as _, TransactionBehavior};
use tracing::debug;

use potluck_core::{
  directory::{Category, Credentials, NewUser, Recipe, User},
  store::{Directory, Gateway, LinkStore, RowWrite, VoteStore},
  taxonomy::ReconcilePlan,
  vote::{Direction, Score, Vote},
};

use crate::{
  Error, Result,
  encode::{RawRecipe, RawUser, RawVote, encode_dt},
  schema::SCHEMA,
};

/// Maps the affected-row count of a conditional write to its outcome.
fn row_write(changed: usize, otherwise: RowWrite) -> RowWrite {
  if changed > 0 { RowWrite::Applied } else { otherwise }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Potluck store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

impl Gateway for SqliteStore {
  type Error = Error;
}

// ─── Directory ───────────────────────────────────────────────────────────────

impl Directory for SqliteStore {
  async fn add_user(&self, input: NewUser) -> Result<Option<User>> {
    let NewUser { username, password_hash, is_admin } = input;
    let created_at   = Utc::now();
    let at_str       = encode_dt(created_at);
    let username_col = username.clone();

    let user_id: Option<i64> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "INSERT INTO users (username, password_hash, is_admin, created_at)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT (username) DO NOTHING",
          rusqlite::params![username_col, password_hash, is_admin, at_str],
        )?;
        Ok((changed > 0).then(|| conn.last_insert_rowid()))
      })
      .await?;

    Ok(user_id.map(|user_id| User { user_id, username, is_admin, created_at }))
  }

  async fn get_user(&self, user_id: i64) -> Result<Option<User>> {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {} FROM users WHERE user_id = ?1", RawUser::COLUMNS),
            rusqlite::params![user_id],
            RawUser::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn find_credentials(&self, username: &str) -> Result<Option<Credentials>> {
    let username = username.to_owned();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {} FROM users WHERE username = ?1", RawUser::COLUMNS),
            rusqlite::params![username],
            RawUser::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawUser::into_credentials).transpose()
  }

  async fn add_recipe(&self, author_id: i64, title: String) -> Result<Recipe> {
    let created_at = Utc::now();
    let at_str = encode_dt(created_at);
    let title_col = title.clone();

    let recipe_id: i64 = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO recipes (author_id, title, created_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![author_id, title_col, at_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Recipe { recipe_id, author_id, title, created_at })
  }

  async fn get_recipe(&self, recipe_id: i64) -> Result<Option<Recipe>> {
    let raw: Option<RawRecipe> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT recipe_id, author_id, title, created_at FROM recipes WHERE recipe_id = ?1",
            rusqlite::params![recipe_id],
            RawRecipe::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawRecipe::into_recipe).transpose()
  }

  async fn add_category(&self, name: String) -> Result<Option<Category>> {
    let name_col = name.clone();

    let category_id: Option<i64> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "INSERT INTO categories (name) VALUES (?1) ON CONFLICT (name) DO NOTHING",
          rusqlite::params![name_col],
        )?;
        Ok((changed > 0).then(|| conn.last_insert_rowid()))
      })
      .await?;

    Ok(category_id.map(|category_id| Category { category_id, name }))
  }

  async fn get_category(&self, category_id: i64) -> Result<Option<Category>> {
    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(conn
            .query_row(
              "SELECT category_id, name FROM categories WHERE category_id = ?1",
              rusqlite::params![category_id],
              |row| Ok(Category { category_id: row.get(0)?, name: row.get(1)? }),
            )
            .optional()?)
        })
        .await?,
    )
  }

  async fn list_categories(&self) -> Result<Vec<Category>> {
    Ok(
      self
        .conn
        .call(|conn| {
          let mut stmt =
            conn.prepare("SELECT category_id, name FROM categories ORDER BY name")?;
          let rows = stmt
            .query_map([], |row| Ok(Category { category_id: row.get(0)?, name: row.get(1)? }))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?,
    )
  }
}

// ─── Votes ───────────────────────────────────────────────────────────────────

impl VoteStore for SqliteStore {
  async fn get_votes(&self, item_id: i64) -> Result<Vec<Vote>> {
    let raws: Vec<RawVote> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT voter_id, recipe_id, direction, cast_at
           FROM votes
           WHERE recipe_id = ?1
           ORDER BY voter_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![item_id], RawVote::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawVote::into_vote).collect()
  }

  async fn get_vote(&self, voter_id: i64, item_id: i64) -> Result<Option<Vote>> {
    let raw: Option<RawVote> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT voter_id, recipe_id, direction, cast_at
             FROM votes
             WHERE voter_id = ?1 AND recipe_id = ?2",
            rusqlite::params![voter_id, item_id],
            RawVote::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawVote::into_vote).transpose()
  }

  async fn insert_vote(
    &self,
    voter_id: i64,
    item_id: i64,
    direction: Direction,
  ) -> Result<RowWrite> {
    let at_str = encode_dt(Utc::now());
    let sign = direction.sign();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT INTO votes (voter_id, recipe_id, direction, cast_at)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT (voter_id, recipe_id) DO NOTHING",
          rusqlite::params![voter_id, item_id, sign, at_str],
        )?)
      })
      .await?;

    debug!(voter_id, item_id, changed, "insert vote");
    Ok(row_write(changed, RowWrite::Duplicate))
  }

  async fn update_vote(
    &self,
    voter_id: i64,
    item_id: i64,
    direction: Direction,
  ) -> Result<RowWrite> {
    let at_str = encode_dt(Utc::now());
    let sign = direction.sign();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE votes SET direction = ?3, cast_at = ?4
           WHERE voter_id = ?1 AND recipe_id = ?2",
          rusqlite::params![voter_id, item_id, sign, at_str],
        )?)
      })
      .await?;

    debug!(voter_id, item_id, changed, "update vote");
    Ok(row_write(changed, RowWrite::Missing))
  }

  async fn delete_vote(&self, voter_id: i64, item_id: i64) -> Result<RowWrite> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM votes WHERE voter_id = ?1 AND recipe_id = ?2",
          rusqlite::params![voter_id, item_id],
        )?)
      })
      .await?;

    debug!(voter_id, item_id, changed, "delete vote");
    Ok(row_write(changed, RowWrite::Missing))
  }

  async fn score(&self, item_id: i64) -> Result<Score> {
    let (up, down): (i64, i64) = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COALESCE(SUM(direction = 1), 0), COALESCE(SUM(direction = -1), 0)
           FROM votes
           WHERE recipe_id = ?1",
          rusqlite::params![item_id],
          |row| Ok((row.get(0)?, row.get(1)?)),
        )?)
      })
      .await?;

    Ok(Score::from_counts(item_id, up as u64, down as u64))
  }
}

// ─── Category links ──────────────────────────────────────────────────────────

impl LinkStore for SqliteStore {
  async fn get_links(&self, item_id: i64) -> Result<BTreeSet<i64>> {
    Ok(
      self
        .conn
        .call(move |conn| {
          let mut stmt =
            conn.prepare("SELECT category_id FROM category_links WHERE recipe_id = ?1")?;
          let ids = stmt
            .query_map(rusqlite::params![item_id], |row| row.get(0))?
            .collect::<rusqlite::Result<BTreeSet<i64>>>()?;
          Ok(ids)
        })
        .await?,
    )
  }

  async fn insert_link(&self, category_id: i64, item_id: i64) -> Result<RowWrite> {
    let at_str = encode_dt(Utc::now());

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT INTO category_links (category_id, recipe_id, linked_at)
           VALUES (?1, ?2, ?3)
           ON CONFLICT (category_id, recipe_id) DO NOTHING",
          rusqlite::params![category_id, item_id, at_str],
        )?)
      })
      .await?;

    Ok(row_write(changed, RowWrite::Duplicate))
  }

  async fn delete_link(&self, category_id: i64, item_id: i64) -> Result<RowWrite> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM category_links WHERE category_id = ?1 AND recipe_id = ?2",
          rusqlite::params![category_id, item_id],
        )?)
      })
      .await?;

    Ok(row_write(changed, RowWrite::Missing))
  }

  async fn reconcile_links(&self, item_id: i64, desired: BTreeSet<i64>) -> Result<ReconcilePlan> {
    let at_str = encode_dt(Utc::now());

    let plan = self
      .conn
      .call(move |conn| {
        // IMMEDIATE takes the write lock before the read, so no other writer
        // can change the set between computing the plan and applying it.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let current = {
          let mut stmt =
            tx.prepare("SELECT category_id FROM category_links WHERE recipe_id = ?1")?;
          stmt
            .query_map(rusqlite::params![item_id], |row| row.get(0))?
            .collect::<rusqlite::Result<BTreeSet<i64>>>()?
        };
        let plan = ReconcilePlan::between(&current, &desired);

        if !plan.is_noop() {
          let mut delete = tx
            .prepare("DELETE FROM category_links WHERE category_id = ?1 AND recipe_id = ?2")?;
          for category_id in &plan.to_remove {
            delete.execute(rusqlite::params![category_id, item_id])?;
          }

          let mut insert = tx.prepare(
            "INSERT INTO category_links (category_id, recipe_id, linked_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (category_id, recipe_id) DO NOTHING",
          )?;
          for category_id in &plan.to_add {
            insert.execute(rusqlite::params![category_id, item_id, at_str])?;
          }
        }

        tx.commit()?;
        Ok(plan)
      })
      .await?;

    debug!(item_id, added = plan.to_add.len(), removed = plan.to_remove.len(), "reconcile");
    Ok(plan)
  }
}
