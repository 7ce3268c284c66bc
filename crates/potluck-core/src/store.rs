//! The persistence gateway traits.
//!
//! Traits are implemented by storage backends (e.g. `potluck-store-sqlite`).
//! The ledger, the linker, and the HTTP layer depend on these abstractions,
//! not on any concrete backend.
//!
//! Conditional single-row writes report their outcome as a [`RowWrite`]
//! instead of an error, so callers can tell a lost race apart from a
//! failing store.

use std::{collections::BTreeSet, future::Future};

use crate::{
  directory::{Category, Credentials, NewUser, Recipe, User},
  taxonomy::ReconcilePlan,
  vote::{Direction, Score, Vote},
};

/// Outcome of a conditional single-row write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowWrite {
  Applied,
  /// An insert found a row with the same key already present.
  Duplicate,
  /// An update or delete found no row to act on.
  Missing,
}

/// Shared error type for every store trait.
///
/// All methods return `Send` futures so the traits can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait Gateway: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;
}

// ─── Directory ───────────────────────────────────────────────────────────────

pub trait Directory: Gateway {
  /// Create a user. Returns `None` if the username is taken.
  fn add_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn get_user(
    &self,
    user_id: i64,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Look up a user and their password hash by username.
  fn find_credentials<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<Credentials>, Self::Error>> + Send + 'a;

  fn add_recipe(
    &self,
    author_id: i64,
    title: String,
  ) -> impl Future<Output = Result<Recipe, Self::Error>> + Send + '_;

  fn get_recipe(
    &self,
    recipe_id: i64,
  ) -> impl Future<Output = Result<Option<Recipe>, Self::Error>> + Send + '_;

  /// Create a category. Returns `None` if the name is taken.
  fn add_category(
    &self,
    name: String,
  ) -> impl Future<Output = Result<Option<Category>, Self::Error>> + Send + '_;

  fn get_category(
    &self,
    category_id: i64,
  ) -> impl Future<Output = Result<Option<Category>, Self::Error>> + Send + '_;

  fn list_categories(
    &self,
  ) -> impl Future<Output = Result<Vec<Category>, Self::Error>> + Send + '_;
}

// ─── Votes ───────────────────────────────────────────────────────────────────

/// Row-level access to the `(voter, item)` vote relation. Each write is
/// atomic; the read-then-decide logic lives in
/// [`VoteLedger`](crate::ledger::VoteLedger).
pub trait VoteStore: Gateway {
  fn get_votes(
    &self,
    item_id: i64,
  ) -> impl Future<Output = Result<Vec<Vote>, Self::Error>> + Send + '_;

  fn get_vote(
    &self,
    voter_id: i64,
    item_id: i64,
  ) -> impl Future<Output = Result<Option<Vote>, Self::Error>> + Send + '_;

  /// Insert a vote. [`RowWrite::Duplicate`] if the pair already has one.
  fn insert_vote(
    &self,
    voter_id: i64,
    item_id: i64,
    direction: Direction,
  ) -> impl Future<Output = Result<RowWrite, Self::Error>> + Send + '_;

  /// Set the direction of an existing vote. [`RowWrite::Missing`] if none.
  fn update_vote(
    &self,
    voter_id: i64,
    item_id: i64,
    direction: Direction,
  ) -> impl Future<Output = Result<RowWrite, Self::Error>> + Send + '_;

  /// Delete a vote. [`RowWrite::Missing`] if none.
  fn delete_vote(
    &self,
    voter_id: i64,
    item_id: i64,
  ) -> impl Future<Output = Result<RowWrite, Self::Error>> + Send + '_;

  /// Recompute the item's score from its vote rows.
  fn score(
    &self,
    item_id: i64,
  ) -> impl Future<Output = Result<Score, Self::Error>> + Send + '_;
}

// ─── Category links ──────────────────────────────────────────────────────────

pub trait LinkStore: Gateway {
  fn get_links(
    &self,
    item_id: i64,
  ) -> impl Future<Output = Result<BTreeSet<i64>, Self::Error>> + Send + '_;

  /// Insert a link. [`RowWrite::Duplicate`] if it already exists.
  fn insert_link(
    &self,
    category_id: i64,
    item_id: i64,
  ) -> impl Future<Output = Result<RowWrite, Self::Error>> + Send + '_;

  /// Delete a link. [`RowWrite::Missing`] if it does not exist.
  fn delete_link(
    &self,
    category_id: i64,
    item_id: i64,
  ) -> impl Future<Output = Result<RowWrite, Self::Error>> + Send + '_;

  /// Move the item's links to exactly `desired`, atomically.
  ///
  /// The current set is read and the plan applied within one transaction;
  /// either every change lands or none does. Returns the applied plan.
  fn reconcile_links(
    &self,
    item_id: i64,
    desired: BTreeSet<i64>,
  ) -> impl Future<Output = Result<ReconcilePlan, Self::Error>> + Send + '_;
}

/// Everything the HTTP layer needs from a backend.
pub trait ForumStore: Directory + VoteStore + LinkStore {}

impl<T: Directory + VoteStore + LinkStore> ForumStore for T {}
