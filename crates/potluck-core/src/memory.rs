//! In-memory store used by the ledger and linker tests.
//!
//! Concurrent writers are simulated with [`Race`]s: each queued race is
//! applied to the vote table immediately before the next vote write, as if
//! another request had slipped in between the ledger's read and its write.

use std::{
  collections::{BTreeMap, BTreeSet, VecDeque},
  convert::Infallible,
  sync::Mutex,
};

use chrono::Utc;

use crate::{
  directory::{Category, Credentials, NewUser, Recipe, User},
  store::{Directory, Gateway, LinkStore, RowWrite, VoteStore},
  taxonomy::ReconcilePlan,
  vote::{Direction, Score, Vote},
};

#[derive(Debug, Clone, Copy)]
pub enum Race {
  /// Another writer inserts (or overwrites) the pair's vote.
  Insert(Direction),
  /// Another writer deletes the pair's vote.
  Delete,
}

#[derive(Default)]
struct Tables {
  users:      BTreeMap<i64, Credentials>,
  recipes:    BTreeMap<i64, Recipe>,
  categories: BTreeMap<i64, Category>,
  votes:      BTreeMap<(i64, i64), Vote>,
  /// `(item_id, category_id)`
  links:      BTreeSet<(i64, i64)>,
  next_id:    i64,
}

impl Tables {
  fn next_id(&mut self) -> i64 {
    self.next_id += 1;
    self.next_id + 1000
  }
}

#[derive(Default)]
pub struct MemoryStore {
  tables: Mutex<Tables>,
  races:  Mutex<VecDeque<Race>>,
  writes: Mutex<usize>,
}

impl MemoryStore {
  pub fn seed_user(&self, user_id: i64, is_admin: bool) {
    let user = User {
      user_id,
      username: format!("user{user_id}"),
      is_admin,
      created_at: Utc::now(),
    };
    self
      .tables
      .lock()
      .unwrap()
      .users
      .insert(user_id, Credentials { user, password_hash: String::new() });
  }

  pub fn seed_recipe(&self, recipe_id: i64, author_id: i64) {
    let recipe = Recipe {
      recipe_id,
      author_id,
      title: format!("recipe {recipe_id}"),
      created_at: Utc::now(),
    };
    self.tables.lock().unwrap().recipes.insert(recipe_id, recipe);
  }

  pub fn seed_category(&self, category_id: i64) {
    let category = Category { category_id, name: format!("category {category_id}") };
    self.tables.lock().unwrap().categories.insert(category_id, category);
  }

  pub fn seed_link(&self, category_id: i64, item_id: i64) {
    self.tables.lock().unwrap().links.insert((item_id, category_id));
  }

  pub fn race(&self, race: Race) { self.races.lock().unwrap().push_back(race); }

  pub fn vote_rows(&self, voter_id: i64, item_id: i64) -> usize {
    let tables = self.tables.lock().unwrap();
    tables.votes.keys().filter(|k| **k == (voter_id, item_id)).count()
  }

  /// Number of link inserts and deletes issued so far.
  pub fn link_writes(&self) -> usize { *self.writes.lock().unwrap() }

  fn interleave(&self, voter_id: i64, item_id: i64) {
    let Some(race) = self.races.lock().unwrap().pop_front() else { return };
    let mut tables = self.tables.lock().unwrap();
    match race {
      Race::Insert(direction) => {
        tables.votes.insert(
          (voter_id, item_id),
          Vote { voter_id, item_id, direction, cast_at: Utc::now() },
        );
      }
      Race::Delete => {
        tables.votes.remove(&(voter_id, item_id));
      }
    }
  }
}

impl Gateway for MemoryStore {
  type Error = Infallible;
}

impl Directory for MemoryStore {
  async fn add_user(&self, input: NewUser) -> Result<Option<User>, Infallible> {
    let mut tables = self.tables.lock().unwrap();
    if tables.users.values().any(|c| c.user.username == input.username) {
      return Ok(None);
    }
    let user = User {
      user_id:    tables.next_id(),
      username:   input.username,
      is_admin:   input.is_admin,
      created_at: Utc::now(),
    };
    let credentials = Credentials { user: user.clone(), password_hash: input.password_hash };
    tables.users.insert(user.user_id, credentials);
    Ok(Some(user))
  }

  async fn get_user(&self, user_id: i64) -> Result<Option<User>, Infallible> {
    Ok(self.tables.lock().unwrap().users.get(&user_id).map(|c| c.user.clone()))
  }

  async fn find_credentials(&self, username: &str) -> Result<Option<Credentials>, Infallible> {
    let tables = self.tables.lock().unwrap();
    Ok(tables.users.values().find(|c| c.user.username == username).cloned())
  }

  async fn add_recipe(&self, author_id: i64, title: String) -> Result<Recipe, Infallible> {
    let mut tables = self.tables.lock().unwrap();
    let recipe = Recipe { recipe_id: tables.next_id(), author_id, title, created_at: Utc::now() };
    tables.recipes.insert(recipe.recipe_id, recipe.clone());
    Ok(recipe)
  }

  async fn get_recipe(&self, recipe_id: i64) -> Result<Option<Recipe>, Infallible> {
    Ok(self.tables.lock().unwrap().recipes.get(&recipe_id).cloned())
  }

  async fn add_category(&self, name: String) -> Result<Option<Category>, Infallible> {
    let mut tables = self.tables.lock().unwrap();
    if tables.categories.values().any(|c| c.name == name) {
      return Ok(None);
    }
    let category = Category { category_id: tables.next_id(), name };
    tables.categories.insert(category.category_id, category.clone());
    Ok(Some(category))
  }

  async fn get_category(&self, category_id: i64) -> Result<Option<Category>, Infallible> {
    Ok(self.tables.lock().unwrap().categories.get(&category_id).cloned())
  }

  async fn list_categories(&self) -> Result<Vec<Category>, Infallible> {
    Ok(self.tables.lock().unwrap().categories.values().cloned().collect())
  }
}

impl VoteStore for MemoryStore {
  async fn get_votes(&self, item_id: i64) -> Result<Vec<Vote>, Infallible> {
    let tables = self.tables.lock().unwrap();
    Ok(tables.votes.values().filter(|v| v.item_id == item_id).cloned().collect())
  }

  async fn get_vote(&self, voter_id: i64, item_id: i64) -> Result<Option<Vote>, Infallible> {
    Ok(self.tables.lock().unwrap().votes.get(&(voter_id, item_id)).cloned())
  }

  async fn insert_vote(
    &self,
    voter_id: i64,
    item_id: i64,
    direction: Direction,
  ) -> Result<RowWrite, Infallible> {
    self.interleave(voter_id, item_id);
    let mut tables = self.tables.lock().unwrap();
    if tables.votes.contains_key(&(voter_id, item_id)) {
      return Ok(RowWrite::Duplicate);
    }
    tables
      .votes
      .insert((voter_id, item_id), Vote { voter_id, item_id, direction, cast_at: Utc::now() });
    Ok(RowWrite::Applied)
  }

  async fn update_vote(
    &self,
    voter_id: i64,
    item_id: i64,
    direction: Direction,
  ) -> Result<RowWrite, Infallible> {
    self.interleave(voter_id, item_id);
    let mut tables = self.tables.lock().unwrap();
    match tables.votes.get_mut(&(voter_id, item_id)) {
      Some(vote) => {
        vote.direction = direction;
        vote.cast_at = Utc::now();
        Ok(RowWrite::Applied)
      }
      None => Ok(RowWrite::Missing),
    }
  }

  async fn delete_vote(&self, voter_id: i64, item_id: i64) -> Result<RowWrite, Infallible> {
    self.interleave(voter_id, item_id);
    let mut tables = self.tables.lock().unwrap();
    Ok(match tables.votes.remove(&(voter_id, item_id)) {
      Some(_) => RowWrite::Applied,
      None => RowWrite::Missing,
    })
  }

  async fn score(&self, item_id: i64) -> Result<Score, Infallible> {
    let votes: Vec<Vote> = self.tables.lock().unwrap().votes.values().cloned().collect();
    Ok(Score::tally(item_id, &votes))
  }
}

impl LinkStore for MemoryStore {
  async fn get_links(&self, item_id: i64) -> Result<BTreeSet<i64>, Infallible> {
    let tables = self.tables.lock().unwrap();
    Ok(tables.links.iter().filter(|(i, _)| *i == item_id).map(|(_, c)| *c).collect())
  }

  async fn insert_link(&self, category_id: i64, item_id: i64) -> Result<RowWrite, Infallible> {
    *self.writes.lock().unwrap() += 1;
    let inserted = self.tables.lock().unwrap().links.insert((item_id, category_id));
    Ok(if inserted { RowWrite::Applied } else { RowWrite::Duplicate })
  }

  async fn delete_link(&self, category_id: i64, item_id: i64) -> Result<RowWrite, Infallible> {
    *self.writes.lock().unwrap() += 1;
    let removed = self.tables.lock().unwrap().links.remove(&(item_id, category_id));
    Ok(if removed { RowWrite::Applied } else { RowWrite::Missing })
  }

  async fn reconcile_links(
    &self,
    item_id: i64,
    desired: BTreeSet<i64>,
  ) -> Result<ReconcilePlan, Infallible> {
    let mut tables = self.tables.lock().unwrap();
    let current = tables.links.iter().filter(|(i, _)| *i == item_id).map(|(_, c)| *c).collect();
    let plan = ReconcilePlan::between(&current, &desired);

    let mut writes = self.writes.lock().unwrap();
    for &category_id in &plan.to_remove {
      tables.links.remove(&(item_id, category_id));
      *writes += 1;
    }
    for &category_id in &plan.to_add {
      tables.links.insert((item_id, category_id));
      *writes += 1;
    }
    Ok(plan)
  }
}
