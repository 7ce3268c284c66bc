//! The vote ledger: one signed vote per `(voter, item)` pair.
//!
//! Every mutation reads the pair's current row, decides the transition with
//! [`VoteState::cast`], and issues a single-row write. The store's uniqueness
//! constraint is the final arbiter between concurrent writers: a write that
//! loses a race is retried once with its [`VoteWrite::fallback`], and only a
//! second loss is reported as [`Error::Conflict`].

use tracing::{debug, info};

use crate::{
  Actor, Error, Result,
  directory::{Recipe, User},
  store::{Directory, RowWrite, VoteStore},
  vote::{Direction, Score, Vote, VoteResult, VoteState, VoteWrite},
};

pub struct VoteLedger<'s, S> {
  store: &'s S,
}

impl<'s, S> VoteLedger<'s, S>
where
  S: Directory + VoteStore,
{
  pub fn new(store: &'s S) -> Self { Self { store } }

  // ── Reads ─────────────────────────────────────────────────────────────────

  /// All votes on an item.
  pub async fn get_votes(&self, item_id: i64) -> Result<Vec<Vote>> {
    self.require_item(item_id).await?;
    self.store.get_votes(item_id).await.map_err(Error::store)
  }

  pub async fn score(&self, item_id: i64) -> Result<Score> {
    self.require_item(item_id).await?;
    self.store.score(item_id).await.map_err(Error::store)
  }

  /// The voter's current state on an item.
  pub async fn vote_state(&self, voter_id: i64, item_id: i64) -> Result<VoteState> {
    self.require_voter(voter_id).await?;
    self.require_item(item_id).await?;
    self.current_state(voter_id, item_id).await
  }

  // ── Mutations ─────────────────────────────────────────────────────────────

  /// Cast a vote, driving the pair through the like/dislike state machine.
  ///
  /// Casting the direction already held removes the vote.
  pub async fn cast_vote(
    &self,
    actor: &Actor,
    voter_id: i64,
    item_id: i64,
    direction: Direction,
  ) -> Result<VoteResult> {
    actor.authorize(voter_id)?;
    self.require_voter(voter_id).await?;
    self.require_item(item_id).await?;

    let previous = self.current_state(voter_id, item_id).await?;
    let transition = previous.cast(direction);
    debug!(voter_id, item_id, ?transition, "casting vote");

    self.apply(voter_id, item_id, transition.write).await?;
    self.finish(voter_id, item_id, previous, transition.to).await
  }

  /// Set the direction of an existing vote in place.
  ///
  /// Unlike [`cast_vote`](Self::cast_vote), repeating the held direction is a
  /// no-op rather than a removal.
  pub async fn replace_vote(
    &self,
    actor: &Actor,
    voter_id: i64,
    item_id: i64,
    direction: Direction,
  ) -> Result<VoteResult> {
    actor.authorize(voter_id)?;
    self.require_voter(voter_id).await?;
    self.require_item(item_id).await?;

    let previous = self.current_state(voter_id, item_id).await?;
    let current = VoteState::of(Some(direction));
    match previous.direction() {
      None => return Err(Error::VoteNotFound { voter_id, item_id }),
      Some(held) if held == direction => {}
      Some(_) => {
        let outcome = self.write(voter_id, item_id, VoteWrite::Update(direction)).await?;
        if outcome != RowWrite::Applied {
          return Err(Error::VoteNotFound { voter_id, item_id });
        }
      }
    }

    self.finish(voter_id, item_id, previous, current).await
  }

  /// Remove an existing vote.
  pub async fn retract_vote(
    &self,
    actor: &Actor,
    voter_id: i64,
    item_id: i64,
  ) -> Result<VoteResult> {
    actor.authorize(voter_id)?;
    self.require_voter(voter_id).await?;
    self.require_item(item_id).await?;

    let previous = self.current_state(voter_id, item_id).await?;
    if previous == VoteState::NoVote {
      return Err(Error::VoteNotFound { voter_id, item_id });
    }

    let outcome = self.write(voter_id, item_id, VoteWrite::Delete).await?;
    if outcome != RowWrite::Applied {
      return Err(Error::VoteNotFound { voter_id, item_id });
    }

    self.finish(voter_id, item_id, previous, VoteState::NoVote).await
  }

  // ── Helpers ───────────────────────────────────────────────────────────────

  async fn require_voter(&self, voter_id: i64) -> Result<User> {
    self
      .store
      .get_user(voter_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::UserNotFound(voter_id))
  }

  async fn require_item(&self, item_id: i64) -> Result<Recipe> {
    self
      .store
      .get_recipe(item_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::RecipeNotFound(item_id))
  }

  async fn current_state(&self, voter_id: i64, item_id: i64) -> Result<VoteState> {
    let row = self.store.get_vote(voter_id, item_id).await.map_err(Error::store)?;
    Ok(VoteState::of(row.map(|v| v.direction)))
  }

  async fn write(&self, voter_id: i64, item_id: i64, write: VoteWrite) -> Result<RowWrite> {
    let outcome = match write {
      VoteWrite::Insert(d) => self.store.insert_vote(voter_id, item_id, d).await,
      VoteWrite::Update(d) => self.store.update_vote(voter_id, item_id, d).await,
      VoteWrite::Delete => self.store.delete_vote(voter_id, item_id).await,
    };
    outcome.map_err(Error::store)
  }

  /// Issue `write`, retrying once with its fallback if it lost a race.
  async fn apply(&self, voter_id: i64, item_id: i64, write: VoteWrite) -> Result<()> {
    let outcome = self.write(voter_id, item_id, write).await?;
    if outcome == RowWrite::Applied {
      return Ok(());
    }

    // A delete that found nothing has already reached the no-vote state.
    let Some(fallback) = write.fallback() else {
      debug!(voter_id, item_id, "vote already removed by a concurrent writer");
      return Ok(());
    };

    debug!(voter_id, item_id, ?write, ?outcome, ?fallback, "vote write raced, retrying");
    match self.write(voter_id, item_id, fallback).await? {
      RowWrite::Applied => Ok(()),
      second => Err(Error::Conflict(format!(
        "vote by user {voter_id} on recipe {item_id} changed concurrently \
         ({write:?} → {outcome:?}, {fallback:?} → {second:?})"
      ))),
    }
  }

  async fn finish(
    &self,
    voter_id: i64,
    item_id: i64,
    previous: VoteState,
    current: VoteState,
  ) -> Result<VoteResult> {
    let score = self.store.score(item_id).await.map_err(Error::store)?;
    info!(voter_id, item_id, ?previous, ?current, score = score.score, "vote recorded");
    Ok(VoteResult { voter_id, item_id, previous, current, score })
  }
}
