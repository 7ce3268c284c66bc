//! Votes, the per-pair vote state machine, and the derived score.
//!
//! A voter holds at most one vote per recipe. Casting the direction the voter
//! already holds removes the vote; casting the other direction flips it in
//! place. The score is never stored: it is recomputed from the vote rows on
//! every read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Direction ───────────────────────────────────────────────────────────────

/// The polarity of a vote. On the wire this is a boolean: `true` is a like
/// (up), `false` a dislike (down).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "bool", into = "bool")]
pub enum Direction {
  Up,
  Down,
}

impl Direction {
  /// `+1` for up, `-1` for down. This is also the stored column value.
  pub fn sign(self) -> i64 {
    match self {
      Self::Up => 1,
      Self::Down => -1,
    }
  }

  pub fn from_sign(sign: i64) -> Option<Self> {
    match sign {
      1 => Some(Self::Up),
      -1 => Some(Self::Down),
      _ => None,
    }
  }
}

impl From<bool> for Direction {
  fn from(like: bool) -> Self { if like { Self::Up } else { Self::Down } }
}

impl From<Direction> for bool {
  fn from(d: Direction) -> Self { d == Direction::Up }
}

// ─── Vote row ────────────────────────────────────────────────────────────────

/// One persisted vote. `(voter_id, item_id)` is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
  pub voter_id:  i64,
  pub item_id:   i64,
  pub direction: Direction,
  /// Server-assigned time of the last insert or flip.
  pub cast_at:   DateTime<Utc>,
}

// ─── State machine ───────────────────────────────────────────────────────────

/// The state of a single `(voter, item)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VoteState {
  NoVote,
  Upvoted,
  Downvoted,
}

/// The single-row write that moves a pair from one state to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteWrite {
  Insert(Direction),
  Update(Direction),
  Delete,
}

impl VoteWrite {
  /// The write to retry with when this one lost a race: a duplicate insert
  /// becomes an update and a vanished update becomes an insert. A delete
  /// whose row is already gone has nothing to retry.
  pub fn fallback(self) -> Option<Self> {
    match self {
      Self::Insert(d) => Some(Self::Update(d)),
      Self::Update(d) => Some(Self::Insert(d)),
      Self::Delete => None,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
  pub from:  VoteState,
  pub to:    VoteState,
  pub write: VoteWrite,
}

impl VoteState {
  pub fn of(direction: Option<Direction>) -> Self {
    match direction {
      None => Self::NoVote,
      Some(Direction::Up) => Self::Upvoted,
      Some(Direction::Down) => Self::Downvoted,
    }
  }

  pub fn direction(self) -> Option<Direction> {
    match self {
      Self::NoVote => None,
      Self::Upvoted => Some(Direction::Up),
      Self::Downvoted => Some(Direction::Down),
    }
  }

  /// The transition taken when the voter casts `direction` from this state.
  pub fn cast(self, direction: Direction) -> Transition {
    let (to, write) = match (self, direction) {
      (Self::NoVote, Direction::Up) => (Self::Upvoted, VoteWrite::Insert(Direction::Up)),
      (Self::NoVote, Direction::Down) => {
        (Self::Downvoted, VoteWrite::Insert(Direction::Down))
      }
      (Self::Upvoted, Direction::Up) => (Self::NoVote, VoteWrite::Delete),
      (Self::Upvoted, Direction::Down) => {
        (Self::Downvoted, VoteWrite::Update(Direction::Down))
      }
      (Self::Downvoted, Direction::Down) => (Self::NoVote, VoteWrite::Delete),
      (Self::Downvoted, Direction::Up) => (Self::Upvoted, VoteWrite::Update(Direction::Up)),
    };
    Transition { from: self, to, write }
  }
}

// ─── Score ───────────────────────────────────────────────────────────────────

/// The aggregate score of an item, always derived from its vote rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
  pub item_id:   i64,
  pub upvotes:   u64,
  pub downvotes: u64,
  pub score:     i64,
}

impl Score {
  pub fn from_counts(item_id: i64, upvotes: u64, downvotes: u64) -> Self {
    Self { item_id, upvotes, downvotes, score: upvotes as i64 - downvotes as i64 }
  }

  /// Recompute a score from a set of votes. Votes for other items are
  /// ignored.
  pub fn tally(item_id: i64, votes: &[Vote]) -> Self {
    let (up, down) = votes
      .iter()
      .filter(|v| v.item_id == item_id)
      .fold((0, 0), |(up, down), v| match v.direction {
        Direction::Up => (up + 1, down),
        Direction::Down => (up, down + 1),
      });
    Self::from_counts(item_id, up, down)
  }
}

// ─── Result ──────────────────────────────────────────────────────────────────

/// Outcome of a ledger mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteResult {
  pub voter_id: i64,
  pub item_id:  i64,
  pub previous: VoteState,
  pub current:  VoteState,
  /// The item's score recomputed after the write.
  pub score:    Score,
}

impl VoteResult {
  /// Whether the mutation created a new vote row.
  pub fn created(&self) -> bool {
    self.previous == VoteState::NoVote && self.current != VoteState::NoVote
  }
}
