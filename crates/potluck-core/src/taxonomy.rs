//! Category links and the reconcile plan.
//!
//! A recipe's category set is edited by submitting the full desired set. The
//! plan computed here is the minimal diff against the persisted set; members
//! present on both sides are never touched.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Membership edge between a category and a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryLink {
  pub category_id: i64,
  pub item_id:     i64,
}

// ─── Plan ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
  pub to_add:    BTreeSet<i64>,
  pub to_remove: BTreeSet<i64>,
  pub unchanged: BTreeSet<i64>,
}

impl ReconcilePlan {
  pub fn between(current: &BTreeSet<i64>, desired: &BTreeSet<i64>) -> Self {
    Self {
      to_add:    desired.difference(current).copied().collect(),
      to_remove: current.difference(desired).copied().collect(),
      unchanged: current.intersection(desired).copied().collect(),
    }
  }

  pub fn is_noop(&self) -> bool { self.to_add.is_empty() && self.to_remove.is_empty() }

  /// The set of links once the plan has been applied.
  pub fn resulting(&self) -> BTreeSet<i64> {
    self.unchanged.union(&self.to_add).copied().collect()
  }
}

// ─── Result ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkAction {
  Added,
  Removed,
  Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkOutcome {
  pub category_id: i64,
  pub action:      LinkAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileResult {
  pub item_id:  i64,
  /// One entry per category id on either side of the diff, ascending.
  pub outcomes: Vec<LinkOutcome>,
  pub links:    BTreeSet<i64>,
}

impl ReconcileResult {
  pub fn from_plan(item_id: i64, plan: &ReconcilePlan) -> Self {
    let tagged = |ids: &BTreeSet<i64>, action| {
      ids
        .iter()
        .map(move |&category_id| LinkOutcome { category_id, action })
        .collect::<Vec<_>>()
    };

    let mut outcomes = tagged(&plan.to_add, LinkAction::Added);
    outcomes.extend(tagged(&plan.to_remove, LinkAction::Removed));
    outcomes.extend(tagged(&plan.unchanged, LinkAction::Unchanged));
    outcomes.sort_by_key(|o| o.category_id);

    Self { item_id, outcomes, links: plan.resulting() }
  }

  pub fn count(&self, action: LinkAction) -> usize {
    self.outcomes.iter().filter(|o| o.action == action).count()
  }
}
