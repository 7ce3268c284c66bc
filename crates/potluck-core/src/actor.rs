//! The acting identity behind a mutating request.
//!
//! Every mutating ledger and linker call takes an [`Actor`] explicitly; the
//! HTTP layer resolves it from the request's credentials.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
  pub user_id:  i64,
  pub is_admin: bool,
}

impl Actor {
  pub fn user(user_id: i64) -> Self { Self { user_id, is_admin: false } }

  pub fn admin(user_id: i64) -> Self { Self { user_id, is_admin: true } }

  /// Owners may act on their own resources; administrators on anyone's.
  pub fn may_act_for(&self, owner_id: i64) -> bool {
    self.is_admin || self.user_id == owner_id
  }

  pub fn authorize(&self, owner_id: i64) -> Result<()> {
    if self.may_act_for(owner_id) {
      Ok(())
    } else {
      Err(Error::Unauthorized { actor: self.user_id, owner: owner_id })
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn owner_may_act_for_self_only() {
    let actor = Actor::user(5);
    assert!(actor.may_act_for(5));
    assert!(!actor.may_act_for(8));
    assert!(matches!(
      actor.authorize(8),
      Err(Error::Unauthorized { actor: 5, owner: 8 })
    ));
  }

  #[test]
  fn admin_may_act_for_anyone() {
    let actor = Actor::admin(1);
    assert!(actor.may_act_for(1));
    assert!(actor.may_act_for(8));
    assert!(actor.authorize(8).is_ok());
  }
}
