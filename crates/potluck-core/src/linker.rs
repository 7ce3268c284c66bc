//! The taxonomy linker: which categories a recipe belongs to.
//!
//! Links are owned by the recipe's author. The whole category set of a recipe
//! is replaced with [`TaxonomyLinker::reconcile`], which hands the desired set
//! to the store so the diff is computed against the latest persisted state
//! and applied in one transaction.

use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::{
  Actor, Error, Result,
  directory::{Category, Recipe},
  store::{Directory, LinkStore, RowWrite},
  taxonomy::{LinkAction, ReconcileResult},
};

pub struct TaxonomyLinker<'s, S> {
  store: &'s S,
}

impl<'s, S> TaxonomyLinker<'s, S>
where
  S: Directory + LinkStore,
{
  pub fn new(store: &'s S) -> Self { Self { store } }

  /// The item's current category ids.
  pub async fn get_links(&self, item_id: i64) -> Result<BTreeSet<i64>> {
    self.require_item(item_id).await?;
    self.store.get_links(item_id).await.map_err(Error::store)
  }

  /// Add a single link. Returns `false` if the link already existed.
  pub async fn link(&self, actor: &Actor, category_id: i64, item_id: i64) -> Result<bool> {
    let recipe = self.require_item(item_id).await?;
    actor.authorize(recipe.author_id)?;
    self.require_category(category_id).await?;

    match self.store.insert_link(category_id, item_id).await.map_err(Error::store)? {
      RowWrite::Applied => {
        info!(category_id, item_id, "category link added");
        Ok(true)
      }
      RowWrite::Duplicate => Ok(false),
      RowWrite::Missing => Err(Error::Conflict(format!(
        "link between category {category_id} and recipe {item_id} could not be written"
      ))),
    }
  }

  /// Remove a single link.
  pub async fn unlink(&self, actor: &Actor, category_id: i64, item_id: i64) -> Result<()> {
    let recipe = self.require_item(item_id).await?;
    actor.authorize(recipe.author_id)?;

    match self.store.delete_link(category_id, item_id).await.map_err(Error::store)? {
      RowWrite::Applied => {
        info!(category_id, item_id, "category link removed");
        Ok(())
      }
      _ => Err(Error::LinkNotFound { category_id, item_id }),
    }
  }

  /// Replace the item's category set with `desired`.
  ///
  /// Duplicate ids are ignored. Every id must name an existing category;
  /// the first unknown id fails the call before anything is written.
  pub async fn reconcile(
    &self,
    actor: &Actor,
    item_id: i64,
    desired: impl IntoIterator<Item = i64>,
  ) -> Result<ReconcileResult> {
    let recipe = self.require_item(item_id).await?;
    actor.authorize(recipe.author_id)?;

    let desired: BTreeSet<i64> = desired.into_iter().collect();
    for &category_id in &desired {
      if self.find_category(category_id).await?.is_none() {
        return Err(Error::InvalidArgument(format!("unknown category id {category_id}")));
      }
    }

    let plan = self
      .store
      .reconcile_links(item_id, desired)
      .await
      .map_err(Error::store)?;
    debug!(item_id, ?plan, "reconciled category links");

    let result = ReconcileResult::from_plan(item_id, &plan);
    info!(
      item_id,
      added = result.count(LinkAction::Added),
      removed = result.count(LinkAction::Removed),
      unchanged = result.count(LinkAction::Unchanged),
      "category set updated"
    );
    Ok(result)
  }

  async fn require_item(&self, item_id: i64) -> Result<Recipe> {
    self
      .store
      .get_recipe(item_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::RecipeNotFound(item_id))
  }

  async fn find_category(&self, category_id: i64) -> Result<Option<Category>> {
    self.store.get_category(category_id).await.map_err(Error::store)
  }

  async fn require_category(&self, category_id: i64) -> Result<Category> {
    self.find_category(category_id).await?.ok_or(Error::CategoryNotFound(category_id))
  }
}
