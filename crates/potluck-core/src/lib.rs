//! Core types, store traits, and the engagement services for Potluck.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! The vote ledger and taxonomy linker are written against the store traits
//! in [`store`]; every other crate depends on this one.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod actor;
pub mod directory;
pub mod error;
pub mod ledger;
pub mod linker;
pub mod store;
pub mod taxonomy;
pub mod vote;

pub use actor::Actor;
pub use error::{Error, Result};
pub use ledger::VoteLedger;
pub use linker::TaxonomyLinker;

#[cfg(test)]
mod memory;
