//! Error type for `potluck-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored value that does not decode into its domain type.
  #[error("corrupt row: {0}")]
  Decode(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
