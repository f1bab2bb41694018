//! Error type for `registrar-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("could not open sqlite database: {0}")]
  Open(#[source] tokio_rusqlite::Error),

  #[error("sqlite error: {0}")]
  Sqlite(#[from] tokio_rusqlite::Error),
}

impl Error {
  fn is_constraint_violation(&self) -> bool {
    match self {
      Self::Sqlite(tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(e, _))) => {
        e.code == rusqlite::ErrorCode::ConstraintViolation
      }
      _ => false,
    }
  }
}

impl From<Error> for registrar_core::Error {
  fn from(err: Error) -> Self {
    if err.is_constraint_violation() {
      return Self::IntegrityViolation(err.to_string());
    }
    match err {
      Error::Open(e) => Self::ConnectFailed(e.to_string()),
      Error::Sqlite(e) => Self::Database(e.to_string()),
    }
  }
}
