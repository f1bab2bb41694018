//! Error type for `registrar-store-postgres`.

use thiserror::Error;

/// SQLSTATE class for integrity constraint violations.
const INTEGRITY_CLASS: &str = "23";

#[derive(Debug, Error)]
pub enum Error {
  #[error("could not connect to postgres: {0}")]
  Connect(#[source] sqlx::Error),

  #[error("postgres error: {0}")]
  Postgres(#[from] sqlx::Error),

  #[error("cannot decode column {column} of type {type_name}; cast it to text")]
  Decode { column: usize, type_name: String },
}

impl Error {
  fn sqlstate(&self) -> Option<String> {
    match self {
      Self::Postgres(sqlx::Error::Database(db)) => db.code().map(|c| c.into_owned()),
      _ => None,
    }
  }
}

impl From<Error> for registrar_core::Error {
  fn from(err: Error) -> Self {
    if err.sqlstate().is_some_and(|code| code.starts_with(INTEGRITY_CLASS)) {
      return Self::IntegrityViolation(err.to_string());
    }
    match err {
      Error::Connect(e) => Self::ConnectFailed(e.to_string()),
      Error::Postgres(e) => Self::Database(e.to_string()),
      e @ Error::Decode { .. } => Self::Decode(e.to_string()),
    }
  }
}
