//! Error types for `registrar-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("no database url configured: set DATABASE_URL or database.url")]
  ConfigMissing,

  #[error("configuration error: {0}")]
  Config(String),

  #[error("invalid database url: {0}")]
  InvalidUrl(String),

  #[error("could not connect to database: {0}")]
  ConnectFailed(String),

  #[error("no such revision: {0:?}")]
  NoSuchRevision(String),

  #[error("revision graph is not linear: {0}")]
  NotLinear(String),

  #[error("invalid migration target: {0}")]
  InvalidTarget(String),

  /// A forward or reverse body raised a database error. The revision's
  /// transaction has been rolled back.
  #[error("{direction} of revision {revision} failed: {message}")]
  DdlFailed {
    revision:  String,
    direction: &'static str,
    message:   String,
  },

  #[error("role {0:?} not found in roles table")]
  MissingRole(String),

  #[error("no user found with email {0:?}")]
  UserNotFound(String),

  #[error("integrity violation: {0}")]
  IntegrityViolation(String),

  #[error("database error: {0}")]
  Database(String),

  #[error("decode error: {0}")]
  Decode(String),

  #[error("password hashing failed: {0}")]
  Hash(String),
}

impl From<config::ConfigError> for Error {
  fn from(err: config::ConfigError) -> Self { Self::Config(err.to_string()) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
