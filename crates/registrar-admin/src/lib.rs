//! Administrative probes and mutators for the school database.
//!
//! Probes are read-only and return typed reports whose `Display` output is
//! meant for a terminal. Mutators run inside a transaction, commit on
//! success and roll back on any error. Everything is generic over
//! [`registrar_core::Database`], so the same code serves Postgres in
//! production and SQLite in tests.

pub mod cleanup;
pub mod hash;
pub mod probes;
pub mod roles;
pub mod users;

pub use hash::{Argon2Hasher, PasswordHasher};

use registrar_core::{Database, Result};
use tracing::warn;

/// Success marker for terminal output.
pub const OK: &str = "✓";
/// Failure marker for terminal output.
pub const FAIL: &str = "✗";

/// Commit if `outcome` is `Ok`, otherwise roll back and return the error.
pub(crate) async fn finish<D: Database, T>(db: &mut D, outcome: Result<T>) -> Result<T> {
  match outcome {
    Ok(value) => {
      db.commit().await?;
      Ok(value)
    }
    Err(err) => {
      if let Err(rollback_err) = db.rollback().await {
        warn!(error = %rollback_err, "rollback failed");
      }
      Err(err)
    }
  }
}

#[cfg(test)]
mod tests;
