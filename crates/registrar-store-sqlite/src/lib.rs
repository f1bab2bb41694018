//! SQLite transport for the registrar toolkit.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Used for local development databases
//! and for every test in the workspace.

mod encode;
mod store;

pub mod error;

pub use error::Error;
pub use store::SqliteDatabase;

#[cfg(test)]
mod tests;
