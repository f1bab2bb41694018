//! Core types and trait definitions for the registrar toolkit.
//!
//! This crate is deliberately free of database drivers. The migration engine,
//! the admin tools and the CLI depend on the [`Database`](database::Database)
//! abstraction defined here, never on a concrete backend.

pub mod config;
pub mod database;
pub mod error;
pub mod value;

pub use database::{ColumnInfo, ConstraintInfo, Database, Dialect, IndexInfo};
pub use error::{Error, Result};
pub use value::{Row, Value};

#[cfg(test)]
mod tests;
