//! Schema migration engine for the school-management database.
//!
//! Revisions form a single linear chain ([`RevisionGraph`]). The
//! [`Migrator`] walks that chain against any [`registrar_core::Database`],
//! one transaction per revision, recording the applied revision in the
//! `schema_version` marker table. [`offline`] renders the same walk as a
//! SQL script without touching a database.

pub mod graph;
pub mod marker;
pub mod offline;
pub mod op;
pub mod render;
pub mod revision;
pub mod revisions;
pub mod runner;

pub use graph::{RevisionGraph, Target};
pub use offline::OfflineRange;
pub use op::{Column, ColumnType, Op, Table};
pub use revision::{Direction, Revision, RevisionState, Transition};
pub use runner::{apply_op, MigrationReport, Migrator, Step};
