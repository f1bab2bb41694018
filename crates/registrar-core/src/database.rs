//! The `Database` transport trait and catalog types.
//!
//! The trait is implemented by `registrar-store-sqlite` and
//! `registrar-store-postgres`. The migration runner and the admin tools are
//! written against this abstraction so the two transports are
//! interchangeable.

use std::{fmt, future::Future};

use crate::{Result, Row, Value};

// ─── Dialect ─────────────────────────────────────────────────────────────────

/// SQL dialect spoken by a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
  Postgres,
  Sqlite,
}

impl Dialect {
  /// Whether `ALTER TABLE … ADD COLUMN IF NOT EXISTS` is understood.
  pub fn supports_add_column_if_not_exists(self) -> bool {
    matches!(self, Self::Postgres)
  }
}

impl fmt::Display for Dialect {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Postgres => f.write_str("postgresql"),
      Self::Sqlite => f.write_str("sqlite"),
    }
  }
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

/// A column as reported by the database catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
  pub name:      String,
  pub data_type: String,
  pub nullable:  bool,
  /// Raw server-side default expression, as the catalog reports it.
  pub default:   Option<String>,
}

/// A secondary index (primary keys excluded).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexInfo {
  pub name:    String,
  pub columns: Vec<String>,
  pub unique:  bool,
}

/// A table constraint, e.g. `("u_staff_date", "UNIQUE")`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintInfo {
  pub name: String,
  pub kind: String,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// A single live connection to the application database.
///
/// SQL passed to [`execute`](Self::execute) and [`query`](Self::query) uses
/// `$1`, `$2`, … placeholders. Transactions are explicit: the connection is in
/// autocommit mode until [`begin`](Self::begin) is called.
///
/// All methods return `Send` futures so callers can run on a multi-threaded
/// tokio runtime.
pub trait Database: Send {
  fn dialect(&self) -> Dialect;

  /// Run a statement and return the number of affected rows.
  fn execute<'a>(
    &'a mut self,
    sql: &'a str,
    params: &'a [Value],
  ) -> impl Future<Output = Result<u64>> + Send + 'a;

  /// Run a statement and collect every returned row.
  fn query<'a>(
    &'a mut self,
    sql: &'a str,
    params: &'a [Value],
  ) -> impl Future<Output = Result<Vec<Row>>> + Send + 'a;

  fn begin(&mut self) -> impl Future<Output = Result<()>> + Send + '_;

  fn commit(&mut self) -> impl Future<Output = Result<()>> + Send + '_;

  fn rollback(&mut self) -> impl Future<Output = Result<()>> + Send + '_;

  // ── Catalog ───────────────────────────────────────────────────────────

  /// Names of all user tables, sorted.
  fn tables(&mut self) -> impl Future<Output = Result<Vec<String>>> + Send + '_;

  /// Columns of `table` in declaration order. Empty if the table is absent.
  fn columns<'a>(
    &'a mut self,
    table: &'a str,
  ) -> impl Future<Output = Result<Vec<ColumnInfo>>> + Send + 'a;

  /// Secondary indexes on `table`, sorted by name.
  fn indexes<'a>(
    &'a mut self,
    table: &'a str,
  ) -> impl Future<Output = Result<Vec<IndexInfo>>> + Send + 'a;

  /// Named constraints on `table`.
  fn constraints<'a>(
    &'a mut self,
    table: &'a str,
  ) -> impl Future<Output = Result<Vec<ConstraintInfo>>> + Send + 'a;

  /// Release the connection.
  fn close(self) -> impl Future<Output = Result<()>> + Send
  where
    Self: Sized;

  // ── Provided helpers ──────────────────────────────────────────────────

  /// Run a query expected to return exactly one integer, e.g. `COUNT(*)`.
  fn scalar_int<'a>(
    &'a mut self,
    sql: &'a str,
    params: &'a [Value],
  ) -> impl Future<Output = Result<i64>> + Send + 'a
  where
    Self: Sized,
  {
    async move {
      let rows = self.query(sql, params).await?;
      let row = rows
        .first()
        .ok_or_else(|| crate::Error::Decode(format!("no rows returned by {sql:?}")))?;
      row.int(0)
    }
  }

  /// Whether `table` currently has a column called `column`.
  fn has_column<'a>(
    &'a mut self,
    table: &'a str,
    column: &'a str,
  ) -> impl Future<Output = Result<bool>> + Send + 'a
  where
    Self: Sized,
  {
    async move {
      let columns = self.columns(table).await?;
      Ok(columns.iter().any(|c| c.name == column))
    }
  }
}
