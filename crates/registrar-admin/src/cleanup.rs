//! Bulk data cleanup and one-off schema fixes.

use std::fmt;

use registrar_core::{Database, Result};
use registrar_migrate::{apply_op, Column, ColumnType, Op};
use tracing::info;

use crate::{finish, FAIL, OK};

// ─── Derived data ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanDerived {
  pub reports_deleted:   u64,
  pub marks_deleted:     u64,
  pub reports_remaining: i64,
  pub marks_remaining:   i64,
}

impl CleanDerived {
  pub fn is_clean(&self) -> bool { self.reports_remaining == 0 && self.marks_remaining == 0 }
}

/// Delete every report, then every mark, each in its own transaction, and
/// recount both tables.
pub async fn clean_derived<D: Database>(db: &mut D) -> Result<CleanDerived> {
  let reports_deleted = delete_all(db, "reports").await?;
  let marks_deleted = delete_all(db, "marks").await?;

  let reports_remaining = db.scalar_int("SELECT COUNT(*) FROM reports", &[]).await?;
  let marks_remaining = db.scalar_int("SELECT COUNT(*) FROM marks", &[]).await?;

  Ok(CleanDerived { reports_deleted, marks_deleted, reports_remaining, marks_remaining })
}

async fn delete_all<D: Database>(db: &mut D, table: &'static str) -> Result<u64> {
  db.begin().await?;
  let sql = format!("DELETE FROM {table}");
  let outcome = db.execute(&sql, &[]).await;
  let deleted = finish(db, outcome).await?;
  info!(table, deleted, "deleted all rows");
  Ok(deleted)
}

impl fmt::Display for CleanDerived {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "{OK} deleted {} reports", self.reports_deleted)?;
    writeln!(f, "{OK} deleted {} marks", self.marks_deleted)?;
    let mark = if self.is_clean() { OK } else { FAIL };
    writeln!(
      f,
      "{mark} remaining: reports={} marks={}",
      self.reports_remaining, self.marks_remaining
    )
  }
}

// ─── Quantity column ─────────────────────────────────────────────────────────

pub fn quantity_column() -> Op {
  Op::ensure_column("expense_records", Column::new("quantity", ColumnType::Integer))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantityColumn {
  /// `false` when the column was already there.
  pub added: bool,
}

/// Add `expense_records.quantity` if it is missing. Safe to run repeatedly.
pub async fn add_quantity_column<D: Database>(db: &mut D) -> Result<QuantityColumn> {
  let existed = db.has_column("expense_records", "quantity").await?;

  db.begin().await?;
  let outcome = apply_op(db, &quantity_column()).await;
  finish(db, outcome).await?;

  info!(added = !existed, "ensured expense_records.quantity");
  Ok(QuantityColumn { added: !existed })
}

impl fmt::Display for QuantityColumn {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.added {
      writeln!(f, "{OK} added expense_records.quantity")
    } else {
      writeln!(f, "{OK} expense_records.quantity already present")
    }
  }
}
