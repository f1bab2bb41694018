//! Offline migration: emit the DDL script instead of executing it.
//!
//! No connection is opened. Parameters are bound as literals and each
//! revision is bracketed by its own `BEGIN;` / `COMMIT;`.

use std::fmt::Write as _;

use registrar_core::{Dialect, Error, Result};

use crate::{
  graph::Target,
  marker,
  op::Op,
  render::render,
  revision::Direction,
  runner::Migrator,
};

/// A `FROM:TO` range as accepted by `--sql`. `FROM` is `None` for base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfflineRange {
  pub from:   Option<String>,
  pub target: Target,
}

impl OfflineRange {
  /// Parse `TO` or `FROM:TO`. Without `FROM`, `default_from` is used.
  pub fn parse(spec: &str, default_from: Option<&str>) -> Result<Self> {
    match spec.split_once(':') {
      Some((from, to)) => Ok(Self {
        from:   match from.trim() {
          "" | "base" => None,
          id => Some(id.to_owned()),
        },
        target: to.parse()?,
      }),
      None => Ok(Self { from: default_from.map(str::to_owned), target: spec.parse()? }),
    }
  }
}

impl Migrator {
  /// Render the script for an upgrade over `range`.
  pub fn upgrade_script(&self, range: &OfflineRange, dialect: Dialect) -> Result<String> {
    let from = range.from.as_deref();
    let path = self.graph().upgrade_path(from, &range.target)?;
    self.script(from, path, Direction::Upgrade, dialect)
  }

  /// Render the script for a downgrade over `range`. The starting revision
  /// must be given explicitly since there is no database to ask.
  pub fn downgrade_script(&self, range: &OfflineRange, dialect: Dialect) -> Result<String> {
    let Some(from) = range.from.as_deref() else {
      return Err(Error::InvalidTarget(
        "offline downgrade needs an explicit starting revision (FROM:TO)".into(),
      ));
    };
    let path = self.graph().downgrade_path(Some(from), &range.target)?;
    self.script(Some(from), path, Direction::Downgrade, dialect)
  }

  fn script(
    &self,
    start: Option<&str>,
    path: Vec<crate::revision::Revision>,
    direction: Direction,
    dialect: Dialect,
  ) -> Result<String> {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "-- {direction} script for {dialect}\n");
    let _ = writeln!(out, "{};\n", marker::create_table_sql());

    let mut at = start.map(str::to_owned);
    for rev in path {
      let dest = match direction {
        Direction::Upgrade => Some(rev.id),
        Direction::Downgrade => rev.parent,
      };
      let _ = writeln!(
        out,
        "-- Running {direction} {} -> {}\n\nBEGIN;\n",
        at.as_deref().unwrap_or(""),
        dest.unwrap_or("")
      );

      for op in rev.body(direction) {
        if let Some(note) = conditional_note(&op, dialect) {
          let _ = writeln!(out, "{note}");
        }
        for statement in render(&op, dialect) {
          let _ = writeln!(out, "{statement};\n");
        }
      }

      if let Some((sql, params)) = marker::move_sql(at.as_deref(), dest) {
        let _ = writeln!(out, "{};\n", marker::bind_literals(&sql, &params));
      }
      let _ = writeln!(out, "COMMIT;\n");
      at = dest.map(str::to_owned);
    }

    Ok(out)
  }
}

/// SQLite cannot express conditional column changes in plain DDL.
fn conditional_note(op: &Op, dialect: Dialect) -> Option<String> {
  if dialect == Dialect::Postgres {
    return None;
  }
  match op {
    Op::AddColumn { table, column, if_not_exists: true } => {
      Some(format!("-- run only if {table}.{} is absent", column.name))
    }
    Op::DropColumn { table, column, if_exists: true } => {
      Some(format!("-- run only if {table}.{column} is present"))
    }
    _ => None,
  }
}
