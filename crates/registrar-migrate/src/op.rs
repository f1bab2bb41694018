//! Typed DDL operations that make up a revision body.
//!
//! Operations are plain data. [`crate::render`] turns them into SQL for a
//! given dialect; the runner executes them in declaration order.

use registrar_core::Dialect;

// ─── Columns ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
  Integer,
  String(u32),
  Text,
  Float,
  Date,
  DateTime,
  Numeric(u8, u8),
}

/// A server-side default, applied by the database to existing and new rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerDefault {
  Literal(String),
  CurrentTimestamp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
  pub name:        String,
  pub ty:          ColumnType,
  pub nullable:    bool,
  pub default:     Option<ServerDefault>,
  pub primary_key: bool,
  pub unique:      bool,
  /// `(table, column)` this column references.
  pub references:  Option<(String, String)>,
}

impl Column {
  /// A nullable column with no default.
  pub fn new(name: &str, ty: ColumnType) -> Self {
    Self {
      name: name.to_owned(),
      ty,
      nullable: true,
      default: None,
      primary_key: false,
      unique: false,
      references: None,
    }
  }

  /// An integer primary key column named `id`.
  pub fn id() -> Self {
    Self { primary_key: true, nullable: false, ..Self::new("id", ColumnType::Integer) }
  }

  pub fn not_null(mut self) -> Self {
    self.nullable = false;
    self
  }

  pub fn default_literal(mut self, value: &str) -> Self {
    self.default = Some(ServerDefault::Literal(value.to_owned()));
    self
  }

  pub fn default_now(mut self) -> Self {
    self.default = Some(ServerDefault::CurrentTimestamp);
    self
  }

  pub fn unique(mut self) -> Self {
    self.unique = true;
    self
  }

  pub fn references(mut self, table: &str, column: &str) -> Self {
    self.references = Some((table.to_owned(), column.to_owned()));
    self
  }
}

// ─── Tables and indexes ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueConstraint {
  pub name:    String,
  pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
  pub name:    String,
  pub columns: Vec<Column>,
  pub uniques: Vec<UniqueConstraint>,
}

impl Table {
  pub fn new(name: &str) -> Self {
    Self { name: name.to_owned(), columns: Vec::new(), uniques: Vec::new() }
  }

  pub fn column(mut self, column: Column) -> Self {
    self.columns.push(column);
    self
  }

  pub fn unique_constraint(mut self, name: &str, columns: &[&str]) -> Self {
    self.uniques.push(UniqueConstraint {
      name:    name.to_owned(),
      columns: columns.iter().map(|c| (*c).to_owned()).collect(),
    });
    self
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
  pub name:    String,
  pub table:   String,
  /// Column order is significant for range scans.
  pub columns: Vec<String>,
  pub unique:  bool,
}

// ─── Operations ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
  CreateTable(Table),
  DropTable {
    name: String,
  },
  AddColumn {
    table:         String,
    column:        Column,
    if_not_exists: bool,
  },
  DropColumn {
    table:     String,
    column:    String,
    if_exists: bool,
  },
  CreateIndex(Index),
  DropIndex {
    name:  String,
    table: String,
  },
  /// Raw SQL. With `only` set, the statement is skipped on other dialects.
  Execute {
    sql:  String,
    only: Option<Dialect>,
  },
}

impl Op {
  pub fn create_table(table: Table) -> Self { Self::CreateTable(table) }

  pub fn drop_table(name: &str) -> Self { Self::DropTable { name: name.to_owned() } }

  pub fn add_column(table: &str, column: Column) -> Self {
    Self::AddColumn { table: table.to_owned(), column, if_not_exists: false }
  }

  /// `ADD COLUMN IF NOT EXISTS`; safe to replay.
  pub fn ensure_column(table: &str, column: Column) -> Self {
    Self::AddColumn { table: table.to_owned(), column, if_not_exists: true }
  }

  pub fn drop_column(table: &str, column: &str) -> Self {
    Self::DropColumn { table: table.to_owned(), column: column.to_owned(), if_exists: false }
  }

  pub fn create_index(name: &str, table: &str, columns: &[&str]) -> Self {
    Self::CreateIndex(Index {
      name:    name.to_owned(),
      table:   table.to_owned(),
      columns: columns.iter().map(|c| (*c).to_owned()).collect(),
      unique:  false,
    })
  }

  pub fn drop_index(name: &str, table: &str) -> Self {
    Self::DropIndex { name: name.to_owned(), table: table.to_owned() }
  }

  pub fn execute(sql: &str) -> Self { Self::Execute { sql: sql.to_owned(), only: None } }

  pub fn execute_on(dialect: Dialect, sql: &str) -> Self {
    Self::Execute { sql: sql.to_owned(), only: Some(dialect) }
  }

  /// Whether replaying this operation on an already-migrated schema succeeds.
  pub fn is_replay_safe(&self) -> bool {
    match self {
      Self::AddColumn { if_not_exists, .. } => *if_not_exists,
      Self::DropColumn { if_exists, .. } => *if_exists,
      _ => false,
    }
  }
}
