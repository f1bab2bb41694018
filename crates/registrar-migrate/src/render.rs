//! SQL rendering of [`Op`]s per dialect.
//!
//! Conditional operations (`if_not_exists` / `if_exists`) only render their
//! guard on Postgres. On SQLite the online runner consults the catalog
//! instead, see [`crate::runner`].

use registrar_core::Dialect;

use crate::op::{Column, ColumnType, Index, Op, ServerDefault, Table};

/// Render `op` as zero or more statements, without trailing semicolons.
pub fn render(op: &Op, dialect: Dialect) -> Vec<String> {
  match op {
    Op::CreateTable(table) => vec![create_table(table, dialect)],
    Op::DropTable { name } => vec![format!("DROP TABLE {name}")],
    Op::AddColumn { table, column, if_not_exists } => {
      let guard = if *if_not_exists && dialect.supports_add_column_if_not_exists() {
        "IF NOT EXISTS "
      } else {
        ""
      };
      vec![format!(
        "ALTER TABLE {table} ADD COLUMN {guard}{}",
        column_spec(column, dialect, false)
      )]
    }
    Op::DropColumn { table, column, if_exists } => {
      let guard = if *if_exists && dialect == Dialect::Postgres { "IF EXISTS " } else { "" };
      vec![format!("ALTER TABLE {table} DROP COLUMN {guard}{column}")]
    }
    Op::CreateIndex(index) => vec![create_index(index)],
    Op::DropIndex { name, .. } => vec![format!("DROP INDEX {name}")],
    Op::Execute { sql, only } => match only {
      Some(d) if *d != dialect => Vec::new(),
      _ => vec![sql.trim().trim_end_matches(';').to_owned()],
    },
  }
}

pub fn type_name(ty: ColumnType, dialect: Dialect) -> String {
  match ty {
    ColumnType::Integer => "INTEGER".to_owned(),
    ColumnType::String(len) => format!("VARCHAR({len})"),
    ColumnType::Text => "TEXT".to_owned(),
    ColumnType::Float => "FLOAT".to_owned(),
    ColumnType::Date => "DATE".to_owned(),
    ColumnType::DateTime => match dialect {
      Dialect::Postgres => "TIMESTAMP WITHOUT TIME ZONE".to_owned(),
      Dialect::Sqlite => "DATETIME".to_owned(),
    },
    ColumnType::Numeric(p, s) => format!("NUMERIC({p}, {s})"),
  }
}

fn default_expr(default: &ServerDefault, dialect: Dialect) -> String {
  match default {
    ServerDefault::Literal(v) => format!("'{}'", v.replace('\'', "''")),
    ServerDefault::CurrentTimestamp => match dialect {
      Dialect::Postgres => "now()".to_owned(),
      Dialect::Sqlite => "CURRENT_TIMESTAMP".to_owned(),
    },
  }
}

/// `name TYPE [DEFAULT x] [NOT NULL]`.
fn column_spec(column: &Column, dialect: Dialect, in_create: bool) -> String {
  let ty = if in_create
    && column.primary_key
    && column.ty == ColumnType::Integer
    && dialect == Dialect::Postgres
  {
    "SERIAL".to_owned()
  } else {
    type_name(column.ty, dialect)
  };

  let mut spec = format!("{} {ty}", column.name);
  if let Some(default) = &column.default {
    spec.push_str(" DEFAULT ");
    spec.push_str(&default_expr(default, dialect));
  }
  if !column.nullable {
    spec.push_str(" NOT NULL");
  }
  spec
}

fn create_table(table: &Table, dialect: Dialect) -> String {
  let mut lines: Vec<String> = table
    .columns
    .iter()
    .map(|c| column_spec(c, dialect, true))
    .collect();

  let pk: Vec<&str> = table
    .columns
    .iter()
    .filter(|c| c.primary_key)
    .map(|c| c.name.as_str())
    .collect();
  if !pk.is_empty() {
    lines.push(format!("PRIMARY KEY ({})", pk.join(", ")));
  }

  for column in &table.columns {
    if let Some((ref_table, ref_column)) = &column.references {
      lines.push(format!(
        "FOREIGN KEY({}) REFERENCES {ref_table} ({ref_column})",
        column.name
      ));
    }
  }

  for column in table.columns.iter().filter(|c| c.unique) {
    lines.push(format!("UNIQUE ({})", column.name));
  }

  for unique in &table.uniques {
    lines.push(format!(
      "CONSTRAINT {} UNIQUE ({})",
      unique.name,
      unique.columns.join(", ")
    ));
  }

  format!("CREATE TABLE {} (\n\t{}\n)", table.name, lines.join(",\n\t"))
}

fn create_index(index: &Index) -> String {
  let unique = if index.unique { "UNIQUE " } else { "" };
  format!(
    "CREATE {unique}INDEX {} ON {} ({})",
    index.name,
    index.table,
    index.columns.join(", ")
  )
}
