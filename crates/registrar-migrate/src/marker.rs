//! The applied-revision marker: a single-row table naming the revision the
//! database is at. An empty table means the empty state.

use registrar_core::{Database, Error, Result, Value};
use tracing::info;

pub const VERSION_TABLE: &str = "schema_version";

/// Marker table written by the tooling this one replaces. Read, never written.
pub const LEGACY_TABLE: &str = "alembic_version";

pub fn create_table_sql() -> String {
  format!(
    "CREATE TABLE IF NOT EXISTS {VERSION_TABLE} (\n\
     \tversion_num VARCHAR(64) NOT NULL,\n\
     \tCONSTRAINT {VERSION_TABLE}_pkc PRIMARY KEY (version_num)\n\
     )"
  )
}

/// Statement moving the marker from `from` to `to`, with parameters.
pub fn move_sql(from: Option<&str>, to: Option<&str>) -> Option<(String, Vec<Value>)> {
  match (from, to) {
    (None, None) => None,
    (None, Some(to)) => Some((
      format!("INSERT INTO {VERSION_TABLE} (version_num) VALUES ($1)"),
      vec![Value::from(to)],
    )),
    (Some(from), Some(to)) => Some((
      format!("UPDATE {VERSION_TABLE} SET version_num = $1 WHERE version_num = $2"),
      vec![Value::from(to), Value::from(from)],
    )),
    (Some(from), None) => Some((
      format!("DELETE FROM {VERSION_TABLE} WHERE version_num = $1"),
      vec![Value::from(from)],
    )),
  }
}

/// Substitute `$n` placeholders with literal values, for offline scripts.
///
/// A single left-to-right pass. Substituted values go straight to the output
/// and are never rescanned, and quoted text is copied untouched.
/// Placeholders without a matching parameter are left as written.
pub fn bind_literals(sql: &str, params: &[Value]) -> String {
  let mut out = String::with_capacity(sql.len());
  let mut quote: Option<char> = None;
  let mut chars = sql.chars().peekable();

  while let Some(c) = chars.next() {
    match quote {
      Some(q) => {
        out.push(c);
        if c == q {
          quote = None;
        }
      }
      None if c == '\'' || c == '"' => {
        quote = Some(c);
        out.push(c);
      }
      None if c == '$' && chars.peek().is_some_and(char::is_ascii_digit) => {
        let mut digits = String::new();
        while let Some(d) = chars.next_if(char::is_ascii_digit) {
          digits.push(d);
        }
        let param = digits
          .parse::<usize>()
          .ok()
          .and_then(|n| n.checked_sub(1))
          .and_then(|idx| params.get(idx));
        match param {
          Some(value) => out.push_str(&value.to_sql_literal()),
          None => {
            out.push('$');
            out.push_str(&digits);
          }
        }
      }
      None => out.push(c),
    }
  }
  out
}

/// Create the marker table if needed. A database last migrated by the
/// previous tooling has its revision in [`LEGACY_TABLE`]; that row is copied
/// over when the table is first created, and the legacy table is left alone.
pub async fn ensure_table<D: Database>(db: &mut D) -> Result<()> {
  let tables = db.tables().await?;
  if tables.iter().any(|t| t == VERSION_TABLE) {
    return Ok(());
  }
  db.execute(&create_table_sql(), &[]).await?;

  if tables.iter().any(|t| t == LEGACY_TABLE) {
    let adopted = db
      .execute(
        &format!(
          "INSERT INTO {VERSION_TABLE} (version_num) SELECT version_num FROM {LEGACY_TABLE}"
        ),
        &[],
      )
      .await?;
    info!(rows = adopted, "adopted revision marker from {LEGACY_TABLE}");
  }
  Ok(())
}

/// The revision the database is at, or `None` for the empty state.
pub async fn current<D: Database>(db: &mut D) -> Result<Option<String>> {
  let tables = db.tables().await?;
  let table = if tables.iter().any(|t| t == VERSION_TABLE) {
    VERSION_TABLE
  } else if tables.iter().any(|t| t == LEGACY_TABLE) {
    LEGACY_TABLE
  } else {
    return Ok(None);
  };

  let rows = db.query(&format!("SELECT version_num FROM {table}"), &[]).await?;
  match rows.as_slice() {
    [] => Ok(None),
    [row] => Ok(Some(row.text(0)?)),
    _ => Err(Error::NotLinear(format!(
      "{table} holds {} rows; expected at most one",
      rows.len()
    ))),
  }
}

pub async fn advance<D: Database>(db: &mut D, from: Option<&str>, to: Option<&str>) -> Result<()> {
  if let Some((sql, params)) = move_sql(from, to) {
    db.execute(&sql, &params).await?;
  }
  Ok(())
}
