//! [`SqliteDatabase`], the SQLite implementation of [`Database`].

use std::path::Path;

use registrar_core::{
  ColumnInfo, ConstraintInfo, Database, Dialect, IndexInfo, Result, Row, Value,
};
use rusqlite::{params_from_iter, OptionalExtension as _};
use tracing::debug;

use crate::{
  encode::{decode_value, encode_value, named_constraints, rewrite_placeholders},
  Error,
};

// ─── Connection ──────────────────────────────────────────────────────────────

/// A single SQLite connection.
pub struct SqliteDatabase {
  conn: tokio_rusqlite::Connection,
}

impl SqliteDatabase {
  /// Open (or create) the database file at `path`.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref().to_owned();
    debug!(path = %path.display(), "opening sqlite database");
    let conn = tokio_rusqlite::Connection::open(path).await.map_err(Error::Open)?;
    Ok(Self { conn })
  }

  /// Open a private in-memory database, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await.map_err(Error::Open)?;
    Ok(Self { conn })
  }

  /// Run a batch of `;`-separated statements without parameters.
  pub async fn execute_batch(&self, sql: &str) -> Result<()> {
    let sql = sql.to_owned();
    self.call(move |conn| Ok(conn.execute_batch(&sql)?)).await
  }

  async fn call<R, F>(&self, f: F) -> Result<R>
  where
    R: Send + 'static,
    F: FnOnce(&mut rusqlite::Connection) -> tokio_rusqlite::Result<R> + Send + 'static,
  {
    Ok(self.conn.call(f).await.map_err(Error::from)?)
  }
}

fn bind(params: &[Value]) -> Vec<rusqlite::types::Value> {
  params.iter().map(encode_value).collect()
}

// ─── Database impl ───────────────────────────────────────────────────────────

impl Database for SqliteDatabase {
  fn dialect(&self) -> Dialect { Dialect::Sqlite }

  async fn execute<'a>(&'a mut self, sql: &'a str, params: &'a [Value]) -> Result<u64> {
    let sql = rewrite_placeholders(sql);
    let params = bind(params);
    self
      .call(move |conn| {
        let affected = conn.execute(&sql, params_from_iter(params))?;
        Ok(affected as u64)
      })
      .await
  }

  async fn query<'a>(&'a mut self, sql: &'a str, params: &'a [Value]) -> Result<Vec<Row>> {
    let sql = rewrite_placeholders(sql);
    let params = bind(params);
    self
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let width = stmt.column_count();
        let rows = stmt
          .query_map(params_from_iter(params), |row| {
            (0..width)
              .map(|i| row.get_ref(i).map(decode_value))
              .collect::<rusqlite::Result<Vec<_>>>()
              .map(Row)
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
  }

  async fn begin(&mut self) -> Result<()> { self.execute_batch("BEGIN").await }

  async fn commit(&mut self) -> Result<()> { self.execute_batch("COMMIT").await }

  async fn rollback(&mut self) -> Result<()> { self.execute_batch("ROLLBACK").await }

  // ── Catalog ───────────────────────────────────────────────────────────

  async fn tables(&mut self) -> Result<Vec<String>> {
    self
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT name FROM sqlite_master
           WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
           ORDER BY name",
        )?;
        let names = stmt
          .query_map([], |r| r.get::<_, String>(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(names)
      })
      .await
  }

  async fn columns<'a>(&'a mut self, table: &'a str) -> Result<Vec<ColumnInfo>> {
    let table = table.to_owned();
    self
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT name, type, \"notnull\", dflt_value
           FROM pragma_table_info(?1)
           ORDER BY cid",
        )?;
        let columns = stmt
          .query_map([&table], |r| {
            Ok(ColumnInfo {
              name:      r.get(0)?,
              data_type: r.get(1)?,
              nullable:  r.get::<_, i64>(2)? == 0,
              default:   r.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(columns)
      })
      .await
  }

  async fn indexes<'a>(&'a mut self, table: &'a str) -> Result<Vec<IndexInfo>> {
    let table = table.to_owned();
    self
      .call(move |conn| {
        // origin 'c' = created by CREATE INDEX, as opposed to constraint
        // backing indexes.
        let listed: Vec<(String, bool)> = conn
          .prepare(
            "SELECT name, \"unique\" FROM pragma_index_list(?1)
             WHERE origin = 'c'
             ORDER BY name",
          )?
          .query_map([&table], |r| Ok((r.get(0)?, r.get::<_, i64>(1)? != 0)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut indexes = Vec::with_capacity(listed.len());
        for (name, unique) in listed {
          let columns = conn
            .prepare("SELECT name FROM pragma_index_info(?1) ORDER BY seqno")?
            .query_map([&name], |r| r.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          indexes.push(IndexInfo { name, columns, unique });
        }
        Ok(indexes)
      })
      .await
  }

  async fn constraints<'a>(&'a mut self, table: &'a str) -> Result<Vec<ConstraintInfo>> {
    let table = table.to_owned();
    self
      .call(move |conn| {
        let create_sql: Option<String> = conn
          .query_row(
            "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [&table],
            |r| r.get(0),
          )
          .optional()?
          .flatten();

        let mut found: Vec<ConstraintInfo> = create_sql
          .as_deref()
          .map(named_constraints)
          .unwrap_or_default()
          .into_iter()
          .map(|(name, kind)| ConstraintInfo { name, kind })
          .collect();

        // Unnamed UNIQUE / PRIMARY KEY constraints only surface as
        // automatic indexes.
        let auto = conn
          .prepare(
            "SELECT name, origin FROM pragma_index_list(?1)
             WHERE origin IN ('u', 'pk')
             ORDER BY name",
          )?
          .query_map([&table], |r| {
            let origin: String = r.get(1)?;
            Ok(ConstraintInfo {
              name: r.get(0)?,
              kind: if origin == "pk" { "PRIMARY KEY".into() } else { "UNIQUE".into() },
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        found.extend(auto);
        Ok(found)
      })
      .await
  }

  async fn close(self) -> Result<()> {
    self
      .conn
      .close()
      .await
      .map_err(|e| registrar_core::Error::from(Error::Sqlite(e)))
  }
}
