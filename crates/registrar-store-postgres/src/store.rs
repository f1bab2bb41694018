//! [`PgDatabase`], the PostgreSQL implementation of [`Database`].

use registrar_core::{
  config::PgParams, ColumnInfo, ConstraintInfo, Database, Dialect, IndexInfo, Result, Row, Value,
};
use sqlx::{
  postgres::{PgArguments, PgConnectOptions, PgRow, PgSslMode},
  query::Query,
  Column as _, Connection as _, PgConnection, Postgres, Row as _, TypeInfo as _,
};
use tracing::debug;

use crate::{catalog, Error};

fn db_err(err: sqlx::Error) -> registrar_core::Error { Error::from(err).into() }

// ─── Connection ──────────────────────────────────────────────────────────────

pub struct PgDatabase {
  conn: PgConnection,
}

impl PgDatabase {
  pub async fn connect(params: &PgParams) -> Result<Self> {
    let mut options = PgConnectOptions::new()
      .host(&params.host)
      .port(params.port)
      .database(&params.database)
      .ssl_mode(if params.require_tls { PgSslMode::Require } else { PgSslMode::Prefer });
    if let Some(user) = &params.user {
      options = options.username(user);
    }
    if let Some(password) = &params.password {
      options = options.password(password);
    }

    debug!(host = %params.host, port = params.port, database = %params.database, "connecting");
    let conn = PgConnection::connect_with(&options).await.map_err(Error::Connect)?;
    Ok(Self { conn })
  }
}

fn bind_all<'q>(
  mut query: Query<'q, Postgres, PgArguments>,
  params: &'q [Value],
) -> Query<'q, Postgres, PgArguments> {
  for param in params {
    query = match param {
      Value::Null => query.bind(None::<String>),
      Value::Bool(b) => query.bind(*b),
      Value::Int(i) => query.bind(*i),
      Value::Float(f) => query.bind(*f),
      Value::Text(s) => query.bind(s.as_str()),
    };
  }
  query
}

/// How a column of a given server type becomes a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Decoder {
  Int2,
  Int4,
  Int8,
  Float4,
  Float8,
  Bool,
  Text,
}

/// The decoder for a server type name. Types without a lossless mapping
/// (NUMERIC, DATE, TIMESTAMP, ...) have none and must be cast to text in SQL.
pub(crate) fn decoder_for(type_name: &str) -> Option<Decoder> {
  match type_name {
    "INT2" => Some(Decoder::Int2),
    "INT4" => Some(Decoder::Int4),
    "INT8" => Some(Decoder::Int8),
    "FLOAT4" => Some(Decoder::Float4),
    "FLOAT8" => Some(Decoder::Float8),
    "BOOL" => Some(Decoder::Bool),
    "TEXT" | "VARCHAR" | "BPCHAR" | "CHAR" | "NAME" => Some(Decoder::Text),
    _ => None,
  }
}

/// Convert a row by inspecting each column's declared type.
fn decode_row(row: &PgRow) -> Result<Row> {
  let mut values = Vec::with_capacity(row.len());
  for (idx, column) in row.columns().iter().enumerate() {
    let type_name = column.type_info().name();
    let decode_err = || Error::Decode { column: idx, type_name: type_name.to_owned() };
    let decoder = decoder_for(type_name).ok_or_else(decode_err)?;
    let value = match decoder {
      Decoder::Int2 => row.try_get::<Option<i16>, _>(idx).map(|v| Value::from(v.map(i64::from))),
      Decoder::Int4 => row.try_get::<Option<i32>, _>(idx).map(|v| Value::from(v.map(i64::from))),
      Decoder::Int8 => row.try_get::<Option<i64>, _>(idx).map(Value::from),
      Decoder::Float4 => row.try_get::<Option<f32>, _>(idx).map(|v| Value::from(v.map(f64::from))),
      Decoder::Float8 => row.try_get::<Option<f64>, _>(idx).map(Value::from),
      Decoder::Bool => row.try_get::<Option<bool>, _>(idx).map(Value::from),
      Decoder::Text => row.try_get::<Option<String>, _>(idx).map(Value::from),
    };
    values.push(value.map_err(|_| decode_err())?);
  }
  Ok(Row(values))
}

// ─── Database impl ───────────────────────────────────────────────────────────

impl Database for PgDatabase {
  fn dialect(&self) -> Dialect { Dialect::Postgres }

  async fn execute<'a>(&'a mut self, sql: &'a str, params: &'a [Value]) -> Result<u64> {
    // The simple protocol accepts several statements and DO blocks.
    let result = if params.is_empty() {
      sqlx::Executor::execute(&mut self.conn, sqlx::raw_sql(sql)).await
    } else {
      bind_all(sqlx::query(sql), params).execute(&mut self.conn).await
    };
    Ok(result.map_err(db_err)?.rows_affected())
  }

  async fn query<'a>(&'a mut self, sql: &'a str, params: &'a [Value]) -> Result<Vec<Row>> {
    let rows = bind_all(sqlx::query(sql), params)
      .fetch_all(&mut self.conn)
      .await
      .map_err(db_err)?;
    rows.iter().map(decode_row).collect()
  }

  async fn begin(&mut self) -> Result<()> { self.execute("BEGIN", &[]).await.map(drop) }

  async fn commit(&mut self) -> Result<()> { self.execute("COMMIT", &[]).await.map(drop) }

  async fn rollback(&mut self) -> Result<()> { self.execute("ROLLBACK", &[]).await.map(drop) }

  // ── Catalog ───────────────────────────────────────────────────────────

  async fn tables(&mut self) -> Result<Vec<String>> {
    self.query(catalog::TABLES, &[]).await?.iter().map(|r| r.text(0)).collect()
  }

  async fn columns<'a>(&'a mut self, table: &'a str) -> Result<Vec<ColumnInfo>> {
    let rows = self.query(catalog::COLUMNS, &[Value::from(table)]).await?;
    rows
      .iter()
      .map(|r| {
        Ok(ColumnInfo {
          name:      r.text(0)?,
          data_type: r.text(1)?,
          nullable:  r.text(2)? == "YES",
          default:   r.opt_text(3)?,
        })
      })
      .collect()
  }

  async fn indexes<'a>(&'a mut self, table: &'a str) -> Result<Vec<IndexInfo>> {
    let rows = self.query(catalog::INDEXES, &[Value::from(table)]).await?;
    rows
      .iter()
      .map(|r| {
        Ok(IndexInfo {
          name:    r.text(0)?,
          unique:  r.bool(1)?,
          columns: r.text(2)?.split(',').map(str::to_owned).collect(),
        })
      })
      .collect()
  }

  async fn constraints<'a>(&'a mut self, table: &'a str) -> Result<Vec<ConstraintInfo>> {
    let rows = self.query(catalog::CONSTRAINTS, &[Value::from(table)]).await?;
    rows
      .iter()
      .map(|r| Ok(ConstraintInfo { name: r.text(0)?, kind: r.text(1)? }))
      .collect()
  }

  async fn close(self) -> Result<()> { self.conn.close().await.map_err(db_err) }
}
