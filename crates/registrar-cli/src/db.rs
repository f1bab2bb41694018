//! A connection to whichever backend the URL names.

use registrar_core::{
  config::{DatabaseUrl, SqliteTarget},
  ColumnInfo, ConstraintInfo, Database, Dialect, IndexInfo, Result, Row, Value,
};
use registrar_store_postgres::PgDatabase;
use registrar_store_sqlite::SqliteDatabase;

pub enum AnyDatabase {
  Postgres(PgDatabase),
  Sqlite(SqliteDatabase),
}

impl AnyDatabase {
  pub async fn connect(url: &str) -> Result<Self> {
    match DatabaseUrl::parse(url)? {
      DatabaseUrl::Postgres(params) => Ok(Self::Postgres(PgDatabase::connect(&params).await?)),
      DatabaseUrl::Sqlite(SqliteTarget::Memory) => {
        Ok(Self::Sqlite(SqliteDatabase::open_in_memory().await?))
      }
      DatabaseUrl::Sqlite(SqliteTarget::File(path)) => {
        Ok(Self::Sqlite(SqliteDatabase::open(path).await?))
      }
    }
  }
}

impl Database for AnyDatabase {
  fn dialect(&self) -> Dialect {
    match self {
      Self::Postgres(db) => db.dialect(),
      Self::Sqlite(db) => db.dialect(),
    }
  }

  async fn execute<'a>(&'a mut self, sql: &'a str, params: &'a [Value]) -> Result<u64> {
    match self {
      Self::Postgres(db) => db.execute(sql, params).await,
      Self::Sqlite(db) => db.execute(sql, params).await,
    }
  }

  async fn query<'a>(&'a mut self, sql: &'a str, params: &'a [Value]) -> Result<Vec<Row>> {
    match self {
      Self::Postgres(db) => db.query(sql, params).await,
      Self::Sqlite(db) => db.query(sql, params).await,
    }
  }

  async fn begin(&mut self) -> Result<()> {
    match self {
      Self::Postgres(db) => db.begin().await,
      Self::Sqlite(db) => db.begin().await,
    }
  }

  async fn commit(&mut self) -> Result<()> {
    match self {
      Self::Postgres(db) => db.commit().await,
      Self::Sqlite(db) => db.commit().await,
    }
  }

  async fn rollback(&mut self) -> Result<()> {
    match self {
      Self::Postgres(db) => db.rollback().await,
      Self::Sqlite(db) => db.rollback().await,
    }
  }

  async fn tables(&mut self) -> Result<Vec<String>> {
    match self {
      Self::Postgres(db) => db.tables().await,
      Self::Sqlite(db) => db.tables().await,
    }
  }

  async fn columns<'a>(&'a mut self, table: &'a str) -> Result<Vec<ColumnInfo>> {
    match self {
      Self::Postgres(db) => db.columns(table).await,
      Self::Sqlite(db) => db.columns(table).await,
    }
  }

  async fn indexes<'a>(&'a mut self, table: &'a str) -> Result<Vec<IndexInfo>> {
    match self {
      Self::Postgres(db) => db.indexes(table).await,
      Self::Sqlite(db) => db.indexes(table).await,
    }
  }

  async fn constraints<'a>(&'a mut self, table: &'a str) -> Result<Vec<ConstraintInfo>> {
    match self {
      Self::Postgres(db) => db.constraints(table).await,
      Self::Sqlite(db) => db.constraints(table).await,
    }
  }

  async fn close(self) -> Result<()> {
    match self {
      Self::Postgres(db) => db.close().await,
      Self::Sqlite(db) => db.close().await,
    }
  }
}
