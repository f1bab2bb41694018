//! Tests for `SqliteDatabase` against an in-memory database.

use registrar_core::{Database, Dialect, Error, Value};

use crate::{
  encode::{named_constraints, rewrite_placeholders},
  SqliteDatabase,
};

async fn db() -> SqliteDatabase {
  SqliteDatabase::open_in_memory().await.expect("in-memory database")
}

// ─── Placeholders ────────────────────────────────────────────────────────────

#[test]
fn placeholders_are_rewritten() {
  assert_eq!(
    rewrite_placeholders("UPDATE t SET a = $1 WHERE b = $2"),
    "UPDATE t SET a = ?1 WHERE b = ?2"
  );
  assert_eq!(rewrite_placeholders("SELECT $12"), "SELECT ?12");
}

#[test]
fn placeholders_inside_literals_are_kept() {
  assert_eq!(
    rewrite_placeholders("SELECT '$1', \"$2\", $3"),
    "SELECT '$1', \"$2\", ?3"
  );
  // A bare dollar is not a placeholder.
  assert_eq!(rewrite_placeholders("SELECT 'a' || $x"), "SELECT 'a' || $x");
}

#[test]
fn named_constraints_are_parsed() {
  let sql = "CREATE TABLE staff_attendance (\n\tid INTEGER NOT NULL,\n\tPRIMARY KEY (id),\n\t\
             CONSTRAINT u_staff_date UNIQUE (staff_id, date)\n)";
  assert_eq!(named_constraints(sql), vec![("u_staff_date".to_owned(), "UNIQUE".to_owned())]);

  let sql = "CREATE TABLE v (x TEXT, CONSTRAINT v_pkc PRIMARY KEY (x))";
  assert_eq!(named_constraints(sql), vec![("v_pkc".to_owned(), "PRIMARY KEY".to_owned())]);
}

// ─── Execute / query ─────────────────────────────────────────────────────────

#[tokio::test]
async fn execute_and_query_roundtrip() {
  let mut db = db().await;
  assert_eq!(db.dialect(), Dialect::Sqlite);

  db.execute("CREATE TABLE people (id INTEGER PRIMARY KEY, name TEXT, score REAL)", &[])
    .await
    .unwrap();
  let affected = db
    .execute(
      "INSERT INTO people (name, score) VALUES ($1, $2), ($3, $4)",
      &[Value::from("Ada"), Value::from(9.5), Value::from("Brian"), Value::Null],
    )
    .await
    .unwrap();
  assert_eq!(affected, 2);

  let rows = db
    .query("SELECT id, name, score FROM people WHERE name = $1", &[Value::from("Ada")])
    .await
    .unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].int(0).unwrap(), 1);
  assert_eq!(rows[0].text(1).unwrap(), "Ada");
  assert_eq!(rows[0].get(2).unwrap(), &Value::Float(9.5));

  let count = db.scalar_int("SELECT COUNT(*) FROM people WHERE score IS NULL", &[]).await.unwrap();
  assert_eq!(count, 1);
}

#[tokio::test]
async fn out_of_order_placeholders_bind_by_index() {
  let mut db = db().await;
  let rows = db
    .query("SELECT $2, $1", &[Value::from("first"), Value::from("second")])
    .await
    .unwrap();
  assert_eq!(rows[0].text(0).unwrap(), "second");
  assert_eq!(rows[0].text(1).unwrap(), "first");
}

#[tokio::test]
async fn unique_violation_maps_to_integrity_error() {
  let mut db = db().await;
  db.execute("CREATE TABLE users (email TEXT UNIQUE)", &[]).await.unwrap();
  db.execute("INSERT INTO users VALUES ($1)", &[Value::from("a@b.c")]).await.unwrap();

  let err = db.execute("INSERT INTO users VALUES ($1)", &[Value::from("a@b.c")]).await.unwrap_err();
  assert!(matches!(err, Error::IntegrityViolation(_)), "got {err:?}");
}

#[tokio::test]
async fn bad_sql_maps_to_database_error() {
  let mut db = db().await;
  let err = db.execute("ALTER TABLE missing ADD COLUMN x INTEGER", &[]).await.unwrap_err();
  assert!(matches!(err, Error::Database(_)), "got {err:?}");
}

#[tokio::test]
async fn rollback_discards_changes() {
  let mut db = db().await;
  db.execute("CREATE TABLE t (x INTEGER)", &[]).await.unwrap();

  db.begin().await.unwrap();
  db.execute("INSERT INTO t VALUES (1)", &[]).await.unwrap();
  db.execute("ALTER TABLE t ADD COLUMN y INTEGER", &[]).await.unwrap();
  db.rollback().await.unwrap();

  assert_eq!(db.scalar_int("SELECT COUNT(*) FROM t", &[]).await.unwrap(), 0);
  assert!(!db.has_column("t", "y").await.unwrap());

  db.begin().await.unwrap();
  db.execute("INSERT INTO t VALUES (2)", &[]).await.unwrap();
  db.commit().await.unwrap();
  assert_eq!(db.scalar_int("SELECT COUNT(*) FROM t", &[]).await.unwrap(), 1);
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn catalog_reports_tables_columns_indexes_constraints() {
  let mut db = db().await;
  db.execute_batch(
    "CREATE TABLE staff (
       id INTEGER NOT NULL,
       staff_id INTEGER NOT NULL,
       date DATE NOT NULL,
       status VARCHAR(20) DEFAULT 'present',
       PRIMARY KEY (id),
       CONSTRAINT u_staff_date UNIQUE (staff_id, date)
     );
     CREATE INDEX ix_staff_date_status ON staff (date, status);
     CREATE TABLE aardvarks (id INTEGER);",
  )
  .await
  .unwrap();

  assert_eq!(db.tables().await.unwrap(), vec!["aardvarks", "staff"]);

  let columns = db.columns("staff").await.unwrap();
  let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
  assert_eq!(names, vec!["id", "staff_id", "date", "status"]);
  assert!(!columns[0].nullable);
  assert!(columns[3].nullable);
  assert_eq!(columns[3].data_type, "VARCHAR(20)");
  assert_eq!(columns[3].default.as_deref(), Some("'present'"));

  let indexes = db.indexes("staff").await.unwrap();
  assert_eq!(indexes.len(), 1);
  assert_eq!(indexes[0].name, "ix_staff_date_status");
  assert_eq!(indexes[0].columns, vec!["date", "status"]);
  assert!(!indexes[0].unique);

  let constraints = db.constraints("staff").await.unwrap();
  assert!(constraints.iter().any(|c| c.name == "u_staff_date" && c.kind == "UNIQUE"));

  assert!(db.columns("missing").await.unwrap().is_empty());
  assert!(db.constraints("missing").await.unwrap().is_empty());
}

#[tokio::test]
async fn close_releases_connection() {
  let db = db().await;
  db.close().await.unwrap();
}
