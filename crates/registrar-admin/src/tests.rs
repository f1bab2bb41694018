//! Probe and mutator tests against an in-memory SQLite school fixture.

use registrar_core::{Database, Error, Result, Value};
use registrar_store_sqlite::SqliteDatabase;

use crate::{
  cleanup, hash,
  hash::{Argon2Hasher, PasswordHasher},
  probes, roles,
  users::{self, DeletedAdmins, NewAdmin},
};

const SCHOOL: &str = "
CREATE TABLE roles (id INTEGER PRIMARY KEY, role_name VARCHAR(50) NOT NULL UNIQUE);
CREATE TABLE users (
  id INTEGER PRIMARY KEY,
  first_name TEXT,
  last_name TEXT,
  email TEXT UNIQUE,
  password TEXT,
  role_id INTEGER REFERENCES roles (id)
);
CREATE TABLE exams (id INTEGER PRIMARY KEY, name TEXT, term TEXT, year INTEGER);
CREATE TABLE marks (id INTEGER PRIMARY KEY, pupil_id INTEGER, exam_id INTEGER, score FLOAT);
CREATE TABLE reports (id INTEGER PRIMARY KEY, pupil_id INTEGER, exam_id INTEGER);
CREATE TABLE expense_records (id INTEGER PRIMARY KEY, amount FLOAT);
CREATE TABLE timetable_slots (
  id INTEGER PRIMARY KEY,
  teacher_id INTEGER,
  day_of_week TEXT,
  start_time TEXT,
  end_time TEXT,
  CONSTRAINT uq_slot UNIQUE (teacher_id, day_of_week, start_time)
);

INSERT INTO roles (id, role_name) VALUES (1, 'Admin'), (2, 'Teacher');
INSERT INTO users (first_name, last_name, email, role_id) VALUES
  ('Ada', 'Okello', 'admin@school.test', 1),
  ('Tom', 'Mugisha', 'tom@school.test', 2),
  ('Ruth', 'Nakato', 'ruth@school.test', 2),
  ('Paul', 'Kato', 'paul@school.test', NULL);

INSERT INTO exams (id, name, term, year) VALUES
  (1, 'Midterm', '1', 2024),
  (2, 'End Term', '1', 2024),
  (3, 'Quiz', '1', 2024),
  (4, 'End_Term', '2', 2024);
INSERT INTO marks (pupil_id, exam_id, score) VALUES
  (1, 1, 50), (2, 1, 61), (3, 1, 72),
  (1, 2, 80), (2, 2, 45),
  (1, 3, 10), (2, 3, 11), (3, 3, 12), (4, 3, 13),
  (1, 4, 99);
INSERT INTO reports (pupil_id, exam_id) VALUES
  (1, 1), (2, 1), (3, 1), (1, 2), (2, 2), (1, 4), (4, 3);
";

async fn school() -> SqliteDatabase {
  let db = SqliteDatabase::open_in_memory().await.unwrap();
  db.execute_batch(SCHOOL).await.unwrap();
  db
}

/// Deterministic stand-in for argon2.
struct TagHasher;

impl PasswordHasher for TagHasher {
  fn hash(&self, password: &str) -> Result<String> { Ok(format!("hashed:{password}")) }
}

fn new_admin(email: &str) -> NewAdmin {
  NewAdmin {
    first_name: "Grace".into(),
    last_name:  "Auma".into(),
    email:      email.into(),
    password:   "s3cret".into(),
  }
}

async fn user_count(db: &mut SqliteDatabase) -> i64 {
  db.scalar_int("SELECT COUNT(*) FROM users", &[]).await.unwrap()
}

// ─── Probes ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn marks_reports_count_samples_reports() {
  let mut db = school().await;
  let report = probes::marks_reports_count(&mut db).await.unwrap();

  assert_eq!(report.marks, 10);
  assert_eq!(report.reports, 7);
  assert_eq!(report.sample.len(), 5);
  assert_eq!(report.sample[0].id, 1);
  assert_eq!(report.sample[0].pupil_id, Some(1));
  assert_eq!(report.sample[0].exam_id, Some(1));

  let text = report.to_string();
  assert!(text.contains("marks:   10"), "{text}");
  assert!(text.contains("(1, 1, 1)"), "{text}");
}

#[tokio::test]
async fn marks_reports_count_skips_sample_when_empty() {
  let mut db = school().await;
  db.execute("DELETE FROM reports", &[]).await.unwrap();

  let report = probes::marks_reports_count(&mut db).await.unwrap();
  assert_eq!(report.reports, 0);
  assert!(report.sample.is_empty());
  assert!(!report.to_string().contains("sample"));
}

#[tokio::test]
async fn marks_status_groups_tracked_exams_per_term() {
  let mut db = school().await;
  let status = probes::marks_status(&mut db).await.unwrap();

  assert_eq!(status.terms.len(), 3);
  let term1 = &status.terms[0];
  assert_eq!(term1.term, 1);
  let ids: Vec<i64> = term1.exams.iter().map(|e| e.exam_id).collect();
  assert_eq!(ids, vec![1, 2], "Quiz is not a tracked exam");
  assert_eq!(term1.total(), 5);
  assert_eq!(status.terms[1].total(), 1);
  assert!(status.terms[2].exams.is_empty());

  let text = status.to_string();
  assert!(text.contains("Term 1:"), "{text}");
  assert!(text.contains("  ID 1 (Midterm             ):      3 marks"), "{text}");
  assert!(text.contains("  TOTAL                     :      5 marks"), "{text}");
}

#[tokio::test]
async fn marks_status_accepts_integer_terms() {
  let mut db = SqliteDatabase::open_in_memory().await.unwrap();
  db.execute_batch(
    "CREATE TABLE exams (id INTEGER PRIMARY KEY, name TEXT, term INTEGER);
     CREATE TABLE marks (id INTEGER PRIMARY KEY, exam_id INTEGER);
     INSERT INTO exams VALUES (7, 'End_term', 3);
     INSERT INTO marks (exam_id) VALUES (7), (7);",
  )
  .await
  .unwrap();

  let status = probes::marks_status(&mut db).await.unwrap();
  assert_eq!(status.terms[2].total(), 2);
  assert_eq!(status.terms[2].exams[0].name, "End_term");
}

#[tokio::test]
async fn catalog_probes_report_schema() {
  let mut db = school().await;

  let columns = probes::reports_columns(&mut db).await.unwrap();
  let names: Vec<&str> = columns.0.iter().map(|c| c.name.as_str()).collect();
  assert_eq!(names, vec!["id", "pupil_id", "exam_id"]);

  let constraints = probes::timetable_constraints(&mut db).await.unwrap();
  assert!(constraints.0.iter().any(|c| c.name == "uq_slot" && c.kind == "UNIQUE"));

  assert_eq!(probes::teachers_count(&mut db).await.unwrap().0, 2);
}

#[tokio::test]
async fn tables_probe_reports_staff_tables() {
  let mut db = school().await;

  let report = probes::tables(&mut db).await.unwrap();
  assert!(report.tables.contains(&"marks".to_owned()));
  assert!(report.staff.iter().all(|(_, cols)| cols.is_none()));
  assert!(report.to_string().contains("✗ staff_attendance: missing"));

  db.execute("CREATE TABLE staff_profiles (id INTEGER PRIMARY KEY, staff_id INTEGER)", &[])
    .await
    .unwrap();
  let report = probes::tables(&mut db).await.unwrap();
  let (name, cols) = &report.staff[2];
  assert_eq!(name, "staff_profiles");
  assert_eq!(cols.as_ref().map(Vec::len), Some(2));
  assert!(report.to_string().contains("✓ staff_profiles: id, staff_id"));
}

// ─── Insert admin ────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_admin_stores_hash_and_role() {
  let mut db = school().await;
  let inserted = users::insert_admin(&mut db, &TagHasher, &new_admin("grace@school.test"))
    .await
    .unwrap();
  assert_eq!(inserted.role_id, 1);

  let rows = db
    .query(
      "SELECT first_name, password, role_id FROM users WHERE email = $1",
      &[Value::from("grace@school.test")],
    )
    .await
    .unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].text(0).unwrap(), "Grace");
  assert_eq!(rows[0].text(1).unwrap(), "hashed:s3cret");
  assert_eq!(rows[0].int(2).unwrap(), 1);
}

#[tokio::test]
async fn insert_admin_without_role_fails() {
  let mut db = school().await;
  db.execute("UPDATE users SET role_id = NULL", &[]).await.unwrap();
  db.execute("DELETE FROM roles WHERE role_name = 'Admin'", &[]).await.unwrap();

  let err = users::insert_admin(&mut db, &TagHasher, &new_admin("grace@school.test"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::MissingRole(ref r) if r == "Admin"), "{err:?}");
  assert_eq!(user_count(&mut db).await, 4);
}

#[tokio::test]
async fn duplicate_email_is_an_integrity_violation() {
  let mut db = school().await;
  let err = users::insert_admin(&mut db, &TagHasher, &new_admin("tom@school.test"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::IntegrityViolation(_)), "{err:?}");

  // The failed transaction was rolled back; the connection is still usable.
  assert_eq!(user_count(&mut db).await, 4);
  users::insert_admin(&mut db, &TagHasher, &new_admin("grace@school.test")).await.unwrap();
  assert_eq!(user_count(&mut db).await, 5);
}

// ─── Delete ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_admins_returns_deleted_rows() {
  let mut db = school().await;
  let deleted = users::delete_admins(&mut db).await.unwrap();
  assert_eq!(deleted, DeletedAdmins::Deleted(vec![(1, "admin@school.test".to_owned())]));
  assert_eq!(user_count(&mut db).await, 3);

  let again = users::delete_admins(&mut db).await.unwrap();
  assert_eq!(again, DeletedAdmins::Deleted(Vec::new()));
}

#[tokio::test]
async fn delete_admins_without_role_is_a_noop() {
  let mut db = school().await;
  db.execute("UPDATE roles SET role_name = 'Administrator' WHERE id = 1", &[]).await.unwrap();

  assert_eq!(users::delete_admins(&mut db).await.unwrap(), DeletedAdmins::NoRole);
  assert_eq!(user_count(&mut db).await, 4);
}

#[tokio::test]
async fn delete_user_by_email_reports_deleted_users() {
  let mut db = school().await;
  let deleted = users::delete_user_by_email(&mut db, "tom@school.test").await.unwrap();
  assert_eq!(deleted.users.len(), 1);
  assert_eq!(deleted.users[0].first_name.as_deref(), Some("Tom"));
  assert!(deleted.to_string().contains("Name=Tom Mugisha"));
  assert_eq!(user_count(&mut db).await, 3);

  let none = users::delete_user_by_email(&mut db, "nobody@school.test").await.unwrap();
  assert!(none.users.is_empty());
  assert!(none.to_string().contains("no users found"));
}

// ─── Promote / list ──────────────────────────────────────────────────────────

#[tokio::test]
async fn promote_and_list_admins() {
  let mut db = school().await;
  users::promote(&mut db, "ruth@school.test").await.unwrap();

  let admins = users::list_admins(&mut db).await.unwrap();
  let emails: Vec<&str> = admins.0.iter().map(|a| a.email.as_str()).collect();
  assert_eq!(emails, vec!["admin@school.test", "ruth@school.test"]);
  assert!(admins.0.iter().all(|a| a.role_name == "Admin"));
  assert!(admins.to_string().contains("total admins: 2"));
  assert_eq!(probes::teachers_count(&mut db).await.unwrap().0, 1);
}

#[tokio::test]
async fn promote_unknown_user_fails() {
  let mut db = school().await;
  let err = users::promote(&mut db, "ghost@school.test").await.unwrap_err();
  assert!(matches!(err, Error::UserNotFound(_)), "{err:?}");

  db.execute("UPDATE users SET role_id = NULL", &[]).await.unwrap();
  db.execute("DELETE FROM roles WHERE id = 1", &[]).await.unwrap();
  let err = users::promote(&mut db, "ruth@school.test").await.unwrap_err();
  assert!(matches!(err, Error::MissingRole(_)), "{err:?}");
}

// ─── Roles ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn seed_roles_inserts_only_missing_ids() {
  let mut db = school().await;
  let seeded = roles::seed_roles(&mut db).await.unwrap();
  let inserted: Vec<i64> = seeded.inserted.iter().map(|(id, _)| *id).collect();
  let skipped: Vec<i64> = seeded.skipped.iter().map(|(id, _)| *id).collect();
  assert_eq!(inserted, vec![3, 4, 5, 6]);
  assert_eq!(skipped, vec![1, 2]);

  assert_eq!(roles::role_id(&mut db, "Bursar").await.unwrap(), Some(6));

  let again = roles::seed_roles(&mut db).await.unwrap();
  assert!(again.inserted.is_empty());
  assert_eq!(again.skipped.len(), 6);
}

// ─── Cleanup ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn clean_derived_empties_reports_and_marks() {
  let mut db = school().await;
  let cleaned = cleanup::clean_derived(&mut db).await.unwrap();
  assert_eq!(cleaned.reports_deleted, 7);
  assert_eq!(cleaned.marks_deleted, 10);
  assert!(cleaned.is_clean());
  assert!(cleaned.to_string().contains("✓ remaining: reports=0 marks=0"));

  let counts = probes::marks_reports_count(&mut db).await.unwrap();
  assert_eq!((counts.marks, counts.reports), (0, 0));
}

#[tokio::test]
async fn quantity_column_is_idempotent() {
  let mut db = school().await;
  assert!(cleanup::add_quantity_column(&mut db).await.unwrap().added);
  assert!(!cleanup::add_quantity_column(&mut db).await.unwrap().added);
  assert!(db.has_column("expense_records", "quantity").await.unwrap());
}

// ─── Hashing ─────────────────────────────────────────────────────────────────

#[test]
fn argon2_hashes_verify() {
  let phc = Argon2Hasher.hash("correct horse").unwrap();
  assert!(phc.starts_with("$argon2id$"), "{phc}");
  assert!(hash::verify("correct horse", &phc).unwrap());
  assert!(!hash::verify("wrong", &phc).unwrap());
  assert!(hash::verify("x", "not a phc string").is_err());
}
