//! Role lookup and seeding.

use std::fmt;

use registrar_core::{Database, Dialect, Result, Value};
use tracing::info;

use crate::{finish, OK};

pub const ADMIN_ROLE: &str = "Admin";

/// Roles every deployment starts with, by fixed id.
pub const DEFAULT_ROLES: [(i64, &str); 6] = [
  (1, "Admin"),
  (2, "Teacher"),
  (3, "Secretary"),
  (4, "Headteacher"),
  (5, "Parent"),
  (6, "Bursar"),
];

/// Id of the role named exactly `name`, if present.
pub async fn role_id<D: Database>(db: &mut D, name: &str) -> Result<Option<i64>> {
  let rows = db
    .query("SELECT id FROM roles WHERE role_name = $1 ORDER BY id", &[Value::from(name)])
    .await?;
  rows.first().map(|r| r.int(0)).transpose()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedRoles {
  pub inserted: Vec<(i64, String)>,
  pub skipped:  Vec<(i64, String)>,
}

/// Insert the [`DEFAULT_ROLES`] whose id is not taken yet.
pub async fn seed_roles<D: Database>(db: &mut D) -> Result<SeedRoles> {
  db.begin().await?;
  let outcome = insert_missing_roles(db).await;
  finish(db, outcome).await
}

async fn insert_missing_roles<D: Database>(db: &mut D) -> Result<SeedRoles> {
  let mut seeded = SeedRoles::default();
  for (id, name) in DEFAULT_ROLES {
    let taken = db.scalar_int("SELECT COUNT(*) FROM roles WHERE id = $1", &[Value::from(id)]).await?;
    if taken > 0 {
      seeded.skipped.push((id, name.to_owned()));
      continue;
    }
    db.execute(
      "INSERT INTO roles (id, role_name) VALUES ($1, $2)",
      &[Value::from(id), Value::from(name)],
    )
    .await?;
    info!(id, role = name, "inserted role");
    seeded.inserted.push((id, name.to_owned()));
  }

  // Explicit ids leave the serial sequence behind.
  if db.dialect() == Dialect::Postgres && !seeded.inserted.is_empty() {
    db.query(
      "SELECT setval(pg_get_serial_sequence('roles', 'id'), (SELECT MAX(id) FROM roles))",
      &[],
    )
    .await?;
  }
  Ok(seeded)
}

impl fmt::Display for SeedRoles {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (id, name) in &self.inserted {
      writeln!(f, "{OK} inserted role {id} {name}")?;
    }
    for (id, name) in &self.skipped {
      writeln!(f, "  role {id} {name} already present")?;
    }
    Ok(())
  }
}
