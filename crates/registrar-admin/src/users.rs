//! Account mutators: creating, promoting, listing and deleting users.

use std::fmt;

use registrar_core::{Database, Error, Result, Value};
use tracing::info;

use crate::{
  finish,
  hash::PasswordHasher,
  roles::{role_id, ADMIN_ROLE},
  OK,
};

// ─── Insert admin ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct NewAdmin {
  pub first_name: String,
  pub last_name:  String,
  pub email:      String,
  pub password:   String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertedAdmin {
  pub email:   String,
  pub role_id: i64,
}

/// Insert a user holding the `Admin` role. The password is stored as
/// produced by `hasher`. No uniqueness check is made beyond what the
/// schema enforces.
pub async fn insert_admin<D, H>(db: &mut D, hasher: &H, admin: &NewAdmin) -> Result<InsertedAdmin>
where
  D: Database,
  H: PasswordHasher + ?Sized,
{
  let role_id = role_id(db, ADMIN_ROLE)
    .await?
    .ok_or_else(|| Error::MissingRole(ADMIN_ROLE.to_owned()))?;
  let password_hash = hasher.hash(&admin.password)?;

  db.begin().await?;
  let outcome = db
    .execute(
      "INSERT INTO users (first_name, last_name, email, password, role_id)
       VALUES ($1, $2, $3, $4, $5)",
      &[
        Value::from(admin.first_name.as_str()),
        Value::from(admin.last_name.as_str()),
        Value::from(admin.email.as_str()),
        Value::from(password_hash),
        Value::from(role_id),
      ],
    )
    .await;
  finish(db, outcome).await?;

  info!(email = %admin.email, role_id, "inserted admin");
  Ok(InsertedAdmin { email: admin.email.clone(), role_id })
}

impl fmt::Display for InsertedAdmin {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "{OK} admin {} created (role id {})", self.email, self.role_id)
  }
}

// ─── Delete admins ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletedAdmins {
  /// The `Admin` role does not exist; nothing was touched.
  NoRole,
  /// `(id, email)` of every deleted user.
  Deleted(Vec<(i64, String)>),
}

pub async fn delete_admins<D: Database>(db: &mut D) -> Result<DeletedAdmins> {
  let Some(role_id) = role_id(db, ADMIN_ROLE).await? else {
    info!("no Admin role; nothing to delete");
    return Ok(DeletedAdmins::NoRole);
  };

  db.begin().await?;
  let outcome = async {
    let rows = db
      .query("DELETE FROM users WHERE role_id = $1 RETURNING id, email", &[Value::from(role_id)])
      .await?;
    rows.iter().map(|r| Ok((r.int(0)?, r.text(1)?))).collect::<Result<Vec<_>>>()
  }
  .await;
  let mut deleted = finish(db, outcome).await?;
  deleted.sort_unstable();

  for (id, email) in &deleted {
    info!(id, email = %email, "deleted admin");
  }
  Ok(DeletedAdmins::Deleted(deleted))
}

impl fmt::Display for DeletedAdmins {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::NoRole => writeln!(f, "Admin role not found; nothing deleted"),
      Self::Deleted(rows) => {
        for (id, email) in rows {
          writeln!(f, "  deleted {id} {email}")?;
        }
        writeln!(f, "{OK} deleted {} admin user(s)", rows.len())
      }
    }
  }
}

// ─── Delete by email ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedUser {
  pub id:         i64,
  pub first_name: Option<String>,
  pub last_name:  Option<String>,
  pub email:      String,
}

/// Every deleted user with that email; empty when none matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedUsers {
  pub email: String,
  pub users: Vec<DeletedUser>,
}

pub async fn delete_user_by_email<D: Database>(db: &mut D, email: &str) -> Result<DeletedUsers> {
  db.begin().await?;
  let outcome = async {
    let rows = db
      .query(
        "DELETE FROM users WHERE email = $1 RETURNING id, first_name, last_name, email",
        &[Value::from(email)],
      )
      .await?;
    rows
      .iter()
      .map(|r| {
        Ok(DeletedUser {
          id:         r.int(0)?,
          first_name: r.opt_text(1)?,
          last_name:  r.opt_text(2)?,
          email:      r.text(3)?,
        })
      })
      .collect::<Result<Vec<_>>>()
  }
  .await;
  let mut users = finish(db, outcome).await?;
  users.sort_unstable_by_key(|u| u.id);

  info!(email, deleted = users.len(), "deleted users by email");
  Ok(DeletedUsers { email: email.to_owned(), users })
}

impl fmt::Display for DeletedUsers {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.users.is_empty() {
      return writeln!(f, "no users found with email {}", self.email);
    }
    for u in &self.users {
      writeln!(
        f,
        "  - ID={}, Name={} {}, Email={}",
        u.id,
        u.first_name.as_deref().unwrap_or(""),
        u.last_name.as_deref().unwrap_or(""),
        u.email
      )?;
    }
    writeln!(f, "{OK} deleted {} user(s) with email {}", self.users.len(), self.email)
  }
}

// ─── Promote ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Promoted {
  pub email:   String,
  pub role_id: i64,
}

/// Give the user with `email` the `Admin` role.
pub async fn promote<D: Database>(db: &mut D, email: &str) -> Result<Promoted> {
  let role_id = role_id(db, ADMIN_ROLE)
    .await?
    .ok_or_else(|| Error::MissingRole(ADMIN_ROLE.to_owned()))?;

  db.begin().await?;
  let outcome: Result<()> = async {
    let updated = db
      .execute(
        "UPDATE users SET role_id = $1 WHERE email = $2",
        &[Value::from(role_id), Value::from(email)],
      )
      .await?;
    if updated == 0 {
      return Err(Error::UserNotFound(email.to_owned()));
    }
    Ok(())
  }
  .await;
  finish(db, outcome).await?;

  info!(email, role_id, "promoted to admin");
  Ok(Promoted { email: email.to_owned(), role_id })
}

impl fmt::Display for Promoted {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "{OK} {} is now an admin (role id {})", self.email, self.role_id)
  }
}

// ─── List admins ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminRow {
  pub id:        i64,
  pub email:     String,
  pub role_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminList(pub Vec<AdminRow>);

pub async fn list_admins<D: Database>(db: &mut D) -> Result<AdminList> {
  let rows = db
    .query(
      "SELECT u.id, u.email, r.role_name
       FROM users u JOIN roles r ON u.role_id = r.id
       WHERE r.role_name = $1
       ORDER BY u.id",
      &[Value::from(ADMIN_ROLE)],
    )
    .await?;
  let admins = rows
    .iter()
    .map(|r| Ok(AdminRow { id: r.int(0)?, email: r.text(1)?, role_name: r.text(2)? }))
    .collect::<Result<Vec<_>>>()?;
  Ok(AdminList(admins))
}

impl fmt::Display for AdminList {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for a in &self.0 {
      writeln!(f, "  {} {} ({})", a.id, a.email, a.role_name)?;
    }
    writeln!(f, "total admins: {}", self.0.len())
  }
}
