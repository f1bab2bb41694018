//! Command dispatch.

use std::io::{self, BufRead as _, Write as _};

use anyhow::{Context as _, Result};
use registrar_admin::{cleanup, probes, roles, users, Argon2Hasher, OK};
use registrar_core::{
  config::{redact, DatabaseUrl, Resolver, Settings},
  Database, Dialect,
};
use registrar_migrate::{revisions, Direction, Migrator, OfflineRange, Target};
use tracing::{info, warn};

use crate::{
  cli::{Admin, Cli, Command, Probe},
  db::AnyDatabase,
};

pub async fn run(cli: Cli) -> Result<()> {
  let settings = Settings::load(&cli.config)
    .with_context(|| format!("loading settings from {}", cli.config.display()))?;
  let resolver = Resolver::from_settings(&settings);
  let migrator = Migrator::new(revisions::graph()?);

  match cli.command {
    Command::History => print!("{}", history(&migrator)),
    Command::Upgrade { target, sql: true } => {
      let dialect = offline_dialect(resolver.resolve().ok().as_deref());
      print!("{}", offline_script(&migrator, Direction::Upgrade, &target, dialect)?);
    }
    Command::Downgrade { target, sql: true } => {
      let dialect = offline_dialect(resolver.resolve().ok().as_deref());
      print!("{}", offline_script(&migrator, Direction::Downgrade, &target, dialect)?);
    }
    command => {
      let url = resolver.resolve()?;
      let mut db = AnyDatabase::connect(&url)
        .await
        .with_context(|| format!("connecting to {}", redact(&url)))?;
      info!(url = %redact(&url), dialect = %db.dialect(), "connected");

      let outcome = online(&mut db, &migrator, command).await;
      if let Err(err) = db.close().await {
        warn!(error = %err, "closing connection failed");
      }
      outcome?;
    }
  }
  Ok(())
}

/// Offline scripts follow the configured URL's dialect when there is one.
pub fn offline_dialect(url: Option<&str>) -> Dialect {
  url
    .and_then(|u| DatabaseUrl::parse(u).ok())
    .map_or(Dialect::Postgres, |u| u.dialect())
}

pub fn offline_script(
  migrator: &Migrator,
  direction: Direction,
  spec: &str,
  dialect: Dialect,
) -> Result<String> {
  let range = OfflineRange::parse(spec, None)?;
  let script = match direction {
    Direction::Upgrade => migrator.upgrade_script(&range, dialect)?,
    Direction::Downgrade => migrator.downgrade_script(&range, dialect)?,
  };
  Ok(script)
}

pub fn history(migrator: &Migrator) -> String {
  let graph = migrator.graph();
  let head = graph.head();
  graph
    .revisions()
    .iter()
    .rev()
    .map(|rev| {
      let marker = if Some(rev.id) == head { " (head)" } else { "" };
      format!(
        "{} -> {}{marker}, {}\n",
        rev.parent.unwrap_or("<base>"),
        rev.id,
        rev.description
      )
    })
    .collect()
}

pub async fn online<D: Database>(db: &mut D, migrator: &Migrator, command: Command) -> Result<()> {
  match command {
    Command::Upgrade { target, .. } => {
      let report = migrator.upgrade(db, &target.parse::<Target>()?).await?;
      print!("{report}");
      println!("{OK} upgrade complete");
    }
    Command::Downgrade { target, .. } => {
      let report = migrator.downgrade(db, &target.parse::<Target>()?).await?;
      print!("{report}");
      println!("{OK} downgrade complete");
    }
    Command::Current => {
      let current = migrator.current(db).await?;
      let head = migrator.graph().head();
      match current.as_deref() {
        None => println!("current: base (no revision applied)"),
        Some(id) if Some(id) == head => println!("current: {id} (head)"),
        Some(id) => println!("current: {id}"),
      }
    }
    Command::History => print!("{}", history(migrator)),
    Command::Probe(probe) => run_probe(db, probe).await?,
    Command::Admin(admin) => run_admin(db, admin).await?,
  }
  Ok(())
}

async fn run_probe<D: Database>(db: &mut D, probe: Probe) -> Result<()> {
  match probe {
    Probe::MarksReports => print!("{}", probes::marks_reports_count(db).await?),
    Probe::MarksStatus => print!("{}", probes::marks_status(db).await?),
    Probe::ReportsColumns => print!("{}", probes::reports_columns(db).await?),
    Probe::Tables => print!("{}", probes::tables(db).await?),
    Probe::Teachers => print!("{}", probes::teachers_count(db).await?),
    Probe::TimetableConstraints => print!("{}", probes::timetable_constraints(db).await?),
  }
  Ok(())
}

async fn run_admin<D: Database>(db: &mut D, admin: Admin) -> Result<()> {
  match admin {
    Admin::InsertAdmin { first_name, last_name, email, password } => {
      let password = match password {
        Some(p) => p,
        None => read_password().context("reading password from stdin")?,
      };
      let new = users::NewAdmin { first_name, last_name, email, password };
      print!("{}", users::insert_admin(db, &Argon2Hasher, &new).await?);
    }
    Admin::DeleteAdmins => print!("{}", users::delete_admins(db).await?),
    Admin::DeleteUser { email } => print!("{}", users::delete_user_by_email(db, &email).await?),
    Admin::Promote { email } => print!("{}", users::promote(db, &email).await?),
    Admin::ListAdmins => print!("{}", users::list_admins(db).await?),
    Admin::SeedRoles => print!("{}", roles::seed_roles(db).await?),
    Admin::CleanDerived => print!("{}", cleanup::clean_derived(db).await?),
    Admin::AddQuantityColumn => print!("{}", cleanup::add_quantity_column(db).await?),
  }
  Ok(())
}

/// Read one line from stdin, prompting on stderr.
fn read_password() -> io::Result<String> {
  eprint!("Password: ");
  io::stderr().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches(['\n', '\r']).to_owned())
}
