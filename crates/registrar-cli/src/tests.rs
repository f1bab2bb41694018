use clap::{CommandFactory as _, Parser as _};
use registrar_core::{Database, Dialect};
use registrar_migrate::{revisions, Direction, Migrator};

use crate::{
  cli::{Admin, Cli, Command, Probe},
  commands::{history, offline_dialect, offline_script, online},
  db::AnyDatabase,
};

fn migrator() -> Migrator { Migrator::new(revisions::graph().unwrap()) }

#[test]
fn cli_definition_is_valid() { Cli::command().debug_assert(); }

#[test]
fn parses_migration_commands() {
  let cli = Cli::try_parse_from(["registrar", "upgrade"]).unwrap();
  assert_eq!(cli.command, Command::Upgrade { target: "head".into(), sql: false });

  let cli = Cli::try_parse_from(["registrar", "downgrade", "-1"]).unwrap();
  assert_eq!(cli.command, Command::Downgrade { target: "-1".into(), sql: false });

  let cli = Cli::try_parse_from(["registrar", "upgrade", "--sql", "base:head"]).unwrap();
  assert_eq!(cli.command, Command::Upgrade { target: "base:head".into(), sql: true });

  assert!(Cli::try_parse_from(["registrar", "downgrade"]).is_err());
}

#[test]
fn parses_probe_and_admin_commands() {
  let cli = Cli::try_parse_from(["registrar", "probe", "marks-status"]).unwrap();
  assert_eq!(cli.command, Command::Probe(Probe::MarksStatus));

  let cli = Cli::try_parse_from([
    "registrar",
    "--config",
    "other.toml",
    "admin",
    "insert-admin",
    "--first-name",
    "Ada",
    "--last-name",
    "Okello",
    "--email",
    "ada@school.test",
  ])
  .unwrap();
  assert_eq!(cli.config.to_str(), Some("other.toml"));
  assert_eq!(
    cli.command,
    Command::Admin(Admin::InsertAdmin {
      first_name: "Ada".into(),
      last_name:  "Okello".into(),
      email:      "ada@school.test".into(),
      password:   None,
    })
  );
}

#[test]
fn history_lists_newest_first() {
  let text = history(&migrator());
  let lines: Vec<&str> = text.lines().collect();
  assert_eq!(lines.len(), 8);
  assert!(lines[0].starts_with("0006_attendance_term_year -> 0007_add_attendance_indexes (head)"));
  assert!(lines[7].starts_with("<base> -> 0001_create_attendance, "));
}

#[test]
fn offline_dialect_follows_url() {
  assert_eq!(offline_dialect(None), Dialect::Postgres);
  assert_eq!(offline_dialect(Some("sqlite::memory:")), Dialect::Sqlite);
  assert_eq!(offline_dialect(Some("postgresql://u@db/school")), Dialect::Postgres);
  assert_eq!(offline_dialect(Some("mysql://nope")), Dialect::Postgres);
}

#[test]
fn offline_downgrade_requires_from() {
  let m = migrator();
  assert!(offline_script(&m, Direction::Downgrade, "base", Dialect::Postgres).is_err());
  let script = offline_script(&m, Direction::Upgrade, "head", Dialect::Sqlite).unwrap();
  assert!(script.contains("CREATE TABLE attendance ("));
}

#[tokio::test]
async fn online_commands_run_against_sqlite() {
  let mut db = AnyDatabase::connect("sqlite::memory:").await.unwrap();
  assert_eq!(db.dialect(), Dialect::Sqlite);

  let m = migrator();
  online(&mut db, &m, Command::Current).await.unwrap();
  online(&mut db, &m, Command::Upgrade { target: "+1".into(), sql: false }).await.unwrap();
  assert_eq!(m.current(&mut db).await.unwrap().as_deref(), Some("0001_create_attendance"));

  online(&mut db, &m, Command::Downgrade { target: "base".into(), sql: false }).await.unwrap();
  assert_eq!(m.current(&mut db).await.unwrap(), None);

  db.close().await.unwrap();
}

#[tokio::test]
async fn unknown_scheme_is_rejected() {
  assert!(AnyDatabase::connect("mysql://localhost/school").await.is_err());
}
