//! Command-line surface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
  name = "registrar",
  version,
  about = "Schema migrations and admin tools for the school database"
)]
pub struct Cli {
  /// TOML settings file; `database.url` is used when DATABASE_URL is unset.
  #[arg(
    short,
    long,
    value_name = "FILE",
    env = "REGISTRAR_CONFIG",
    default_value = "registrar.toml",
    global = true
  )]
  pub config: PathBuf,

  #[command(subcommand)]
  pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
  /// Apply revisions forward to TARGET.
  Upgrade {
    /// `head`, a revision id or `+N`. With --sql, `FROM:TO` is accepted.
    #[arg(default_value = "head", allow_hyphen_values = true)]
    target: String,

    /// Print the DDL script instead of executing it. No connection is made.
    #[arg(long)]
    sql: bool,
  },

  /// Revert revisions back to TARGET.
  Downgrade {
    /// `base`, a revision id or `-N`. With --sql, `FROM:TO` is required.
    #[arg(allow_hyphen_values = true)]
    target: String,

    /// Print the DDL script instead of executing it. No connection is made.
    #[arg(long)]
    sql: bool,
  },

  /// Show the revision the database is at.
  Current,

  /// List every revision, newest first.
  History,

  /// Read-only diagnostics.
  #[command(subcommand)]
  Probe(Probe),

  /// Account and data maintenance.
  #[command(subcommand)]
  Admin(Admin),
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
  /// Row counts of marks and reports, with a sample of reports.
  MarksReports,
  /// Marks per tracked exam for terms 1 to 3.
  MarksStatus,
  /// Columns of the reports table.
  ReportsColumns,
  /// All tables, and the columns of the staff tables.
  Tables,
  /// Number of users holding the teacher role.
  Teachers,
  /// Constraints on timetable_slots.
  TimetableConstraints,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Admin {
  /// Create a user with the Admin role.
  InsertAdmin {
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name:  String,
    #[arg(long)]
    email:      String,
    /// Read from stdin when omitted.
    #[arg(long)]
    password:   Option<String>,
  },
  /// Delete every user holding the Admin role.
  DeleteAdmins,
  /// Delete the users with EMAIL.
  DeleteUser {
    #[arg(long)]
    email: String,
  },
  /// Give the user with EMAIL the Admin role.
  Promote {
    #[arg(long)]
    email: String,
  },
  /// List users holding the Admin role.
  ListAdmins,
  /// Insert the default roles that are missing.
  SeedRoles,
  /// Delete all reports and marks.
  CleanDerived,
  /// Add expense_records.quantity if missing.
  AddQuantityColumn,
}
