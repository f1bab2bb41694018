//! `registrar`: schema migrations and admin tools for the school database.
//!
//! # Usage
//!
//! ```text
//! registrar upgrade head
//! registrar downgrade -1
//! registrar upgrade --sql base:head > schema.sql
//! registrar probe marks-status
//! registrar admin insert-admin --first-name Ada --last-name Okello --email ada@example.com
//! ```
//!
//! The connection string comes from `DATABASE_URL`, falling back to
//! `database.url` in the settings file.

mod cli;
mod commands;
mod db;

use std::process::ExitCode;

use clap::Parser;
use registrar_admin::FAIL;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
  // Logs go to stderr; stdout carries probe output and SQL scripts.
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  match commands::run(cli).await {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      eprintln!("{FAIL} {err:#}");
      ExitCode::FAILURE
    }
  }
}

#[cfg(test)]
mod tests;
