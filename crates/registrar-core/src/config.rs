//! Settings and connection-string resolution.
//!
//! The connection string comes from `DATABASE_URL` when set, otherwise from
//! the `database.url` key of the settings file.

use std::path::Path;

use percent_encoding::percent_decode_str;
use serde::Deserialize;
use url::Url;

use crate::{Dialect, Error, Result};

/// Environment variable consulted before the settings file.
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";

/// Default port for `postgresql://` URLs without one.
pub const DEFAULT_PG_PORT: u16 = 5432;

// ─── Settings ────────────────────────────────────────────────────────────────

/// Static settings, deserialised from `registrar.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
  #[serde(default)]
  pub database: DatabaseSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseSettings {
  /// Fallback connection string, used only when `DATABASE_URL` is unset.
  pub url: Option<String>,
}

impl Settings {
  /// Load settings from an optional TOML file layered with `REGISTRAR__*`
  /// environment variables. A missing file is not an error.
  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path.as_ref()).required(false))
      .add_source(config::Environment::with_prefix("REGISTRAR").separator("__"))
      .build()?;
    Ok(settings.try_deserialize()?)
  }

  /// Parse settings from an in-memory TOML document.
  pub fn from_toml(source: &str) -> Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from_str(source, config::FileFormat::Toml))
      .build()?;
    Ok(settings.try_deserialize()?)
  }
}

// ─── Resolver ────────────────────────────────────────────────────────────────

/// Produces the connection string every component uses.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
  fallback: Option<String>,
}

impl Resolver {
  pub fn new(fallback: Option<String>) -> Self { Self { fallback } }

  pub fn from_settings(settings: &Settings) -> Self {
    Self::new(settings.database.url.clone())
  }

  /// Resolve against the process environment.
  pub fn resolve(&self) -> Result<String> {
    self.resolve_with(|key| std::env::var(key).ok())
  }

  /// Resolve using `lookup` in place of the process environment.
  ///
  /// An empty variable counts as unset.
  pub fn resolve_with(&self, lookup: impl Fn(&str) -> Option<String>) -> Result<String> {
    lookup(DATABASE_URL_VAR)
      .filter(|v| !v.trim().is_empty())
      .or_else(|| self.fallback.clone().filter(|v| !v.trim().is_empty()))
      .ok_or(Error::ConfigMissing)
  }
}

// ─── Connection targets ──────────────────────────────────────────────────────

/// Postgres connection parameters extracted from a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PgParams {
  pub host:        String,
  pub port:        u16,
  pub database:    String,
  pub user:        Option<String>,
  pub password:    Option<String>,
  pub require_tls: bool,
}

/// Where a SQLite database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqliteTarget {
  Memory,
  File(String),
}

/// A parsed connection string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseUrl {
  Postgres(PgParams),
  Sqlite(SqliteTarget),
}

impl DatabaseUrl {
  pub fn parse(raw: &str) -> Result<Self> {
    if raw == "sqlite::memory:" || raw == "sqlite://:memory:" {
      return Ok(Self::Sqlite(SqliteTarget::Memory));
    }
    if let Some(path) = raw.strip_prefix("sqlite://").or_else(|| raw.strip_prefix("sqlite:")) {
      if path.is_empty() {
        return Err(Error::InvalidUrl("sqlite url has no path".into()));
      }
      return Ok(Self::Sqlite(SqliteTarget::File(path.to_owned())));
    }

    let url = Url::parse(raw).map_err(|e| Error::InvalidUrl(e.to_string()))?;
    match url.scheme() {
      "postgres" | "postgresql" => Ok(Self::Postgres(pg_params(&url)?)),
      other => Err(Error::InvalidUrl(format!("unsupported scheme {other:?}"))),
    }
  }

  pub fn dialect(&self) -> Dialect {
    match self {
      Self::Postgres(_) => Dialect::Postgres,
      Self::Sqlite(_) => Dialect::Sqlite,
    }
  }
}

fn pg_params(url: &Url) -> Result<PgParams> {
  let database = url.path().trim_start_matches('/');
  if database.is_empty() {
    return Err(Error::InvalidUrl("postgres url has no database name".into()));
  }

  let user = Some(decode(url.username())?).filter(|u| !u.is_empty());
  let password = url.password().map(decode).transpose()?;
  let require_tls = url
    .query_pairs()
    .any(|(k, v)| k == "sslmode" && v == "require");

  Ok(PgParams {
    host: url.host_str().unwrap_or("localhost").to_owned(),
    port: url.port().unwrap_or(DEFAULT_PG_PORT),
    database: decode(database)?,
    user,
    password,
    require_tls,
  })
}

fn decode(component: &str) -> Result<String> {
  percent_decode_str(component)
    .decode_utf8()
    .map(|s| s.into_owned())
    .map_err(|e| Error::InvalidUrl(format!("cannot decode {component:?}: {e}")))
}

/// Hide the password of a connection string for logs and banners.
pub fn redact(raw: &str) -> String {
  match Url::parse(raw) {
    Ok(mut url) if url.password().is_some() => {
      // set_password only fails for cannot-be-a-base urls, which have no password.
      let _ = url.set_password(Some("***"));
      url.to_string()
    }
    _ => raw.to_owned(),
  }
}
