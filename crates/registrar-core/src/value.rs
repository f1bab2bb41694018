//! Driver-neutral parameter and result values.
//!
//! Both transports convert their native column types into [`Value`] so that
//! probes and mutators read rows the same way regardless of backend.

use std::fmt;

use crate::{Error, Result};

// ─── Value ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
  Null,
  Bool(bool),
  Int(i64),
  Float(f64),
  Text(String),
}

impl Value {
  pub fn is_null(&self) -> bool { matches!(self, Self::Null) }

  /// Render the value as an SQL literal for offline scripts.
  ///
  /// Text is single-quoted with embedded quotes doubled.
  pub fn to_sql_literal(&self) -> String {
    match self {
      Self::Null => "NULL".to_owned(),
      Self::Bool(true) => "TRUE".to_owned(),
      Self::Bool(false) => "FALSE".to_owned(),
      Self::Int(i) => i.to_string(),
      Self::Float(f) => f.to_string(),
      Self::Text(s) => format!("'{}'", s.replace('\'', "''")),
    }
  }
}

impl fmt::Display for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Null => f.write_str("NULL"),
      Self::Bool(b) => write!(f, "{b}"),
      Self::Int(i) => write!(f, "{i}"),
      Self::Float(x) => write!(f, "{x}"),
      Self::Text(s) => f.write_str(s),
    }
  }
}

impl From<i64> for Value {
  fn from(v: i64) -> Self { Self::Int(v) }
}

impl From<i32> for Value {
  fn from(v: i32) -> Self { Self::Int(v.into()) }
}

impl From<f64> for Value {
  fn from(v: f64) -> Self { Self::Float(v) }
}

impl From<bool> for Value {
  fn from(v: bool) -> Self { Self::Bool(v) }
}

impl From<&str> for Value {
  fn from(v: &str) -> Self { Self::Text(v.to_owned()) }
}

impl From<String> for Value {
  fn from(v: String) -> Self { Self::Text(v) }
}

impl<T: Into<Value>> From<Option<T>> for Value {
  fn from(v: Option<T>) -> Self { v.map_or(Self::Null, Into::into) }
}

// ─── Row ─────────────────────────────────────────────────────────────────────

/// One result row, addressed by column position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row(pub Vec<Value>);

impl Row {
  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn get(&self, idx: usize) -> Result<&Value> {
    self
      .0
      .get(idx)
      .ok_or_else(|| Error::Decode(format!("column {idx} out of range ({} columns)", self.0.len())))
  }

  pub fn int(&self, idx: usize) -> Result<i64> {
    match self.get(idx)? {
      Value::Int(i) => Ok(*i),
      Value::Bool(b) => Ok(i64::from(*b)),
      Value::Text(s) => s
        .parse()
        .map_err(|_| Error::Decode(format!("column {idx}: {s:?} is not an integer"))),
      other => Err(Error::Decode(format!("column {idx}: expected integer, got {other:?}"))),
    }
  }

  pub fn opt_int(&self, idx: usize) -> Result<Option<i64>> {
    match self.get(idx)? {
      Value::Null => Ok(None),
      _ => self.int(idx).map(Some),
    }
  }

  pub fn text(&self, idx: usize) -> Result<String> {
    match self.get(idx)? {
      Value::Null => Err(Error::Decode(format!("column {idx}: unexpected NULL"))),
      other => Ok(other.to_string()),
    }
  }

  pub fn opt_text(&self, idx: usize) -> Result<Option<String>> {
    match self.get(idx)? {
      Value::Null => Ok(None),
      other => Ok(Some(other.to_string())),
    }
  }

  pub fn bool(&self, idx: usize) -> Result<bool> {
    match self.get(idx)? {
      Value::Bool(b) => Ok(*b),
      Value::Int(i) => Ok(*i != 0),
      Value::Text(s) => Ok(matches!(s.as_str(), "t" | "true" | "YES" | "1")),
      other => Err(Error::Decode(format!("column {idx}: expected boolean, got {other:?}"))),
    }
  }
}

impl From<Vec<Value>> for Row {
  fn from(values: Vec<Value>) -> Self { Self(values) }
}
