//! Conversions between driver-neutral [`Value`]s and rusqlite types, and
//! placeholder rewriting.

use registrar_core::Value;
use rusqlite::types::{Value as SqlValue, ValueRef};

pub fn encode_value(value: &Value) -> SqlValue {
  match value {
    Value::Null => SqlValue::Null,
    Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
    Value::Int(i) => SqlValue::Integer(*i),
    Value::Float(f) => SqlValue::Real(*f),
    Value::Text(s) => SqlValue::Text(s.clone()),
  }
}

pub fn decode_value(value: ValueRef<'_>) -> Value {
  match value {
    ValueRef::Null => Value::Null,
    ValueRef::Integer(i) => Value::Int(i),
    ValueRef::Real(f) => Value::Float(f),
    ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
      Value::Text(String::from_utf8_lossy(bytes).into_owned())
    }
  }
}

/// Rewrite `$n` placeholders to SQLite's `?n`.
///
/// Quoted literals and identifiers are copied untouched, so a `$1` inside
/// `'...'` or `"..."` survives.
pub fn rewrite_placeholders(sql: &str) -> String {
  let mut out = String::with_capacity(sql.len());
  let mut quote: Option<char> = None;
  let mut chars = sql.chars().peekable();

  while let Some(c) = chars.next() {
    match quote {
      Some(q) => {
        out.push(c);
        if c == q {
          quote = None;
        }
      }
      None if c == '\'' || c == '"' => {
        quote = Some(c);
        out.push(c);
      }
      None if c == '$' && chars.peek().is_some_and(char::is_ascii_digit) => out.push('?'),
      None => out.push(c),
    }
  }
  out
}

/// Named constraints declared in a `CREATE TABLE` statement, as
/// `(name, kind)` pairs.
pub fn named_constraints(create_sql: &str) -> Vec<(String, String)> {
  let cleaned: String = create_sql
    .chars()
    .map(|c| if matches!(c, '(' | ')' | ',') { ' ' } else { c })
    .collect();
  let tokens: Vec<&str> = cleaned.split_whitespace().collect();

  let mut found = Vec::new();
  for (i, token) in tokens.iter().enumerate() {
    if !token.eq_ignore_ascii_case("CONSTRAINT") {
      continue;
    }
    let (Some(name), Some(kind)) = (tokens.get(i + 1), tokens.get(i + 2)) else {
      continue;
    };
    let kind = kind.to_ascii_uppercase();
    let kind = match kind.as_str() {
      "PRIMARY" | "FOREIGN" => format!("{kind} KEY"),
      _ => kind,
    };
    found.push((name.trim_matches('"').to_owned(), kind));
  }
  found
}
