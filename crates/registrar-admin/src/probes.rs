//! Read-only diagnostics. Each probe runs a small fixed query and returns a
//! report; nothing is written.

use std::fmt;

use registrar_core::{ColumnInfo, ConstraintInfo, Database, Result, Value};
use tracing::info;

use crate::{FAIL, OK};

// ─── Marks / reports counts ──────────────────────────────────────────────────

/// Reports sampled when derived rows are present.
pub const REPORT_SAMPLE_SIZE: i64 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSample {
  pub id:       i64,
  pub pupil_id: Option<i64>,
  pub exam_id:  Option<i64>,
}

/// Row counts of `marks` and `reports`. Leftover reports block a fresh
/// marks import, so a few are sampled when any exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarksReportsCount {
  pub marks:   i64,
  pub reports: i64,
  pub sample:  Vec<ReportSample>,
}

pub async fn marks_reports_count<D: Database>(db: &mut D) -> Result<MarksReportsCount> {
  let marks = db.scalar_int("SELECT COUNT(*) FROM marks", &[]).await?;
  let reports = db.scalar_int("SELECT COUNT(*) FROM reports", &[]).await?;

  let mut sample = Vec::new();
  if reports > 0 {
    let rows = db
      .query(
        "SELECT id, pupil_id, exam_id FROM reports ORDER BY id LIMIT $1",
        &[Value::from(REPORT_SAMPLE_SIZE)],
      )
      .await?;
    for row in rows {
      sample.push(ReportSample {
        id:       row.int(0)?,
        pupil_id: row.opt_int(1)?,
        exam_id:  row.opt_int(2)?,
      });
    }
  }

  info!(marks, reports, "counted marks and reports");
  Ok(MarksReportsCount { marks, reports, sample })
}

impl fmt::Display for MarksReportsCount {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "marks:   {}", self.marks)?;
    writeln!(f, "reports: {}", self.reports)?;
    if !self.sample.is_empty() {
      writeln!(f, "sample reports (id, pupil_id, exam_id):")?;
      for s in &self.sample {
        writeln!(f, "  ({}, {}, {})", s.id, opt(s.pupil_id), opt(s.exam_id))?;
      }
    }
    Ok(())
  }
}

fn opt(v: Option<i64>) -> String { v.map_or_else(|| "NULL".to_owned(), |v| v.to_string()) }

// ─── Per-term marks status ───────────────────────────────────────────────────

pub const TERMS: [i64; 3] = [1, 2, 3];

// `term` is stored as text in some deployments and as an integer in others.
// Exam name spellings vary in the data.
const MARKS_PER_EXAM: &str = "
SELECT e.id, e.name, COUNT(m.id)
FROM exams e
LEFT JOIN marks m ON e.id = m.exam_id
WHERE CAST(e.term AS TEXT) = $1
  AND e.name IN ('Midterm', 'End Term', 'End_term', 'End_Term')
GROUP BY e.id, e.name
ORDER BY e.id";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamMarks {
  pub exam_id: i64,
  pub name:    String,
  pub marks:   i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermMarks {
  pub term:  i64,
  pub exams: Vec<ExamMarks>,
}

impl TermMarks {
  pub fn total(&self) -> i64 { self.exams.iter().map(|e| e.marks).sum() }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarksStatus {
  pub terms: Vec<TermMarks>,
}

pub async fn marks_status<D: Database>(db: &mut D) -> Result<MarksStatus> {
  let mut terms = Vec::with_capacity(TERMS.len());
  for term in TERMS {
    let rows = db.query(MARKS_PER_EXAM, &[Value::from(term.to_string())]).await?;
    let exams = rows
      .iter()
      .map(|r| Ok(ExamMarks { exam_id: r.int(0)?, name: r.text(1)?, marks: r.int(2)? }))
      .collect::<Result<Vec<_>>>()?;
    terms.push(TermMarks { term, exams });
  }
  Ok(MarksStatus { terms })
}

impl fmt::Display for MarksStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "[MARKS STATUS]")?;
    for term in &self.terms {
      writeln!(f, "\nTerm {}:", term.term)?;
      for exam in &term.exams {
        writeln!(f, "  ID {} ({:<20}): {:>6} marks", exam.exam_id, exam.name, exam.marks)?;
      }
      writeln!(f, "  {:<26}: {:>6} marks", "TOTAL", term.total())?;
    }
    Ok(())
  }
}

// ─── Catalog probes ──────────────────────────────────────────────────────────

/// `(column_name, data_type)` of the `reports` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportsColumns(pub Vec<ColumnInfo>);

pub async fn reports_columns<D: Database>(db: &mut D) -> Result<ReportsColumns> {
  Ok(ReportsColumns(db.columns("reports").await?))
}

impl fmt::Display for ReportsColumns {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.0.is_empty() {
      return writeln!(f, "{FAIL} table reports not found");
    }
    writeln!(f, "reports columns:")?;
    for c in &self.0 {
      writeln!(f, "  {} {}", c.name, c.data_type)?;
    }
    Ok(())
  }
}

/// Tables added by the staff revisions.
pub const STAFF_TABLES: [&str; 3] = ["staff_attendance", "salary_history", "staff_profiles"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablesReport {
  pub tables: Vec<String>,
  /// One entry per [`STAFF_TABLES`] name; `None` when the table is absent.
  pub staff:  Vec<(String, Option<Vec<ColumnInfo>>)>,
}

pub async fn tables<D: Database>(db: &mut D) -> Result<TablesReport> {
  let tables = db.tables().await?;
  let mut staff = Vec::with_capacity(STAFF_TABLES.len());
  for name in STAFF_TABLES {
    let columns = if tables.iter().any(|t| t == name) {
      Some(db.columns(name).await?)
    } else {
      None
    };
    staff.push((name.to_owned(), columns));
  }
  Ok(TablesReport { tables, staff })
}

impl fmt::Display for TablesReport {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "tables ({}):", self.tables.len())?;
    for t in &self.tables {
      writeln!(f, "  {t}")?;
    }
    for (name, columns) in &self.staff {
      match columns {
        Some(columns) => {
          let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
          writeln!(f, "{OK} {name}: {}", names.join(", "))?;
        }
        None => writeln!(f, "{FAIL} {name}: missing")?,
      }
    }
    Ok(())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeachersCount(pub i64);

pub async fn teachers_count<D: Database>(db: &mut D) -> Result<TeachersCount> {
  let n = db
    .scalar_int(
      "SELECT COUNT(*) FROM users u JOIN roles r ON u.role_id = r.id
       WHERE LOWER(r.role_name) = 'teacher'",
      &[],
    )
    .await?;
  Ok(TeachersCount(n))
}

impl fmt::Display for TeachersCount {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { writeln!(f, "teachers: {}", self.0) }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimetableConstraints(pub Vec<ConstraintInfo>);

pub async fn timetable_constraints<D: Database>(db: &mut D) -> Result<TimetableConstraints> {
  Ok(TimetableConstraints(db.constraints("timetable_slots").await?))
}

impl fmt::Display for TimetableConstraints {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "timetable_slots constraints ({}):", self.0.len())?;
    for c in &self.0 {
      writeln!(f, "  {} {}", c.name, c.kind)?;
    }
    Ok(())
  }
}
