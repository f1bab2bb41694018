//! Term and year on staff attendance, with an index on year.

use crate::{
  op::{Column, ColumnType, Op},
  revision::Revision,
};

pub const REVISION: Revision = Revision {
  id:          "0006_attendance_term_year",
  parent:      Some("0005_staff_models"),
  description: "add term and year to staff_attendance",
  upgrade,
  downgrade,
};

fn upgrade() -> Vec<Op> {
  vec![
    Op::add_column("staff_attendance", Column::new("term", ColumnType::String(50))),
    Op::add_column("staff_attendance", Column::new("year", ColumnType::Integer)),
    Op::create_index("ix_staff_attendance_year", "staff_attendance", &["year"]),
  ]
}

// The index goes first; SQLite refuses to drop an indexed column.
fn downgrade() -> Vec<Op> {
  vec![
    Op::drop_index("ix_staff_attendance_year", "staff_attendance"),
    Op::drop_column("staff_attendance", "year"),
    Op::drop_column("staff_attendance", "term"),
  ]
}
