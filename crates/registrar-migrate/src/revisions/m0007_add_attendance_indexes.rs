//! Composite indexes on staff attendance for date range scans.

use crate::{op::Op, revision::Revision};

pub const REVISION: Revision = Revision {
  id:          "0007_add_attendance_indexes",
  parent:      Some("0006_attendance_term_year"),
  description: "add composite indexes to staff_attendance for faster range queries",
  upgrade,
  downgrade,
};

fn upgrade() -> Vec<Op> {
  vec![
    // date range scans grouped by staff
    Op::create_index("ix_staff_attendance_date_staff_id", "staff_attendance", &["date", "staff_id"]),
    // date + present/absent filters
    Op::create_index("ix_staff_attendance_date_status", "staff_attendance", &["date", "status"]),
  ]
}

fn downgrade() -> Vec<Op> {
  vec![
    Op::drop_index("ix_staff_attendance_date_status", "staff_attendance"),
    Op::drop_index("ix_staff_attendance_date_staff_id", "staff_attendance"),
  ]
}
