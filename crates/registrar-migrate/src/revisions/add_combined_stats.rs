//! Combined (midterm + end-of-term) statistics on reports.

use crate::{
  op::{Column, ColumnType, Op},
  revision::Revision,
};

pub const REVISION: Revision = Revision {
  id:          "add_combined_stats",
  parent:      Some("0003_add_status_desc"),
  description: "add combined stats columns to reports",
  upgrade,
  downgrade,
};

fn upgrade() -> Vec<Op> {
  vec![
    Op::add_column("reports", Column::new("combined_total", ColumnType::Float)),
    Op::add_column("reports", Column::new("combined_average", ColumnType::Float)),
    Op::add_column("reports", Column::new("combined_grade", ColumnType::String(5))),
  ]
}

fn downgrade() -> Vec<Op> {
  vec![
    Op::drop_column("reports", "combined_grade"),
    Op::drop_column("reports", "combined_average"),
    Op::drop_column("reports", "combined_total"),
  ]
}
