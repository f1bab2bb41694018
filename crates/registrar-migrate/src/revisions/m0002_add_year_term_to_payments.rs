//! Academic year and term on payments.

use crate::{
  op::{Column, ColumnType, Op},
  revision::Revision,
};

pub const REVISION: Revision = Revision {
  id:          "0002_add_year_term_to_payments",
  parent:      Some("0001_create_attendance"),
  description: "add year and term fields to payments",
  upgrade,
  downgrade,
};

fn upgrade() -> Vec<Op> {
  vec![
    Op::add_column("payments", Column::new("year", ColumnType::Integer)),
    Op::add_column("payments", Column::new("term", ColumnType::String(20))),
  ]
}

fn downgrade() -> Vec<Op> {
  vec![Op::drop_column("payments", "term"), Op::drop_column("payments", "year")]
}
