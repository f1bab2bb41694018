//! Payment status and free-text description.
//!
//! `status` is NOT NULL, so it carries a server default that backfills
//! existing rows.

use crate::{
  op::{Column, ColumnType, Op},
  revision::Revision,
};

pub const REVISION: Revision = Revision {
  id:          "0003_add_status_desc",
  parent:      Some("0002_add_year_term_to_payments"),
  description: "add status and description to payments",
  upgrade,
  downgrade,
};

fn upgrade() -> Vec<Op> {
  vec![
    Op::add_column(
      "payments",
      Column::new("status", ColumnType::String(20)).not_null().default_literal("completed"),
    ),
    Op::add_column("payments", Column::new("description", ColumnType::String(255))),
  ]
}

fn downgrade() -> Vec<Op> {
  vec![Op::drop_column("payments", "description"), Op::drop_column("payments", "status")]
}
