//! Staff attendance, salary history and staff profiles.

use crate::{
  op::{Column, ColumnType, Op, Table},
  revision::Revision,
};

pub const REVISION: Revision = Revision {
  id:          "0005_staff_models",
  parent:      Some("0004_timetable_overlap"),
  description: "add staff attendance, salary history and staff profiles tables",
  upgrade,
  downgrade,
};

fn upgrade() -> Vec<Op> {
  vec![
    Op::create_table(
      Table::new("staff_attendance")
        .column(Column::id())
        .column(Column::new("staff_id", ColumnType::Integer).not_null().references("users", "id"))
        .column(Column::new("date", ColumnType::Date).not_null())
        .column(Column::new("status", ColumnType::String(20)).not_null())
        .column(Column::new("recorded_by", ColumnType::Integer).references("users", "id"))
        .column(Column::new("notes", ColumnType::Text))
        .column(Column::new("created_at", ColumnType::DateTime).not_null().default_now())
        .column(Column::new("updated_at", ColumnType::DateTime).not_null().default_now())
        .unique_constraint("u_staff_date", &["staff_id", "date"]),
    ),
    Op::create_table(
      Table::new("salary_history")
        .column(Column::id())
        .column(Column::new("staff_id", ColumnType::Integer).not_null().references("users", "id"))
        .column(Column::new("old_salary", ColumnType::Numeric(12, 2)).not_null())
        .column(Column::new("new_salary", ColumnType::Numeric(12, 2)).not_null())
        .column(Column::new("changed_by", ColumnType::Integer).not_null().references("users", "id"))
        .column(Column::new("reason", ColumnType::Text))
        .column(Column::new("changed_at", ColumnType::DateTime).not_null().default_now()),
    ),
    Op::create_table(
      Table::new("staff_profiles")
        .column(Column::id())
        .column(
          Column::new("staff_id", ColumnType::Integer)
            .not_null()
            .unique()
            .references("users", "id"),
        )
        .column(Column::new("bank_name", ColumnType::String(100)))
        .column(Column::new("bank_account", ColumnType::String(100)))
        .column(Column::new("tax_id", ColumnType::String(100)))
        .column(Column::new("pay_grade", ColumnType::String(50)))
        .column(Column::new("created_at", ColumnType::DateTime).not_null().default_now()),
    ),
  ]
}

fn downgrade() -> Vec<Op> {
  vec![
    Op::drop_table("staff_profiles"),
    Op::drop_table("salary_history"),
    Op::drop_table("staff_attendance"),
  ]
}
