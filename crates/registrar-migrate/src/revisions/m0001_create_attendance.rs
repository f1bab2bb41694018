//! Root revision: pupil attendance and its change log.

use crate::{
  op::{Column, ColumnType, Op, Table},
  revision::Revision,
};

pub const REVISION: Revision = Revision {
  id:          "0001_create_attendance",
  parent:      None,
  description: "create attendance and attendance_log tables",
  upgrade,
  downgrade,
};

fn upgrade() -> Vec<Op> {
  vec![
    Op::create_table(
      Table::new("attendance")
        .column(Column::id())
        .column(Column::new("pupil_id", ColumnType::Integer).not_null().references("pupils", "id"))
        .column(Column::new("class_id", ColumnType::Integer).references("classes", "id"))
        .column(Column::new("stream_id", ColumnType::Integer).references("streams", "id"))
        .column(Column::new("date", ColumnType::Date).not_null())
        .column(Column::new("status", ColumnType::String(32)).not_null())
        .column(Column::new("reason", ColumnType::Text))
        .column(Column::new("recorded_by", ColumnType::Integer).references("users", "id"))
        .column(Column::new("created_at", ColumnType::DateTime))
        .column(Column::new("updated_at", ColumnType::DateTime))
        .unique_constraint("u_pupil_date", &["pupil_id", "date"]),
    ),
    Op::create_table(
      Table::new("attendance_log")
        .column(Column::id())
        .column(Column::new("attendance_id", ColumnType::Integer).references("attendance", "id"))
        .column(Column::new("pupil_id", ColumnType::Integer).not_null())
        .column(Column::new("date", ColumnType::Date).not_null())
        .column(Column::new("old_status", ColumnType::String(32)))
        .column(Column::new("new_status", ColumnType::String(32)))
        .column(Column::new("changed_by", ColumnType::Integer).references("users", "id"))
        .column(Column::new("reason", ColumnType::Text))
        .column(Column::new("note", ColumnType::Text))
        .column(Column::new("changed_at", ColumnType::DateTime)),
    ),
  ]
}

fn downgrade() -> Vec<Op> {
  vec![Op::drop_table("attendance_log"), Op::drop_table("attendance")]
}
