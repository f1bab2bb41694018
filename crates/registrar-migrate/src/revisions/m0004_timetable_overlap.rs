//! Prevent a teacher from being booked into overlapping timetable slots.
//!
//! Uses a generated `int4range` column and a GiST exclusion constraint, both
//! Postgres features; the statements are skipped on other dialects. Every
//! statement is guarded so the body can be replayed.

use registrar_core::Dialect;

use crate::{op::Op, revision::Revision};

pub const REVISION: Revision = Revision {
  id:          "0004_timetable_overlap",
  parent:      Some("add_combined_stats"),
  description: "add generated time_range and exclusion constraint to prevent teacher overlap",
  upgrade,
  downgrade,
};

const ENSURE_BTREE_GIST: &str = "CREATE EXTENSION IF NOT EXISTS btree_gist";

const VALIDATE_SLOT_TIMES: &str = r"
DO $$
BEGIN
    IF EXISTS (
        SELECT 1 FROM timetable_slots
        WHERE start_time IS NULL OR end_time IS NULL
           OR start_time !~ '^(?:[01][0-9]|2[0-3]):[0-5][0-9]$'
           OR end_time   !~ '^(?:[01][0-9]|2[0-3]):[0-5][0-9]$'
    ) THEN
        RAISE EXCEPTION 'Found timetable_slots rows with NULL or invalid start_time/end_time. Fix them before running this migration.';
    END IF;
END
$$";

const ADD_TIME_RANGE: &str = r"
ALTER TABLE timetable_slots
  ADD COLUMN IF NOT EXISTS time_range int4range GENERATED ALWAYS AS (
    int4range(
      (split_part(start_time, ':', 1)::int * 60 + split_part(start_time, ':', 2)::int),
      (split_part(end_time,   ':', 1)::int * 60 + split_part(end_time,   ':', 2)::int)
    )
  ) STORED";

const ADD_EXCLUSION: &str = r"
DO $$
BEGIN
  IF NOT EXISTS (SELECT 1 FROM pg_constraint WHERE conname = 'no_teacher_overlap') THEN
    EXECUTE 'ALTER TABLE timetable_slots ADD CONSTRAINT no_teacher_overlap EXCLUDE USING gist (
      teacher_id WITH =,
      day_of_week WITH =,
      time_range WITH &&
    )';
  END IF;
END
$$";

const DROP_EXCLUSION: &str = r"
DO $$
BEGIN
  IF EXISTS (SELECT 1 FROM pg_constraint WHERE conname = 'no_teacher_overlap') THEN
    EXECUTE 'ALTER TABLE timetable_slots DROP CONSTRAINT no_teacher_overlap';
  END IF;
END
$$";

const DROP_TIME_RANGE: &str = "ALTER TABLE timetable_slots DROP COLUMN IF EXISTS time_range";

fn upgrade() -> Vec<Op> {
  vec![
    Op::execute_on(Dialect::Postgres, ENSURE_BTREE_GIST),
    Op::execute_on(Dialect::Postgres, VALIDATE_SLOT_TIMES),
    Op::execute_on(Dialect::Postgres, ADD_TIME_RANGE),
    Op::execute_on(Dialect::Postgres, ADD_EXCLUSION),
  ]
}

// btree_gist stays installed; other objects may depend on it.
fn downgrade() -> Vec<Op> {
  vec![
    Op::execute_on(Dialect::Postgres, DROP_EXCLUSION),
    Op::execute_on(Dialect::Postgres, DROP_TIME_RANGE),
  ]
}
