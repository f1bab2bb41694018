//! The application's declared revisions.
//!
//! One file per revision; each exports a `REVISION` descriptor. Order comes
//! from the `parent` links, never from this list or from the identifiers.
//!
//! To add a revision:
//! 1. Create a file with `upgrade()` / `downgrade()` returning `Vec<Op>`,
//!    the reverse body undoing the forward body in exactly inverse order.
//! 2. Point its `parent` at the current head.
//! 3. Register it in [`all`].

mod add_combined_stats;
mod m0001_create_attendance;
mod m0002_add_year_term_to_payments;
mod m0003_add_status_desc;
mod m0004_timetable_overlap;
mod m0005_staff_models;
mod m0006_attendance_term_year;
mod m0007_add_attendance_indexes;

use registrar_core::Result;

use crate::{graph::RevisionGraph, revision::Revision};

pub fn all() -> Vec<Revision> {
  vec![
    m0001_create_attendance::REVISION,
    m0002_add_year_term_to_payments::REVISION,
    m0003_add_status_desc::REVISION,
    add_combined_stats::REVISION,
    m0004_timetable_overlap::REVISION,
    m0005_staff_models::REVISION,
    m0006_attendance_term_year::REVISION,
    m0007_add_attendance_indexes::REVISION,
  ]
}

/// The validated chain of every declared revision.
pub fn graph() -> Result<RevisionGraph> { RevisionGraph::new(all()) }
