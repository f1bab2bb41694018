//! Revision descriptors and the per-revision state machine.

use std::fmt;

use crate::op::Op;

// ─── Revision ────────────────────────────────────────────────────────────────

/// A named unit of schema change with a forward and a reverse body.
///
/// Revisions are declared statically and never mutated. Their order is
/// derived from `parent` links only; identifiers are opaque.
#[derive(Clone, Copy)]
pub struct Revision {
  pub id:          &'static str,
  /// `None` for the root revision.
  pub parent:      Option<&'static str>,
  pub description: &'static str,
  pub upgrade:     fn() -> Vec<Op>,
  pub downgrade:   fn() -> Vec<Op>,
}

impl Revision {
  pub fn body(&self, direction: Direction) -> Vec<Op> {
    match direction {
      Direction::Upgrade => (self.upgrade)(),
      Direction::Downgrade => (self.downgrade)(),
    }
  }
}

impl fmt::Debug for Revision {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Revision")
      .field("id", &self.id)
      .field("parent", &self.parent)
      .finish_non_exhaustive()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
  Upgrade,
  Downgrade,
}

impl Direction {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Upgrade => "upgrade",
      Self::Downgrade => "downgrade",
    }
  }
}

impl fmt::Display for Direction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

// ─── State machine ───────────────────────────────────────────────────────────

/// Where a single revision stands during a run.
///
/// ```text
/// Unapplied ──begin──▶ Applying ──ok──▶ Applied
///     ▲                   │                │
///     └─────fail──────────┘              begin
///     ▲                                    ▼
///     └──────────ok──────────────────── Reverting ──fail──▶ Applied
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevisionState {
  Unapplied,
  Applying,
  Applied,
  Reverting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
  Begin,
  Succeed,
  Fail,
}

impl RevisionState {
  /// The state reached from `self` via `transition`, or `None` if the
  /// transition is not allowed.
  pub fn next(self, transition: Transition) -> Option<Self> {
    use RevisionState::*;
    use Transition::*;
    match (self, transition) {
      (Unapplied, Begin) => Some(Applying),
      (Applying, Succeed) => Some(Applied),
      (Applying, Fail) => Some(Unapplied),
      (Applied, Begin) => Some(Reverting),
      (Reverting, Succeed) => Some(Unapplied),
      (Reverting, Fail) => Some(Applied),
      _ => None,
    }
  }

  pub fn is_settled(self) -> bool { matches!(self, Self::Unapplied | Self::Applied) }
}

impl fmt::Display for RevisionState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      Self::Unapplied => "unapplied",
      Self::Applying => "applying",
      Self::Applied => "applied",
      Self::Reverting => "reverting",
    };
    f.write_str(s)
  }
}
