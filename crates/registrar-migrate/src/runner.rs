//! Online migration: executes revision bodies against a live connection.
//!
//! Each revision runs in its own transaction. On failure the transaction is
//! rolled back, the marker stays where it was and later revisions are not
//! attempted. Revisions committed earlier in the same run stay applied.

use std::fmt;

use registrar_core::{Database, Dialect, Error, Result};
use tracing::{debug, info, warn};

use crate::{
  graph::{RevisionGraph, Target},
  marker,
  op::Op,
  render::render,
  revision::{Direction, Revision, RevisionState, Transition},
};

// ─── Report ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
  pub revision: &'static str,
  pub state:    RevisionState,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
  pub direction: Direction,
  pub from:      Option<String>,
  pub to:        Option<String>,
  pub steps:     Vec<Step>,
}

impl MigrationReport {
  pub fn is_noop(&self) -> bool { self.steps.is_empty() }
}

impl fmt::Display for MigrationReport {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let from = self.from.as_deref().unwrap_or("base");
    if self.is_noop() {
      return writeln!(f, "nothing to {}; at {from}", self.direction);
    }
    for step in &self.steps {
      writeln!(f, "{} {}: {}", self.direction, step.revision, step.state)?;
    }
    writeln!(f, "{from} -> {}", self.to.as_deref().unwrap_or("base"))
  }
}

// ─── Migrator ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Migrator {
  graph: RevisionGraph,
}

impl Migrator {
  pub fn new(graph: RevisionGraph) -> Self { Self { graph } }

  pub fn graph(&self) -> &RevisionGraph { &self.graph }

  /// The applied revision, checked against the graph.
  pub async fn current<D: Database>(&self, db: &mut D) -> Result<Option<String>> {
    let current = marker::current(db).await?;
    if let Some(id) = &current {
      self.graph.get(id)?;
    }
    Ok(current)
  }

  /// Apply forward bodies from the applied revision up to `target`.
  pub async fn upgrade<D: Database>(&self, db: &mut D, target: &Target) -> Result<MigrationReport> {
    marker::ensure_table(db).await?;
    let current = self.current(db).await?;
    let path = self.graph.upgrade_path(current.as_deref(), target)?;
    self.run(db, current, path, Direction::Upgrade).await
  }

  /// Apply reverse bodies from the applied revision back to `target`.
  pub async fn downgrade<D: Database>(&self, db: &mut D, target: &Target) -> Result<MigrationReport> {
    marker::ensure_table(db).await?;
    let current = self.current(db).await?;
    let path = self.graph.downgrade_path(current.as_deref(), target)?;
    self.run(db, current, path, Direction::Downgrade).await
  }

  async fn run<D: Database>(
    &self,
    db: &mut D,
    start: Option<String>,
    path: Vec<Revision>,
    direction: Direction,
  ) -> Result<MigrationReport> {
    if path.is_empty() {
      info!(current = start.as_deref().unwrap_or("base"), "nothing to {direction}");
      return Ok(MigrationReport { direction, from: start.clone(), to: start, steps: Vec::new() });
    }

    let mut steps = Vec::with_capacity(path.len());
    let mut at = start.clone();
    for rev in path {
      let dest = match direction {
        Direction::Upgrade => Some(rev.id),
        Direction::Downgrade => rev.parent,
      };
      let state = self.step(db, &rev, direction, at.as_deref(), dest).await?;
      steps.push(Step { revision: rev.id, state });
      at = dest.map(str::to_owned);
    }

    Ok(MigrationReport { direction, from: start, to: at, steps })
  }

  /// Run one revision body inside its own transaction.
  async fn step<D: Database>(
    &self,
    db: &mut D,
    rev: &Revision,
    direction: Direction,
    from: Option<&str>,
    to: Option<&str>,
  ) -> Result<RevisionState> {
    let settled = match direction {
      Direction::Upgrade => RevisionState::Unapplied,
      Direction::Downgrade => RevisionState::Applied,
    };
    let state = transition(rev, settled, Transition::Begin)?;
    info!(
      revision = rev.id,
      %state,
      "running {direction} {} -> {}",
      from.unwrap_or("base"),
      to.unwrap_or("base")
    );

    let outcome = async {
      db.begin().await?;
      for op in rev.body(direction) {
        apply_op(db, &op).await?;
      }
      marker::advance(db, from, to).await?;
      db.commit().await
    }
    .await;

    match outcome {
      Ok(()) => {
        let state = transition(rev, state, Transition::Succeed)?;
        info!(revision = rev.id, %state, "{direction} committed");
        Ok(state)
      }
      Err(err) => {
        if let Err(rollback_err) = db.rollback().await {
          warn!(revision = rev.id, error = %rollback_err, "rollback failed");
        }
        let state = transition(rev, state, Transition::Fail)?;
        warn!(revision = rev.id, %state, error = %err, "{direction} rolled back");
        Err(Error::DdlFailed {
          revision:  rev.id.to_owned(),
          direction: direction.as_str(),
          message:   err.to_string(),
        })
      }
    }
  }
}

fn transition(rev: &Revision, state: RevisionState, t: Transition) -> Result<RevisionState> {
  state.next(t).ok_or_else(|| {
    Error::InvalidTarget(format!("revision {} cannot go from {state} via {t:?}", rev.id))
  })
}

/// Execute a single operation on `db`.
///
/// Conditional column operations consult the catalog on dialects that lack
/// the `IF [NOT] EXISTS` guard, so they are replay-safe everywhere.
pub async fn apply_op<D: Database>(db: &mut D, op: &Op) -> Result<()> {
  let dialect = db.dialect();
  match op {
    Op::AddColumn { table, column, if_not_exists: true }
      if !dialect.supports_add_column_if_not_exists() =>
    {
      if db.has_column(table, &column.name).await? {
        debug!(table = %table, column = %column.name, "column present; skipping");
        return Ok(());
      }
    }
    Op::DropColumn { table, column, if_exists: true } if dialect != Dialect::Postgres => {
      if !db.has_column(table, column).await? {
        debug!(table = %table, column = %column, "column absent; skipping");
        return Ok(());
      }
    }
    _ => {}
  }

  for statement in render(op, dialect) {
    debug!(%statement, "execute");
    db.execute(&statement, &[]).await?;
  }
  Ok(())
}
