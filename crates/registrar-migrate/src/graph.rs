//! The revision graph: a validated, linear chain from a root to a head.

use std::{collections::HashMap, fmt, str::FromStr};

use registrar_core::{Error, Result};

use crate::revision::Revision;

// ─── Graph ───────────────────────────────────────────────────────────────────

/// Revisions ordered root-first, built exclusively from `parent` links.
#[derive(Debug, Clone)]
pub struct RevisionGraph {
  ordered: Vec<Revision>,
}

impl RevisionGraph {
  /// Validate `revisions` and order them along their parent links.
  ///
  /// Rejects duplicate identifiers, missing parents, zero or several roots,
  /// branches (two revisions sharing a parent) and cycles.
  pub fn new(revisions: Vec<Revision>) -> Result<Self> {
    let mut by_id: HashMap<&'static str, Revision> = HashMap::with_capacity(revisions.len());
    for rev in &revisions {
      if by_id.insert(rev.id, *rev).is_some() {
        return Err(Error::NotLinear(format!("duplicate revision id {:?}", rev.id)));
      }
    }

    let mut roots = Vec::new();
    let mut children: HashMap<&'static str, Vec<&'static str>> = HashMap::new();
    for rev in &revisions {
      match rev.parent {
        None => roots.push(rev.id),
        Some(parent) => {
          if !by_id.contains_key(parent) {
            return Err(Error::NoSuchRevision(parent.to_owned()));
          }
          children.entry(parent).or_default().push(rev.id);
        }
      }
    }

    let root = match roots.as_slice() {
      [] if revisions.is_empty() => return Ok(Self { ordered: Vec::new() }),
      [] => return Err(Error::NotLinear("no root revision (every revision has a parent)".into())),
      [root] => *root,
      many => return Err(Error::NotLinear(format!("multiple roots: {}", many.join(", ")))),
    };

    if let Some((parent, kids)) = children.iter().find(|(_, kids)| kids.len() > 1) {
      let mut kids = kids.clone();
      kids.sort_unstable();
      return Err(Error::NotLinear(format!(
        "revision {parent:?} has multiple children: {}",
        kids.join(", ")
      )));
    }

    let mut ordered = Vec::with_capacity(revisions.len());
    let mut cursor = Some(root);
    while let Some(id) = cursor {
      ordered.push(by_id[id]);
      cursor = children.get(id).and_then(|kids| kids.first().copied());
    }

    if ordered.len() != revisions.len() {
      let reached: Vec<&str> = ordered.iter().map(|r| r.id).collect();
      let mut stranded: Vec<&str> = revisions
        .iter()
        .map(|r| r.id)
        .filter(|id| !reached.contains(id))
        .collect();
      stranded.sort_unstable();
      return Err(Error::NotLinear(format!(
        "revisions unreachable from root (cycle): {}",
        stranded.join(", ")
      )));
    }

    Ok(Self { ordered })
  }

  /// All revisions, root first.
  pub fn revisions(&self) -> &[Revision] { &self.ordered }

  pub fn is_empty(&self) -> bool { self.ordered.is_empty() }

  /// The unique revision with no successor.
  pub fn head(&self) -> Option<&'static str> { self.ordered.last().map(|r| r.id) }

  pub fn root(&self) -> Option<&'static str> { self.ordered.first().map(|r| r.id) }

  pub fn get(&self, id: &str) -> Result<&Revision> {
    self
      .ordered
      .iter()
      .find(|r| r.id == id)
      .ok_or_else(|| Error::NoSuchRevision(id.to_owned()))
  }

  /// Number of revisions applied when the database is at `id`
  /// (`None` = empty state = 0).
  pub fn depth(&self, id: Option<&str>) -> Result<usize> {
    match id {
      None => Ok(0),
      Some(id) => self
        .ordered
        .iter()
        .position(|r| r.id == id)
        .map(|p| p + 1)
        .ok_or_else(|| Error::NoSuchRevision(id.to_owned())),
    }
  }

  /// The revision at `depth`, with 0 meaning the empty state.
  fn at_depth(&self, depth: usize) -> Option<&'static str> {
    depth.checked_sub(1).map(|i| self.ordered[i].id)
  }

  /// The revisions strictly after `from` up to and including `to`, in chain
  /// order. `None` stands for the empty state.
  pub fn chain(&self, from: Option<&str>, to: Option<&str>) -> Result<Vec<Revision>> {
    let start = self.depth(from)?;
    let end = self.depth(to)?;
    if end < start {
      return Err(Error::InvalidTarget(format!(
        "{} is not a descendant of {}",
        to.unwrap_or("base"),
        from.unwrap_or("base")
      )));
    }
    Ok(self.ordered[start..end].to_vec())
  }

  /// Resolve `target` relative to the applied revision `current`.
  pub fn resolve(&self, target: &Target, current: Option<&str>) -> Result<Option<&'static str>> {
    match target {
      Target::Head => Ok(self.head()),
      Target::Base => Ok(None),
      Target::Revision(id) => self.get(id).map(|r| Some(r.id)),
      Target::Relative(steps) => {
        let depth = self.depth(current)? as i64 + steps;
        if depth < 0 || depth > self.ordered.len() as i64 {
          return Err(Error::InvalidTarget(format!(
            "relative step {steps:+} from {} leaves the chain",
            current.unwrap_or("base")
          )));
        }
        Ok(self.at_depth(depth as usize))
      }
    }
  }

  /// Revisions to run forward to move from `current` to `target`.
  pub fn upgrade_path(&self, current: Option<&str>, target: &Target) -> Result<Vec<Revision>> {
    let dest = self.resolve(target, current)?;
    if self.depth(dest)? < self.depth(current)? {
      return Err(Error::InvalidTarget(format!(
        "{target} is behind the current revision {}; use downgrade",
        current.unwrap_or("base")
      )));
    }
    self.chain(current, dest)
  }

  /// Revisions to run in reverse to move from `current` back to `target`,
  /// head-most first.
  pub fn downgrade_path(&self, current: Option<&str>, target: &Target) -> Result<Vec<Revision>> {
    let dest = self.resolve(target, current)?;
    if self.depth(dest)? > self.depth(current)? {
      return Err(Error::InvalidTarget(format!(
        "{target} is ahead of the current revision {}; use upgrade",
        current.unwrap_or("base")
      )));
    }
    let mut path = self.chain(dest, current)?;
    path.reverse();
    Ok(path)
  }
}

// ─── Targets ─────────────────────────────────────────────────────────────────

/// A migration destination as written on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
  Head,
  Base,
  Revision(String),
  /// `+N` / `-N` steps from the applied revision.
  Relative(i64),
}

impl FromStr for Target {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let s = s.trim();
    match s {
      "" => Err(Error::InvalidTarget("empty target".into())),
      "head" | "heads" => Ok(Self::Head),
      "base" => Ok(Self::Base),
      _ if s.starts_with('+') || s.starts_with('-') => s
        .parse::<i64>()
        .map(Self::Relative)
        .map_err(|_| Error::InvalidTarget(format!("bad relative step {s:?}"))),
      _ => Ok(Self::Revision(s.to_owned())),
    }
  }
}

impl fmt::Display for Target {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Head => f.write_str("head"),
      Self::Base => f.write_str("base"),
      Self::Revision(id) => f.write_str(id),
      Self::Relative(n) => write!(f, "{n:+}"),
    }
  }
}
