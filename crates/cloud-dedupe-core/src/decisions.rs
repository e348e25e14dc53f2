use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::model::DuplicateSet;

/// Per-file action inside a duplicate set. There is no "undecided" state:
/// after a resolve every member carries one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Keep,
    Delete,
}

/// Result of a manual toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The file is now kept; the set's previous keeper (if any) was demoted.
    Promoted { demoted: Option<String> },
    /// The file was demoted to Delete (only possible while the set still has
    /// another keeper).
    Demoted,
    /// Demoting was refused: the file is the only Keep left in its set.
    RejectedLastKeep,
    /// The path is not a member of the given set; nothing changed.
    NotAMember,
}

/// Keep/Delete decisions keyed by path. Produced by the resolver, mutated
/// only through [`Decisions::toggle`], and rebuilt from scratch on every new
/// scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decisions {
    by_path: BTreeMap<String, Decision>,
}

impl Decisions {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set(&mut self, path: impl Into<String>, decision: Decision) {
        self.by_path.insert(path.into(), decision);
    }

    pub fn get(&self, path: &str) -> Option<Decision> {
        self.by_path.get(path).copied()
    }

    pub fn is_keep(&self, path: &str) -> bool {
        self.get(path) == Some(Decision::Keep)
    }

    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Decision)> {
        self.by_path.iter()
    }

    /// Paths currently marked Delete, in path order.
    pub fn deletions(&self) -> Vec<String> {
        self.by_path
            .iter()
            .filter(|(_, d)| **d == Decision::Delete)
            .map(|(path, _)| path.clone())
            .collect()
    }

    pub fn keep_count_in(&self, set: &DuplicateSet) -> usize {
        set.members.iter().filter(|m| self.is_keep(&m.path)).count()
    }

    /// Flips one file's action while preserving the one-keeper invariant:
    /// promoting a file demotes the set's current keeper; demoting the sole
    /// keeper is refused.
    pub fn toggle(&mut self, set: &DuplicateSet, path: &str) -> ToggleOutcome {
        if !set.contains(path) {
            warn!(path, hash = %set.content_hash, "toggle target is not a member of the set");
            return ToggleOutcome::NotAMember;
        }

        match self.get(path) {
            Some(Decision::Keep) => {
                if self.keep_count_in(set) <= 1 {
                    info!(path, "cannot mark for deletion: only kept file in its set");
                    ToggleOutcome::RejectedLastKeep
                } else {
                    self.set(path, Decision::Delete);
                    ToggleOutcome::Demoted
                }
            }
            _ => {
                let demoted = set
                    .members
                    .iter()
                    .map(|m| m.path.as_str())
                    .find(|p| *p != path && self.is_keep(p))
                    .map(|p| p.to_string());
                if let Some(previous) = &demoted {
                    self.set(previous.clone(), Decision::Delete);
                }
                self.set(path, Decision::Keep);
                ToggleOutcome::Promoted { demoted }
            }
        }
    }
}
