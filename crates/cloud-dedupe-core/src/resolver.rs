use tracing::{info, warn};

use crate::decisions::{Decision, Decisions};
use crate::error::Error;
use crate::model::{DuplicateSet, DuplicateSets, FileRecord};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Keeper-selection rule. A closed enum so an unhandled rule cannot slip
/// through as a silent fallthrough.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    ShortestPath,
    LongestPath,
    Oldest,
    Newest,
    SuffixMatch(String),
}

impl Rule {
    pub fn label(&self) -> &'static str {
        match self {
            Rule::ShortestPath => "shortest path",
            Rule::LongestPath => "longest path",
            Rule::Oldest => "oldest",
            Rule::Newest => "newest",
            Rule::SuffixMatch(_) => "keep suffix",
        }
    }
}

/// Selects exactly one keeper per duplicate set and marks every other member
/// for deletion.
///
/// Deterministic and idempotent: identical sets and rule always produce the
/// identical decision map. Sets are numbered in ascending hash order for log
/// messages. Fails fast with [`Error::MissingSuffix`] when a suffix rule
/// carries an empty suffix.
pub fn resolve(sets: &DuplicateSets, rule: &Rule) -> Result<Decisions, Error> {
    if let Rule::SuffixMatch(suffix) = rule {
        if suffix.trim().is_empty() {
            return Err(Error::MissingSuffix);
        }
    }

    let mut decisions = Decisions::new();
    for (index, set) in sets.values().enumerate() {
        resolve_set(set, index + 1, rule, &mut decisions);
    }
    Ok(decisions)
}

fn resolve_set(set: &DuplicateSet, set_no: usize, rule: &Rule, decisions: &mut Decisions) {
    if set.members.len() < 2 {
        warn!(set = set_no, "malformed duplicate set, leaving decisions unset");
        return;
    }

    let (pool, tie_reason) = candidate_pool(set, set_no, rule);
    let keeper = match select_keeper(&pool, &tie_reason, set_no) {
        Some(keeper) => keeper,
        None => {
            warn!(
                set = set_no,
                rule = rule.label(),
                "rule failed to select a file to keep, leaving decisions unset"
            );
            return;
        }
    };

    let keeper_path = keeper.path.clone();
    for member in &set.members {
        let decision = if member.path == keeper_path {
            Decision::Keep
        } else {
            Decision::Delete
        };
        decisions.set(member.path.clone(), decision);
    }
}

/// Members achieving the rule's primary criterion. When the criterion cannot
/// be evaluated at all (no dates, no suffix match) the pool falls back to the
/// whole set and the tie-break picks the shortest path.
fn candidate_pool<'a>(
    set: &'a DuplicateSet,
    set_no: usize,
    rule: &Rule,
) -> (Vec<&'a FileRecord>, String) {
    match rule {
        Rule::ShortestPath => {
            let min = set.members.iter().map(|m| m.path.len()).min().unwrap_or(0);
            (
                set.members.iter().filter(|m| m.path.len() == min).collect(),
                format!("multiple files share the minimum path length ({min})"),
            )
        }
        Rule::LongestPath => {
            let max = set.members.iter().map(|m| m.path.len()).max().unwrap_or(0);
            (
                set.members.iter().filter(|m| m.path.len() == max).collect(),
                format!("multiple files share the maximum path length ({max})"),
            )
        }
        Rule::Oldest | Rule::Newest => {
            let dated: Vec<&FileRecord> =
                set.members.iter().filter(|m| m.modified.is_some()).collect();
            if dated.is_empty() {
                warn!(
                    set = set_no,
                    rule = rule.label(),
                    "no valid modification dates, falling back to shortest path"
                );
                return (
                    set.members.iter().collect(),
                    "no valid modification dates".to_string(),
                );
            }
            let target = if matches!(rule, Rule::Oldest) {
                dated.iter().filter_map(|m| m.modified).min()
            } else {
                dated.iter().filter_map(|m| m.modified).max()
            };
            let reason = match target {
                Some(ts) => format!(
                    "multiple files share the {} date ({})",
                    rule.label(),
                    ts.format(DATE_FORMAT)
                ),
                None => String::new(),
            };
            (
                dated.into_iter().filter(|m| m.modified == target).collect(),
                reason,
            )
        }
        Rule::SuffixMatch(suffix) => {
            let suffix_lower = suffix.to_lowercase();
            let matching: Vec<&FileRecord> = set
                .members
                .iter()
                .filter(|m| m.path.to_lowercase().ends_with(&suffix_lower))
                .collect();
            if matching.is_empty() {
                warn!(
                    set = set_no,
                    suffix = %suffix,
                    "no files match suffix, falling back to shortest path"
                );
                (
                    set.members.iter().collect(),
                    format!("no files match suffix '{suffix}'"),
                )
            } else {
                (matching, format!("multiple files match suffix '{suffix}'"))
            }
        }
    }
}

/// Tie-break: shortest path, then lexicographic path order. Stable across
/// runs by construction.
fn select_keeper<'a>(
    pool: &[&'a FileRecord],
    reason: &str,
    set_no: usize,
) -> Option<&'a FileRecord> {
    match pool {
        [] => None,
        [only] => Some(*only),
        _ => {
            let winner = pool
                .iter()
                .min_by(|a, b| {
                    a.path
                        .len()
                        .cmp(&b.path.len())
                        .then_with(|| a.path.cmp(&b.path))
                })
                .copied();
            if let Some(winner) = winner {
                info!(
                    set = set_no,
                    kept = %winner.path,
                    candidates = pool.len(),
                    reason,
                    "tie-break: kept shortest path"
                );
            }
            winner
        }
    }
}
