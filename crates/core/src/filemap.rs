//! Derived per-path indexes over the collected content-transition history.
//!
//! From the raw `path_histories` artifact this builds:
//! - per-path revision breakpoint tables for binary-search window lookup,
//! - a per-revision index of which tracked paths actually changed,
//! - a content-identity index linking each `(path, revision)` to all earlier
//!   pairs that carried byte-identical (nonzero, non-deleted) content.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::debug;

use crate::models::{ContentTransition, HistoryDump};

/// A `(path, revision)` pair, the unit the content-identity index relates.
pub type PathRev = (String, i64);

/// The derived file map.
#[derive(Debug, Clone, Default)]
pub struct FileMap {
    /// Per-path sorted breakpoints, bounded by `-1` and `max_rev`.
    /// Only paths with a nonempty history are present.
    pub breakpoints: HashMap<String, Vec<i64>>,
    /// Revision -> tracked paths whose content actually changed there.
    pub by_revision: HashMap<i64, BTreeSet<String>>,
    /// `(path, rev)` -> earlier pairs with identical content, ordered by
    /// revision ascending (ties by path).
    pub identical: HashMap<PathRev, Vec<PathRev>>,
}

impl FileMap {
    /// Whether `path` has a tracked content history.
    pub fn is_tracked(&self, path: &str) -> bool {
        self.breakpoints.contains_key(path)
    }

    /// The tracked paths that actually changed in `rev` (empty if none).
    pub fn changed_in(&self, rev: i64) -> impl Iterator<Item = &str> {
        self.by_revision
            .get(&rev)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }
}

/// Build the file map from the raw per-path transition history.
///
/// Pure and deterministic. Cost is linear in total history length, except
/// the identity-group reconciliation which is quadratic in the size of each
/// duplicate-content group (expected small in practice).
pub fn build(
    path_histories: &BTreeMap<String, Vec<ContentTransition>>,
    max_rev: i64,
) -> FileMap {
    let mut map = FileMap::default();
    // Content id -> every (path, rev) that carried that content.
    let mut content_groups: BTreeMap<u64, BTreeSet<(i64, String)>> = BTreeMap::new();

    for (path, transitions) in path_histories {
        if transitions.is_empty() {
            continue;
        }
        let mut breaks = vec![-1, max_rev];
        for t in transitions {
            breaks.push(t.revision);
            map.by_revision
                .entry(t.revision)
                .or_default()
                .insert(path.clone());
            // Empty (0) and deleted (None) content never links paths.
            if let Some(id) = t.content {
                if id != 0 {
                    content_groups
                        .entry(id)
                        .or_default()
                        .insert((t.revision, path.clone()));
                }
            }
        }
        breaks.sort_unstable();
        map.breakpoints.insert(path.clone(), breaks);
    }

    for (id, group) in content_groups {
        if group.len() < 2 {
            continue;
        }
        debug!(content_id = id, size = group.len(), "duplicate content group");
        let members: Vec<PathRev> = group.into_iter().map(|(rev, path)| (path, rev)).collect();
        for i in 1..members.len() {
            map.identical
                .insert(members[i].clone(), members[..i].to_vec());
        }
    }

    map
}

/// Convenience wrapper building the file map for a whole dump.
pub fn build_for(dump: &HistoryDump) -> FileMap {
    build(&dump.path_histories, dump.max_rev())
}
