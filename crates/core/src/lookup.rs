//! Resolution of evidence references into branch-range constraints.
//!
//! A `(path, revision)` reference (an explicit merge source, or the earlier
//! half of a content-identity link) resolves to the breakpoint window the
//! referenced revision falls into on the referenced path's branch. A
//! same-branch window still open at the target revision is a pre-existing
//! file, not merge evidence, and yields no constraint.

use std::collections::{BTreeMap, HashMap};

use crate::branch;
use crate::errors::AnalysisError;
use crate::range::BranchRange;

/// Resolves evidence references against the file map and the per-branch
/// revision lists accumulated so far by the analyzer.
pub struct CandidateLookup<'a> {
    breakpoints: &'a HashMap<String, Vec<i64>>,
    branch_revs: &'a BTreeMap<String, Vec<i64>>,
}

impl<'a> CandidateLookup<'a> {
    pub fn new(
        breakpoints: &'a HashMap<String, Vec<i64>>,
        branch_revs: &'a BTreeMap<String, Vec<i64>>,
    ) -> Self {
        Self {
            breakpoints,
            branch_revs,
        }
    }

    /// Resolve the `(path, rev)` reference against the target revision.
    ///
    /// Returns `Ok(None)` when the reference is a pre-existing file on the
    /// target's own branch (no constraint), otherwise the singleton window
    /// containing `rev`. Fails with [`AnalysisError::OrderingViolation`] when
    /// the window starts after the target revision.
    pub fn resolve(
        &self,
        path: &str,
        rev: i64,
        target_branch: &str,
        target_rev: i64,
    ) -> Result<Option<BranchRange>, AnalysisError> {
        static EMPTY: Vec<i64> = Vec::new();

        let ref_branch = branch::classify(path)?;
        // Untracked paths (directories, never-materialized entries) fall back
        // to the target branch's own revision list.
        let table = match self.breakpoints.get(path) {
            Some(breaks) => breaks,
            None => self.branch_revs.get(target_branch).unwrap_or(&EMPTY),
        };

        // Upper-bound search: low is the greatest breakpoint <= rev.
        let idx = table.partition_point(|&b| b <= rev);
        let low = if idx > 0 { table[idx - 1] } else { -1 };
        let high = if idx < table.len() { table[idx] } else { low + 1 };

        if low > target_rev {
            return Err(AnalysisError::OrderingViolation {
                evidence_rev: low,
                target_rev,
            });
        }
        if high >= target_rev && ref_branch == target_branch {
            // Pre-existing file on the same branch, not merge evidence.
            return Ok(None);
        }
        Ok(Some(BranchRange::single(ref_branch, low, high)))
    }
}
