//! The sequential revision-classification driver.
//!
//! The [`RevisionAnalyzer`] walks the collected history in strictly
//! increasing revision order. For each revision it:
//!
//! 1. Classifies the owning branch (least-frequently-touched branch wins,
//!    ties broken by branch name ascending).
//! 2. Marks the revision spurious when nothing actually changed.
//! 3. Re-parents the branch lineage across spurious predecessors.
//! 4. Accumulates merge evidence (explicit merge refs intersected with
//!    content-identity alternatives) into a [`BranchRange`].
//! 5. Emits a merge directive for the best candidate, or records the
//!    revision as ambiguous when the evidence is contradictory.
//!
//! Classification, spurious detection, and reparenting for revision R depend
//! on state built from all revisions < R, so the loop order is load-bearing.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{debug, warn};

use crate::branch::{self, NONEXISTENT_BRANCH};
use crate::errors::AnalysisError;
use crate::filemap::{self, FileMap};
use crate::lookup::CandidateLookup;
use crate::models::{AnalysisReport, Directive, HistoryDump};
use crate::range::BranchRange;

// ---------------------------------------------------------------------------
// Run state
// ---------------------------------------------------------------------------

/// Mutable state accumulated over one analysis run.
///
/// Owned exclusively by the analyzer; built up monotonically revision by
/// revision and discarded at the end of the run.
#[derive(Debug, Default)]
struct RunState {
    /// Per-branch list of revisions seen so far, in order.
    branch_revs: BTreeMap<String, Vec<i64>>,
    /// Revisions whose declared changes produced no content change.
    spurious: HashSet<i64>,
    /// Branch assigned to each processed revision.
    rev_branches: HashMap<i64, String>,
}

// ---------------------------------------------------------------------------
// Analyzer
// ---------------------------------------------------------------------------

/// One-shot topology analyzer over a [`HistoryDump`].
pub struct RevisionAnalyzer<'a> {
    dump: &'a HistoryDump,
    file_map: FileMap,
    state: RunState,
}

impl<'a> RevisionAnalyzer<'a> {
    pub fn new(dump: &'a HistoryDump) -> Self {
        Self {
            dump,
            file_map: filemap::build_for(dump),
            state: RunState::default(),
        }
    }

    /// Run the full batch pass and produce the directive stream.
    ///
    /// Deterministic: identical inputs always yield the identical ordered
    /// stream. Structural and ordering violations abort the run.
    pub fn analyze(mut self) -> Result<AnalysisReport, AnalysisError> {
        if self.dump.commits.len() != self.dump.merges.len() {
            return Err(AnalysisError::structural(format!(
                "commits ({}) and merges ({}) differ in length",
                self.dump.commits.len(),
                self.dump.merges.len()
            )));
        }

        let mut report = AnalysisReport::default();
        for rev in 0..self.dump.max_rev() {
            self.analyze_revision(rev, &mut report)?;
        }
        debug!(
            revisions = self.state.rev_branches.len(),
            branches = self.state.branch_revs.len(),
            directives = report.directives.len(),
            ambiguous = report.ambiguous.len(),
            spurious = report.spurious.len(),
            "analysis complete"
        );
        Ok(report)
    }

    fn analyze_revision(
        &mut self,
        rev: i64,
        report: &mut AnalysisReport,
    ) -> Result<(), AnalysisError> {
        // 1. Classify the owning branch.
        let branch = self.classify_revision(rev)?;
        self.state.rev_branches.insert(rev, branch.clone());
        let my_revs = self.state.branch_revs.entry(branch.clone()).or_default();
        my_revs.push(rev);

        // 2. Spurious check: nothing actually changed.
        if self.file_map.changed_in(rev).next().is_none() {
            debug!(%branch, rev, "spurious revision");
            self.state.spurious.insert(rev);
            report.spurious.push(rev);
            return Ok(());
        }

        // 3. Re-parent across spurious predecessors on this branch.
        let mut dropped = false;
        while my_revs.len() > 1 && self.state.spurious.contains(&my_revs[my_revs.len() - 2]) {
            my_revs.remove(my_revs.len() - 2);
            dropped = true;
        }
        if dropped {
            if my_revs.len() > 1 {
                let predecessor = my_revs[my_revs.len() - 2];
                debug!(rev, predecessor, "reparenting");
                report.directives.push(Directive::Reparent {
                    predecessor,
                    revision: rev,
                });
            } else {
                // Every predecessor on this branch was spurious; there is
                // nothing left to reparent onto.
                warn!(%branch, rev, "dropped spurious predecessors but no parent remains");
            }
        }

        // 4. Accumulate merge evidence.
        let lookup = CandidateLookup::new(&self.file_map.breakpoints, &self.state.branch_revs);
        let mut range = BranchRange::All;

        for mref in &self.dump.merges[rev as usize] {
            if let Some(r) = lookup.resolve(&mref.path, mref.revision, &branch, rev)? {
                range = range.intersect(&r);
            }
        }

        for path in self.file_map.changed_in(rev) {
            let key = (path.to_string(), rev);
            let Some(predecessors) = self.file_map.identical.get(&key) else {
                continue;
            };
            // Union the alternative origins of this copied content, then
            // intersect the combined constraint into the overall range.
            let mut path_range = BranchRange::None;
            for (pred_path, pred_rev) in predecessors {
                match lookup.resolve(pred_path, *pred_rev, &branch, rev)? {
                    Some(r) => path_range = path_range.union(&r),
                    // A pre-existing same-branch copy explains the content
                    // without constraining anything.
                    None => path_range = BranchRange::All,
                }
            }
            range = range.intersect(&path_range);
        }

        // 5. Decide.
        match range {
            BranchRange::All => {} // no evidence of a merge
            range => match range.choose_best(&branch) {
                Some((source_branch, source_rev)) => {
                    debug!(rev, %branch, %source_branch, source_rev, "merge target");
                    report.directives.push(Directive::Merge {
                        source: source_rev,
                        revision: rev,
                    });
                }
                None => {
                    warn!(rev, %branch, "ambiguous merge evidence, no directive");
                    report.ambiguous.push(rev);
                }
            },
        }

        Ok(())
    }

    /// Pick the owning branch for a revision: tally every touched branch
    /// over the union of actually-changed paths and tracked commit paths,
    /// then take the least-frequent one (ties by name ascending). The
    /// low-count rule isolates the owning branch when a commit also
    /// incidentally touches the destination paths of a copy or tag.
    fn classify_revision(&self, rev: i64) -> Result<String, AnalysisError> {
        let mut touched: HashSet<&str> = self.file_map.changed_in(rev).collect();
        for path in &self.dump.commits[rev as usize] {
            if self.file_map.is_tracked(path) {
                touched.insert(path.as_str());
            }
        }

        let mut tallies: BTreeMap<String, usize> = BTreeMap::new();
        for path in touched {
            *tallies.entry(branch::classify(path)?).or_insert(0) += 1;
        }

        Ok(tallies
            .into_iter()
            .min_by(|a, b| (a.1, &a.0).cmp(&(b.1, &b.0)))
            .map(|(branch, _)| branch)
            .unwrap_or_else(|| NONEXISTENT_BRANCH.to_string()))
    }
}

/// Analyze a dump in one call.
pub fn analyze(dump: &HistoryDump) -> Result<AnalysisReport, AnalysisError> {
    RevisionAnalyzer::new(dump).analyze()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentTransition, MergeRef};

    struct DumpBuilder {
        dump: HistoryDump,
    }

    impl DumpBuilder {
        fn new(revisions: usize) -> Self {
            Self {
                dump: HistoryDump {
                    commits: vec![Vec::new(); revisions],
                    merges: vec![Vec::new(); revisions],
                    path_histories: BTreeMap::new(),
                },
            }
        }

        fn commit(mut self, rev: i64, paths: &[&str]) -> Self {
            self.dump.commits[rev as usize] = paths.iter().map(|p| p.to_string()).collect();
            self
        }

        fn merge_ref(mut self, rev: i64, path: &str, source_rev: i64) -> Self {
            self.dump.merges[rev as usize].push(MergeRef {
                path: path.to_string(),
                revision: source_rev,
            });
            self
        }

        fn history(mut self, path: &str, transitions: &[(i64, Option<u64>)]) -> Self {
            self.dump.path_histories.insert(
                path.to_string(),
                transitions
                    .iter()
                    .map(|&(revision, content)| ContentTransition { revision, content })
                    .collect(),
            );
            self
        }

        fn build(self) -> HistoryDump {
            self.dump
        }
    }

    #[test]
    fn test_linear_history_emits_nothing() {
        // Scenario: single branch, no merges, no duplicate content.
        let dump = DumpBuilder::new(4)
            .commit(1, &["/trunk/a"])
            .commit(2, &["/trunk/a"])
            .commit(3, &["/trunk/b"])
            .history("/trunk/a", &[(1, Some(1)), (2, Some(2))])
            .history("/trunk/b", &[(3, Some(3))])
            .build();

        let report = analyze(&dump).unwrap();
        assert!(report.directives.is_empty());
        assert!(report.ambiguous.is_empty());
    }

    #[test]
    fn test_identical_content_emits_merge() {
        // Scenario: r3's tag content is byte-identical to trunk content
        // first seen at r1; no explicit merge metadata.
        let dump = DumpBuilder::new(4)
            .commit(1, &["/trunk/a"])
            .commit(2, &["/trunk/b"])
            .commit(3, &["/tags/v1/a"])
            .history("/trunk/a", &[(1, Some(7))])
            .history("/trunk/b", &[(2, Some(8))])
            .history("/tags/v1/a", &[(3, Some(7))])
            .build();

        let report = analyze(&dump).unwrap();
        assert_eq!(
            report.directives,
            vec![Directive::Merge {
                source: 1,
                revision: 3
            }]
        );
    }

    #[test]
    fn test_explicit_merge_ref_emits_merge() {
        let dump = DumpBuilder::new(5)
            .commit(1, &["/trunk/a"])
            .commit(2, &["/branches/foo/a"])
            .commit(3, &["/branches/foo/a"])
            .commit(4, &["/trunk/a"])
            .merge_ref(4, "/branches/foo/a", 3)
            .history("/trunk/a", &[(1, Some(1)), (4, Some(4))])
            .history("/branches/foo/a", &[(2, Some(2)), (3, Some(3))])
            .build();

        let report = analyze(&dump).unwrap();
        // /branches/foo/a's window containing r3 is [3, 5).
        assert_eq!(
            report.directives,
            vec![Directive::Merge {
                source: 3,
                revision: 4
            }]
        );
    }

    #[test]
    fn test_contradictory_evidence_is_ambiguous() {
        // Scenario: r4 declares a merge from branches/foo but its content is
        // identical to closed-out trunk content; the two constraints share
        // no branch, so the intersection is impossible.
        let dump = DumpBuilder::new(5)
            .commit(1, &["/trunk/a"])
            .commit(2, &["/trunk/a"])
            .commit(3, &["/branches/foo/b"])
            .commit(4, &["/tags/v1/a"])
            .merge_ref(4, "/branches/foo/b", 3)
            .history("/trunk/a", &[(1, Some(7)), (2, Some(9))])
            .history("/branches/foo/b", &[(3, Some(3))])
            .history("/tags/v1/a", &[(4, Some(7))])
            .build();

        let report = analyze(&dump).unwrap();
        assert!(report.directives.is_empty());
        assert_eq!(report.ambiguous, vec![4]);
    }

    #[test]
    fn test_spurious_revision_triggers_reparent() {
        // Scenario: r2 changes nothing despite its commit list; r3 on the
        // same branch must be reparented onto r1.
        let dump = DumpBuilder::new(4)
            .commit(1, &["/trunk/a"])
            .commit(2, &["/trunk/a"])
            .commit(3, &["/trunk/b"])
            .history("/trunk/a", &[(1, Some(1))])
            .history("/trunk/b", &[(3, Some(3))])
            .build();

        let report = analyze(&dump).unwrap();
        assert_eq!(report.spurious, vec![0, 2]);
        assert!(report
            .directives
            .contains(&Directive::Reparent {
                predecessor: 1,
                revision: 3
            }));
    }

    #[test]
    fn test_reparent_skips_chain_of_spurious_revisions() {
        let dump = DumpBuilder::new(6)
            .commit(1, &["/trunk/a"])
            .commit(2, &["/trunk/a"])
            .commit(3, &["/trunk/a"])
            .commit(4, &["/trunk/a"])
            .commit(5, &["/trunk/b"])
            .history("/trunk/a", &[(1, Some(1)), (4, Some(4))])
            .history("/trunk/b", &[(5, Some(5))])
            .build();

        let report = analyze(&dump).unwrap();
        // r2 and r3 are spurious; r4 reparents onto r1.
        assert_eq!(report.spurious, vec![0, 2, 3]);
        assert_eq!(
            report.directives,
            vec![Directive::Reparent {
                predecessor: 1,
                revision: 4
            }]
        );
    }

    #[test]
    fn test_least_frequent_branch_owns_the_revision() {
        // A copy commit touches one branch path and many destination tag
        // paths; the single-path branch owns the revision.
        let dump = DumpBuilder::new(3)
            .commit(1, &["/trunk/a", "/trunk/b"])
            .commit(2, &["/trunk/a", "/tags/v1/a", "/tags/v1/b"])
            .history("/trunk/a", &[(1, Some(1)), (2, Some(9))])
            .history("/trunk/b", &[(1, Some(2))])
            .history("/tags/v1/a", &[(2, Some(3))])
            .history("/tags/v1/b", &[(2, Some(4))])
            .build();

        let analyzer = RevisionAnalyzer::new(&dump);
        assert_eq!(analyzer.classify_revision(2).unwrap(), "trunk");
    }

    #[test]
    fn test_classification_ties_break_by_name() {
        let dump = DumpBuilder::new(2)
            .commit(1, &["/branches/zeta/a", "/branches/alpha/a"])
            .history("/branches/zeta/a", &[(1, Some(1))])
            .history("/branches/alpha/a", &[(1, Some(2))])
            .build();

        let analyzer = RevisionAnalyzer::new(&dump);
        assert_eq!(
            analyzer.classify_revision(1).unwrap(),
            "branches/alpha"
        );
    }

    #[test]
    fn test_empty_revision_gets_sentinel_branch() {
        let dump = DumpBuilder::new(1).build();
        let analyzer = RevisionAnalyzer::new(&dump);
        assert_eq!(
            analyzer.classify_revision(0).unwrap(),
            NONEXISTENT_BRANCH
        );
    }

    #[test]
    fn test_preexisting_copy_contributes_no_constraint() {
        // r3 re-introduces content identical to a still-open window on its
        // own branch: the copied evidence is explained locally, so no merge.
        let dump = DumpBuilder::new(4)
            .commit(1, &["/trunk/a"])
            .commit(2, &["/trunk/c"])
            .commit(3, &["/trunk/b"])
            .history("/trunk/a", &[(1, Some(7))])
            .history("/trunk/c", &[(2, Some(5))])
            .history("/trunk/b", &[(3, Some(7))])
            .build();

        let report = analyze(&dump).unwrap();
        assert!(report.directives.is_empty());
        assert!(report.ambiguous.is_empty());
    }

    #[test]
    fn test_mismatched_artifact_lengths_are_fatal() {
        let mut dump = DumpBuilder::new(3).build();
        dump.merges.pop();
        let err = analyze(&dump).unwrap_err();
        assert!(matches!(err, AnalysisError::StructuralViolation { .. }));
    }

    #[test]
    fn test_ordering_violation_aborts_the_run() {
        // Evidence window for the merge ref starts after the target.
        let dump = DumpBuilder::new(4)
            .commit(1, &["/trunk/a"])
            .commit(2, &["/branches/foo/a"])
            .merge_ref(1, "/branches/foo/a", 2)
            .history("/trunk/a", &[(1, Some(1))])
            .history("/branches/foo/a", &[(2, Some(2))])
            .build();

        let err = analyze(&dump).unwrap_err();
        assert!(matches!(err, AnalysisError::OrderingViolation { .. }));
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let dump = DumpBuilder::new(6)
            .commit(1, &["/trunk/a", "/trunk/b"])
            .commit(2, &["/branches/foo/a"])
            .commit(3, &["/trunk/a"])
            .commit(4, &["/tags/v1/a", "/tags/v1/b"])
            .commit(5, &["/trunk/b"])
            .merge_ref(3, "/branches/foo/a", 2)
            .history("/trunk/a", &[(1, Some(1)), (3, Some(6))])
            .history("/trunk/b", &[(1, Some(2)), (5, Some(7))])
            .history("/branches/foo/a", &[(2, Some(3))])
            .history("/tags/v1/a", &[(4, Some(1))])
            .history("/tags/v1/b", &[(4, Some(2))])
            .build();

        let a = analyze(&dump).unwrap();
        let b = analyze(&dump).unwrap();
        assert_eq!(a.render(), b.render());
    }
}
