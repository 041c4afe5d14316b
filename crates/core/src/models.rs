//! Domain model types used throughout svntopo.
//!
//! These types bridge the artifact loader, the inference engine, and the
//! directive output written for the downstream rewriting tool.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Collected history artifacts
// ---------------------------------------------------------------------------

/// An explicit merge source declared in the SVN log for a revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRef {
    /// Canonical source path (leading `/`).
    pub path: String,
    /// Source revision the path was merged from.
    pub revision: i64,
}

/// One content transition of a path.
///
/// `content` is an opaque identifier for byte-identical file content:
/// `Some(0)` means the file was empty, `None` means the path was deleted at
/// this revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentTransition {
    pub revision: i64,
    pub content: Option<u64>,
}

/// The three artifacts produced by the out-of-scope collection component.
///
/// - `commits[r]` lists the paths the SVN log reported changed in revision
///   `r` (revision 0 is the collector's empty placeholder commit).
/// - `merges[r]` lists the explicit merge sources reported for revision `r`;
///   always the same outer length as `commits`.
/// - `path_histories` maps each tracked file path to its ordered content
///   transitions, strictly increasing by revision.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryDump {
    pub commits: Vec<Vec<String>>,
    pub merges: Vec<Vec<MergeRef>>,
    pub path_histories: BTreeMap<String, Vec<ContentTransition>>,
}

impl HistoryDump {
    /// Number of revisions covered by the dump.
    pub fn max_rev(&self) -> i64 {
        self.commits.len() as i64
    }
}

// ---------------------------------------------------------------------------
// Directives
// ---------------------------------------------------------------------------

/// A single decision emitted for the downstream rewriting tool.
///
/// The `Display` impl renders the exact line grammar the consumer expects:
/// two integers, each enclosed in angle brackets, separated by a comma,
/// then a space and the literal keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Directive {
    /// Relink `revision`'s lineage to `predecessor`, skipping spurious
    /// revisions in between.
    Reparent { predecessor: i64, revision: i64 },
    /// `revision` merged from `source`.
    Merge { source: i64, revision: i64 },
}

impl std::fmt::Display for Directive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reparent {
                predecessor,
                revision,
            } => write!(f, "<{}>,<{}> reparent", predecessor, revision),
            Self::Merge { source, revision } => {
                write!(f, "<{}>,<{}> merge", source, revision)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Analysis report
// ---------------------------------------------------------------------------

/// Outcome of one full analysis run.
///
/// `directives` is the contractual output, in revision-processing order.
/// The remaining fields are diagnostic observations for callers and tests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Ordered directive stream.
    pub directives: Vec<Directive>,
    /// Revisions whose merge evidence was contradictory (no directive).
    pub ambiguous: Vec<i64>,
    /// Revisions whose declared changes produced no actual content change.
    pub spurious: Vec<i64>,
}

impl AnalysisReport {
    /// Render the contractual directive stream, one line per decision.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for d in &self.directives {
            out.push_str(&d.to_string());
            out.push('\n');
        }
        out
    }
}
