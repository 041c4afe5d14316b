//! The branch-range interval algebra.
//!
//! A [`BranchRange`] describes the set of places a piece of file content
//! could have come from, as half-open `(branch, low, high)` revision windows.
//! Two sentinels complete the algebra: [`BranchRange::All`] (no constraint,
//! identity for intersection and absorbing for union) and
//! [`BranchRange::None`] (impossible, absorbing for intersection and identity
//! for union).
//!
//! Intersection combines corroborating evidence: every source must agree on
//! an origin window. Union combines alternative equally-valid origins for one
//! piece of copied evidence before that combined evidence is intersected into
//! the overall range.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

/// One candidate origin window: `branch`, revisions `low..high` (half-open,
/// `low < high`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Span {
    pub branch: String,
    pub low: i64,
    pub high: i64,
}

impl Span {
    pub fn new(branch: impl Into<String>, low: i64, high: i64) -> Self {
        Self {
            branch: branch.into(),
            low,
            high,
        }
    }
}

/// The set of possible origins for some merge evidence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchRange {
    /// Unconstrained: the evidence says nothing.
    All,
    /// Impossible: the evidence sources contradict each other.
    None,
    /// A finite, sorted, deduplicated set of candidate windows.
    Spans(Vec<Span>),
}

impl BranchRange {
    /// Build a range from spans, normalizing the empty set to `None`.
    pub fn from_spans(spans: impl IntoIterator<Item = Span>) -> Self {
        let set: BTreeSet<Span> = spans.into_iter().collect();
        if set.is_empty() {
            Self::None
        } else {
            Self::Spans(set.into_iter().collect())
        }
    }

    /// A range holding exactly one window.
    pub fn single(branch: impl Into<String>, low: i64, high: i64) -> Self {
        Self::Spans(vec![Span::new(branch, low, high)])
    }

    /// Intersect two ranges: all evidence sources must agree.
    ///
    /// `All` is the identity, `None` is absorbing. For two span sets, every
    /// pair on the same branch contributes its overlap; empty overlaps are
    /// discarded and an empty result collapses to `None`.
    pub fn intersect(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::All, r) | (r, Self::All) => r.clone(),
            (Self::None, _) | (_, Self::None) => Self::None,
            (Self::Spans(a), Self::Spans(b)) => {
                let mut out = BTreeSet::new();
                for sa in a {
                    for sb in b {
                        if sa.branch != sb.branch {
                            continue;
                        }
                        let low = sa.low.max(sb.low);
                        let high = sa.high.min(sb.high);
                        if low < high {
                            out.insert(Span::new(sa.branch.clone(), low, high));
                        }
                    }
                }
                Self::from_spans(out)
            }
        }
    }

    /// Union two ranges: alternative origins for the same evidence.
    ///
    /// `All` is absorbing, `None` is the identity. Within each branch,
    /// touching or overlapping windows are coalesced into one.
    pub fn union(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::All, _) | (_, Self::All) => Self::All,
            (Self::None, r) | (r, Self::None) => r.clone(),
            (Self::Spans(a), Self::Spans(b)) => {
                let mut by_branch: BTreeMap<&str, Vec<(i64, i64)>> = BTreeMap::new();
                for s in a.iter().chain(b.iter()) {
                    by_branch.entry(&s.branch).or_default().push((s.low, s.high));
                }
                let mut out = Vec::new();
                for (branch, mut windows) in by_branch {
                    windows.sort_unstable();
                    let mut merged: Vec<(i64, i64)> = Vec::with_capacity(windows.len());
                    for (low, high) in windows {
                        match merged.last_mut() {
                            Some(prev) if low <= prev.1 => prev.1 = prev.1.max(high),
                            _ => merged.push((low, high)),
                        }
                    }
                    out.extend(
                        merged
                            .into_iter()
                            .map(|(low, high)| Span::new(branch, low, high)),
                    );
                }
                Self::from_spans(out)
            }
        }
    }

    /// Pick the single most plausible `(branch, low)` origin out of a range.
    ///
    /// With more than one candidate window the preference order is: windows
    /// on `own_branch`, else windows on `trunk`, else all of them; the
    /// survivors are ordered by `(branch, low)` and the last one wins. This
    /// tie-break is a behavioral contract inherited from the original
    /// analysis and must not be reinterpreted.
    pub fn choose_best(&self, own_branch: &str) -> Option<(String, i64)> {
        let spans = match self {
            Self::Spans(spans) => spans,
            Self::All | Self::None => return None,
        };
        if spans.len() == 1 {
            let s = &spans[0];
            return Some((s.branch.clone(), s.low));
        }
        let mut candidates: Vec<&Span> = spans.iter().filter(|s| s.branch == own_branch).collect();
        if candidates.is_empty() {
            candidates = spans.iter().filter(|s| s.branch == "trunk").collect();
        }
        if candidates.is_empty() {
            candidates = spans.iter().collect();
        }
        candidates.sort_by(|a, b| (&a.branch, a.low).cmp(&(&b.branch, b.low)));
        candidates.last().map(|s| (s.branch.clone(), s.low))
    }
}
