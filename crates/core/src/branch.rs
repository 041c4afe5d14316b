//! Branch classification from SVN filesystem paths.
//!
//! The derived key does not have to match a real branch name; it only has to
//! identify different branches consistently based on path structure, so that
//! all per-path lookups group the same way.

use crate::errors::AnalysisError;

/// Branch key assigned when a revision touches nothing classifiable.
pub const NONEXISTENT_BRANCH: &str = "<nonexistent>";

/// The branch key used for trunk (and wiki, which shadows trunk).
pub const TRUNK: &str = "trunk";

/// Derive the branch key for a canonical path.
///
/// Rules:
/// - the path must start with `/`, otherwise this is a fatal
///   [`AnalysisError::StructuralViolation`];
/// - `/tags/<x>/...` and `/branches/<x>/...` each map to their own
///   two-level key (`tags/<x>`, `branches/<x>`), so every tag or branch
///   subdirectory is a distinct branch;
/// - `/wiki/...` maps to `trunk`;
/// - anything else maps to its first component.
pub fn classify(path: &str) -> Result<String, AnalysisError> {
    let rest = path.strip_prefix('/').ok_or_else(|| {
        AnalysisError::structural(format!("path '{}' does not start with '/'", path))
    })?;
    let mut parts = rest.splitn(3, '/');
    let first = parts.next().unwrap_or("");
    let second = parts.next().unwrap_or("");

    Ok(match first {
        "tags" | "branches" => {
            if second.is_empty() {
                first.to_string()
            } else {
                format!("{}/{}", first, second)
            }
        }
        "wiki" => TRUNK.to_string(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trunk_paths() {
        assert_eq!(classify("/trunk/lib.txt").unwrap(), "trunk");
        assert_eq!(classify("/trunk/deep/nested/file.rs").unwrap(), "trunk");
        assert_eq!(classify("/trunk").unwrap(), "trunk");
    }

    #[test]
    fn test_tags_and_branches_get_two_level_keys() {
        assert_eq!(classify("/tags/v1/lib.txt").unwrap(), "tags/v1");
        assert_eq!(classify("/tags/v2").unwrap(), "tags/v2");
        assert_eq!(classify("/branches/foo/src/a.rs").unwrap(), "branches/foo");
        // Distinct subdirectories are distinct branches.
        assert_ne!(
            classify("/branches/foo/a").unwrap(),
            classify("/branches/bar/a").unwrap()
        );
    }

    #[test]
    fn test_wiki_maps_to_trunk() {
        assert_eq!(classify("/wiki/Home.md").unwrap(), "trunk");
    }

    #[test]
    fn test_other_top_levels_are_their_own_branch() {
        assert_eq!(classify("/site/index.html").unwrap(), "site");
    }

    #[test]
    fn test_classification_is_stable() {
        let a = classify("/branches/rel-1.2/src/main.c").unwrap();
        let b = classify("/branches/rel-1.2/src/main.c").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_missing_root_separator_is_fatal() {
        let err = classify("trunk/lib.txt").unwrap_err();
        assert!(matches!(err, AnalysisError::StructuralViolation { .. }));
        assert!(classify("").is_err());
    }

    #[test]
    fn test_tagsish_prefix_is_not_tags() {
        // Equality on the component, not substring matching.
        assert_eq!(classify("/tagsarchive/a.txt").unwrap(), "tagsarchive");
        assert_eq!(classify("/wikis/a.txt").unwrap(), "wikis");
    }
}
