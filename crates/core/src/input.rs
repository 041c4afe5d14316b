//! Loading and shape-checking the collected history artifacts.
//!
//! The collector serializes its three artifacts as one JSON document (see
//! [`HistoryDump`]). Everything here is validated before analysis starts so
//! that shape defects surface as [`InputError`]s with a named location
//! instead of mid-run failures.

use std::path::Path;

use tracing::debug;

use crate::errors::InputError;
use crate::models::HistoryDump;

/// Read and validate a history dump from a JSON file.
pub fn load_dump(path: &Path) -> Result<HistoryDump, InputError> {
    let text = std::fs::read_to_string(path)?;
    let dump: HistoryDump = serde_json::from_str(&text)?;
    validate(&dump)?;
    debug!(
        revisions = dump.commits.len(),
        paths = dump.path_histories.len(),
        "loaded history dump"
    );
    Ok(dump)
}

/// Check the shape invariants of a dump.
///
/// - `commits` and `merges` have the same outer length;
/// - every path is canonical (leading `/`);
/// - every path history is strictly increasing by revision, with revisions
///   inside `0..max_rev`.
pub fn validate(dump: &HistoryDump) -> Result<(), InputError> {
    if dump.commits.len() != dump.merges.len() {
        return Err(InputError::InvalidShape(format!(
            "commits ({}) and merges ({}) differ in length",
            dump.commits.len(),
            dump.merges.len()
        )));
    }

    let max_rev = dump.max_rev();
    for (path, transitions) in &dump.path_histories {
        if !path.starts_with('/') {
            return Err(InputError::InvalidShape(format!(
                "path '{}' does not start with '/'",
                path
            )));
        }
        let mut prev = -1;
        for t in transitions {
            if t.revision <= prev {
                return Err(InputError::InvalidShape(format!(
                    "history of '{}' is not strictly increasing at r{}",
                    path, t.revision
                )));
            }
            if t.revision < 0 || t.revision >= max_rev {
                return Err(InputError::InvalidShape(format!(
                    "history of '{}' references r{} outside 0..{}",
                    path, t.revision, max_rev
                )));
            }
            prev = t.revision;
        }
    }
    Ok(())
}
