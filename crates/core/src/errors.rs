//! Error types for the svntopo core library.
//!
//! Each subsystem has its own error type derived with `thiserror`, and a
//! top-level [`CoreError`] enum unifies them all for callers that want a
//! single error type.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Unified error type for the entire core library.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Analysis errors
// ---------------------------------------------------------------------------

/// Fatal errors raised during topology analysis.
///
/// Both variants abort the whole batch: there is no partial-output guarantee
/// once one of these is returned.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A path or input artifact does not have the required structure.
    #[error("structural violation: {detail}")]
    StructuralViolation { detail: String },

    /// A piece of merge evidence points at a revision window that starts
    /// after the revision it is supposed to explain. This indicates an
    /// unsupported topology or a defect in the collected input.
    #[error(
        "ordering violation: evidence window starting at r{evidence_rev} \
         exceeds target r{target_rev}"
    )]
    OrderingViolation { evidence_rev: i64, target_rev: i64 },
}

impl AnalysisError {
    /// Shorthand for a [`AnalysisError::StructuralViolation`].
    pub fn structural(detail: impl Into<String>) -> Self {
        Self::StructuralViolation {
            detail: detail.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Input artifact errors
// ---------------------------------------------------------------------------

/// Errors loading or validating the collected history artifacts.
#[derive(Debug, Error)]
pub enum InputError {
    /// The artifact file could not be read.
    #[error("history dump I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The artifact file is not valid JSON for the expected shape.
    #[error("history dump parse error: {0}")]
    ParseError(#[from] serde_json::Error),

    /// The parsed artifacts violate a shape invariant.
    #[error("invalid history dump: {0}")]
    InvalidShape(String),
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// TOML parse error.
    #[error("configuration parse error: {0}")]
    ParseError(String),

    /// A config value is invalid.
    #[error("invalid configuration value for '{field}': {detail}")]
    InvalidValue { field: String, detail: String },

    /// Generic I/O error reading the config file.
    #[error("configuration I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = AnalysisError::structural("path '\\trunk' does not start with '/'");
        assert!(err.to_string().starts_with("structural violation:"));

        let err = AnalysisError::OrderingViolation {
            evidence_rev: 12,
            target_rev: 7,
        };
        assert_eq!(
            err.to_string(),
            "ordering violation: evidence window starting at r12 exceeds target r7"
        );

        let err = InputError::InvalidShape("commits and merges differ in length".into());
        assert!(err.to_string().contains("commits and merges"));
    }

    #[test]
    fn test_core_error_from_subsystem() {
        let core_err: CoreError = AnalysisError::structural("x").into();
        assert!(matches!(core_err, CoreError::Analysis(_)));

        let core_err: CoreError = InputError::InvalidShape("y".into()).into();
        assert!(matches!(core_err, CoreError::Input(_)));
    }
}
