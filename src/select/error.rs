use thiserror::Error;

use crate::api::ObjectKind;

/// Errors produced while turning user selectors into server objects
#[derive(Debug, Error)]
pub enum SelectError {
    /// No selectors and no narrowing filter: refusing to select everything
    #[error("Refusing to select every {kind}: specify names or filter criteria")]
    SafetyAbort { kind: ObjectKind },

    /// An exact name or id matched nothing
    #[error("{kind} {selector} not found")]
    NotFound { kind: ObjectKind, selector: String },

    /// Selector could not be compiled as a regular expression
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Malformed `--match-date` value
    #[error("Invalid date format '{0}': expected YYYY-MM-DD or YYYY-MM-DD:YYYY-MM-DD")]
    InvalidDate(String),
}

impl SelectError {
    #[must_use]
    pub fn not_found(kind: ObjectKind, selector: &str) -> Self {
        Self::NotFound {
            kind,
            selector: selector.to_string(),
        }
    }

    /// Whether this is the bulk-selection safety refusal
    #[must_use]
    pub const fn is_safety_abort(&self) -> bool {
        matches!(self, Self::SafetyAbort { .. })
    }
}
