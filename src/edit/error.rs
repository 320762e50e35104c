use thiserror::Error;

use super::apply::ApplyReport;
use crate::api::{ApiError, ObjectKind};

/// Ways an edited snapshot can fail to describe the original selection
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("expected a list of entries")]
    NotAList,

    #[error("entry {position} is not a mapping")]
    NotAnEntry { position: usize },

    #[error("found {found} entries but {expected} objects were selected; adding or removing entries is not supported")]
    CountMismatch { found: usize, expected: usize },

    #[error("entry {position} sets field '{field}', which is not editable")]
    UndeclaredField { position: usize, field: String },

    #[error("entry {position} field '{field}' must be a mapping")]
    NotAMapping { position: usize, field: String },
}

/// Errors from dumping or applying a bulk edit
#[derive(Debug, Error)]
pub enum EditError {
    /// The snapshot does not match the schema or the selection; nothing was written
    #[error("Invalid edit file: {0}")]
    SchemaViolation(#[from] Violation),

    /// Applying stopped part way through; `report` holds what was written and
    /// skipped before position `position`
    #[error("Failed to update {kind} {position} ({title}): {source} ({} already applied)", .report.applied.len())]
    Interrupted {
        kind: ObjectKind,
        position: usize,
        title: String,
        report: ApplyReport,
        #[source]
        source: ApiError,
    },

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Failed to parse edit file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Editor failed: {0}")]
    EditorFailed(String),
}
