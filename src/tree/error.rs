use thiserror::Error;

use crate::api::ApiError;

/// Errors building or hydrating the folder hierarchy
#[derive(Debug, Error)]
pub enum TreeError {
    /// A folder names a parent that is not in the folder list
    #[error("Folder '{folder}' refers to unknown parent folder {parent}")]
    UnknownParent { folder: String, parent: String },

    /// The same folder was reached twice while walking down from the root
    #[error("Folder {0} is its own ancestor; the folder hierarchy contains a cycle")]
    Cycle(String),

    /// Nesting deeper than the walk is willing to follow
    #[error("Folder nesting exceeds {max} levels at folder {folder}")]
    TooDeep { folder: String, max: usize },

    /// Fetching folder contents failed
    #[error(transparent)]
    Api(#[from] ApiError),
}
