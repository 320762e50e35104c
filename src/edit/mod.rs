//! Bulk editing
//!
//! A selection is exported as a YAML list holding the editable fields of each
//! object ([`dump`]), changed by hand or in an editor, and written back with
//! [`apply`]. Every entry carries the revision it was taken at; an entry whose
//! object changed on the server in the meantime is skipped and reported
//! instead of overwriting the newer state.
//!
//! ```text
//! Selected -> Snapshotted -> (edited) -> Applied | PartiallyApplied | Aborted
//! ```

mod apply;
mod error;
mod schema;
mod snapshot;

pub use apply::{Applied, ApplyReport, Conflict, ConflictKind, apply};
pub use error::{EditError, Violation};
pub use schema::{EditSchema, FieldRule, PROPERTY_KEYS};
pub use snapshot::{EditSnapshot, dump, edit_order, entry_id, entry_revision};

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::SystemTime;

use tracing::{debug, info};

use crate::api::{ObjectKind, Remote, Summary};

/// Fallback editor on Debian-style systems
pub const SYSTEM_EDITOR: &str = "/usr/bin/editor";

/// Dump to `path`, let `edit` change the file, and apply the result
///
/// Returns `Ok(None)` when the file's modification time did not change, in
/// which case nothing is sent to the server.
///
/// # Errors
/// Returns `EditError` from writing the file, the edit step, or [`apply`].
pub fn edit_file<F>(
    remote: &dyn Remote,
    kind: ObjectKind,
    items: &[Summary],
    schema: &EditSchema,
    path: &Path,
    edit: F,
) -> Result<Option<ApplyReport>, EditError>
where
    F: FnOnce(&Path) -> Result<(), EditError>,
{
    dump(remote, kind, items, schema)?.write_to(path)?;
    let before = modified(path)?;
    edit(path)?;
    if modified(path)? == before {
        info!(path = %path.display(), "edit file unchanged; nothing to apply");
        return Ok(None);
    }
    let edited = EditSnapshot::read_from(path)?;
    apply(remote, kind, items, &edited, schema).map(Some)
}

fn modified(path: &Path) -> Result<SystemTime, EditError> {
    Ok(fs::metadata(path)?.modified()?)
}

/// Pick the editor: configured, then `$EDITOR`, then [`SYSTEM_EDITOR`]
///
/// The first candidate that is set is checked; `None` if it is not an
/// executable file.
#[must_use]
pub fn find_editor(configured: Option<&str>) -> Option<PathBuf> {
    let candidate = configured
        .map(str::to_string)
        .or_else(|| env::var("EDITOR").ok().filter(|e| !e.trim().is_empty()))
        .unwrap_or_else(|| SYSTEM_EDITOR.to_string());
    let resolved = resolve_program(&candidate);
    if resolved.is_none() {
        debug!(editor = %candidate, "editor is not executable");
    }
    resolved
}

fn resolve_program(program: &str) -> Option<PathBuf> {
    let path = Path::new(program);
    if path.components().count() > 1 {
        return is_executable(path).then(|| path.to_path_buf());
    }
    env::var_os("PATH").and_then(|dirs| {
        env::split_paths(&dirs)
            .map(|dir| dir.join(program))
            .find(|p| is_executable(p))
    })
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path).is_ok_and(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Run `editor` on `path` and wait for it to exit
///
/// # Errors
/// Returns `EditError::EditorFailed` if the editor cannot be started or exits
/// unsuccessfully.
pub fn launch_editor(editor: &Path, path: &Path) -> Result<(), EditError> {
    debug!(editor = %editor.display(), file = %path.display(), "launching editor");
    let status = Command::new(editor)
        .arg(path)
        .status()
        .map_err(|e| EditError::EditorFailed(format!("Failed to launch editor: {e}")))?;
    if !status.success() {
        return Err(EditError::EditorFailed(format!(
            "Editor exited with status: {status}"
        )));
    }
    Ok(())
}
