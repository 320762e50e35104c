//! Print the folder hierarchy

use tracing::debug;

use super::{Context, Result};
use crate::api::ObjectKind;
use crate::{output, tree};

/// Execute the tree command
///
/// # Errors
/// Returns `TrailError::Tree` if the folder structure is inconsistent or a
/// folder cannot be fetched.
pub fn execute(ctx: &Context, long: bool) -> Result<()> {
    let folders = ctx.remote.list_objects(ObjectKind::Folder, true)?;
    let built = tree::build(&folders)?;
    debug!(folders = built.len(), "built folder tree");
    let resolved = tree::resolve(ctx.remote, built)?;
    ctx.out.write(output::render_tree(&resolved, long).trim_end());
    Ok(())
}
