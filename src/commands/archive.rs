//! Archive and unarchive objects

use tracing::info;

use super::{Context, DRY_RUN, Result, count};
use crate::api::ObjectKind;
use crate::cli::ArchiveArgs;
use crate::select;

/// Execute the archive (`archive == true`) or unarchive command
///
/// All selected objects go to the server in one request.
///
/// # Errors
/// Returns `TrailError` if selection fails or the server refuses the change.
pub fn execute(ctx: &Context, kind: ObjectKind, args: &ArchiveArgs, archive: bool) -> Result<()> {
    let targets = select::resolve(ctx.remote, kind, &args.select.criteria(&args.names))?;
    if targets.is_empty() {
        info!("No items matched criteria");
        return Ok(());
    }

    let verb = if archive { "Archiving" } else { "Unarchiving" };
    for obj in &targets {
        info!("{verb} {kind} {:?} ({})", obj.title, obj.id);
    }
    if args.dry_run {
        ctx.out.write(DRY_RUN);
        return Ok(());
    }

    let ids: Vec<String> = targets.into_iter().map(|obj| obj.id).collect();
    ctx.remote.set_objects_archive(kind, &ids, archive)?;
    let done = if archive { "Archived" } else { "Unarchived" };
    ctx.out.success(&format!("{done} {}", count(ids.len(), kind)));
    Ok(())
}
