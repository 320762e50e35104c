//! Move objects between folders

use tracing::info;

use super::{Context, DRY_RUN, Result, capitalized, count};
use crate::api::{ApiError, ObjectKind, Summary};
use crate::cli::MoveArgs;
use crate::select;
use crate::tree::ROOT_NAME;

/// Folder an object currently sits in
fn container(kind: ObjectKind, obj: &Summary) -> Option<&str> {
    match kind {
        ObjectKind::Folder => obj.parent_id(),
        _ => obj.folder_id(),
    }
}

/// Execute the move command
///
/// A destination of `/` takes each object out of its folder.
///
/// # Errors
/// Returns `TrailError` if selection fails, the destination folder does not
/// exist, or the server refuses a change.
pub fn execute(ctx: &Context, kind: ObjectKind, args: &MoveArgs) -> Result<()> {
    let targets = select::resolve(ctx.remote, kind, &args.select.criteria(args.names()))?;
    if targets.is_empty() {
        info!("No items matched criteria");
        return Ok(());
    }

    let mut moved = 0;
    if args.destination() == ROOT_NAME {
        for obj in &targets {
            let Some(folder_id) = container(kind, obj) else {
                ctx.out
                    .write(&format!("{} {:?} is already at root", capitalized(kind), obj.title));
                continue;
            };
            info!("Moving {kind} {:?} ({}) to /", obj.title, obj.id);
            if !args.dry_run {
                ctx.remote.remove_object_from_folder(folder_id, kind, &obj.id)?;
                moved += 1;
            }
        }
    } else {
        let folder = ctx
            .remote
            .get_object_by_name(ObjectKind::Folder, args.destination())?;
        let folder_id = folder
            .id()
            .ok_or_else(|| ApiError::Decode(format!("folder {} has no id", args.destination())))?;
        for obj in &targets {
            info!("Moving {kind} {:?} ({}) to {}", obj.title, obj.id, folder.title());
            if !args.dry_run {
                ctx.remote.add_object_to_folder(folder_id, kind, &obj.id)?;
                moved += 1;
            }
        }
    }

    if args.dry_run {
        ctx.out.write(DRY_RUN);
    } else if moved > 0 {
        ctx.out
            .success(&format!("Moved {} to {}", count(moved, kind), args.destination()));
    }
    Ok(())
}
