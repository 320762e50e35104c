//! Delete objects from the server

use colored::Colorize;
use tracing::{info, warn};

use super::{Context, DRY_RUN, Result, count};
use crate::api::{ObjectKind, Summary};
use crate::cli::RemoveArgs;
use crate::select;

/// Execute the remove command
///
/// Non-empty folders are only removed with `force`, or after confirmation
/// on a terminal.
///
/// # Errors
/// Returns `TrailError` if selection fails or a delete is refused.
pub fn execute(ctx: &Context, kind: ObjectKind, args: &RemoveArgs, force: bool) -> Result<()> {
    let targets = select::resolve(ctx.remote, kind, &args.select.criteria(&args.names))?;
    if targets.is_empty() {
        info!("No items matched criteria");
        return Ok(());
    }

    let mut removed = 0;
    for obj in &targets {
        if kind == ObjectKind::Folder && !confirm_non_empty(ctx, obj, force)? {
            continue;
        }
        info!("Removing {kind} {:?} ({})", obj.title, obj.id);
        if !args.dry_run {
            ctx.remote.delete_object(kind, &obj.id)?;
            removed += 1;
        }
    }

    if args.dry_run {
        ctx.out.write(DRY_RUN);
    } else if removed > 0 {
        ctx.out.success(&format!("Removed {}", count(removed, kind).as_str().bold()));
    }
    Ok(())
}

fn confirm_non_empty(ctx: &Context, folder: &Summary, force: bool) -> Result<bool> {
    if !folder.has_contents() {
        return Ok(true);
    }
    if force {
        warn!("folder {:?} is not empty", folder.title);
        return Ok(true);
    }
    if ctx.input.is_interactive() {
        let prompt = format!("Folder {} is not empty. Remove anyway?", folder.title);
        return Ok(ctx.input.confirm(&prompt, false)?);
    }
    ctx.out
        .warning(&format!("Folder {:?} is not empty; skipping.", folder.title));
    Ok(false)
}
