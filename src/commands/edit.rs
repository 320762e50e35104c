//! Bulk edit through a YAML file
//!
//! Without flags the selection is written to the edit file for the user to
//! change and apply later with `-f`. `-i` does both in one go through an
//! editor.

use colored::Colorize;
use tracing::{debug, info};

use super::{Context, Result, count};
use crate::TrailError;
use crate::api::{ApiError, ObjectKind, Summary};
use crate::cli::EditArgs;
use crate::edit::{self, ApplyReport, EditError, EditSchema, EditSnapshot};
use crate::select::{self, Criteria, SelectError};

/// Execute the edit command
///
/// # Errors
/// Returns `TrailError::NoMatch` for an empty selection, `InvalidInput` when
/// no usable editor exists, or any error from selection, dump or apply.
pub fn execute(ctx: &Context, kind: ObjectKind, args: &EditArgs) -> Result<()> {
    let items = items(ctx, kind, args)?;
    let schema = EditSchema::default();

    if args.interactive {
        let editor = edit::find_editor(ctx.config.editor.as_deref()).ok_or_else(|| {
            TrailError::InvalidInput(
                "No usable editor; set `editor` in the config file or $EDITOR".into(),
            )
        })?;
        let path = ctx.config.edit_file_for(kind);
        let outcome = edit::edit_file(ctx.remote, kind, &items, &schema, &path, |p| {
            edit::launch_editor(&editor, p)
        });
        if let Ok(None) = outcome {
            ctx.out.write("No changes made; not updating");
            return Ok(());
        }
        return finish(ctx, kind, outcome.map(Option::unwrap_or_default));
    }

    if let Some(file) = &args.file {
        let snapshot = EditSnapshot::read_from(file)?;
        return finish(ctx, kind, edit::apply(ctx.remote, kind, &items, &snapshot, &schema));
    }

    let path = ctx.config.edit_file_for(kind);
    let snapshot = edit::dump(ctx.remote, kind, &items, &schema)?;
    snapshot.write_to(&path)?;
    info!(path = %path.display(), entries = snapshot.len(), "wrote edit file");
    ctx.out.write(&format!(
        "Wrote {} to {:?}. Edit and then apply with `{kind} edit -f {}`",
        count(snapshot.len(), kind),
        path,
        path.display()
    ));
    Ok(())
}

/// Objects to edit, sorted by id
///
/// A selection refused for being unbounded falls back to everything when
/// `--in-folder` bounds it instead.
fn items(ctx: &Context, kind: ObjectKind, args: &EditArgs) -> Result<Vec<Summary>> {
    let criteria = Criteria::new(args.names.iter().cloned()).pattern(args.pattern);
    let all = ctx.remote.list_objects(kind, true)?;
    let mut items = match select::select(&all, kind, &criteria) {
        Ok(items) => items,
        Err(SelectError::SafetyAbort { .. }) if args.in_folder.is_some() => all,
        Err(e) => return Err(e.into()),
    };
    items.sort_by(|a, b| a.id.cmp(&b.id));

    if let Some(name) = &args.in_folder {
        let folder = ctx.remote.get_object_by_name(ObjectKind::Folder, name)?;
        let folder_id = folder
            .id()
            .ok_or_else(|| ApiError::Decode(format!("folder {name} has no id")))?;
        items.retain(|item| item.folder_id() == Some(folder_id));
        debug!(folder = %folder_id, kept = items.len(), "limited edit to folder");
    }

    if items.is_empty() {
        return Err(TrailError::NoMatch);
    }
    Ok(items)
}

/// Report an apply, including the part that went through before a failure
fn finish(ctx: &Context, kind: ObjectKind, outcome: std::result::Result<ApplyReport, EditError>) -> Result<()> {
    match outcome {
        Ok(report) => {
            print_report(ctx, kind, &report);
            Ok(())
        }
        Err(e) => {
            if let EditError::Interrupted { report, .. } = &e {
                for applied in &report.applied {
                    ctx.out.write(&format!("Updated {kind} {} ({})", applied.position, applied.title));
                }
                print_report(ctx, kind, report);
            }
            Err(e.into())
        }
    }
}

fn print_report(ctx: &Context, kind: ObjectKind, report: &ApplyReport) {
    for conflict in &report.conflicts {
        ctx.out.warning(&conflict.to_string());
    }
    ctx.out.success(&format!(
        "Updated {}",
        count(report.applied.len(), kind).as_str().bold()
    ));
}
