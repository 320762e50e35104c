//! Rename a single waypoint or track

use serde_json::{Value, json};
use tracing::info;

use super::{Context, DRY_RUN, Result, capitalized};
use crate::api::{ObjectKind, Record};
use crate::cli::RenameArgs;

/// Execute the rename command
///
/// Waypoints are written back in full with a new `properties.title`; tracks
/// take a partial `{id, title}` update.
///
/// # Errors
/// Returns `TrailError` if the object is not found or the write is refused.
pub fn execute(ctx: &Context, kind: ObjectKind, args: &RenameArgs) -> Result<()> {
    let mut record = ctx.remote.get_object_by_name(kind, &args.name)?;
    let old_title = record.title().to_string();
    info!("Renaming {kind} {old_title:?} to {:?}", args.new_name);

    let update = match kind {
        ObjectKind::Waypoint => {
            record
                .properties_mut()
                .insert("title".into(), Value::String(args.new_name.clone()));
            record
        }
        _ => Record::from_value(json!({
            "id": record.id().unwrap_or_default(),
            "title": args.new_name,
        }))?,
    };

    if args.dry_run {
        ctx.out.write(DRY_RUN);
        return Ok(());
    }
    ctx.remote.put_object(kind, &update)?;
    ctx.out.success(&format!(
        "{} {old_title:?} renamed to {:?}",
        capitalized(kind),
        args.new_name
    ));
    Ok(())
}
