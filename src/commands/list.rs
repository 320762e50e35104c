//! List objects of one type as a table

use std::collections::HashMap;

use chrono::{Local, TimeZone};
use regex::Regex;
use tabled::{Table, Tabled};
use tracing::debug;

use super::{Context, Result};
use crate::api::{ObjectKind, Summary};
use crate::cli::ListArgs;
use crate::output;
use crate::select::{SelectError, created_at};

/// One line of the listing table
#[derive(Debug, Tabled)]
struct Row {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Updated")]
    updated: String,
    #[tabled(rename = "Folder")]
    folder: String,
}

/// Execute the list command
///
/// # Errors
/// Returns `TrailError` if listing fails or `--match` is not a valid regex.
pub fn execute(ctx: &Context, kind: ObjectKind, args: &ListArgs) -> Result<()> {
    if args.by_id {
        for item in ctx.remote.list_objects(kind, true)? {
            ctx.out.write(&output::id_line(&item));
        }
        return Ok(());
    }

    let pattern = args
        .pattern
        .as_deref()
        .map(|p| {
            Regex::new(p).map_err(|e| SelectError::InvalidPattern {
                pattern: p.to_string(),
                reason: e.to_string(),
            })
        })
        .transpose()?;

    let items = ctx.remote.list_objects(kind, args.archived.unwrap_or(true))?;
    let folder_names: HashMap<String, String> = if items.iter().any(|i| i.folder_id().is_some()) {
        ctx.remote
            .list_objects(ObjectKind::Folder, true)?
            .into_iter()
            .map(|f| (f.id, f.title))
            .collect()
    } else {
        HashMap::new()
    };

    let rows = rows(&items, &folder_names, pattern.as_ref(), args, &Local);
    debug!(listed = items.len(), shown = rows.len(), "list {kind}");
    ctx.out.write(&Table::new(&rows).to_string());
    Ok(())
}

/// Filter and sort listed objects into `Name`, `Updated`, `Folder` rows
fn rows<Tz: TimeZone>(
    items: &[Summary],
    folder_names: &HashMap<String, String>,
    pattern: Option<&Regex>,
    args: &ListArgs,
    tz: &Tz,
) -> Vec<Row> {
    let only_archived = args.archived == Some(true);
    let mut named: Vec<(&Summary, String)> = items
        .iter()
        .filter(|i| pattern.is_none_or(|re| re.is_match(&i.title)))
        .filter(|i| {
            args.match_date
                .is_none_or(|range| created_at(i).is_some_and(|ts| range.contains_in(ts, tz)))
        })
        .filter(|i| !only_archived || i.deleted)
        .map(|i| {
            let folder = i
                .folder_id()
                .map(|id| folder_names.get(id).cloned().unwrap_or_else(|| id.to_string()))
                .unwrap_or_default();
            (i, folder)
        })
        .collect();
    named.sort_by(|(a, fa), (b, fb)| (fa, &a.title).cmp(&(fb, &b.title)));
    named
        .into_iter()
        .map(|(i, folder)| Row {
            name: i.title.clone(),
            updated: output::date(i),
            folder,
        })
        .collect()
}
