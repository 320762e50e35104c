//! Output formatting for CLI display
//!
//! Plain-text rendering of dates, id listings and the folder tree. Nothing
//! here prints; callers decide where the text goes.

use std::fmt::Write as _;

use chrono::{DateTime, Local, TimeZone, Utc};

use crate::api::Summary;
use crate::select::created_at;
use crate::tree::{FolderNode, FolderTree};

const DATE_FORMAT: &str = "%d %b %Y %H:%M:%S";
const MID_CHILD: &str = "├──";
const LAST_CHILD: &str = "└──";

/// Format an instant in `tz` the way every listing shows dates
#[must_use]
pub fn format_instant<Tz: TimeZone>(instant: Option<DateTime<Utc>>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    instant.map_or_else(
        || "?".to_string(),
        |ts| ts.with_timezone(tz).format(DATE_FORMAT).to_string(),
    )
}

/// Creation date of an object in local time, or `?`
#[must_use]
pub fn date(object: &Summary) -> String {
    format_instant(created_at(object), &Local)
}

/// One line per object for `list --by-id`
#[must_use]
pub fn id_line(object: &Summary) -> String {
    format!("{:<36} {:>20} {:?}", object.id, date(object), object.title)
}

/// Render the pseudo-filesystem view of a resolved tree
///
/// Subfolders come first, sorted by name, then `[W]` waypoints and `[T]`
/// tracks sorted by title. With `long`, every entry is prefixed by its
/// creation date.
#[must_use]
pub fn render_tree(tree: &FolderTree, long: bool) -> String {
    render_tree_in(tree, long, &Local)
}

/// [`render_tree`] with dates shown in `tz`
#[must_use]
pub fn render_tree_in<Tz: TimeZone>(tree: &FolderTree, long: bool, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let mut out = String::from("/\n");
    render_node(tree, tree.root(), 0, long, tz, &mut out);
    out
}

fn render_node<Tz: TimeZone>(tree: &FolderTree, node: &FolderNode, indent: usize, long: bool, tz: &Tz, out: &mut String)
where
    Tz::Offset: std::fmt::Display,
{
    let label = |title: &str, summary: Option<&Summary>| {
        if long {
            format!("{} {title}", format_instant(summary.and_then(created_at), tz))
        } else {
            title.to_string()
        }
    };

    let mut folders: Vec<&FolderNode> = tree.children(node).collect();
    folders.sort_by(|a, b| a.name().cmp(b.name()));
    let mut items: Vec<(char, &Summary)> = Vec::new();
    let mut waypoints: Vec<&Summary> = node.waypoints.iter().collect();
    waypoints.sort_by(|a, b| a.title.cmp(&b.title));
    let mut tracks: Vec<&Summary> = node.tracks.iter().collect();
    tracks.sort_by(|a, b| a.title.cmp(&b.title));
    items.extend(waypoints.into_iter().map(|w| ('W', w)));
    items.extend(tracks.into_iter().map(|t| ('T', t)));

    let pad = " ".repeat(indent);
    let total = folders.len() + items.len();
    for (i, folder) in folders.iter().enumerate() {
        let branch = if i + 1 == total { LAST_CHILD } else { MID_CHILD };
        let _ = writeln!(out, "{pad}{branch} {}/", label(folder.name(), folder.summary.as_ref()));
        render_node(tree, folder, indent + 4, long, tz, out);
    }
    for (i, (marker, item)) in items.iter().enumerate() {
        let branch = if folders.len() + i + 1 == total { LAST_CHILD } else { MID_CHILD };
        let _ = writeln!(out, "{pad}{branch} [{marker}] {}", label(&item.title, Some(*item)));
    }
}
