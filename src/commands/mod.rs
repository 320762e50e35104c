//! Command implementations
//!
//! Each command is a module with an execute function that takes parsed CLI
//! args and a [`Context`], and runs the operation against the remote.

pub mod add;
pub mod archive;
pub mod edit;
pub mod inspect;
pub mod list;
pub mod relocate;
pub mod remove;
pub mod rename;
pub mod tree;

use crate::TrailError;
use crate::api::{ObjectKind, Remote};
use crate::cli::{Commands, FolderCommands, TrackCommands, WaypointCommands};
use crate::config::TrailConfig;
use crate::ui::{OutputWriter, UserInput};

type Result<T> = std::result::Result<T, TrailError>;

/// Printed after a `--dry-run` that would have changed something
pub const DRY_RUN: &str = "Dry run; no action taken";

/// Everything a command needs besides its arguments
pub struct Context<'a> {
    pub remote: &'a dyn Remote,
    pub config: &'a TrailConfig,
    pub input: &'a dyn UserInput,
    pub out: &'a dyn OutputWriter,
}

/// `Waypoint`, `Track` or `Folder`
#[must_use]
pub fn capitalized(kind: ObjectKind) -> String {
    let name = kind.as_str();
    let mut chars = name.chars();
    chars
        .next()
        .map(|c| c.to_uppercase().chain(chars).collect())
        .unwrap_or_default()
}

/// `1 waypoint`, `3 waypoints`
#[must_use]
pub fn count(n: usize, kind: ObjectKind) -> String {
    if n == 1 {
        format!("{n} {kind}")
    } else {
        format!("{n} {}", kind.plural())
    }
}

/// Run a parsed command
///
/// # Errors
/// Returns `TrailError` from the command.
pub fn execute(command: &Commands, ctx: &Context) -> Result<()> {
    match command {
        Commands::Waypoint { command } => waypoint(command, ctx),
        Commands::Track { command } => track(command, ctx),
        Commands::Folder { command } => folder(command, ctx),
        Commands::Tree { long } => tree::execute(ctx, *long),
        Commands::Test => inspect::test(ctx),
        Commands::Query(args) => inspect::query(ctx, args),
    }
}

fn waypoint(command: &WaypointCommands, ctx: &Context) -> Result<()> {
    const KIND: ObjectKind = ObjectKind::Waypoint;
    match command {
        WaypointCommands::Add(args) => add::waypoint(ctx, args),
        WaypointCommands::List(args) => list::execute(ctx, KIND, args),
        WaypointCommands::Remove(args) => remove::execute(ctx, KIND, args, false),
        WaypointCommands::Move(args) => relocate::execute(ctx, KIND, args),
        WaypointCommands::Rename(args) => rename::execute(ctx, KIND, args),
        WaypointCommands::Archive(args) => archive::execute(ctx, KIND, args, true),
        WaypointCommands::Unarchive(args) => archive::execute(ctx, KIND, args, false),
        WaypointCommands::Edit(args) => edit::execute(ctx, KIND, args),
        WaypointCommands::Dump(args) => inspect::dump(ctx, KIND, &args.name),
        WaypointCommands::Url(args) => inspect::url(ctx, KIND, &args.name),
        WaypointCommands::Show(args) => inspect::show(ctx, KIND, args),
        WaypointCommands::Export(args) => inspect::export(ctx, KIND, args),
        WaypointCommands::Coords(args) => inspect::coords(ctx, &args.name),
        WaypointCommands::ListIcons => inspect::list_icons(ctx),
    }
}

fn track(command: &TrackCommands, ctx: &Context) -> Result<()> {
    const KIND: ObjectKind = ObjectKind::Track;
    match command {
        TrackCommands::List(args) => list::execute(ctx, KIND, args),
        TrackCommands::Remove(args) => remove::execute(ctx, KIND, args, false),
        TrackCommands::Move(args) => relocate::execute(ctx, KIND, args),
        TrackCommands::Rename(args) => rename::execute(ctx, KIND, args),
        TrackCommands::Archive(args) => archive::execute(ctx, KIND, args, true),
        TrackCommands::Unarchive(args) => archive::execute(ctx, KIND, args, false),
        TrackCommands::Edit(args) => edit::execute(ctx, KIND, args),
        TrackCommands::Dump(args) => inspect::dump(ctx, KIND, &args.name),
        TrackCommands::Url(args) => inspect::url(ctx, KIND, &args.name),
        TrackCommands::Show(args) => inspect::show(ctx, KIND, args),
        TrackCommands::Export(args) => inspect::export(ctx, KIND, args),
    }
}

fn folder(command: &FolderCommands, ctx: &Context) -> Result<()> {
    const KIND: ObjectKind = ObjectKind::Folder;
    match command {
        FolderCommands::Add(args) => add::folder(ctx, args),
        FolderCommands::List(args) => list::execute(ctx, KIND, args),
        FolderCommands::Remove(args) => remove::execute(ctx, KIND, &args.remove, args.force),
        FolderCommands::Move(args) => relocate::execute(ctx, KIND, args),
        FolderCommands::Archive(args) => archive::execute(ctx, KIND, args, true),
        FolderCommands::Unarchive(args) => archive::execute(ctx, KIND, args, false),
        FolderCommands::Dump(args) => inspect::dump(ctx, KIND, &args.name),
        FolderCommands::Url(args) => inspect::url(ctx, KIND, &args.name),
        FolderCommands::Show(args) => inspect::show(ctx, KIND, args),
        FolderCommands::Export(args) => inspect::export(ctx, KIND, args),
    }
}
