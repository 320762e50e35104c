//! Command-line interface definitions and parsing
//!
//! This module defines the complete CLI structure for trailhead using the
//! `clap` crate. Objects are managed per type:
//!
//! - **waypoint**: add, list, remove, move, rename, archive, edit, show, export,
//!   coords, list-icons
//! - **track**: list, remove, move, rename, archive, edit, show, export
//! - **folder**: add, list, remove, move, archive, show, export
//! - **tree**: print every folder and its contents
//! - **test**: check that the stored session or credentials work
//! - **query**: send a raw request to the API (for debugging)
//!
//! # Examples
//!
//! ```
//! use clap::Parser;
//! use trailhead::cli::{Cli, Commands, WaypointCommands};
//!
//! let cli = Cli::parse_from(["trailhead", "waypoint", "remove", "--match", "^tmp"]);
//! assert!(matches!(
//!     cli.command,
//!     Some(Commands::Waypoint { command: WaypointCommands::Remove(_) })
//! ));
//! ```

use clap::{Args, Parser, Subcommand};

use crate::api::{ExportFormat, QueryMethod};
use crate::select::{Criteria, DateRange};

/// Main CLI structure for parsing command-line arguments
#[derive(Parser, Debug)]
#[command(name = "trailhead")]
#[command(about = "Command line client for a hosted waypoint and track service", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Account name (overrides config)
    #[arg(long = "user", global = true)]
    pub user: Option<String>,

    /// Account password (prompted for when --user is given without it)
    #[arg(long = "pass", value_name = "PASS", global = true)]
    pub pass: Option<String>,

    /// Report each action as it is taken
    #[arg(long = "verbose", global = true)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long = "debug", global = true)]
    pub debug: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Manage waypoints
    #[command(visible_alias = "w")]
    Waypoint {
        #[command(subcommand)]
        command: WaypointCommands,
    },

    /// Manage tracks
    #[command(visible_alias = "t")]
    Track {
        #[command(subcommand)]
        command: TrackCommands,
    },

    /// Manage folders
    #[command(visible_alias = "f")]
    Folder {
        #[command(subcommand)]
        command: FolderCommands,
    },

    /// Display all folders, waypoints and tracks as a tree
    Tree {
        /// Show creation dates
        #[arg(long = "long")]
        long: bool,
    },

    /// Check access to the service
    Test,

    /// Send a request straight to the API and print the response
    Query(QueryArgs),
}

/// Waypoint subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum WaypointCommands {
    /// Add a waypoint
    Add(AddWaypointArgs),
    /// List waypoints
    List(ListArgs),
    /// Delete waypoints from the server forever
    Remove(RemoveArgs),
    /// Move waypoints into a folder
    Move(MoveArgs),
    /// Rename a waypoint
    Rename(RenameArgs),
    /// Archive waypoints (stop syncing them to devices)
    Archive(ArchiveArgs),
    /// Unarchive waypoints (sync them to devices again)
    Unarchive(ArchiveArgs),
    /// Edit attributes of one or more waypoints through a YAML file
    Edit(EditArgs),
    /// Raw dump of the server's representation
    Dump(NameArg),
    /// Show a browser URL
    Url(NameArg),
    /// Show all available details of one item
    Show(ShowArgs),
    /// Export to a local GPX or KML file
    Export(ExportArgs),
    /// Display coordinates as lat,lon
    Coords(NameArg),
    /// List the icon aliases accepted by `add --icon`
    ListIcons,
}

/// Track subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum TrackCommands {
    /// List tracks
    List(ListArgs),
    /// Delete tracks from the server forever
    Remove(RemoveArgs),
    /// Move tracks into a folder
    Move(MoveArgs),
    /// Rename a track
    Rename(RenameArgs),
    /// Archive tracks (stop syncing them to devices)
    Archive(ArchiveArgs),
    /// Unarchive tracks (sync them to devices again)
    Unarchive(ArchiveArgs),
    /// Edit attributes of one or more tracks through a YAML file
    Edit(EditArgs),
    /// Raw dump of the server's representation
    Dump(NameArg),
    /// Show a browser URL
    Url(NameArg),
    /// Show all available details of one item
    Show(ShowArgs),
    /// Export to a local GPX or KML file
    Export(ExportArgs),
}

/// Folder subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum FolderCommands {
    /// Add a folder
    Add(AddFolderArgs),
    /// List folders
    List(ListArgs),
    /// Delete folders from the server forever
    Remove(RemoveFolderArgs),
    /// Move folders into another folder
    Move(MoveArgs),
    /// Archive folders (stop syncing them to devices)
    Archive(ArchiveArgs),
    /// Unarchive folders (sync them to devices again)
    Unarchive(ArchiveArgs),
    /// Raw dump of the server's representation
    Dump(NameArg),
    /// Show a browser URL
    Url(NameArg),
    /// Show all available details of one item
    Show(ShowArgs),
    /// Export to a local GPX or KML file
    Export(ExportArgs),
}

/// Parse a yes/no answer
///
/// # Errors
/// Returns a message if the value is not one of y/yes/t/true/n/no/f/false.
pub fn parse_fuzzy_bool(value: &str) -> Result<bool, String> {
    match value.to_lowercase().as_str() {
        "y" | "yes" | "t" | "true" => Ok(true),
        "n" | "no" | "f" | "false" => Ok(false),
        _ => Err(format!("Invalid value for {value}: must be \"yes\" or \"no\"")),
    }
}

/// Selection options shared by bulk commands
#[derive(Debug, Clone, Args)]
pub struct MatchArgs {
    /// Treat names as regular expressions and include all matches
    #[arg(long = "match")]
    pub pattern: bool,

    /// Match items created on this day, or in an inclusive START:END range
    #[arg(long = "match-date", value_name = "YYYY-MM-DD")]
    pub match_date: Option<DateRange>,
}

/// Arguments for the list subcommand
#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    /// List items by id only (for resolving duplicates)
    #[arg(long = "by-id")]
    pub by_id: bool,

    /// List only items whose name matches this regular expression
    #[arg(long = "match", value_name = "NAME")]
    pub pattern: Option<String>,

    /// Match items created on this day, or in an inclusive START:END range
    #[arg(long = "match-date", value_name = "YYYY-MM-DD")]
    pub match_date: Option<DateRange>,

    /// Match items with this archived state ("yes" or "no")
    #[arg(long = "archived", value_parser = parse_fuzzy_bool)]
    pub archived: Option<bool>,
}

/// Arguments for the remove subcommand
#[derive(Debug, Clone, Args)]
pub struct RemoveArgs {
    /// Names (or ids)
    #[arg(required = true)]
    pub names: Vec<String>,

    #[command(flatten)]
    pub select: MatchArgs,

    /// Do not actually remove anything (use with --verbose)
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

/// Arguments for removing folders
#[derive(Debug, Clone, Args)]
pub struct RemoveFolderArgs {
    #[command(flatten)]
    pub remove: RemoveArgs,

    /// Remove even if not empty
    #[arg(long = "force")]
    pub force: bool,
}

/// Arguments for the move subcommand
#[derive(Debug, Clone, Args)]
pub struct MoveArgs {
    /// Names (or ids) followed by the destination folder, or "/" for the top level
    #[arg(value_name = "NAME... DEST", required = true, num_args = 1..)]
    pub targets: Vec<String>,

    #[command(flatten)]
    pub select: MatchArgs,

    /// Do not actually move anything (use with --verbose)
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

impl MoveArgs {
    /// Everything but the last positional
    #[must_use]
    pub fn names(&self) -> &[String] {
        self.targets.split_last().map_or(&[], |(_, names)| names)
    }

    /// The last positional
    #[must_use]
    pub fn destination(&self) -> &str {
        self.targets.last().map_or("", String::as_str)
    }
}

/// Arguments for the rename subcommand
#[derive(Debug, Clone, Args)]
pub struct RenameArgs {
    /// Current name (or id)
    pub name: String,

    /// New name
    pub new_name: String,

    /// Do not actually rename anything (use with --verbose)
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

/// Arguments for archive and unarchive
#[derive(Debug, Clone, Args)]
pub struct ArchiveArgs {
    /// Names (or ids)
    pub names: Vec<String>,

    #[command(flatten)]
    pub select: MatchArgs,

    /// Do not actually change anything (use with --verbose)
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

/// Arguments for the edit subcommand
#[derive(Debug, Clone, Args)]
pub struct EditArgs {
    /// Names (or ids)
    pub names: Vec<String>,

    /// Open the file in an editor and apply it when the editor exits
    #[arg(short = 'i', long = "interactive", conflicts_with = "file")]
    pub interactive: bool,

    /// Apply edits from a file
    #[arg(short = 'f', long = "file")]
    pub file: Option<std::path::PathBuf>,

    /// Treat names as regular expressions and include all matches
    #[arg(long = "match")]
    pub pattern: bool,

    /// Only edit items in this folder
    #[arg(long = "in-folder", value_name = "FOLDER")]
    pub in_folder: Option<String>,
}

/// Arguments for adding a waypoint
#[derive(Debug, Clone, Args)]
pub struct AddWaypointArgs {
    /// Name of the new waypoint
    pub name: String,

    /// Latitude (in decimal degrees)
    #[arg(allow_hyphen_values = true)]
    pub latitude: String,

    /// Longitude (in decimal degrees)
    #[arg(allow_hyphen_values = true)]
    pub longitude: String,

    /// Altitude (in meters)
    #[arg(default_value = "0", allow_hyphen_values = true)]
    pub altitude: String,

    /// Set the notes field
    #[arg(long = "notes", default_value = "")]
    pub notes: String,

    /// Set the icon field (a file name or an alias from list-icons)
    #[arg(long = "icon", default_value = "")]
    pub icon: String,

    /// Add to existing folder with this name
    #[arg(long = "existing-folder", conflicts_with = "new_folder")]
    pub existing_folder: Option<String>,

    /// Add to a new folder with this name
    #[arg(long = "new-folder")]
    pub new_folder: Option<String>,

    /// Do not actually add anything (use with --verbose)
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

/// Arguments for adding a folder
#[derive(Debug, Clone, Args)]
pub struct AddFolderArgs {
    /// Name of the new folder
    pub name: String,

    /// Add to existing folder with this name
    #[arg(long = "existing-folder")]
    pub existing_folder: Option<String>,

    /// Do not actually add anything (use with --verbose)
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

/// A single object by name or id
#[derive(Debug, Clone, Args)]
pub struct NameArg {
    /// Name (or id)
    pub name: String,
}

/// Arguments for the show subcommand
#[derive(Debug, Clone, Args)]
pub struct ShowArgs {
    /// Name (or id)
    pub name: String,

    /// Print key<SEP>value lines instead of a table
    #[arg(short = 'f', long = "field-separator", value_name = "SEP", conflicts_with = "only_vals")]
    pub field_separator: Option<String>,

    /// Only display this key (repeat for several)
    #[arg(short = 'K', long = "only-key", value_name = "KEY")]
    pub only_key: Vec<String>,

    /// Show the full value of this key, or of every key with "all" (repeatable)
    #[arg(short = 'k', long = "expand-key", value_name = "KEY")]
    pub expand_key: Vec<String>,

    /// Only show values
    #[arg(short = 'V', long = "only-vals")]
    pub only_vals: bool,
}

/// Arguments for the export subcommand
#[derive(Debug, Clone, Args)]
pub struct ExportArgs {
    /// Name (or id)
    pub name: String,

    /// Export filename (or - for stdout)
    pub filename: String,

    /// File format
    #[arg(long = "format", value_enum, default_value_t = ExportFormat::Gpx)]
    pub format: ExportFormat,
}

/// Parse a `KEY=VALUE` query argument
///
/// # Errors
/// Returns a message if there is no `=`.
pub fn parse_key_value(value: &str) -> Result<(String, String), String> {
    value
        .split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got {value:?}"))
}

/// Arguments for the query command
#[derive(Debug, Clone, Args)]
pub struct QueryArgs {
    /// API URL path, e.g. api/objects/waypoint
    pub path: String,

    /// Query string argument (repeatable)
    #[arg(short = 'a', value_name = "KEY=VALUE", num_args = 1.., value_parser = parse_key_value)]
    pub params: Vec<(String, String)>,

    /// Method
    #[arg(short = 'X', value_name = "METHOD", value_enum, ignore_case = true, default_value_t = QueryMethod::Get)]
    pub method: QueryMethod,

    /// Suppress response information; only print content
    #[arg(short = 'q')]
    pub quiet: bool,
}

impl MatchArgs {
    /// Selection criteria for `names`
    #[must_use]
    pub fn criteria(&self, names: &[String]) -> Criteria {
        Criteria::new(names.iter().cloned())
            .pattern(self.pattern)
            .dates(self.match_date)
    }
}

impl Cli {
    /// Parse command line arguments
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
