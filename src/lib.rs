//! Trailhead - a command-line client for a hosted waypoint and track service
//!
//! The library resolves what the user typed into concrete server objects,
//! assembles the flat folder list into a browsable hierarchy, and round-trips
//! the editable fields of many objects through a text file with optimistic
//! concurrency checks on the way back.

use thiserror::Error;

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod edit;
pub mod icons;
pub mod output;
pub mod select;
pub mod tree;
pub mod ui;
pub mod validate;

#[cfg(test)]
pub mod testing;

/// Error enum, contains all failure states of the program
#[derive(Debug, Error)]
pub enum TrailError {
    /// Talking to the server failed
    #[error("{0}")]
    Api(#[from] api::ApiError),
    /// Selection was refused or matched nothing
    #[error("{0}")]
    Select(#[from] select::SelectError),
    /// Folder hierarchy could not be built
    #[error("{0}")]
    Tree(#[from] tree::TreeError),
    /// Bulk edit failed
    #[error("{0}")]
    Edit(#[from] edit::EditError),
    /// Represents a configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ::config::ConfigError),
    /// Represents an I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    /// A command selected nothing to work on
    #[error("No objects matched criteria.")]
    NoMatch,
    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
