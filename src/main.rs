//! trailhead CLI application entry point
//!
//! Manages waypoints, tracks and folders stored on a hosted GPS service.
//!
//! # Usage
//!
//! ```bash
//! # Log in once; the session cookie is kept for later runs
//! trailhead --user me@example.com test
//!
//! # List, then remove everything named like a scratch point
//! trailhead waypoint list --match '^tmp'
//! trailhead waypoint remove --match '^tmp' --dry-run --verbose
//!
//! # File tracks from a date range into a folder
//! trailhead track move --match-date 2019-05-01:2019-05-31 "May trips"
//!
//! # Edit notes and icons for a folder's waypoints in $EDITOR
//! trailhead waypoint edit -i --in-folder "May trips"
//!
//! # Show the folder hierarchy
//! trailhead tree --long
//! ```
//!
//! # Configuration
//!
//! Settings live in `~/.config/trailhead/config.toml` (created on first run)
//! and can be overridden with `TRAILHEAD_*` environment variables.

use std::process::ExitCode;

use clap::CommandFactory;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use trailhead::{
    TrailError,
    api::{HttpRemote, Remote},
    cli::{Cli, Commands},
    commands::{self, Context},
    config::TrailConfig,
    ui::{Console, DialoguerInput, UserInput},
};

type Result<T> = std::result::Result<T, TrailError>;

fn init_logging(cli: &Cli, config: &TrailConfig) {
    let default_level = if cli.debug {
        "debug"
    } else if cli.verbose || config.verbose {
        "info"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .init();
}

/// Open the remote, logging in when credentials are given or the stored
/// session has expired
fn connect(cli: &Cli, config: &TrailConfig, input: &dyn UserInput) -> Result<HttpRemote> {
    let remote = HttpRemote::new(&config.base_url, Some(TrailConfig::session_path()?))?;

    let Some(user) = cli.user.as_deref().or(config.username.as_deref()) else {
        return Ok(remote);
    };
    if cli.user.is_none() && cli.pass.is_none() && remote.test_auth() {
        debug!("reusing stored session");
        return Ok(remote);
    }

    let password = match &cli.pass {
        Some(pass) => pass.clone(),
        None if input.is_interactive() => input.password(&format!("Password for {user}"))?,
        None => {
            return Err(TrailError::InvalidInput(
                "--pass is required when not running on a terminal".into(),
            ));
        }
    };
    remote.login(user, &password)?;
    Ok(remote)
}

fn run(cli: &Cli, command: &Commands, config: &TrailConfig) -> Result<()> {
    let input = DialoguerInput::new();
    let out = Console::new();
    let remote = connect(cli, config, &input)?;
    let ctx = Context {
        remote: &remote,
        config,
        input: &input,
        out: &out,
    };
    commands::execute(command, &ctx)
}

fn main() -> ExitCode {
    let config = match TrailConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let cli = Cli::parse_args();
    init_logging(&cli, &config);

    let Some(command) = &cli.command else {
        let _ = Cli::command().print_help();
        return ExitCode::FAILURE;
    };

    match run(&cli, command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
