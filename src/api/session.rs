//! Cookie session persistence
//!
//! The service authenticates with a session cookie. After a successful login
//! the cookies for the base URL are written to a small file, one
//! `name=value` pair per line, and replayed into the jar on the next run.

use std::fs;
use std::path::Path;

use reqwest::Url;
use reqwest::cookie::{CookieStore, Jar};
use tracing::debug;

use super::ApiError;

fn parse_base(base_url: &str) -> Result<Url, ApiError> {
    Url::parse(base_url).map_err(|e| ApiError::Decode(format!("invalid base URL '{base_url}': {e}")))
}

/// Load saved cookies into `jar`; a missing file is not an error
///
/// # Errors
/// Returns `ApiError` if the base URL is invalid or the file cannot be read.
pub fn restore(jar: &Jar, base_url: &str, path: &Path) -> Result<(), ApiError> {
    let url = parse_base(base_url)?;
    if !path.exists() {
        debug!(path = %path.display(), "no saved session");
        return Ok(());
    }
    let content = fs::read_to_string(path)?;
    let mut restored = 0;
    for pair in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
        jar.add_cookie_str(pair, &url);
        restored += 1;
    }
    debug!(path = %path.display(), restored, "restored session cookies");
    Ok(())
}

/// Save the cookies the jar would send to `base_url`
///
/// # Errors
/// Returns `ApiError` if the base URL is invalid or the file cannot be written.
pub fn save(jar: &Jar, base_url: &str, path: &Path) -> Result<(), ApiError> {
    let url = parse_base(base_url)?;
    let Some(header) = jar.cookies(&url) else {
        debug!("no cookies to save");
        return Ok(());
    };
    let header = header
        .to_str()
        .map_err(|e| ApiError::Decode(format!("unreadable cookie header: {e}")))?;
    let lines: Vec<&str> = header.split("; ").filter(|p| !p.is_empty()).collect();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, lines.join("\n") + "\n")?;
    debug!(path = %path.display(), count = lines.len(), "saved session cookies");
    Ok(())
}
