//! Read-only lookups: dump, show, export, url, coords, icon aliases, the
//! auth check and raw queries

use std::fs;

use serde_json::Value;
use tabled::{Table, Tabled};
use tracing::info;

use super::{Context, Result, capitalized};
use crate::{TrailError, icons};
use crate::api::{ApiError, ObjectKind, find};
use crate::cli::{ExportArgs, QueryArgs, ShowArgs};
use crate::select::is_id;

/// Print the full server representation of one object as JSON
///
/// # Errors
/// Returns `TrailError::Api` if the object is not found.
pub fn dump(ctx: &Context, kind: ObjectKind, name: &str) -> Result<()> {
    let record = ctx.remote.get_object_by_name(kind, name)?;
    let pretty = serde_json::to_string_pretty(&record).map_err(ApiError::from)?;
    ctx.out.write(&pretty);
    Ok(())
}

#[derive(Debug, Tabled)]
struct Property {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Value")]
    value: String,
}

/// Strings print bare, everything else as JSON
fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Whether a value counts as set for `--only-vals`
fn is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Print the properties of one object
///
/// Lists and mappings are summarized as `(N items)` / `(N keys)` in the
/// table unless expanded with `-k`.
///
/// # Errors
/// Returns `TrailError::InvalidInput` if an `--only-key` is not a property of
/// the object, or `TrailError::Api` if the object is not found.
pub fn show(ctx: &Context, kind: ObjectKind, args: &ShowArgs) -> Result<()> {
    let record = ctx.remote.get_object_by_name(kind, &args.name)?;
    let empty = serde_json::Map::new();
    let props = record.properties().unwrap_or(&empty);

    if let Some(missing) = args.only_key.iter().find(|k| !props.contains_key(k.as_str())) {
        return Err(TrailError::InvalidInput(format!(
            "{} {:?} does not have key {missing:?}",
            capitalized(kind),
            args.name
        )));
    }
    let expand_all = args.expand_key.iter().any(|k| k == "all");

    let mut selected: Vec<(&String, &Value)> = props
        .iter()
        .filter(|(k, _)| args.only_key.is_empty() || args.only_key.contains(*k))
        .collect();
    selected.sort_by(|a, b| a.0.cmp(b.0));

    if args.only_vals {
        for (_, value) in selected.into_iter().filter(|(_, v)| is_set(v)) {
            ctx.out.write(&plain(value));
        }
    } else if let Some(sep) = &args.field_separator {
        for (key, value) in selected {
            ctx.out.write(&format!("{key}{sep}{}", plain(value)));
        }
    } else {
        let rows: Vec<Property> = selected
            .into_iter()
            .map(|(key, value)| {
                let expanded = expand_all || args.expand_key.contains(key);
                let value = match value {
                    Value::Array(items) if !expanded => format!("({} items)", items.len()),
                    Value::Object(map) if !expanded => format!("({} keys)", map.len()),
                    other => plain(other),
                };
                Property {
                    key: key.clone(),
                    value,
                }
            })
            .collect();
        ctx.out.write(&Table::new(&rows).to_string());
    }
    Ok(())
}

/// Id of `name`, looked up in the listing unless it already is one
fn resolve_id(ctx: &Context, kind: ObjectKind, name: &str) -> Result<String> {
    if is_id(name) {
        return Ok(name.to_string());
    }
    let objects = ctx.remote.list_objects(kind, true)?;
    Ok(find(&objects, kind, "title", name)?.id.clone())
}

/// Download one object as GPX or KML, to a file or to stdout with `-`
///
/// # Errors
/// Returns `TrailError::Api` if the object is not found or cannot be
/// rendered, or `TrailError::IoError` if the file cannot be written.
pub fn export(ctx: &Context, kind: ObjectKind, args: &ExportArgs) -> Result<()> {
    let id = resolve_id(ctx, kind, &args.name)?;
    let data = ctx.remote.export_object(kind, &id, args.format)?;
    if args.filename == "-" {
        ctx.out.write(&String::from_utf8_lossy(&data));
        return Ok(());
    }
    fs::write(&args.filename, &data)?;
    info!(bytes = data.len(), "exported {kind} {id} as {}", args.format);
    ctx.out.success(&format!("Wrote {:?}", args.filename));
    Ok(())
}

/// Send a raw request and print the status line, headers and body
///
/// JSON bodies are pretty-printed; anything else is printed as text.
///
/// # Errors
/// Returns `TrailError::Api` on transport failure. Error statuses are
/// printed, not raised.
pub fn query(ctx: &Context, args: &QueryArgs) -> Result<()> {
    let response = ctx.remote.raw_request(args.method, &args.path, &args.params)?;
    if !args.quiet {
        ctx.out.write(&format!("HTTP {} {}", response.status, response.reason));
        for (name, value) in &response.headers {
            ctx.out.write(&format!("{name}: {value}"));
        }
        ctx.out.write("");
    }

    let body = if response.is_json() {
        serde_json::from_slice::<Value>(&response.body)
            .and_then(|v| serde_json::to_string_pretty(&v))
            .ok()
    } else {
        None
    };
    ctx.out
        .write(&body.unwrap_or_else(|| String::from_utf8_lossy(&response.body).into_owned()));
    Ok(())
}

/// Print the web URL for one object
///
/// # Errors
/// Returns `TrailError::Api` if the object is not found.
pub fn url(ctx: &Context, kind: ObjectKind, name: &str) -> Result<()> {
    let record = ctx.remote.get_object_by_name(kind, name)?;
    let id = record
        .id()
        .ok_or_else(|| ApiError::Decode(format!("{kind} {name} has no id")))?;
    ctx.out.write(&format!(
        "{}/datasummary/{kind}/{id}",
        ctx.config.base_url.trim_end_matches('/')
    ));
    Ok(())
}

/// Print a waypoint's position as `lat,lon`
///
/// # Errors
/// Returns `TrailError::Api` if the waypoint is not found or has no point
/// geometry.
pub fn coords(ctx: &Context, name: &str) -> Result<()> {
    let record = ctx.remote.get_object_by_name(ObjectKind::Waypoint, name)?;
    let position = record
        .get("geometry")
        .and_then(|g| g.get("coordinates"))
        .and_then(Value::as_array)
        .and_then(|c| Some((c.first()?.as_f64()?, c.get(1)?.as_f64()?)));
    let Some((lon, lat)) = position else {
        return Err(ApiError::Decode(format!("waypoint {name} has no coordinates")).into());
    };
    ctx.out.write(&format!("{lat:.6},{lon:.6}"));
    Ok(())
}

/// Print every icon alias with the file it stands for
pub fn list_icons(ctx: &Context) -> Result<()> {
    for (alias, file) in icons::ICON_ALIASES {
        ctx.out.write(&format!("{alias} ({file})"));
    }
    Ok(())
}

/// Check that the session is authenticated
///
/// # Errors
/// Returns `ApiError::Unauthorized` if the server refuses the session.
pub fn test(ctx: &Context) -> Result<()> {
    if !ctx.remote.test_auth() {
        return Err(TrailError::Api(ApiError::Unauthorized(
            "login failed; check --user and --pass".into(),
        )));
    }
    ctx.out.success("Success!");
    Ok(())
}
