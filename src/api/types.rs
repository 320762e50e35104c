//! Object representations exchanged with the remote service
//!
//! The service speaks loosely-typed JSON. List endpoints return compact
//! [`Summary`] entries, while single-object endpoints return a full
//! [`Record`] (a GeoJSON-like feature with a `properties` mapping). Records are
//! kept as ordered JSON maps so that writing one back never drops fields this
//! client does not know about.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tracing::warn;

use super::ApiError;

/// Kind of object stored on the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Waypoint,
    Track,
    Folder,
}

impl ObjectKind {
    /// Name used in API paths and messages
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Waypoint => "waypoint",
            Self::Track => "track",
            Self::Folder => "folder",
        }
    }

    /// Plural form, also the key of id lists inside a folder
    #[must_use]
    pub const fn plural(self) -> &'static str {
        match self {
            Self::Waypoint => "waypoints",
            Self::Track => "tracks",
            Self::Folder => "folders",
        }
    }

    /// Key under which a folder lists contained objects of this kind
    #[must_use]
    pub const fn folder_key(self) -> &'static str {
        match self {
            Self::Waypoint => "waypoints",
            Self::Track => "tracks",
            Self::Folder => "children",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a list response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Containing folder id; null or `""` means top level
    #[serde(default)]
    pub folder: Option<String>,
    /// Parent folder id (folders only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Archived flag
    #[serde(default)]
    pub deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_created: Option<String>,
    #[serde(default)]
    pub properties: Map<String, Value>,
    /// Everything else the server sent, preserved for write-back
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Summary {
    /// Create a bare summary (mostly useful for tests and fixtures)
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            folder: None,
            parent: None,
            deleted: false,
            time_created: None,
            properties: Map::new(),
            extra: Map::new(),
        }
    }

    /// True when the object is not filed in any folder
    #[must_use]
    pub fn is_top_level(&self) -> bool {
        self.folder.as_deref().is_none_or(str::is_empty)
    }

    /// Folder id, if the object is filed
    #[must_use]
    pub fn folder_id(&self) -> Option<&str> {
        self.folder.as_deref().filter(|f| !f.is_empty())
    }

    /// Parent folder id, if any
    #[must_use]
    pub fn parent_id(&self) -> Option<&str> {
        self.parent.as_deref().filter(|p| !p.is_empty())
    }

    /// Raw creation timestamp, from the top level or the nested properties
    #[must_use]
    pub fn time_created(&self) -> Option<&str> {
        self.time_created
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| {
                self.properties
                    .get("time_created")
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
            })
    }

    /// Whether a folder summary lists any contents
    #[must_use]
    pub fn has_contents(&self) -> bool {
        ["tracks", "waypoints", "children", "maps"].iter().any(|key| {
            self.extra
                .get(*key)
                .and_then(Value::as_array)
                .is_some_and(|ids| !ids.is_empty())
        })
    }
}

/// Optimistic-concurrency token carried in `properties.revision`
///
/// Compared for equality only; its contents mean nothing to the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Revision(String);

impl Revision {
    /// Build a token from a JSON value (strings and numbers only)
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self(s.clone())),
            Value::Number(n) => Some(Self(n.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Full representation of a single object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(pub Map<String, Value>);

impl Record {
    #[must_use]
    pub const fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Wrap a JSON value, which must be an object
    ///
    /// # Errors
    /// Returns `ApiError::Decode` if the value is not a JSON object.
    pub fn from_value(value: Value) -> Result<Self, ApiError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(ApiError::Decode(format!(
                "expected a JSON object, got {other}"
            ))),
        }
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.0.get("id").and_then(Value::as_str)
    }

    #[must_use]
    pub fn properties(&self) -> Option<&Map<String, Value>> {
        self.0.get("properties").and_then(Value::as_object)
    }

    /// Mutable access to `properties`, created if missing
    pub fn properties_mut(&mut self) -> &mut Map<String, Value> {
        let entry = self
            .0
            .entry("properties")
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        match entry {
            Value::Object(map) => map,
            _ => unreachable!("properties was just made an object"),
        }
    }

    fn property_str(&self, key: &str) -> Option<&str> {
        self.properties()
            .and_then(|p| p.get(key))
            .and_then(Value::as_str)
    }

    /// Display title: `properties.title`, then `properties.name`, then `title`
    #[must_use]
    pub fn title(&self) -> &str {
        self.property_str("title")
            .or_else(|| self.property_str("name"))
            .or_else(|| self.0.get("title").and_then(Value::as_str))
            .unwrap_or("")
    }

    #[must_use]
    pub fn revision(&self) -> Option<Revision> {
        self.properties()
            .and_then(|p| p.get("revision"))
            .and_then(Revision::from_value)
    }

    #[must_use]
    pub fn time_created(&self) -> Option<&str> {
        self.0
            .get("time_created")
            .and_then(Value::as_str)
            .or_else(|| self.property_str("time_created"))
    }

    /// Objects of `key` (e.g. `waypoints`) embedded in a hydrated folder
    ///
    /// Entries that do not read as a [`Summary`] are logged and left out.
    #[must_use]
    pub fn embedded(&self, key: &str) -> Vec<Summary> {
        let Some(items) = self
            .properties()
            .and_then(|p| p.get(key))
            .and_then(Value::as_array)
        else {
            return Vec::new();
        };
        items
            .iter()
            .filter_map(|v| match serde_json::from_value(v.clone()) {
                Ok(summary) => Some(summary),
                Err(e) => {
                    warn!(folder = ?self.id(), key, entry = %v, error = %e, "skipping unreadable folder entry");
                    None
                }
            })
            .collect()
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// File format for `export`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ExportFormat {
    #[default]
    Gpx,
    Kml,
}

impl ExportFormat {
    /// File extension the server expects on the object URL
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Gpx => "gpx",
            Self::Kml => "kml",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// HTTP method for raw queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[value(rename_all = "UPPER")]
pub enum QueryMethod {
    #[default]
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
}

impl QueryMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Post => "POST",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
            Self::Head => "HEAD",
        }
    }
}

/// Whatever the server answered to a raw query, success or not
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub reason: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Whether the `Content-Type` header names JSON
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.headers
            .iter()
            .any(|(k, v)| k.eq_ignore_ascii_case("content-type") && v.contains("json"))
    }
}

/// Find the first object whose `field` equals `value`
///
/// Only `id` and `title` are searchable.
///
/// # Errors
/// Returns `ApiError::NotFound` if nothing matches.
pub fn find<'a>(
    objects: &'a [Summary],
    kind: ObjectKind,
    field: &'static str,
    value: &str,
) -> Result<&'a Summary, ApiError> {
    objects
        .iter()
        .find(|obj| match field {
            "id" => obj.id == value,
            _ => obj.title == value,
        })
        .ok_or_else(|| ApiError::NotFound {
            kind,
            field,
            value: value.to_string(),
        })
}

/// Build the request body for a new waypoint
#[must_use]
pub fn make_waypoint(name: &str, lat: f64, lon: f64, alt: u32, notes: &str, icon: &str) -> Value {
    serde_json::json!({
        "type": "Feature",
        "properties": {
            "title": name,
            "notes": notes,
            "icon": icon,
        },
        "geometry": {
            "type": "Point",
            "coordinates": [lon, lat, alt],
        },
    })
}

/// Build the request body for a new folder
#[must_use]
pub fn make_folder(name: &str) -> Value {
    serde_json::json!({ "title": name })
}
