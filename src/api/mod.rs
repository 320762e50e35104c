//! Remote service boundary
//!
//! Everything that talks to the server goes through the [`Remote`] trait so
//! that selection, tree resolution and bulk editing can run against the real
//! HTTP client ([`HttpRemote`]) or an in-memory double in tests.

pub mod client;
pub mod error;
pub mod session;
pub mod types;

pub use client::{DEFAULT_BASE_URL, HttpRemote};
pub use error::ApiError;
pub use types::{
    ExportFormat, ObjectKind, QueryMethod, RawResponse, Record, Revision, Summary, find, make_folder,
    make_waypoint,
};

use serde_json::Value;
use tracing::debug;

type Result<T> = std::result::Result<T, ApiError>;

/// Operations the client needs from the server
///
/// Implementations issue one request at a time; no method is expected to be
/// called concurrently.
pub trait Remote {
    /// List every object of a kind (`archived = false` hides archived ones)
    ///
    /// # Errors
    /// Returns `ApiError` on transport failure or an unexpected response.
    fn list_objects(&self, kind: ObjectKind, archived: bool) -> Result<Vec<Summary>>;

    /// Fetch the full representation of one object
    ///
    /// # Errors
    /// Returns `ApiError` on transport failure or if the object does not exist.
    fn get_object(&self, kind: ObjectKind, id: &str) -> Result<Record>;

    /// Create an object and return the server's representation of it
    ///
    /// # Errors
    /// Returns `ApiError::Rejected` if the server refuses the object.
    fn create_object(&self, kind: ObjectKind, body: &Value) -> Result<Record>;

    /// Replace an object with `record`
    ///
    /// # Errors
    /// Returns `ApiError::Rejected` if the server refuses the write.
    fn put_object(&self, kind: ObjectKind, record: &Record) -> Result<Record>;

    /// Delete an object permanently
    ///
    /// # Errors
    /// Returns `ApiError` if the request fails.
    fn delete_object(&self, kind: ObjectKind, id: &str) -> Result<()>;

    /// Set or clear the archived flag on several objects at once
    ///
    /// # Errors
    /// Returns `ApiError` if the request fails.
    fn set_objects_archive(&self, kind: ObjectKind, ids: &[String], archive: bool) -> Result<()>;

    /// Whether the current session can access the API
    fn test_auth(&self) -> bool;

    /// Download one object rendered as a GPX or KML document
    ///
    /// # Errors
    /// Returns `ApiError::NotFound` if the object does not exist, or
    /// `ApiError::Rejected` if the server cannot render it.
    fn export_object(&self, kind: ObjectKind, id: &str, format: ExportFormat) -> Result<Vec<u8>>;

    /// Issue an arbitrary request under `path` relative to the base URL
    ///
    /// Any status is returned as-is.
    ///
    /// # Errors
    /// Returns `ApiError::Http` only on transport failure.
    fn raw_request(
        &self,
        method: QueryMethod,
        path: &str,
        params: &[(String, String)],
    ) -> Result<RawResponse>;

    /// Fetch an object by id, or by exact title when `name_or_id` is not an id
    ///
    /// # Errors
    /// Returns `ApiError::NotFound` if no object has that title.
    fn get_object_by_name(&self, kind: ObjectKind, name_or_id: &str) -> Result<Record> {
        if crate::select::is_id(name_or_id) {
            return self.get_object(kind, name_or_id);
        }
        let objects = self.list_objects(kind, true)?;
        let found = find(&objects, kind, "title", name_or_id)?;
        self.get_object(kind, &found.id)
    }

    /// File an object into a folder
    ///
    /// # Errors
    /// Returns `ApiError::NotFound` if the folder does not exist, or any error
    /// from writing the folder back.
    fn add_object_to_folder(&self, folder_id: &str, kind: ObjectKind, id: &str) -> Result<()> {
        self.update_folder_membership(folder_id, kind, id, true)
    }

    /// Take an object out of a folder (back to the top level)
    ///
    /// # Errors
    /// Returns `ApiError::NotFound` if the folder does not exist, or any error
    /// from writing the folder back.
    fn remove_object_from_folder(&self, folder_id: &str, kind: ObjectKind, id: &str) -> Result<()> {
        self.update_folder_membership(folder_id, kind, id, false)
    }

    #[doc(hidden)]
    fn update_folder_membership(
        &self,
        folder_id: &str,
        kind: ObjectKind,
        id: &str,
        add: bool,
    ) -> Result<()> {
        let folders = self.list_objects(ObjectKind::Folder, true)?;
        let folder = find(&folders, ObjectKind::Folder, "id", folder_id)?;
        let mut record = Record::from_value(serde_json::to_value(folder)?)?;
        let members = record
            .0
            .entry(kind.folder_key())
            .or_insert_with(|| Value::Array(Vec::new()));
        let Value::Array(ids) = members else {
            return Err(ApiError::Decode(format!(
                "folder {folder_id} has a malformed {} list",
                kind.folder_key()
            )));
        };
        let present = ids.iter().any(|v| v.as_str() == Some(id));
        if add && !present {
            ids.push(Value::String(id.to_string()));
        } else if !add {
            ids.retain(|v| v.as_str() != Some(id));
        }
        debug!(folder = folder_id, %kind, id, add, "updating folder membership");
        self.put_object(ObjectKind::Folder, &record)?;
        Ok(())
    }
}
