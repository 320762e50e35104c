//! Testing utilities for trailhead
//!
//! This module provides [`FakeRemote`], an in-memory stand-in for the server
//! that stores full records, derives list entries from them the way the real
//! service does, and records every write so tests can assert on them.
//!
//! Only available when compiled with `cfg(test)`.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value, json};

use crate::api::{ApiError, ExportFormat, ObjectKind, QueryMethod, RawResponse, Record, Remote, Summary};

type Result<T> = std::result::Result<T, ApiError>;

/// A write issued against the fake
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create(ObjectKind, Value),
    Put(ObjectKind, String),
    Delete(ObjectKind, String),
    AddToFolder(String, ObjectKind, String),
    RemoveFromFolder(String, ObjectKind, String),
    Archive(ObjectKind, Vec<String>, bool),
    Query(QueryMethod, String, Vec<(String, String)>),
}

/// Build a waypoint or track record as the server would return it
#[must_use]
pub fn item(id: &str, title: &str, folder: Option<&str>) -> Value {
    json!({
        "id": id,
        "title": title,
        "folder": folder.unwrap_or(""),
        "deleted": false,
        "properties": {
            "title": title,
            "revision": "1",
            "notes": "",
            "icon": "blue-pin-down.png",
            "public": false,
        },
    })
}

/// Build a folder record
#[must_use]
pub fn folder(id: &str, title: &str, parent: Option<&str>) -> Value {
    json!({
        "id": id,
        "title": title,
        "parent": parent,
        "properties": { "name": title },
    })
}

/// In-memory server
#[derive(Default)]
pub struct FakeRemote {
    store: RefCell<HashMap<ObjectKind, Vec<Record>>>,
    calls: RefCell<Vec<Call>>,
    rejected: RefCell<HashSet<String>>,
    reads: RefCell<usize>,
    auth_denied: Cell<bool>,
}

impl FakeRemote {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a stored object
    ///
    /// # Panics
    /// Panics if `value` is not a JSON object.
    #[must_use]
    pub fn with(self, kind: ObjectKind, value: Value) -> Self {
        let record = Record::from_value(value).expect("fixture must be a JSON object");
        self.store.borrow_mut().entry(kind).or_default().push(record);
        self
    }

    /// Make the server refuse writes to this id
    pub fn reject_put(&self, id: &str) {
        self.rejected.borrow_mut().insert(id.to_string());
    }

    /// Make `test_auth` fail as it does for an expired session
    pub fn deny_auth(&self) {
        self.auth_denied.set(true);
    }

    /// Change a stored property behind the client's back
    ///
    /// # Panics
    /// Panics if the object does not exist.
    pub fn set_property(&self, kind: ObjectKind, id: &str, key: &str, value: Value) {
        let mut store = self.store.borrow_mut();
        let record = store
            .get_mut(&kind)
            .and_then(|records| records.iter_mut().find(|r| r.id() == Some(id)))
            .expect("object must exist");
        record.properties_mut().insert(key.to_string(), value);
    }

    /// Delete an object behind the client's back
    pub fn forget(&self, kind: ObjectKind, id: &str) {
        if let Some(records) = self.store.borrow_mut().get_mut(&kind) {
            records.retain(|r| r.id() != Some(id));
        }
    }

    /// Current stored state of an object
    ///
    /// # Panics
    /// Panics if the object does not exist.
    #[must_use]
    pub fn stored(&self, kind: ObjectKind, id: &str) -> Record {
        self.find(kind, id).expect("object must exist")
    }

    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// Ids written with `put_object`, in order
    #[must_use]
    pub fn puts(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::Put(_, id) => Some(id.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of read requests served
    #[must_use]
    pub fn reads(&self) -> usize {
        *self.reads.borrow()
    }

    fn find(&self, kind: ObjectKind, id: &str) -> Option<Record> {
        self.store
            .borrow()
            .get(&kind)
            .and_then(|records| records.iter().find(|r| r.id() == Some(id)).cloned())
    }

    fn records(&self, kind: ObjectKind) -> Vec<Record> {
        self.store.borrow().get(&kind).cloned().unwrap_or_default()
    }

    fn member_ids(&self, kind: ObjectKind, folder_id: &str) -> Vec<Value> {
        let key = if kind == ObjectKind::Folder { "parent" } else { "folder" };
        self.records(kind)
            .iter()
            .filter(|r| r.get(key).and_then(Value::as_str) == Some(folder_id))
            .filter_map(|r| r.id().map(|id| Value::String(id.to_string())))
            .collect()
    }

    fn summarize(&self, kind: ObjectKind, record: &Record) -> Summary {
        let mut value = record.clone().into_value();
        if kind == ObjectKind::Folder {
            let id = record.id().unwrap_or_default().to_string();
            value["waypoints"] = Value::Array(self.member_ids(ObjectKind::Waypoint, &id));
            value["tracks"] = Value::Array(self.member_ids(ObjectKind::Track, &id));
            value["children"] = Value::Array(self.member_ids(ObjectKind::Folder, &id));
            value["maps"] = Value::Array(Vec::new());
        }
        value["title"] = Value::String(record.title().to_string());
        serde_json::from_value(value).expect("fixture must deserialize as a summary")
    }

    fn log(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

impl Remote for FakeRemote {
    fn list_objects(&self, kind: ObjectKind, archived: bool) -> Result<Vec<Summary>> {
        *self.reads.borrow_mut() += 1;
        Ok(self
            .records(kind)
            .iter()
            .map(|r| self.summarize(kind, r))
            .filter(|s| archived || !s.deleted)
            .collect())
    }

    fn get_object(&self, kind: ObjectKind, id: &str) -> Result<Record> {
        *self.reads.borrow_mut() += 1;
        let mut record = self.find(kind, id).ok_or_else(|| ApiError::NotFound {
            kind,
            field: "id",
            value: id.to_string(),
        })?;
        if kind == ObjectKind::Folder {
            for member in [ObjectKind::Waypoint, ObjectKind::Track] {
                let contained: Vec<Value> = self
                    .records(member)
                    .into_iter()
                    .filter(|r| r.get("folder").and_then(Value::as_str) == Some(id))
                    .map(Record::into_value)
                    .collect();
                record
                    .properties_mut()
                    .insert(member.plural().to_string(), Value::Array(contained));
            }
        }
        Ok(record)
    }

    fn create_object(&self, kind: ObjectKind, body: &Value) -> Result<Record> {
        self.log(Call::Create(kind, body.clone()));
        let mut map = body.as_object().cloned().unwrap_or_else(Map::new);
        let id = format!("new-{}", self.records(kind).len() + 1);
        map.insert("id".into(), Value::String(id));
        let record = Record::new(map);
        self.store.borrow_mut().entry(kind).or_default().push(record.clone());
        Ok(record)
    }

    fn put_object(&self, kind: ObjectKind, record: &Record) -> Result<Record> {
        let id = record.id().unwrap_or_default().to_string();
        self.log(Call::Put(kind, id.clone()));
        if self.rejected.borrow().contains(&id) {
            return Err(ApiError::Rejected {
                status: 400,
                context: format!("put {kind} {id}"),
            });
        }
        let mut store = self.store.borrow_mut();
        let records = store.entry(kind).or_default();
        match records.iter_mut().find(|r| r.id() == Some(id.as_str())) {
            Some(existing) => *existing = record.clone(),
            None => records.push(record.clone()),
        }
        Ok(record.clone())
    }

    fn delete_object(&self, kind: ObjectKind, id: &str) -> Result<()> {
        self.log(Call::Delete(kind, id.to_string()));
        if let Some(records) = self.store.borrow_mut().get_mut(&kind) {
            records.retain(|r| r.id() != Some(id));
        }
        Ok(())
    }

    fn set_objects_archive(&self, kind: ObjectKind, ids: &[String], archive: bool) -> Result<()> {
        self.log(Call::Archive(kind, ids.to_vec(), archive));
        if let Some(records) = self.store.borrow_mut().get_mut(&kind) {
            for record in records.iter_mut().filter(|r| r.id().is_some_and(|id| ids.iter().any(|i| i == id))) {
                record.0.insert("deleted".into(), Value::Bool(archive));
            }
        }
        Ok(())
    }

    fn test_auth(&self) -> bool {
        !self.auth_denied.get()
    }

    /// A minimal document naming the object, e.g. `<gpx><name>wpt1</name></gpx>`
    fn export_object(&self, kind: ObjectKind, id: &str, format: ExportFormat) -> Result<Vec<u8>> {
        *self.reads.borrow_mut() += 1;
        let record = self.find(kind, id).ok_or_else(|| ApiError::NotFound {
            kind,
            field: "id",
            value: id.to_string(),
        })?;
        Ok(format!("<{format}><name>{}</name></{format}>", record.title()).into_bytes())
    }

    /// Answers every query with a JSON echo of the request
    fn raw_request(
        &self,
        method: QueryMethod,
        path: &str,
        params: &[(String, String)],
    ) -> Result<RawResponse> {
        self.log(Call::Query(method, path.to_string(), params.to_vec()));
        let echo = json!({
            "method": method.as_str(),
            "path": path,
            "params": params.iter().cloned().collect::<HashMap<_, _>>(),
        });
        Ok(RawResponse {
            status: 200,
            reason: "OK".into(),
            headers: vec![("content-type".into(), "application/json".into())],
            body: serde_json::to_vec(&echo)?,
        })
    }

    fn add_object_to_folder(&self, folder_id: &str, kind: ObjectKind, id: &str) -> Result<()> {
        self.find(ObjectKind::Folder, folder_id).ok_or_else(|| ApiError::NotFound {
            kind: ObjectKind::Folder,
            field: "id",
            value: folder_id.to_string(),
        })?;
        self.log(Call::AddToFolder(folder_id.to_string(), kind, id.to_string()));
        Ok(())
    }

    fn remove_object_from_folder(&self, folder_id: &str, kind: ObjectKind, id: &str) -> Result<()> {
        self.log(Call::RemoveFromFolder(folder_id.to_string(), kind, id.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_summary_lists_members() {
        let remote = FakeRemote::new()
            .with(ObjectKind::Folder, folder("101", "folder1", None))
            .with(ObjectKind::Waypoint, item("001", "wpt1", Some("101")));
        let folders = remote.list_objects(ObjectKind::Folder, true).unwrap();
        assert_eq!(folders[0].extra.get("waypoints"), Some(&json!(["001"])));
        assert!(folders[0].has_contents());
    }

    #[test]
    fn test_archived_hidden_on_request() {
        let mut archived = item("002", "wpt2", None);
        archived["deleted"] = json!(true);
        let remote = FakeRemote::new()
            .with(ObjectKind::Waypoint, item("001", "wpt1", None))
            .with(ObjectKind::Waypoint, archived);
        assert_eq!(remote.list_objects(ObjectKind::Waypoint, true).unwrap().len(), 2);
        assert_eq!(remote.list_objects(ObjectKind::Waypoint, false).unwrap().len(), 1);
    }

    #[test]
    fn test_rejected_put_is_not_stored() {
        let remote = FakeRemote::new().with(ObjectKind::Waypoint, item("001", "wpt1", None));
        remote.reject_put("001");
        let mut record = remote.get_object(ObjectKind::Waypoint, "001").unwrap();
        record.properties_mut().insert("title".into(), json!("changed"));
        assert!(remote.put_object(ObjectKind::Waypoint, &record).is_err());
        assert_eq!(remote.stored(ObjectKind::Waypoint, "001").title(), "wpt1");
    }
}
