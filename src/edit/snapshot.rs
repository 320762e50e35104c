use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::debug;

use super::error::{EditError, Violation};
use super::schema::EditSchema;
use crate::api::{ObjectKind, Remote, Revision, Summary};

/// Editable fields of a selection, one entry per object in id order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditSnapshot {
    entries: Vec<Map<String, Value>>,
}

impl EditSnapshot {
    #[must_use]
    pub const fn new(entries: Vec<Map<String, Value>>) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn entries(&self) -> &[Map<String, Value>] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut [Map<String, Value>] {
        &mut self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize as a YAML sequence
    ///
    /// # Errors
    /// Returns `EditError::Parse` if serialization fails.
    pub fn to_yaml(&self) -> Result<String, EditError> {
        Ok(serde_yaml::to_string(&self.entries)?)
    }

    /// Parse a hand-edited YAML document
    ///
    /// # Errors
    /// * `EditError::Parse` if the text is not YAML.
    /// * `EditError::SchemaViolation` if it is not a sequence of mappings.
    pub fn from_yaml(text: &str) -> Result<Self, EditError> {
        let document: Value = serde_yaml::from_str(text)?;
        let Value::Array(items) = document else {
            return Err(Violation::NotAList.into());
        };
        let entries = items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Object(map) => Ok(map),
                _ => Err(Violation::NotAnEntry { position: i + 1 }),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }

    /// # Errors
    /// Returns `EditError` if the file cannot be written.
    pub fn write_to(&self, path: &Path) -> Result<(), EditError> {
        fs::write(path, self.to_yaml()?)?;
        debug!(path = %path.display(), entries = self.len(), "wrote edit file");
        Ok(())
    }

    /// # Errors
    /// Returns `EditError` if the file cannot be read or parsed.
    pub fn read_from(path: &Path) -> Result<Self, EditError> {
        Self::from_yaml(&fs::read_to_string(path)?)
    }
}

/// Revision recorded in a snapshot entry
#[must_use]
pub fn entry_revision(entry: &Map<String, Value>) -> Option<Revision> {
    entry
        .get("properties")
        .and_then(|p| p.get("revision"))
        .and_then(Revision::from_value)
}

#[must_use]
pub fn entry_id(entry: &Map<String, Value>) -> Option<&str> {
    entry.get("id").and_then(Value::as_str)
}

/// The order snapshots and apply agree on
#[must_use]
pub fn edit_order(items: &[Summary]) -> Vec<&Summary> {
    let mut ordered: Vec<&Summary> = items.iter().collect();
    ordered.sort_by(|a, b| a.id.cmp(&b.id));
    ordered
}

/// Fetch the current state of every item and project its editable fields
///
/// # Errors
/// Returns `EditError::Api` if a fetch fails.
pub fn dump(
    remote: &dyn Remote,
    kind: ObjectKind,
    items: &[Summary],
    schema: &EditSchema,
) -> Result<EditSnapshot, EditError> {
    let entries = edit_order(items)
        .into_iter()
        .map(|item| {
            let current = remote.get_object(kind, &item.id)?;
            Ok(schema.project(&current))
        })
        .collect::<Result<Vec<_>, EditError>>()?;
    Ok(EditSnapshot::new(entries))
}
