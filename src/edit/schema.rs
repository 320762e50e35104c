use serde_json::{Map, Value};

use super::error::Violation;
use crate::api::Record;

/// Keys of `properties` exposed for editing
pub const PROPERTY_KEYS: &[&str] = &["icon", "notes", "public", "title", "revision"];

/// How much of a top-level field the snapshot exposes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldRule {
    /// Copied whole; read back but never written to the server
    Verbatim,
    /// A mapping of which only these keys are exposed and writable
    Subset(&'static [&'static str]),
}

/// Which fields of a record appear in an edit snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSchema {
    fields: Vec<(&'static str, FieldRule)>,
}

impl Default for EditSchema {
    fn default() -> Self {
        Self {
            fields: vec![
                ("id", FieldRule::Verbatim),
                ("properties", FieldRule::Subset(PROPERTY_KEYS)),
            ],
        }
    }
}

impl EditSchema {
    #[must_use]
    pub const fn new(fields: Vec<(&'static str, FieldRule)>) -> Self {
        Self { fields }
    }

    #[must_use]
    pub fn rule(&self, field: &str) -> Option<&FieldRule> {
        self.fields
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, rule)| rule)
    }

    /// Copy the exposed fields of `record` into a snapshot entry
    #[must_use]
    pub fn project(&self, record: &Record) -> Map<String, Value> {
        let mut entry = Map::new();
        for (name, rule) in &self.fields {
            let Some(value) = record.get(name) else {
                continue;
            };
            match rule {
                FieldRule::Verbatim => {
                    entry.insert((*name).to_string(), value.clone());
                }
                FieldRule::Subset(keys) => {
                    let nested: Map<String, Value> = value
                        .as_object()
                        .map(|m| {
                            keys.iter()
                                .filter_map(|k| m.get(*k).map(|v| ((*k).to_string(), v.clone())))
                                .collect()
                        })
                        .unwrap_or_default();
                    entry.insert((*name).to_string(), Value::Object(nested));
                }
            }
        }
        entry
    }

    /// Reject keys the schema does not declare, at any level
    ///
    /// `position` is 1-based and only used in the error.
    ///
    /// # Errors
    /// Returns `Violation::UndeclaredField` or `Violation::NotAMapping`.
    pub fn validate(&self, position: usize, entry: &Map<String, Value>) -> Result<(), Violation> {
        for (key, value) in entry {
            match self.rule(key) {
                None => {
                    return Err(Violation::UndeclaredField {
                        position,
                        field: key.clone(),
                    });
                }
                Some(FieldRule::Verbatim) => {}
                Some(FieldRule::Subset(allowed)) => {
                    let Some(nested) = value.as_object() else {
                        return Err(Violation::NotAMapping {
                            position,
                            field: key.clone(),
                        });
                    };
                    if let Some(extra) = nested.keys().find(|k| !allowed.contains(&k.as_str())) {
                        return Err(Violation::UndeclaredField {
                            position,
                            field: format!("{key}.{extra}"),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Write the editable parts of a validated entry into `record`
    ///
    /// Verbatim fields are left as the server has them.
    pub fn merge(&self, entry: &Map<String, Value>, record: &mut Record) {
        for (key, value) in entry {
            let (Some(FieldRule::Subset(_)), Some(nested)) = (self.rule(key), value.as_object()) else {
                continue;
            };
            let target = record
                .0
                .entry(key.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if !target.is_object() {
                *target = Value::Object(Map::new());
            }
            if let Value::Object(target) = target {
                for (k, v) in nested {
                    target.insert(k.clone(), v.clone());
                }
            }
        }
    }
}
