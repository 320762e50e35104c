use std::fmt;

use tracing::{debug, info};

use super::error::{EditError, Violation};
use super::schema::EditSchema;
use super::snapshot::{EditSnapshot, edit_order, entry_id, entry_revision};
use crate::api::{ApiError, ObjectKind, Remote, Summary};

/// Why an entry was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// Server revision differs from the snapshot's, or one side has none
    Revision,
    /// The entry at this position names a different object
    Identity,
}

/// An entry left untouched on the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub kind: ConflictKind,
    pub object: ObjectKind,
    /// 1-based position in the snapshot
    pub position: usize,
    pub id: String,
    pub title: String,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self.kind {
            ConflictKind::Revision => "has changed on the server since the edit began",
            ConflictKind::Identity => "does not line up with its entry; the list order changed",
        };
        write!(f, "{} {} ({}) {reason}; not updated", self.object, self.position, self.title)
    }
}

/// An object written back successfully
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub position: usize,
    pub id: String,
    pub title: String,
}

/// Outcome of an apply that ran to completion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub applied: Vec<Applied>,
    pub conflicts: Vec<Conflict>,
}

impl ApplyReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty()
    }
}

/// Write an edited snapshot back over the objects it was taken from
///
/// `originals` is the selection the snapshot was dumped from; both sides are
/// matched by position after sorting by id. The whole snapshot is validated
/// before the first write. Conflicting entries are skipped and reported.
///
/// # Errors
/// * `EditError::SchemaViolation` for a count mismatch or an undeclared
///   field; nothing has been written.
/// * `EditError::Interrupted` if re-fetching or writing an object fails. It
///   carries the report of everything written or skipped up to that point.
pub fn apply(
    remote: &dyn Remote,
    kind: ObjectKind,
    originals: &[Summary],
    snapshot: &EditSnapshot,
    schema: &EditSchema,
) -> Result<ApplyReport, EditError> {
    if snapshot.len() != originals.len() {
        return Err(Violation::CountMismatch {
            found: snapshot.len(),
            expected: originals.len(),
        }
        .into());
    }
    for (i, entry) in snapshot.entries().iter().enumerate() {
        schema.validate(i + 1, entry)?;
    }

    let mut report = ApplyReport::default();
    for (i, (original, entry)) in edit_order(originals)
        .into_iter()
        .zip(snapshot.entries())
        .enumerate()
    {
        let position = i + 1;
        let interrupted = |report: ApplyReport, source: ApiError| EditError::Interrupted {
            kind,
            position,
            title: original.title.clone(),
            report,
            source,
        };
        let mut current = match remote.get_object(kind, &original.id) {
            Ok(current) => current,
            Err(source) => return Err(interrupted(report, source)),
        };
        let title = current.title().to_string();
        let conflict = |conflict_kind| Conflict {
            kind: conflict_kind,
            object: kind,
            position,
            id: original.id.clone(),
            title: title.clone(),
        };

        let server_rev = current.revision();
        let local_rev = entry_revision(entry);
        if server_rev.is_none() || server_rev != local_rev {
            debug!(
                position,
                server = ?server_rev.map(|r| r.to_string()),
                local = ?local_rev.map(|r| r.to_string()),
                "revision mismatch"
            );
            report.conflicts.push(conflict(ConflictKind::Revision));
            continue;
        }
        if current.id() != entry_id(entry) {
            debug!(position, server = ?current.id(), local = ?entry_id(entry), "id mismatch");
            report.conflicts.push(conflict(ConflictKind::Identity));
            continue;
        }

        schema.merge(entry, &mut current);
        if let Err(source) = remote.put_object(kind, &current) {
            return Err(interrupted(report, source));
        }
        info!(position, id = %original.id, "updated {kind}");
        report.applied.push(Applied {
            position,
            id: original.id.clone(),
            title,
        });
    }
    Ok(report)
}
