//! Object selection
//!
//! Turns the names, ids and patterns a user typed into concrete server
//! objects. Selectors that look like ids are looked up exactly; other
//! selectors are exact titles, or regular expressions when pattern matching
//! is enabled. An optional [`DateRange`] narrows the result by creation time.
//!
//! Bulk commands (remove, archive, move) run on whatever this returns, so an
//! invocation with no selectors that would select the whole collection is
//! refused with [`SelectError::SafetyAbort`].

mod date;
mod error;

pub use date::{DateRange, parse_timestamp};
pub use error::SelectError;

use std::collections::HashSet;

use chrono::{DateTime, Local, TimeZone, Utc};
use regex::Regex;
use tracing::debug;

use crate::api::{ObjectKind, Remote, Summary};
use crate::TrailError;

/// Lengths of the two id spellings the service uses (with and without hyphens)
const ID_LENGTHS: [usize; 2] = [32, 36];

/// Detect if a string is likely an API identifier
///
/// # Examples
/// ```
/// # use trailhead::select::is_id;
/// assert!(is_id("0c94be3d-6fd9-45a0-9ca5-e8fd6969b7d3"));
/// assert!(is_id("0b00901f6549abf8a8b7de8b49d24894"));
/// assert!(!is_id("Camp by the lake"));
/// ```
#[must_use]
pub fn is_id(candidate: &str) -> bool {
    ID_LENGTHS.contains(&candidate.len())
        && candidate.chars().all(|c| c.is_ascii_hexdigit() || c == '-')
}

/// Creation time of a listed object, if it carries a parseable one
#[must_use]
pub fn created_at(object: &Summary) -> Option<DateTime<Utc>> {
    object.time_created().and_then(parse_timestamp)
}

/// What the user asked for
#[derive(Debug, Clone, Default)]
pub struct Criteria {
    selectors: Vec<String>,
    pattern: bool,
    dates: Option<DateRange>,
}

impl Criteria {
    #[must_use]
    pub fn new<I, S>(selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            selectors: selectors.into_iter().map(Into::into).collect(),
            pattern: false,
            dates: None,
        }
    }

    /// Treat non-id selectors as regular expressions
    #[must_use]
    pub const fn pattern(mut self, v: bool) -> Self {
        self.pattern = v;
        self
    }

    /// Keep only objects created inside this range
    #[must_use]
    pub const fn dates(mut self, range: Option<DateRange>) -> Self {
        self.dates = range;
        self
    }

    #[must_use]
    pub fn selectors(&self) -> &[String] {
        &self.selectors
    }
}

/// Select from `objects`, comparing dates in the local time zone
///
/// # Errors
/// See [`select_in`].
pub fn select(objects: &[Summary], kind: ObjectKind, criteria: &Criteria) -> Result<Vec<Summary>, SelectError> {
    select_in(objects, kind, criteria, &Local)
}

/// Select from `objects`, comparing dates in `tz`
///
/// # Errors
/// * `SelectError::NotFound` if an id or exact title matches nothing.
/// * `SelectError::InvalidPattern` if a selector is not a valid regex.
/// * `SelectError::SafetyAbort` if no selectors were given and the date
///   filter (if any) did not narrow the collection.
pub fn select_in<Tz: TimeZone>(
    objects: &[Summary],
    kind: ObjectKind,
    criteria: &Criteria,
    tz: &Tz,
) -> Result<Vec<Summary>, SelectError> {
    let mut matched: Vec<&Summary> = if criteria.selectors.is_empty() {
        objects.iter().collect()
    } else {
        let mut matched = Vec::new();
        for selector in &criteria.selectors {
            if is_id(selector) {
                let found = objects
                    .iter()
                    .find(|o| &o.id == selector)
                    .ok_or_else(|| SelectError::not_found(kind, selector))?;
                matched.push(found);
            } else if criteria.pattern {
                let re = Regex::new(selector).map_err(|e| SelectError::InvalidPattern {
                    pattern: selector.clone(),
                    reason: e.to_string(),
                })?;
                let before = matched.len();
                matched.extend(objects.iter().filter(|o| re.is_match(&o.title)));
                debug!(pattern = %selector, hits = matched.len() - before, "pattern selector");
            } else {
                let found = objects
                    .iter()
                    .find(|o| &o.title == selector)
                    .ok_or_else(|| SelectError::not_found(kind, selector))?;
                matched.push(found);
            }
        }
        matched
    };

    if let Some(range) = &criteria.dates {
        matched.retain(|o| created_at(o).is_some_and(|ts| range.contains_in(ts, tz)));
    }

    if criteria.selectors.is_empty() && matched.len() == objects.len() {
        return Err(SelectError::SafetyAbort { kind });
    }

    let mut seen = HashSet::new();
    Ok(matched
        .into_iter()
        .filter(|o| seen.insert(o.id.as_str()))
        .cloned()
        .collect())
}

/// List every object of `kind` on the server and select from it
///
/// # Errors
/// Returns `TrailError` if listing fails or selection is refused.
pub fn resolve(remote: &dyn Remote, kind: ObjectKind, criteria: &Criteria) -> Result<Vec<Summary>, TrailError> {
    let objects = remote.list_objects(kind, true)?;
    Ok(select(&objects, kind, criteria)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn waypoints() -> Vec<Summary> {
        let mut w1 = Summary::new("001", "wpt1");
        w1.time_created = Some("2019-05-01T12:00:00Z".into());
        let mut w2 = Summary::new("002", "wpt2");
        w2.folder = Some("101".into());
        let mut w3 = Summary::new("003", "wpt3");
        w3.properties
            .insert("time_created".into(), "2015-10-21T12:00:00Z".into());
        let other = Summary::new("004", "camp");
        vec![w1, w2, w3, other]
    }

    fn ids(selected: &[Summary]) -> Vec<&str> {
        selected.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn test_is_id() {
        let ids = [
            "0b00901f6549abf8a8b7de8b49d24894",
            "0c94be3d-6fd9-45a0-9ca5-e8fd6969b7d3",
        ];
        let not_ids = [
            "0b00901f6549abf8a8b7de8b49d2489z",
            "0c94be3d-6fd9-45a0-9ca5-e8fd6969b7dz",
            "0b00901f6549abf8a8b7de8b49d2489",
            "0b00901f6549abf8a8b7de8b49d248933",
            "0c94be3d-6fd9-45a0-9ca5:e8fd6969b7dz",
            "0c94be3d-6fd9-45a0-9ca5 e8fd6969b7dz",
            "This is a name",
            "name",
        ];
        for i in ids {
            assert!(is_id(i), "{i}");
        }
        for i in not_ids {
            assert!(!is_id(i), "{i}");
        }
    }

    #[test]
    fn test_empty_selection_is_refused() {
        let err = select_in(&waypoints(), ObjectKind::Waypoint, &Criteria::default(), &Utc).unwrap_err();
        assert!(err.is_safety_abort());
    }

    #[test]
    fn test_exact_title() {
        let selected = select_in(&waypoints(), ObjectKind::Waypoint, &Criteria::new(["wpt2"]), &Utc).unwrap();
        assert_eq!(ids(&selected), vec!["002"]);
    }

    #[test]
    fn test_exact_title_missing() {
        let err = select_in(&waypoints(), ObjectKind::Waypoint, &Criteria::new(["wpt7"]), &Utc).unwrap_err();
        assert!(matches!(err, SelectError::NotFound { .. }));
        assert_eq!(err.to_string(), "waypoint wpt7 not found");
    }

    #[test]
    fn test_pattern_matches_many_or_none() {
        let criteria = Criteria::new(["w.*"]).pattern(true);
        let selected = select_in(&waypoints(), ObjectKind::Waypoint, &criteria, &Utc).unwrap();
        assert_eq!(ids(&selected), vec!["001", "002", "003"]);

        let criteria = Criteria::new(["^zzz"]).pattern(true);
        assert!(select_in(&waypoints(), ObjectKind::Waypoint, &criteria, &Utc).unwrap().is_empty());
    }

    #[test]
    fn test_pattern_is_unanchored_search() {
        let criteria = Criteria::new(["t2"]).pattern(true);
        let selected = select_in(&waypoints(), ObjectKind::Waypoint, &criteria, &Utc).unwrap();
        assert_eq!(ids(&selected), vec!["002"]);
    }

    #[test]
    fn test_invalid_pattern() {
        let criteria = Criteria::new(["w(["]).pattern(true);
        let err = select_in(&waypoints(), ObjectKind::Waypoint, &criteria, &Utc).unwrap_err();
        assert!(matches!(err, SelectError::InvalidPattern { .. }));
    }

    #[test]
    fn test_id_lookup() {
        let mut objs = waypoints();
        let long_id = "0c94be3d-6fd9-45a0-9ca5-e8fd6969b7d3";
        objs.push(Summary::new(long_id, "by id"));
        let selected = select_in(&objs, ObjectKind::Waypoint, &Criteria::new([long_id]), &Utc).unwrap();
        assert_eq!(selected[0].title, "by id");

        let missing = "0b00901f6549abf8a8b7de8b49d24894";
        assert!(select_in(&objs, ObjectKind::Waypoint, &Criteria::new([missing]), &Utc).is_err());
    }

    #[test]
    fn test_date_filter_narrows_full_list() {
        let range = DateRange::parse("2015-10-21").unwrap();
        let criteria = Criteria::default().dates(Some(range));
        let selected = select_in(&waypoints(), ObjectKind::Waypoint, &criteria, &Utc).unwrap();
        assert_eq!(ids(&selected), vec!["003"]);
    }

    #[test]
    fn test_date_filter_that_matches_everything_is_refused() {
        let objs: Vec<Summary> = waypoints()
            .into_iter()
            .map(|mut o| {
                o.time_created = Some("2015-10-21T12:00:00Z".into());
                o
            })
            .collect();
        let criteria = Criteria::default().dates(Some(DateRange::parse("2015-10-21").unwrap()));
        assert!(select_in(&objs, ObjectKind::Waypoint, &criteria, &Utc).unwrap_err().is_safety_abort());
    }

    #[test]
    fn test_date_filter_with_selectors() {
        let criteria = Criteria::new(["w.*"])
            .pattern(true)
            .dates(Some(DateRange::parse("2019-01-01:2019-12-31").unwrap()));
        let selected = select_in(&waypoints(), ObjectKind::Waypoint, &criteria, &Utc).unwrap();
        assert_eq!(ids(&selected), vec!["001"]);
    }

    #[test]
    fn test_date_filter_matching_nothing_is_empty_not_error() {
        let criteria = Criteria::default().dates(Some(DateRange::parse("2001-01-01").unwrap()));
        let selected = select_in(&waypoints(), ObjectKind::Waypoint, &criteria, &Utc).unwrap();
        assert!(selected.is_empty());
    }

    #[test]
    fn test_duplicate_selectors_select_once() {
        let criteria = Criteria::new(["wpt1", "w.*1"]).pattern(true);
        let selected = select_in(&waypoints(), ObjectKind::Waypoint, &criteria, &Utc).unwrap();
        assert_eq!(ids(&selected), vec!["001"]);
    }
}
