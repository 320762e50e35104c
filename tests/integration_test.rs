//! Integration tests for trailhead
//!
//! These tests drive the public library API against an in-memory server and
//! check the complete selection, tree and bulk-edit workflows.

use std::cell::RefCell;
use std::io;

use clap::Parser;
use serde_json::{Value, json};
use tempfile::TempDir;
use trailhead::{
    TrailError,
    api::{ApiError, ExportFormat, ObjectKind, QueryMethod, RawResponse, Record, Remote, Summary},
    cli::Cli,
    commands::{self, Context},
    config::TrailConfig,
    edit::{self, EditSchema, EditSnapshot},
    output,
    select::{self, Criteria},
    tree,
    ui::{BufferWriter, UserInput},
};

type ApiResult<T> = Result<T, ApiError>;

/// Server state: every object with its kind, in insertion order
#[derive(Default)]
struct MemoryRemote {
    objects: RefCell<Vec<(ObjectKind, Record)>>,
    puts: RefCell<Vec<String>>,
}

impl MemoryRemote {
    fn with(self, kind: ObjectKind, value: Value) -> Self {
        let Value::Object(map) = value else {
            panic!("fixtures are JSON objects");
        };
        self.objects.borrow_mut().push((kind, Record::new(map)));
        self
    }

    fn record(&self, kind: ObjectKind, id: &str) -> Option<Record> {
        self.objects
            .borrow()
            .iter()
            .find(|(k, r)| *k == kind && r.id() == Some(id))
            .map(|(_, r)| r.clone())
    }

    fn bump_revision(&self, id: &str) {
        let mut objects = self.objects.borrow_mut();
        let (_, record) = objects
            .iter_mut()
            .find(|(_, r)| r.id() == Some(id))
            .expect("object exists");
        record.properties_mut().insert("revision".into(), json!("99"));
    }
}

impl Remote for MemoryRemote {
    fn list_objects(&self, kind: ObjectKind, archived: bool) -> ApiResult<Vec<Summary>> {
        self.objects
            .borrow()
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, r)| serde_json::from_value::<Summary>(r.clone().into_value()).map_err(ApiError::from))
            .filter(|s| archived || s.as_ref().is_ok_and(|s| !s.deleted))
            .collect()
    }

    fn get_object(&self, kind: ObjectKind, id: &str) -> ApiResult<Record> {
        let mut record = self.record(kind, id).ok_or_else(|| ApiError::NotFound {
            kind,
            field: "id",
            value: id.to_string(),
        })?;
        if kind == ObjectKind::Folder {
            for member in [ObjectKind::Waypoint, ObjectKind::Track] {
                let contained: Vec<Value> = self
                    .objects
                    .borrow()
                    .iter()
                    .filter(|(k, r)| *k == member && r.get("folder").and_then(Value::as_str) == Some(id))
                    .map(|(_, r)| r.clone().into_value())
                    .collect();
                record
                    .properties_mut()
                    .insert(member.plural().into(), Value::Array(contained));
            }
        }
        Ok(record)
    }

    fn create_object(&self, kind: ObjectKind, body: &Value) -> ApiResult<Record> {
        let mut record = Record::from_value(body.clone())?;
        let id = format!("{:032x}", self.objects.borrow().len() + 1);
        record.0.insert("id".into(), json!(id));
        self.objects.borrow_mut().push((kind, record.clone()));
        Ok(record)
    }

    fn put_object(&self, kind: ObjectKind, record: &Record) -> ApiResult<Record> {
        let id = record.id().unwrap_or_default().to_string();
        self.puts.borrow_mut().push(id.clone());
        let mut objects = self.objects.borrow_mut();
        let slot = objects
            .iter_mut()
            .find(|(k, r)| *k == kind && r.id() == Some(id.as_str()))
            .ok_or(ApiError::Rejected {
                status: 404,
                context: format!("put {kind} {id}"),
            })?;
        slot.1 = record.clone();
        Ok(record.clone())
    }

    fn delete_object(&self, kind: ObjectKind, id: &str) -> ApiResult<()> {
        self.objects
            .borrow_mut()
            .retain(|(k, r)| !(*k == kind && r.id() == Some(id)));
        Ok(())
    }

    fn set_objects_archive(&self, kind: ObjectKind, ids: &[String], archive: bool) -> ApiResult<()> {
        for (_, record) in self
            .objects
            .borrow_mut()
            .iter_mut()
            .filter(|(k, r)| *k == kind && r.id().is_some_and(|id| ids.iter().any(|i| i == id)))
        {
            record.0.insert("deleted".into(), json!(archive));
        }
        Ok(())
    }

    fn test_auth(&self) -> bool {
        true
    }

    fn export_object(&self, kind: ObjectKind, id: &str, _format: ExportFormat) -> ApiResult<Vec<u8>> {
        let record = self.get_object(kind, id)?;
        Ok(serde_json::to_vec(&record)?)
    }

    fn raw_request(&self, _method: QueryMethod, path: &str, _params: &[(String, String)]) -> ApiResult<RawResponse> {
        Err(ApiError::Rejected {
            status: 501,
            context: format!("query {path}"),
        })
    }
}

/// Never on a terminal; declines every prompt
struct Batch;

impl UserInput for Batch {
    fn is_interactive(&self) -> bool {
        false
    }

    fn confirm(&self, _prompt: &str, _default: bool) -> io::Result<bool> {
        Ok(false)
    }

    fn password(&self, _prompt: &str) -> io::Result<String> {
        Err(io::Error::other("no terminal"))
    }
}

fn waypoint(id: &str, title: &str, folder: &str, created: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "folder": folder,
        "deleted": false,
        "time_created": created,
        "properties": {
            "title": title,
            "notes": "",
            "icon": "blue-pin-down.png",
            "public": false,
            "revision": 1,
        },
    })
}

fn server() -> MemoryRemote {
    MemoryRemote::default()
        .with(ObjectKind::Folder, json!({ "id": "f1", "title": "Cascades", "parent": null, "waypoints": ["w1", "w2"] }))
        .with(ObjectKind::Folder, json!({ "id": "f2", "title": "2019", "parent": "f1" }))
        .with(ObjectKind::Waypoint, waypoint("w1", "Camp Muir", "f1", "2019-07-04T15:00:00Z"))
        .with(ObjectKind::Waypoint, waypoint("w2", "Paradise", "f1", "2019-07-04T09:30:00Z"))
        .with(ObjectKind::Waypoint, waypoint("w3", "Trailhead lot", "", "2020-01-02T10:00:00Z"))
        .with(ObjectKind::Track, waypoint("t1", "Skyline loop", "f2", "2019-07-05T08:00:00Z"))
}

/// Run a command line against `remote`, returning everything printed
fn run(remote: &MemoryRemote, config: &TrailConfig, args: &[&str]) -> Result<String, TrailError> {
    let cli = Cli::try_parse_from(std::iter::once("trailhead").chain(args.iter().copied()))
        .expect("command line parses");
    let out = BufferWriter::new();
    let ctx = Context {
        remote,
        config,
        input: &Batch,
        out: &out,
    };
    commands::execute(cli.command.as_ref().expect("a command"), &ctx)?;
    Ok(out.text())
}

#[test]
fn test_selection_refuses_everything() {
    let remote = server();
    let err = select::resolve(&remote, ObjectKind::Waypoint, &Criteria::default()).unwrap_err();
    assert!(matches!(err, TrailError::Select(e) if e.is_safety_abort()));

    assert!(Cli::try_parse_from(["trailhead", "waypoint", "remove"]).is_err());
}

#[test]
fn test_selection_by_pattern_and_date() {
    let remote = server();
    let criteria = Criteria::new(["^(Camp|Para)"]).pattern(true);
    let selected = select::resolve(&remote, ObjectKind::Waypoint, &criteria).unwrap();
    let titles: Vec<&str> = selected.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Camp Muir", "Paradise"]);

    let by_date = Criteria::new(Vec::<String>::new())
        .dates(Some(select::DateRange::parse("2020-01-01:2020-12-31").unwrap()));
    let selected = select::select_in(
        &remote.list_objects(ObjectKind::Waypoint, true).unwrap(),
        ObjectKind::Waypoint,
        &by_date,
        &chrono::Utc,
    )
    .unwrap();
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].id, "w3");
}

#[test]
fn test_tree_resolves_nested_folders() {
    let remote = server();
    let folders = remote.list_objects(ObjectKind::Folder, true).unwrap();
    let resolved = tree::resolve(&remote, tree::build(&folders).unwrap()).unwrap();

    let cascades = resolved.node("f1").unwrap();
    assert_eq!(cascades.waypoints.len(), 2);
    assert_eq!(resolved.node("f2").unwrap().tracks[0].title, "Skyline loop");
    assert_eq!(resolved.root().waypoints.len(), 1);

    let rendered = output::render_tree(&resolved, false);
    assert!(rendered.starts_with("/\n├── Cascades/\n"));
    assert!(rendered.contains("[T] Skyline loop"));
    assert!(rendered.ends_with("└── [W] Trailhead lot\n"));
}

#[test]
fn test_bulk_edit_applies_and_reports_conflicts() {
    let remote = server();
    let schema = EditSchema::default();
    let items = select::resolve(
        &remote,
        ObjectKind::Waypoint,
        &Criteria::new(["Camp Muir", "Paradise"]),
    )
    .unwrap();

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("waypoints.yml");
    edit::dump(&remote, ObjectKind::Waypoint, &items, &schema)
        .unwrap()
        .write_to(&path)
        .unwrap();

    let mut snapshot = EditSnapshot::read_from(&path).unwrap();
    for entry in snapshot.entries_mut() {
        entry["properties"]["notes"] = json!("checked 2019");
    }
    remote.bump_revision("w2");

    let report = edit::apply(&remote, ObjectKind::Waypoint, &items, &snapshot, &schema).unwrap();
    assert_eq!(report.applied.len(), 1);
    assert_eq!(report.conflicts.len(), 1);
    assert_eq!(report.conflicts[0].id, "w2");
    assert_eq!(remote.puts.borrow().as_slice(), ["w1"]);

    let w1 = remote.record(ObjectKind::Waypoint, "w1").unwrap();
    assert_eq!(w1.properties().unwrap()["notes"], "checked 2019");
    assert_eq!(w1.properties().unwrap()["icon"], "blue-pin-down.png");
    let w2 = remote.record(ObjectKind::Waypoint, "w2").unwrap();
    assert_eq!(w2.properties().unwrap()["notes"], "");
}

#[test]
fn test_bulk_edit_rejects_added_fields() {
    let remote = server();
    let schema = EditSchema::default();
    let items = select::resolve(&remote, ObjectKind::Waypoint, &Criteria::new(["Paradise"])).unwrap();
    let mut snapshot = edit::dump(&remote, ObjectKind::Waypoint, &items, &schema).unwrap();
    snapshot.entries_mut()[0]["properties"]["elevation"] = json!(1647);

    let err = edit::apply(&remote, ObjectKind::Waypoint, &items, &snapshot, &schema).unwrap_err();
    assert!(err.to_string().contains("properties.elevation"), "{err}");
    assert!(remote.puts.borrow().is_empty());
}

#[test]
fn test_commands_end_to_end() {
    let remote = server();
    let config = TrailConfig::default();

    let listed = run(&remote, &config, &["waypoint", "list", "--match", "^P"]).unwrap();
    assert!(listed.contains("| Paradise"));
    assert!(!listed.contains("Camp Muir"));

    run(&remote, &config, &["waypoint", "move", "Trailhead lot", "Cascades"]).unwrap();
    let folder = remote.record(ObjectKind::Folder, "f1").unwrap();
    assert_eq!(folder.get("waypoints").unwrap(), &json!(["w1", "w2", "w3"]));

    let skipped = run(&remote, &config, &["folder", "remove", "Cascades"]).unwrap();
    assert!(skipped.contains("is not empty; skipping."));
    assert!(remote.record(ObjectKind::Folder, "f1").is_some());

    run(&remote, &config, &["track", "archive", "Skyline loop"]).unwrap();
    let visible = remote.list_objects(ObjectKind::Track, false).unwrap();
    assert!(visible.is_empty());

    let dry = run(&remote, &config, &["waypoint", "rename", "Paradise", "Paradise Inn", "--dry-run"]).unwrap();
    assert_eq!(dry, commands::DRY_RUN);
    run(&remote, &config, &["waypoint", "rename", "Paradise", "Paradise Inn"]).unwrap();
    assert_eq!(remote.record(ObjectKind::Waypoint, "w2").unwrap().title(), "Paradise Inn");
}

#[test]
fn test_show_and_export() {
    let remote = server();
    let config = TrailConfig::default();

    let shown = run(&remote, &config, &["waypoint", "show", "Camp Muir", "-K", "title", "-K", "icon", "-f", ":"]).unwrap();
    assert_eq!(shown, "icon:blue-pin-down.png\ntitle:Camp Muir");

    let missing = run(&remote, &config, &["waypoint", "show", "Camp Muir", "-K", "elevation"]).unwrap_err();
    assert!(matches!(missing, TrailError::InvalidInput(_)));

    let exported = run(&remote, &config, &["waypoint", "export", "Camp Muir", "-"]).unwrap();
    assert!(exported.contains("\"Camp Muir\""));

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("skyline.gpx");
    let wrote = run(&remote, &config, &["track", "export", "Skyline loop", path.to_str().unwrap()]).unwrap();
    assert!(wrote.starts_with("Wrote "));
    assert!(std::fs::read_to_string(&path).unwrap().contains("Skyline loop"));
}
