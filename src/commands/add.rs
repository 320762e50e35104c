//! Create waypoints and folders

use tracing::{debug, info};

use super::{Context, DRY_RUN, Result};
use crate::TrailError;
use crate::api::{ApiError, ObjectKind, Record, make_folder, make_waypoint};
use crate::cli::{AddFolderArgs, AddWaypointArgs};
use crate::{icons, validate};

fn id_of(record: &Record, kind: ObjectKind) -> Result<String> {
    record
        .id()
        .map(str::to_string)
        .ok_or_else(|| ApiError::Decode(format!("created {kind} has no id")).into())
}

/// Look up an existing folder's id by name or id
fn folder_id(ctx: &Context, name: &str) -> Result<String> {
    let folder = ctx.remote.get_object_by_name(ObjectKind::Folder, name)?;
    id_of(&folder, ObjectKind::Folder)
}

/// Add a waypoint, optionally filing it into an existing or new folder
///
/// Coordinates are checked before anything is sent.
///
/// # Errors
/// Returns `TrailError::InvalidInput` for bad coordinates, or any error from
/// the server.
pub fn waypoint(ctx: &Context, args: &AddWaypointArgs) -> Result<()> {
    let invalid = |e: validate::CoordError| {
        TrailError::InvalidInput(format!("Unable to add waypoint: {e}"))
    };
    let lat = validate::latitude(&args.latitude).map_err(invalid)?;
    let lon = validate::longitude(&args.longitude).map_err(invalid)?;
    let alt = validate::altitude(&args.altitude).map_err(invalid)?;

    let existing = args
        .existing_folder
        .as_deref()
        .map(|name| folder_id(ctx, name))
        .transpose()?;

    let icon = icons::resolve(&args.icon);
    let body = make_waypoint(&args.name, lat, lon, alt, &args.notes, icon);
    debug!(%body, "new waypoint");
    if args.dry_run {
        ctx.out.write(DRY_RUN);
        return Ok(());
    }

    let created = ctx.remote.create_object(ObjectKind::Waypoint, &body)?;
    let waypoint_id = id_of(&created, ObjectKind::Waypoint)?;
    info!("Created waypoint {:?} ({waypoint_id})", args.name);

    let target = match (&existing, &args.new_folder) {
        (Some(id), _) => Some(id.clone()),
        (None, Some(name)) => {
            let folder = ctx
                .remote
                .create_object(ObjectKind::Folder, &make_folder(name))?;
            info!("Created folder {name:?}");
            Some(id_of(&folder, ObjectKind::Folder)?)
        }
        (None, None) => None,
    };
    if let Some(folder_id) = target {
        ctx.remote
            .add_object_to_folder(&folder_id, ObjectKind::Waypoint, &waypoint_id)?;
    }

    ctx.out.success(&format!("Added waypoint {:?}", args.name));
    Ok(())
}

/// Add a folder, optionally inside an existing one
///
/// # Errors
/// Returns `TrailError` if the parent folder does not exist or the server
/// refuses the change.
pub fn folder(ctx: &Context, args: &AddFolderArgs) -> Result<()> {
    let parent = args
        .existing_folder
        .as_deref()
        .map(|name| folder_id(ctx, name))
        .transpose()?;
    if args.dry_run {
        ctx.out.write(DRY_RUN);
        return Ok(());
    }

    let created = ctx
        .remote
        .create_object(ObjectKind::Folder, &make_folder(&args.name))?;
    let id = id_of(&created, ObjectKind::Folder)?;
    info!("Created folder {:?} ({id})", args.name);
    if let Some(parent) = parent {
        ctx.remote.add_object_to_folder(&parent, ObjectKind::Folder, &id)?;
    }
    ctx.out.success(&format!("Added folder {:?}", args.name));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixture::Harness;
    use crate::testing::{Call, FakeRemote, folder as folder_record};
    use serde_json::json;

    fn waypoint_args(lat: &str, lon: &str) -> AddWaypointArgs {
        AddWaypointArgs {
            name: "spring".into(),
            latitude: lat.into(),
            longitude: lon.into(),
            altitude: "0".into(),
            notes: String::new(),
            icon: String::new(),
            existing_folder: None,
            new_folder: None,
            dry_run: false,
        }
    }

    fn remote() -> FakeRemote {
        FakeRemote::new().with(ObjectKind::Folder, folder_record("101", "Trips", None))
    }

    #[test]
    fn test_add_waypoint() {
        let remote = remote();
        let harness = Harness::new();
        waypoint(&harness.ctx(&remote), &waypoint_args("45.5", "-122.25")).unwrap();
        let calls = remote.calls();
        assert_eq!(calls.len(), 1);
        let Call::Create(ObjectKind::Waypoint, body) = &calls[0] else {
            panic!("expected a create, got {calls:?}");
        };
        assert_eq!(body["geometry"]["coordinates"], json!([-122.25, 45.5, 0]));
        assert_eq!(harness.out.text(), "Added waypoint \"spring\"");
    }

    #[test]
    fn test_add_waypoint_icon_alias() {
        let remote = remote();
        let harness = Harness::new();
        let args = AddWaypointArgs {
            icon: "campsite".into(),
            ..waypoint_args("45.5", "-122.25")
        };
        waypoint(&harness.ctx(&remote), &args).unwrap();
        let calls = remote.calls();
        let Call::Create(_, body) = &calls[0] else {
            panic!("expected a create, got {calls:?}");
        };
        assert_eq!(body["properties"]["icon"], "campsite-24.png");
    }

    #[test]
    fn test_add_waypoint_to_existing_folder() {
        let remote = remote();
        let harness = Harness::new();
        let args = AddWaypointArgs {
            existing_folder: Some("Trips".into()),
            ..waypoint_args("45.5", "-122.25")
        };
        waypoint(&harness.ctx(&remote), &args).unwrap();
        assert_eq!(
            remote.calls()[1],
            Call::AddToFolder("101".into(), ObjectKind::Waypoint, "new-1".into())
        );
    }

    #[test]
    fn test_add_waypoint_to_new_folder() {
        let remote = remote();
        let harness = Harness::new();
        let args = AddWaypointArgs {
            new_folder: Some("Camps".into()),
            ..waypoint_args("45.5", "-122.25")
        };
        waypoint(&harness.ctx(&remote), &args).unwrap();
        let calls = remote.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[1], Call::Create(ObjectKind::Folder, json!({ "title": "Camps" })));
        assert_eq!(
            calls[2],
            Call::AddToFolder("new-2".into(), ObjectKind::Waypoint, "new-1".into())
        );
    }

    #[test]
    fn test_invalid_coordinates_send_nothing() {
        let remote = remote();
        let harness = Harness::new();
        for (lat, lon) in [("91", "0"), ("0", "-181"), ("north", "0")] {
            let err = waypoint(&harness.ctx(&remote), &waypoint_args(lat, lon)).unwrap_err();
            assert!(err.to_string().contains("Unable to add waypoint"), "{err}");
        }
        let bad_alt = AddWaypointArgs {
            altitude: "-5".into(),
            ..waypoint_args("0", "0")
        };
        assert!(waypoint(&harness.ctx(&remote), &bad_alt).is_err());
        assert!(remote.calls().is_empty());
    }

    #[test]
    fn test_add_waypoint_dry_run() {
        let remote = remote();
        let harness = Harness::new();
        let args = AddWaypointArgs {
            dry_run: true,
            new_folder: Some("Camps".into()),
            ..waypoint_args("1", "2")
        };
        waypoint(&harness.ctx(&remote), &args).unwrap();
        assert!(remote.calls().is_empty());
        assert_eq!(harness.out.text(), DRY_RUN);
    }

    #[test]
    fn test_add_folder_inside_existing() {
        let remote = remote();
        let harness = Harness::new();
        let args = AddFolderArgs {
            name: "Day hikes".into(),
            existing_folder: Some("Trips".into()),
            dry_run: false,
        };
        folder(&harness.ctx(&remote), &args).unwrap();
        assert_eq!(
            remote.calls(),
            vec![
                Call::Create(ObjectKind::Folder, json!({ "title": "Day hikes" })),
                Call::AddToFolder("101".into(), ObjectKind::Folder, "new-2".into()),
            ]
        );
    }

    #[test]
    fn test_add_folder_missing_parent() {
        let remote = remote();
        let harness = Harness::new();
        let args = AddFolderArgs {
            name: "Day hikes".into(),
            existing_folder: Some("Nowhere".into()),
            dry_run: false,
        };
        assert!(folder(&harness.ctx(&remote), &args).is_err());
        assert!(remote.calls().is_empty());
    }
}
