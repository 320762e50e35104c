//! Folder hierarchy
//!
//! The server hands out folders as a flat list where each entry names its
//! parent. [`FolderTree::build`] indexes that list by id and links every
//! folder under its parent, or under a synthetic `/` root when it has none.
//! Children are recorded as ids, so hydrating a node in the index is seen by
//! every path that leads to it.
//!
//! [`FolderTree::resolve`] then walks the tree from the root and replaces each
//! folder descriptor with the server's full representation, including the
//! waypoints and tracks it contains. The root has no server object; its
//! contents are the top-level items.

mod error;

pub use error::TreeError;

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::api::{ObjectKind, Record, Remote, Summary};

/// Deepest nesting the resolver follows before giving up
pub const MAX_DEPTH: usize = 64;

/// Display name of the synthetic root
pub const ROOT_NAME: &str = "/";

/// One folder in the hierarchy (or the synthetic root)
#[derive(Debug, Clone, Default)]
pub struct FolderNode {
    /// Flat descriptor from the folder list; `None` for the root
    pub summary: Option<Summary>,
    /// Full representation, filled in by resolution
    pub detail: Option<Record>,
    /// Ids of direct subfolders, in list order
    pub subfolders: Vec<String>,
    pub waypoints: Vec<Summary>,
    pub tracks: Vec<Summary>,
}

impl FolderNode {
    /// Server id; `None` for the synthetic root
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.summary.as_ref().map(|s| s.id.as_str())
    }

    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.summary.is_none()
    }

    #[must_use]
    pub fn name(&self) -> &str {
        if let Some(detail) = &self.detail {
            let title = detail.title();
            if !title.is_empty() {
                return title;
            }
        }
        self.summary.as_ref().map_or(ROOT_NAME, |s| s.title.as_str())
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.is_root() || self.detail.is_some()
    }
}

/// Parent-indexed folder hierarchy rooted at `/`
#[derive(Debug, Clone, Default)]
pub struct FolderTree {
    root: FolderNode,
    nodes: HashMap<String, FolderNode>,
}

impl FolderTree {
    /// Link a flat folder list into a hierarchy
    ///
    /// # Errors
    /// Returns `TreeError::UnknownParent` if a folder's parent is not listed.
    pub fn build(folders: &[Summary]) -> Result<Self, TreeError> {
        let mut nodes: HashMap<String, FolderNode> = folders
            .iter()
            .map(|f| {
                let node = FolderNode {
                    summary: Some(f.clone()),
                    ..FolderNode::default()
                };
                (f.id.clone(), node)
            })
            .collect();
        let mut root = FolderNode::default();

        for folder in folders {
            let parent = match folder.parent_id() {
                Some(parent_id) => nodes.get_mut(parent_id).ok_or_else(|| TreeError::UnknownParent {
                    folder: folder.title.clone(),
                    parent: parent_id.to_string(),
                })?,
                None => &mut root,
            };
            if !parent.subfolders.contains(&folder.id) {
                parent.subfolders.push(folder.id.clone());
            }
        }

        Ok(Self { root, nodes })
    }

    #[must_use]
    pub const fn root(&self) -> &FolderNode {
        &self.root
    }

    #[must_use]
    pub fn node(&self, id: &str) -> Option<&FolderNode> {
        self.nodes.get(id)
    }

    /// Number of indexed folders (the root is not counted)
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Direct subfolders of `node`
    pub fn children<'a>(&'a self, node: &'a FolderNode) -> impl Iterator<Item = &'a FolderNode> + 'a {
        node.subfolders.iter().filter_map(|id| self.nodes.get(id))
    }

    /// Hydrate every folder reachable from the root, depth first
    ///
    /// Each node is resolved before its subfolders. Folder nodes take the
    /// server's full representation and keep their subfolder links; the root
    /// collects the top-level waypoints and tracks.
    ///
    /// # Errors
    /// * `TreeError::Api` if a fetch fails.
    /// * `TreeError::Cycle` if a folder is reached twice.
    /// * `TreeError::TooDeep` if nesting exceeds [`MAX_DEPTH`].
    pub fn resolve(&mut self, remote: &dyn Remote) -> Result<(), TreeError> {
        debug!("resolving root folder");
        self.root.waypoints = top_level(remote, ObjectKind::Waypoint)?;
        self.root.tracks = top_level(remote, ObjectKind::Track)?;

        let mut visited: HashSet<String> = HashSet::new();
        let mut stack: Vec<(String, usize)> = self
            .root
            .subfolders
            .iter()
            .rev()
            .map(|id| (id.clone(), 1))
            .collect();

        while let Some((id, depth)) = stack.pop() {
            if depth > MAX_DEPTH {
                return Err(TreeError::TooDeep {
                    folder: id,
                    max: MAX_DEPTH,
                });
            }
            if !visited.insert(id.clone()) {
                return Err(TreeError::Cycle(id));
            }

            debug!(folder = %id, depth, "resolving folder");
            let detail = remote.get_object(ObjectKind::Folder, &id)?;
            let Some(node) = self.nodes.get_mut(&id) else {
                continue;
            };
            node.waypoints = detail.embedded("waypoints");
            node.tracks = detail.embedded("tracks");
            node.detail = Some(detail);

            stack.extend(node.subfolders.iter().rev().map(|child| (child.clone(), depth + 1)));
        }

        if visited.len() < self.nodes.len() {
            warn!(
                unreachable = self.nodes.len() - visited.len(),
                "some folders are not reachable from the root; their parent links form a cycle"
            );
        }
        Ok(())
    }
}

fn top_level(remote: &dyn Remote, kind: ObjectKind) -> Result<Vec<Summary>, TreeError> {
    Ok(remote
        .list_objects(kind, true)?
        .into_iter()
        .filter(Summary::is_top_level)
        .collect())
}

/// Build the folder hierarchy from a flat list
///
/// # Errors
/// See [`FolderTree::build`].
pub fn build(folders: &[Summary]) -> Result<FolderTree, TreeError> {
    FolderTree::build(folders)
}

/// Hydrate a built tree from the server
///
/// # Errors
/// See [`FolderTree::resolve`].
pub fn resolve(remote: &dyn Remote, mut tree: FolderTree) -> Result<FolderTree, TreeError> {
    tree.resolve(remote)?;
    Ok(tree)
}
