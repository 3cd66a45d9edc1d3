/*!
 * Namespace Tree
 * Single-writer, in-memory hierarchical namespace rooted at "/"
 */

mod dir_ops;
mod file_ops;
mod metadata_ops;
mod validate;

use time::OffsetDateTime;
use tracing::debug;

use super::init::default_tree;
use super::paths::{self, split_parent};
use super::types::*;
use crate::config::{DEFAULT_DIR_MODE, ROOT_PATH};

pub use validate::{ValidateOptions, Validated};

/// Namespace tree owned by one session
///
/// Relative paths resolve against the working path. All mutation goes
/// through `&mut self`, so one logical operation runs at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceTree {
    root: Node,
    cwd: String,
}

impl NamespaceTree {
    /// Wrap an existing root directory
    pub fn new(root: Node) -> FsResult<Self> {
        if !root.is_dir() {
            return Err(FsError::CorruptSnapshot(
                "namespace root must be a directory".to_string(),
            ));
        }
        Ok(Self {
            root,
            cwd: ROOT_PATH.to_string(),
        })
    }

    /// Tree with the default layout (root, /home and bootstrap homes)
    pub fn with_default_layout() -> Self {
        Self {
            root: default_tree(OffsetDateTime::now_utc()),
            cwd: ROOT_PATH.to_string(),
        }
    }

    #[inline]
    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn into_root(self) -> Node {
        self.root
    }

    /// Current working path
    #[inline]
    pub fn cwd(&self) -> &str {
        &self.cwd
    }

    /// Resolve `path` against the working path
    #[inline]
    pub fn resolve(&self, path: &str) -> String {
        paths::resolve(path, &self.cwd)
    }

    /// Look up the node at `path`
    ///
    /// Returns `None` when a segment is missing or a file is traversed as a
    /// directory.
    pub fn get_node(&self, path: &str) -> Option<&Node> {
        let resolved = self.resolve(path);
        self.node_at(&resolved)
    }

    pub fn get_node_mut(&mut self, path: &str) -> Option<&mut Node> {
        let resolved = self.resolve(path);
        self.node_at_mut(&resolved)
    }

    /// Look up an already-resolved path
    pub(super) fn node_at(&self, resolved: &str) -> Option<&Node> {
        let mut node = &self.root;
        for segment in paths::segments(resolved) {
            node = node.child(segment)?;
        }
        Some(node)
    }

    pub(super) fn node_at_mut(&mut self, resolved: &str) -> Option<&mut Node> {
        let mut node = &mut self.root;
        for segment in paths::segments(resolved) {
            node = node.child_mut(segment)?;
        }
        Some(node)
    }

    /// Make sure every ancestor of `full_path` exists and return its parent
    ///
    /// Missing intermediate directories are created for `user` with the
    /// default directory mode. Nothing is created if the deepest existing
    /// ancestor denies write access or an intermediate component is a file.
    pub fn ensure_parents(&mut self, full_path: &str, user: &str) -> FsResult<&mut Node> {
        let resolved = self.resolve(full_path);
        let (parent_path, _) = split_parent(&resolved).ok_or_else(|| {
            FsError::InvalidPath("the root directory has no parent".to_string())
        })?;
        let wanted: Vec<&str> = paths::segments(parent_path).collect();

        // Plan: find how much of the chain exists before touching anything
        let mut existing = 0;
        let mut walked = String::new();
        let mut deepest = &self.root;
        for segment in &wanted {
            walked.push('/');
            walked.push_str(segment);
            match deepest.child(segment) {
                Some(child) if child.is_dir() => {
                    deepest = child;
                    existing += 1;
                }
                Some(_) => return Err(FsError::wrong_type(walked, NodeType::Directory)),
                None => break,
            }
        }

        if existing < wanted.len() && !has_permission(deepest, user, Access::Write) {
            let denied_at = if existing == 0 {
                ROOT_PATH.to_string()
            } else {
                format!("/{}", wanted[..existing].join("/"))
            };
            return Err(FsError::PermissionDenied(format!(
                "cannot create directory in '{}'",
                denied_at
            )));
        }

        // Apply
        let now = OffsetDateTime::now_utc();
        let mut node = &mut self.root;
        for (depth, segment) in wanted.iter().enumerate() {
            if depth >= existing {
                node.mtime = now;
                if let Some(children) = node.children_mut() {
                    children.insert(
                        segment.to_string(),
                        Node::directory(user, DEFAULT_DIR_MODE, now),
                    );
                }
                debug!(user = %user, segment = %segment, "created intermediate directory");
            }
            node = node
                .child_mut(segment)
                .ok_or_else(|| FsError::NotFound(parent_path.to_string()))?;
        }

        Ok(node)
    }

    /// Size of a subtree in bytes, 0 for `None`
    pub fn compute_size(node: Option<&Node>) -> u64 {
        node.map_or(0, Node::size)
    }

    /// Replace the whole tree, as on session restore
    ///
    /// The working path survives only if it still names a directory.
    pub fn replace_root(&mut self, root: Node) -> FsResult<()> {
        if !root.is_dir() {
            return Err(FsError::CorruptSnapshot(
                "namespace root must be a directory".to_string(),
            ));
        }
        self.root = root;
        if !self.node_at(&self.cwd).is_some_and(Node::is_dir) {
            self.cwd = ROOT_PATH.to_string();
        }
        Ok(())
    }

    /// Move to `path` if it names a directory, without permission checks
    ///
    /// Used when restoring a saved working path. Returns whether it moved.
    pub fn try_restore_cwd(&mut self, path: &str) -> bool {
        let resolved = paths::resolve(path, ROOT_PATH);
        if self.node_at(&resolved).is_some_and(Node::is_dir) {
            self.cwd = resolved;
            true
        } else {
            false
        }
    }
}

impl Default for NamespaceTree {
    fn default() -> Self {
        Self::with_default_layout()
    }
}
