/*!
 * Directory Operations Implementation
 * Directory creation, listing, removal and the working path
 */

use time::OffsetDateTime;
use tracing::{debug, info};

use super::super::paths::{is_valid_name, split_parent};
use super::super::types::*;
use super::{NamespaceTree, ValidateOptions};
use crate::config::{DEFAULT_DIR_MODE, ROOT_PATH};

impl NamespaceTree {
    /// Change the working path
    ///
    /// The target must be a directory the user may execute.
    pub fn set_cwd(&mut self, path: &str, user: &str) -> FsResult<()> {
        let validated = self.validate(
            path,
            ValidateOptions::new()
                .expect(NodeType::Directory)
                .default_to_cwd(),
        )?;

        if let Some(node) = validated.node {
            if !has_permission(node, user, Access::Execute) {
                return Err(FsError::PermissionDenied(format!(
                    "cannot enter '{}'",
                    validated.resolved_path
                )));
            }
        }

        self.cwd = validated.resolved_path;
        Ok(())
    }

    /// Create a directory
    ///
    /// With `parents`, missing ancestors are created and an existing
    /// directory is not an error.
    pub fn make_dir(&mut self, path: &str, user: &str, parents: bool) -> FsResult<()> {
        let resolved = self.resolve(path);
        if resolved == ROOT_PATH {
            return if parents {
                Ok(())
            } else {
                Err(FsError::AlreadyExists(resolved))
            };
        }

        let (parent_path, name) = match split_parent(&resolved) {
            Some((parent, name)) if is_valid_name(name) => (parent.to_string(), name.to_string()),
            _ => return Err(FsError::AlreadyExists(resolved.clone())),
        };

        if let Some(existing) = self.node_at(&resolved) {
            if parents && existing.is_dir() {
                return Ok(());
            }
            return Err(FsError::AlreadyExists(resolved));
        }

        let parent = if parents {
            self.ensure_parents(&resolved, user)?
        } else {
            let parent = self
                .node_at_mut(&parent_path)
                .ok_or_else(|| FsError::NotFound(parent_path.clone()))?;
            if !parent.is_dir() {
                return Err(FsError::wrong_type(parent_path, NodeType::Directory));
            }
            parent
        };

        if !has_permission(parent, user, Access::Write) {
            return Err(FsError::PermissionDenied(format!(
                "cannot create directory '{}'",
                resolved
            )));
        }

        let now = OffsetDateTime::now_utc();
        parent.mtime = now;
        if let Some(children) = parent.children_mut() {
            children.insert(name, Node::directory(user, DEFAULT_DIR_MODE, now));
        }

        debug!(path = %resolved, user = %user, "directory created");
        Ok(())
    }

    /// List a directory as (name, type) pairs in name order
    pub fn list_dir(&self, path: &str, user: &str) -> FsResult<Vec<(String, NodeType)>> {
        let validated = self.validate(
            path,
            ValidateOptions::new()
                .expect(NodeType::Directory)
                .default_to_cwd(),
        )?;
        let node = validated
            .node
            .ok_or_else(|| FsError::NotFound(validated.resolved_path.clone()))?;

        if !has_permission(node, user, Access::Read) {
            return Err(FsError::PermissionDenied(format!(
                "cannot open directory '{}'",
                validated.resolved_path
            )));
        }

        Ok(node
            .children()
            .map(|children| {
                children
                    .iter()
                    .map(|(name, child)| (name.clone(), child.node_type()))
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Remove a file or directory
    ///
    /// Requires write access on the parent. The root is never removed.
    pub fn remove(&mut self, path: &str, user: &str, recursive: bool) -> FsResult<()> {
        let validated = self.validate(path, ValidateOptions::new().disallow_root())?;
        let resolved = validated.resolved_path;
        let non_empty_dir = validated
            .node
            .and_then(Node::children)
            .is_some_and(|children| !children.is_empty());

        if non_empty_dir && !recursive {
            return Err(FsError::NotEmpty(resolved));
        }

        let (parent_path, name) = split_parent(&resolved)
            .map(|(parent, name)| (parent.to_string(), name.to_string()))
            .ok_or_else(|| FsError::InvalidPath(resolved.clone()))?;

        let parent = self
            .node_at_mut(&parent_path)
            .ok_or_else(|| FsError::NotFound(parent_path.clone()))?;
        if !has_permission(parent, user, Access::Write) {
            return Err(FsError::PermissionDenied(format!("cannot remove '{}'", resolved)));
        }

        if let Some(children) = parent.children_mut() {
            children.remove(&name);
        }
        parent.mtime = OffsetDateTime::now_utc();

        // Don't leave the working path dangling inside the removed subtree
        if self.cwd == resolved || self.cwd.starts_with(&format!("{}/", resolved)) {
            self.cwd = parent_path;
        }

        info!(path = %resolved, user = %user, recursive, "node removed");
        Ok(())
    }
}
