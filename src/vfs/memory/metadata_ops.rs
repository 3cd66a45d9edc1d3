/*!
 * Metadata Operations Implementation
 * Modification times, modes and ownership
 */

use time::OffsetDateTime;
use tracing::info;

use super::super::paths::split_parent;
use super::super::types::*;
use super::NamespaceTree;
use crate::config::ROOT_USER;

impl NamespaceTree {
    /// Set the mtime of `path` and of its immediate parent
    ///
    /// Propagation is exactly one level; the grandparent keeps its mtime.
    pub fn touch(&mut self, path: &str, timestamp: OffsetDateTime) -> FsResult<()> {
        let resolved = self.resolve(path);
        let node = self
            .node_at_mut(&resolved)
            .ok_or_else(|| FsError::NotFound(resolved.clone()))?;
        node.mtime = timestamp;

        if let Some((parent_path, _)) = split_parent(&resolved) {
            if let Some(parent) = self.node_at_mut(parent_path) {
                parent.mtime = timestamp;
            }
        }
        Ok(())
    }

    /// Change the mode of `path`; owner or root only
    pub fn chmod(&mut self, path: &str, mode: Mode, user: &str) -> FsResult<()> {
        let resolved = self.resolve(path);
        let node = self
            .node_at_mut(&resolved)
            .ok_or_else(|| FsError::NotFound(resolved.clone()))?;

        if user != ROOT_USER && user != node.owner() {
            return Err(FsError::PermissionDenied(format!(
                "only the owner may change the mode of '{}'",
                resolved
            )));
        }
        node.mode = mode;

        info!(path = %resolved, mode = %mode, user = %user, "mode changed");
        self.touch(&resolved, OffsetDateTime::now_utc())
    }

    /// Change the owner of `path`; root only
    pub fn chown(&mut self, path: &str, new_owner: &str, user: &str) -> FsResult<()> {
        if user != ROOT_USER {
            return Err(FsError::PermissionDenied(
                "only root may change ownership".to_string(),
            ));
        }
        if new_owner.is_empty() {
            return Err(FsError::InvalidPath("owner name must not be empty".to_string()));
        }

        let resolved = self.resolve(path);
        let node = self
            .node_at_mut(&resolved)
            .ok_or_else(|| FsError::NotFound(resolved.clone()))?;
        node.owner = new_owner.to_string();

        info!(path = %resolved, owner = %new_owner, "owner changed");
        self.touch(&resolved, OffsetDateTime::now_utc())
    }
}
