/*!
 * File Operations Implementation
 * Reading and writing file content under permission checks
 */

use time::OffsetDateTime;
use tracing::debug;

use super::super::paths::{is_valid_name, split_parent};
use super::super::types::*;
use super::NamespaceTree;
use crate::config::DEFAULT_FILE_MODE;

impl NamespaceTree {
    /// Read a file's content
    pub fn read_file(&self, path: &str, user: &str) -> FsResult<&str> {
        let resolved = self.resolve(path);
        let node = self
            .node_at(&resolved)
            .ok_or_else(|| FsError::NotFound(resolved.clone()))?;

        let content = node
            .content()
            .ok_or_else(|| FsError::wrong_type(resolved.as_str(), NodeType::File))?;

        if !has_permission(node, user, Access::Read) {
            return Err(FsError::PermissionDenied(format!("cannot read '{}'", resolved)));
        }
        Ok(content)
    }

    /// Create or overwrite a file, creating missing parents
    pub fn write_file(&mut self, path: &str, content: &str, user: &str) -> FsResult<()> {
        self.store_file(path, content, user, false)
    }

    /// Append to a file, creating it (and missing parents) if needed
    pub fn append_file(&mut self, path: &str, content: &str, user: &str) -> FsResult<()> {
        self.store_file(path, content, user, true)
    }

    fn store_file(&mut self, path: &str, content: &str, user: &str, append: bool) -> FsResult<()> {
        let resolved = self.resolve(path);
        let name = match split_parent(&resolved) {
            Some((_, name)) if is_valid_name(name) => name.to_string(),
            _ => return Err(FsError::wrong_type(resolved.clone(), NodeType::File)),
        };

        // Existing target: must be a writable file
        if let Some(existing) = self.node_at(&resolved) {
            if existing.is_dir() {
                return Err(FsError::wrong_type(resolved, NodeType::File));
            }
            if !has_permission(existing, user, Access::Write) {
                return Err(FsError::PermissionDenied(format!("cannot write '{}'", resolved)));
            }
        }

        let parent = self.ensure_parents(&resolved, user)?;
        let now = OffsetDateTime::now_utc();

        match parent.child_mut(&name) {
            Some(file) => {
                if let Some(existing) = file.content_mut() {
                    if append {
                        existing.push_str(content);
                    } else {
                        existing.clear();
                        existing.push_str(content);
                    }
                }
                file.mtime = now;
            }
            None => {
                if !has_permission(parent, user, Access::Write) {
                    return Err(FsError::PermissionDenied(format!(
                        "cannot create '{}'",
                        resolved
                    )));
                }
                if let Some(children) = parent.children_mut() {
                    children.insert(name, Node::file(user, DEFAULT_FILE_MODE, now, content));
                }
            }
        }
        parent.mtime = now;

        debug!(path = %resolved, user = %user, bytes = content.len(), append, "file stored");
        Ok(())
    }
}
