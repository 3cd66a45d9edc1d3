/*!
 * Path Validation
 * Reusable guard combining resolution, existence and type checks
 */

use super::super::types::*;
use super::NamespaceTree;
use crate::config::ROOT_PATH;

/// Policies applied by `NamespaceTree::validate`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidateOptions {
    /// Required node type, if any
    pub expected: Option<NodeType>,
    /// A missing node is not an error
    pub allow_missing: bool,
    /// Reject the root directory as a target
    pub disallow_root: bool,
    /// An empty path means the working directory instead of an error
    pub default_to_cwd: bool,
}

impl ValidateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expect(mut self, node_type: NodeType) -> Self {
        self.expected = Some(node_type);
        self
    }

    pub fn allow_missing(mut self) -> Self {
        self.allow_missing = true;
        self
    }

    pub fn disallow_root(mut self) -> Self {
        self.disallow_root = true;
        self
    }

    pub fn default_to_cwd(mut self) -> Self {
        self.default_to_cwd = true;
        self
    }
}

/// Outcome of a successful validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validated<'a> {
    pub resolved_path: String,
    /// `None` only when `allow_missing` was set and nothing exists there
    pub node: Option<&'a Node>,
}

impl NamespaceTree {
    /// Resolve `path` and check it against `options`
    pub fn validate(&self, path: &str, options: ValidateOptions) -> FsResult<Validated<'_>> {
        if path.is_empty() && !options.default_to_cwd {
            return Err(FsError::InvalidPath("empty path".to_string()));
        }

        let resolved_path = self.resolve(path);
        if options.disallow_root && resolved_path == ROOT_PATH {
            return Err(FsError::InvalidPath(
                "operation not permitted on the root directory".to_string(),
            ));
        }

        let node = match self.node_at(&resolved_path) {
            Some(node) => node,
            None if options.allow_missing => {
                return Ok(Validated {
                    resolved_path,
                    node: None,
                })
            }
            None => return Err(FsError::NotFound(resolved_path)),
        };

        if let Some(expected) = options.expected {
            if node.node_type() != expected {
                return Err(FsError::wrong_type(resolved_path, expected));
            }
        }

        Ok(Validated {
            resolved_path,
            node: Some(node),
        })
    }
}
