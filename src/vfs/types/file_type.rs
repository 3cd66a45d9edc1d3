/*!
 * Node Type Enum
 * Defines the two kinds of namespace entries
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Node type, the tag of the `Node` variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Directory,
    File,
}

impl NodeType {
    /// Type flag used in the permission string
    #[inline]
    #[must_use]
    pub const fn flag(&self) -> char {
        match self {
            NodeType::Directory => 'd',
            NodeType::File => '-',
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NodeType::File => write!(f, "file"),
            NodeType::Directory => write!(f, "directory"),
        }
    }
}
