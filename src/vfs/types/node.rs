/*!
 * Namespace Node Types
 * Tree representation of files and directories
 */

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::OffsetDateTime;

use super::file_type::NodeType;
use super::permissions::Mode;

/// One entry in the namespace tree
///
/// Directories own their children outright, so every node has exactly one
/// parent and the tree cannot contain cycles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub owner: String,
    pub mode: Mode,
    #[serde(with = "time::serde::rfc3339")]
    pub mtime: OffsetDateTime,
    #[serde(flatten)]
    pub kind: NodeKind,
}

/// Variant payload, tagged as `"type"` on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    Directory { children: BTreeMap<String, Node> },
    File { content: String },
}

impl Node {
    /// Create an empty directory
    pub fn directory(owner: impl Into<String>, mode: Mode, mtime: OffsetDateTime) -> Self {
        Self {
            owner: owner.into(),
            mode,
            mtime,
            kind: NodeKind::Directory {
                children: BTreeMap::new(),
            },
        }
    }

    /// Create a file with `content`
    pub fn file(
        owner: impl Into<String>,
        mode: Mode,
        mtime: OffsetDateTime,
        content: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            mode,
            mtime,
            kind: NodeKind::File {
                content: content.into(),
            },
        }
    }

    #[inline]
    pub fn node_type(&self) -> NodeType {
        match self.kind {
            NodeKind::Directory { .. } => NodeType::Directory,
            NodeKind::File { .. } => NodeType::File,
        }
    }

    #[inline]
    pub fn is_dir(&self) -> bool {
        matches!(self.kind, NodeKind::Directory { .. })
    }

    #[inline]
    pub fn is_file(&self) -> bool {
        matches!(self.kind, NodeKind::File { .. })
    }

    #[inline]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    #[inline]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[inline]
    pub fn mtime(&self) -> OffsetDateTime {
        self.mtime
    }

    /// File payload, `None` for directories
    pub fn content(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::File { content } => Some(content),
            NodeKind::Directory { .. } => None,
        }
    }

    pub fn content_mut(&mut self) -> Option<&mut String> {
        match &mut self.kind {
            NodeKind::File { content } => Some(content),
            NodeKind::Directory { .. } => None,
        }
    }

    /// Directory entries, `None` for files
    pub fn children(&self) -> Option<&BTreeMap<String, Node>> {
        match &self.kind {
            NodeKind::Directory { children } => Some(children),
            NodeKind::File { .. } => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut BTreeMap<String, Node>> {
        match &mut self.kind {
            NodeKind::Directory { children } => Some(children),
            NodeKind::File { .. } => None,
        }
    }

    /// Look up a direct child by name
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children().and_then(|c| c.get(name))
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.children_mut().and_then(|c| c.get_mut(name))
    }

    /// Content length for a file, recursive sum for a directory
    pub fn size(&self) -> u64 {
        match &self.kind {
            NodeKind::File { content } => content.len() as u64,
            NodeKind::Directory { children } => children.values().map(Node::size).sum(),
        }
    }
}
