/*!
 * Virtual File System Module
 * In-memory namespace tree with owner/other permissions
 */

pub mod init;
pub mod memory;
pub mod paths;
pub mod types;

// Re-exports
pub use init::{decode_snapshot, default_tree, BackfillReport};
pub use memory::{NamespaceTree, ValidateOptions, Validated};
pub use paths::{home_dir, resolve};
pub use types::{
    format_mode, has_permission, Access, FsError, FsResult, Mode, Node, NodeKind, NodeType,
};
