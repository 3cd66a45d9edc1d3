/*!
 * Namespace Types
 * Shared types for namespace operations with modern serde patterns
 */

mod errors;
mod file_type;
mod node;
mod permissions;

pub use errors::{FsError, FsResult};
pub use file_type::NodeType;
pub use node::{Node, NodeKind};
pub use permissions::{format_mode, has_permission, Access, Mode, MODE_MASK};
