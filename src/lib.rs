/*!
 * termfs Library
 * Single-writer in-memory namespace with snapshot persistence and per-user sessions
 */

pub mod config;
pub mod monitoring;
pub mod session;
pub mod store;
pub mod vfs;

// Re-exports
pub use config::Config;
pub use monitoring::{init_tracing, span_operation};
pub use session::{
    AutoState, ConfirmationGate, ConfirmationRequest, ManualState, MessageSink, RequestOutcome,
    Resolution, RestoreGate, SessionContext, SessionStateManager,
};
pub use store::{FileStore, KvStore, LoadedSnapshot, MemoryStore, PersistenceStore, SnapshotOrigin};
pub use vfs::{
    format_mode, has_permission, resolve, Access, FsError, FsResult, Mode, NamespaceTree, Node,
    NodeType,
};
