/*!
 * Backing Store Module
 * Durable snapshots of the namespace in an asynchronous key-value store
 *
 * ## Features
 * - `KvStore` seam with in-memory and file-backed implementations
 * - Whole-tree snapshots under one well-known key
 * - Self-healing load: missing or corrupt snapshots are replaced by the
 *   default tree, an unreachable store degrades to memory only
 */

pub mod local;
pub mod memory;
pub mod persistence;
pub mod traits;

// Re-exports
pub use local::FileStore;
pub use memory::MemoryStore;
pub use persistence::{LoadedSnapshot, PersistenceStore, SnapshotOrigin, SnapshotRecord};
pub use traits::{KvStore, StoreError, StoreResult};
