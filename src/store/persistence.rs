/*!
 * Namespace Persistence
 * Whole-tree snapshots under one well-known key
 *
 * The snapshot is serialized synchronously when `save` is called, so every
 * mutation made before the call is captured even if the write completes
 * later. Concurrent sessions sharing one store race; the last save wins.
 *
 * A load that could not read the store leaves the handle degraded: saves are
 * refused until a later load reads the store, so an in-memory default tree
 * never replaces a snapshot that is only temporarily unreadable.
 */

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::{error, info, warn};

use super::traits::{KvStore, StoreError};
use crate::config::FS_STORE_KEY;
use crate::vfs::{decode_snapshot, default_tree, FsError, FsResult, Node};

/// Persisted record layout: `{ id, data }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub id: String,
    pub data: Value,
}

/// Where a loaded tree came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotOrigin {
    /// Decoded from the stored record
    Stored,
    /// No record existed; default tree synthesized and persisted
    Initialized,
    /// Stored record was corrupt; default tree synthesized and persisted
    Recovered,
    /// Store unreachable; default tree kept in memory only
    InMemoryOnly,
}

/// Result of `PersistenceStore::load`
#[derive(Debug, Clone)]
pub struct LoadedSnapshot {
    pub root: Node,
    pub origin: SnapshotOrigin,
}

/// Serializes the namespace tree to and from a backing store
#[derive(Clone)]
pub struct PersistenceStore {
    store: Arc<dyn KvStore>,
    degraded: Arc<AtomicBool>,
}

impl std::fmt::Debug for PersistenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceStore")
            .field("store", &self.store.name())
            .field("degraded", &self.is_degraded())
            .finish()
    }
}

impl PersistenceStore {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self {
            store,
            degraded: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether the last load fell back to an in-memory tree
    ///
    /// While degraded, `save` refuses to write.
    #[inline]
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::Acquire)
    }

    /// Shared handle on the backing store
    pub fn backing(&self) -> Arc<dyn KvStore> {
        Arc::clone(&self.store)
    }

    /// Write a full snapshot of `root`
    ///
    /// The root shape is checked and the snapshot taken before this returns;
    /// only the store write happens when the future is awaited. A root that
    /// is not a directory is never written, and nothing is written while the
    /// handle is degraded.
    pub fn save(&self, root: &Node) -> impl Future<Output = FsResult<()>> + Send + 'static {
        let prepared = if self.is_degraded() {
            warn!("Refusing to save: namespace was not loaded from the store");
            Err(FsError::StoreUnavailable(
                "namespace was not loaded from the store; refusing to overwrite it".to_string(),
            ))
        } else {
            Self::snapshot(root)
        };
        let store = Arc::clone(&self.store);

        async move {
            let record = prepared?;
            store.put(FS_STORE_KEY, record).await.map_err(|e| {
                error!(error = %e, store = store.name(), "Failed to persist namespace");
                FsError::from(e)
            })?;
            info!(store = store.name(), "Namespace snapshot saved");
            Ok(())
        }
    }

    fn snapshot(root: &Node) -> FsResult<Value> {
        if !root.is_dir() {
            warn!("Refusing to save a namespace whose root is not a directory");
            return Err(FsError::CorruptSnapshot(
                "refusing to save: root is not a directory".to_string(),
            ));
        }

        let data = serde_json::to_value(root)
            .map_err(|e| FsError::Malformed(format!("cannot serialize namespace: {}", e)))?;
        let record = SnapshotRecord {
            id: FS_STORE_KEY.to_string(),
            data,
        };
        serde_json::to_value(record)
            .map_err(|e| FsError::Malformed(format!("cannot serialize record: {}", e)))
    }

    /// Load the namespace, self-healing a missing or corrupt snapshot
    ///
    /// Never fails: an unreachable store yields an in-memory default tree.
    pub async fn load(&self) -> LoadedSnapshot {
        let now = OffsetDateTime::now_utc();

        let raw = match self.store.get(FS_STORE_KEY).await {
            Ok(raw) => {
                self.degraded.store(false, Ordering::Release);
                raw
            }
            Err(StoreError::Corrupt { reason, .. }) => {
                warn!(reason = %reason, "Stored namespace record is unreadable");
                self.degraded.store(false, Ordering::Release);
                return self.reinitialize(now, SnapshotOrigin::Recovered).await;
            }
            Err(e) => {
                warn!(error = %e, store = self.store.name(), "Backing store unavailable, namespace is in-memory only");
                self.degraded.store(true, Ordering::Release);
                return LoadedSnapshot {
                    root: default_tree(now),
                    origin: SnapshotOrigin::InMemoryOnly,
                };
            }
        };

        let Some(raw) = raw else {
            info!("No stored namespace, initializing default tree");
            return self.reinitialize(now, SnapshotOrigin::Initialized).await;
        };

        let decoded = serde_json::from_value::<SnapshotRecord>(raw)
            .map_err(|e| FsError::CorruptSnapshot(format!("bad record envelope: {}", e)))
            .and_then(|record| decode_snapshot(record.data, now));

        match decoded {
            Ok((root, report)) => {
                if !report.is_clean() {
                    // Persist the backfilled tree so the repair happens once
                    if let Err(e) = self.save(&root).await {
                        warn!(error = %e, "Could not persist backfilled namespace");
                    }
                }
                info!("Namespace loaded from store");
                LoadedSnapshot {
                    root,
                    origin: SnapshotOrigin::Stored,
                }
            }
            Err(e) => {
                warn!(error = %e, "Stored namespace is corrupt, reinitializing");
                self.reinitialize(now, SnapshotOrigin::Recovered).await
            }
        }
    }

    async fn reinitialize(&self, now: OffsetDateTime, origin: SnapshotOrigin) -> LoadedSnapshot {
        let root = default_tree(now);
        match self.save(&root).await {
            Ok(()) => LoadedSnapshot { root, origin },
            Err(e) => {
                warn!(error = %e, "Default namespace could not be persisted");
                LoadedSnapshot {
                    root,
                    origin: SnapshotOrigin::InMemoryOnly,
                }
            }
        }
    }

    /// Empty the whole backing store namespace
    pub async fn clear(&self) -> FsResult<()> {
        self.store.clear().await.map_err(|e| {
            error!(error = %e, store = self.store.name(), "Failed to clear backing store");
            FsError::from(e)
        })?;
        warn!(store = self.store.name(), "Backing store cleared");
        Ok(())
    }
}
