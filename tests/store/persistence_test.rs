/*!
 * Persistence Tests
 * Save/load round trips and self-healing loads
 */

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use termfs::store::{KvStore, MemoryStore, PersistenceStore, SnapshotOrigin, StoreError, StoreResult};
use termfs::vfs::{FsError, NamespaceTree};

const FS_KEY: &str = "fs::root";

/// Store that is never reachable
struct FailingStore;

#[async_trait]
impl KvStore for FailingStore {
    async fn get(&self, _key: &str) -> StoreResult<Option<Value>> {
        Err(StoreError::Unavailable("offline".into()))
    }

    async fn put(&self, _key: &str, _value: Value) -> StoreResult<()> {
        Err(StoreError::Unavailable("offline".into()))
    }

    async fn delete(&self, _key: &str) -> StoreResult<()> {
        Err(StoreError::Unavailable("offline".into()))
    }

    async fn clear(&self) -> StoreResult<()> {
        Err(StoreError::Unavailable("offline".into()))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Store whose first read fails with an I/O error
struct FlakyStore {
    inner: MemoryStore,
    failed_once: AtomicBool,
}

impl FlakyStore {
    fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            failed_once: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl KvStore for FlakyStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        if !self.failed_once.swap(true, Ordering::SeqCst) {
            return Err(StoreError::Io {
                key: key.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::Interrupted, "transient"),
            });
        }
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, value: Value) -> StoreResult<()> {
        self.inner.put(key, value).await
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.inner.delete(key).await
    }

    async fn clear(&self) -> StoreResult<()> {
        self.inner.clear().await
    }

    fn name(&self) -> &str {
        "flaky"
    }
}

async fn store_with_thesis() -> MemoryStore {
    let store = MemoryStore::new();
    let mut tree = NamespaceTree::with_default_layout();
    tree.write_file("/home/Guest/thesis.txt", "chapter 1", "Guest").unwrap();
    tree.write_file("/home/Guest/notes.txt", "todo", "Guest").unwrap();
    PersistenceStore::new(Arc::new(store.clone()))
        .save(tree.root())
        .await
        .unwrap();
    store
}

#[tokio::test]
async fn test_round_trip_preserves_content_and_mtime() {
    let store = MemoryStore::new();
    let mut tree = NamespaceTree::with_default_layout();
    tree.make_dir("/home/alice", "root", false).unwrap();
    tree.chown("/home/alice", "alice", "root").unwrap();
    tree.write_file("/home/alice/note.txt", "hi", "alice").unwrap();
    let mtime = tree.get_node("/home/alice/note.txt").unwrap().mtime();

    PersistenceStore::new(Arc::new(store.clone()))
        .save(tree.root())
        .await
        .unwrap();

    // A fresh instance over the same records
    let loaded = PersistenceStore::new(Arc::new(store)).load().await;
    assert_eq!(loaded.origin, SnapshotOrigin::Stored);

    let restored = NamespaceTree::new(loaded.root).unwrap();
    let note = restored.get_node("/home/alice/note.txt").unwrap();
    assert_eq!(note.content(), Some("hi"));
    assert_eq!(note.mtime(), mtime);
    assert_eq!(note.owner(), "alice");
}

#[tokio::test]
async fn test_first_load_synthesizes_and_persists() {
    let store = MemoryStore::new();
    let persistence = PersistenceStore::new(Arc::new(store.clone()));

    let first = persistence.load().await;
    assert_eq!(first.origin, SnapshotOrigin::Initialized);
    assert!(first.root.is_dir());
    assert!(first.root.child("home").is_some_and(|home| home.is_dir()));
    assert!(store.get(FS_KEY).await.unwrap().is_some());

    let second = persistence.load().await;
    assert_eq!(second.origin, SnapshotOrigin::Stored);
    assert_eq!(second.root, first.root);
}

#[tokio::test]
async fn test_corrupt_record_is_replaced() {
    let store = MemoryStore::new();
    store
        .put(FS_KEY, json!({ "id": FS_KEY, "data": { "type": "file", "content": "oops" } }))
        .await
        .unwrap();

    let persistence = PersistenceStore::new(Arc::new(store.clone()));
    let loaded = persistence.load().await;
    assert_eq!(loaded.origin, SnapshotOrigin::Recovered);
    assert!(loaded.root.is_dir());

    let stored = store.get(FS_KEY).await.unwrap().unwrap();
    assert_eq!(stored["data"]["type"], json!("directory"));
}

#[tokio::test]
async fn test_record_without_envelope_is_replaced() {
    let store = MemoryStore::new();
    store.put(FS_KEY, json!("garbage")).await.unwrap();

    let loaded = PersistenceStore::new(Arc::new(store)).load().await;
    assert_eq!(loaded.origin, SnapshotOrigin::Recovered);
}

#[tokio::test]
async fn test_unreachable_store_degrades_to_memory() {
    let persistence = PersistenceStore::new(Arc::new(FailingStore));

    let loaded = persistence.load().await;
    assert_eq!(loaded.origin, SnapshotOrigin::InMemoryOnly);
    assert!(loaded.root.child("home").is_some());

    assert!(matches!(
        persistence.save(&loaded.root).await,
        Err(FsError::StoreUnavailable(_))
    ));
    assert!(matches!(
        persistence.clear().await,
        Err(FsError::StoreUnavailable(_))
    ));
}

#[tokio::test]
async fn test_clear_empties_store() {
    let store = MemoryStore::new();
    let persistence = PersistenceStore::new(Arc::new(store.clone()));
    persistence.load().await;
    assert!(!store.is_empty());

    persistence.clear().await.unwrap();
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_bad_descendant_does_not_wipe_tree() {
    let store = store_with_thesis().await;
    let mut record = store.get(FS_KEY).await.unwrap().unwrap();
    let guest = &mut record["data"]["children"]["home"]["children"]["Guest"]["children"];
    guest["thesis.txt"]["mtime"] = json!("Mon Jan 01 2024");
    guest["broken"] = json!({ "type": "symlink" });
    store.put(FS_KEY, record).await.unwrap();

    let loaded = PersistenceStore::new(Arc::new(store.clone())).load().await;
    assert_eq!(loaded.origin, SnapshotOrigin::Stored);

    let tree = NamespaceTree::new(loaded.root).unwrap();
    assert_eq!(tree.read_file("/home/Guest/thesis.txt", "Guest"), Ok("chapter 1"));
    assert_eq!(tree.read_file("/home/Guest/notes.txt", "Guest"), Ok("todo"));
    assert!(tree.get_node("/home/Guest/broken").is_none());

    // The repaired tree, not a default one, is what got written back
    let stored = store.get(FS_KEY).await.unwrap().unwrap();
    let guest = &stored["data"]["children"]["home"]["children"]["Guest"]["children"];
    assert_eq!(guest["thesis.txt"]["content"], json!("chapter 1"));
    assert!(guest.get("broken").is_none());
}

#[tokio::test]
async fn test_transient_read_error_never_overwrites_snapshot() {
    let store = store_with_thesis().await;
    let persistence = PersistenceStore::new(Arc::new(FlakyStore::new(store.clone())));

    let loaded = persistence.load().await;
    assert_eq!(loaded.origin, SnapshotOrigin::InMemoryOnly);
    assert!(persistence.is_degraded());
    assert!(matches!(
        persistence.save(&loaded.root).await,
        Err(FsError::StoreUnavailable(_))
    ));

    let stored = store.get(FS_KEY).await.unwrap().unwrap();
    assert_eq!(
        stored["data"]["children"]["home"]["children"]["Guest"]["children"]["thesis.txt"]["content"],
        json!("chapter 1")
    );

    // The next successful read lifts the restriction
    let reloaded = persistence.load().await;
    assert_eq!(reloaded.origin, SnapshotOrigin::Stored);
    assert!(!persistence.is_degraded());
    assert!(persistence.save(&reloaded.root).await.is_ok());
}
