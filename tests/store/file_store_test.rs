/*!
 * File Store Persistence Tests
 */

use std::sync::Arc;
use tempfile::TempDir;
use termfs::store::{FileStore, PersistenceStore, SnapshotOrigin};
use termfs::vfs::NamespaceTree;

#[tokio::test]
async fn test_snapshot_survives_reopen() {
    let temp = TempDir::new().unwrap();

    {
        let store = FileStore::open(temp.path()).await.unwrap();
        let persistence = PersistenceStore::new(Arc::new(store));
        let loaded = persistence.load().await;
        assert_eq!(loaded.origin, SnapshotOrigin::Initialized);

        let mut tree = NamespaceTree::new(loaded.root).unwrap();
        tree.write_file("/home/Guest/todo.txt", "buy milk", "Guest").unwrap();
        persistence.save(tree.root()).await.unwrap();
    }

    let store = FileStore::open(temp.path()).await.unwrap();
    let loaded = PersistenceStore::new(Arc::new(store)).load().await;
    assert_eq!(loaded.origin, SnapshotOrigin::Stored);

    let tree = NamespaceTree::new(loaded.root).unwrap();
    assert_eq!(tree.read_file("/home/Guest/todo.txt", "Guest"), Ok("buy milk"));
}

#[tokio::test]
async fn test_unparseable_file_recovers() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("fs%3A%3Aroot.json"), b"{{{").unwrap();

    let store = FileStore::open(temp.path()).await.unwrap();
    let loaded = PersistenceStore::new(Arc::new(store)).load().await;
    assert_eq!(loaded.origin, SnapshotOrigin::Recovered);
    assert!(loaded.root.is_dir());
}
