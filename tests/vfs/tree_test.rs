/*!
 * Namespace Tree Tests
 * Lookup, parent creation, sizes and mtime propagation
 */

use pretty_assertions::assert_eq;
use termfs::vfs::{FsError, Mode, NamespaceTree, Node, NodeType, ValidateOptions};
use time::macros::datetime;

#[test]
fn test_ensure_parents_twice_is_stable() {
    let mut tree = NamespaceTree::with_default_layout();
    assert!(tree.ensure_parents("/a/b/c/file.txt", "root").is_ok());
    let first = tree.root().child("a").cloned();

    assert!(tree.ensure_parents("/a/b/c/file.txt", "root").is_ok());
    assert_eq!(tree.root().child("a").cloned(), first);
    assert_eq!(
        tree.list_dir("/a/b", "root").unwrap(),
        vec![("c".to_string(), NodeType::Directory)]
    );
}

#[test]
fn test_ensure_parents_denied_under_foreign_directory() {
    let mut tree = NamespaceTree::with_default_layout();
    tree.make_dir("/home/Guest/locked", "Guest", false).unwrap();
    tree.chmod("/home/Guest/locked", Mode::new(0o75), "Guest").unwrap();
    let before = tree.clone();

    let result = tree.ensure_parents("/home/Guest/locked/x/y/z.txt", "alice");
    assert!(matches!(result, Err(FsError::PermissionDenied(_))));
    assert_eq!(tree, before);
}

#[test]
fn test_ensure_parents_through_file_is_wrong_type() {
    let mut tree = NamespaceTree::with_default_layout();
    tree.write_file("/home/Guest/f", "x", "Guest").unwrap();
    assert!(matches!(
        tree.ensure_parents("/home/Guest/f/g/h", "Guest"),
        Err(FsError::WrongType { .. })
    ));
}

#[test]
fn test_compute_size() {
    let mut tree = NamespaceTree::with_default_layout();
    assert_eq!(NamespaceTree::compute_size(None), 0);
    assert_eq!(NamespaceTree::compute_size(Some(tree.root())), 0);

    tree.write_file("/home/Guest/a.txt", "hello", "Guest").unwrap();
    tree.write_file("/home/Guest/sub/b.txt", "hi", "Guest").unwrap();
    assert_eq!(NamespaceTree::compute_size(tree.get_node("/home/Guest")), 7);
    assert_eq!(NamespaceTree::compute_size(tree.get_node("/home/Guest/a.txt")), 5);
    assert_eq!(NamespaceTree::compute_size(Some(tree.root())), 7);
}

#[test]
fn test_touch_is_one_level() {
    let mut tree = NamespaceTree::with_default_layout();
    tree.write_file("/home/Guest/note.txt", "", "Guest").unwrap();
    let grandparent_mtime = tree.get_node("/home").unwrap().mtime();

    let stamp = datetime!(2030-01-01 12:00 UTC);
    tree.touch("/home/Guest/note.txt", stamp).unwrap();

    assert_eq!(tree.get_node("/home/Guest/note.txt").unwrap().mtime(), stamp);
    assert_eq!(tree.get_node("/home/Guest").unwrap().mtime(), stamp);
    assert_eq!(tree.get_node("/home").unwrap().mtime(), grandparent_mtime);
}

#[test]
fn test_relative_paths_follow_cwd() {
    let mut tree = NamespaceTree::with_default_layout();
    tree.set_cwd("/home/Guest", "Guest").unwrap();
    tree.write_file("notes/today.txt", "x", "Guest").unwrap();

    assert!(tree.get_node("/home/Guest/notes/today.txt").is_some_and(Node::is_file));
    assert_eq!(tree.read_file("../Guest/notes/today.txt", "Guest"), Ok("x"));
    assert!(matches!(
        tree.set_cwd("/home/root", "Guest"),
        Err(FsError::PermissionDenied(_))
    ));
    assert_eq!(tree.cwd(), "/home/Guest");
}

#[test]
fn test_validate_policies() {
    let tree = NamespaceTree::with_default_layout();

    let validated = tree
        .validate("", ValidateOptions::new().default_to_cwd())
        .unwrap();
    assert_eq!(validated.resolved_path, "/");

    assert!(tree
        .validate("/missing", ValidateOptions::new().allow_missing())
        .unwrap()
        .node
        .is_none());
    assert!(matches!(
        tree.validate("/missing", ValidateOptions::new()),
        Err(FsError::NotFound(_))
    ));
    assert!(tree
        .validate("/", ValidateOptions::new().disallow_root())
        .is_err());
    assert!(matches!(
        tree.validate("/home", ValidateOptions::new().expect(NodeType::File)),
        Err(FsError::WrongType { .. })
    ));
}

#[test]
fn test_remove_rules() {
    let mut tree = NamespaceTree::with_default_layout();
    tree.write_file("/home/Guest/d/f.txt", "x", "Guest").unwrap();

    assert!(matches!(tree.remove("/", "root", true), Err(FsError::InvalidPath(_))));
    assert!(matches!(
        tree.remove("/home/Guest/d", "Guest", false),
        Err(FsError::NotEmpty(_))
    ));
    assert!(matches!(
        tree.remove("/home/Guest/d", "alice", true),
        Err(FsError::PermissionDenied(_))
    ));

    tree.set_cwd("/home/Guest/d", "Guest").unwrap();
    tree.remove("/home/Guest/d", "Guest", true).unwrap();
    assert!(tree.get_node("/home/Guest/d").is_none());
    assert_eq!(tree.cwd(), "/home/Guest");
}

#[test]
fn test_replace_root_resets_missing_cwd() {
    let mut tree = NamespaceTree::with_default_layout();
    tree.make_dir("/tmp", "root", false).unwrap();
    tree.set_cwd("/tmp", "root").unwrap();

    let fresh = NamespaceTree::with_default_layout().into_root();
    tree.replace_root(fresh).unwrap();
    assert_eq!(tree.cwd(), "/");

    let file_root = Node::file("root", Mode::new(0o64), time::OffsetDateTime::now_utc(), "");
    assert!(matches!(
        tree.replace_root(file_root),
        Err(FsError::CorruptSnapshot(_))
    ));
}
