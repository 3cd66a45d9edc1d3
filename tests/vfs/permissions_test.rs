/*!
 * Permission Model Tests
 */

use termfs::vfs::{format_mode, has_permission, Access, Mode, NamespaceTree, Node};
use time::OffsetDateTime;

#[test]
fn test_owner_only_file() {
    let node = Node::file("alice", Mode::new(0b110_000), OffsetDateTime::now_utc(), "secret");
    assert!(has_permission(&node, "alice", Access::Write));
    assert!(!has_permission(&node, "bob", Access::Write));
    assert!(has_permission(&node, "root", Access::Write));
    assert_eq!(format_mode(&node), "-rw----");
}

#[test]
fn test_default_layout_modes() {
    let tree = NamespaceTree::with_default_layout();
    assert_eq!(format_mode(tree.root()), "drwxr-x");
    assert_eq!(format_mode(tree.get_node("/home/root").unwrap()), "drwx---");

    let root_home = tree.get_node("/home/root").unwrap();
    assert!(!has_permission(root_home, "Guest", Access::Read));
    assert!(has_permission(root_home, "root", Access::Read));
}

#[test]
fn test_private_file_is_unreadable_to_others() {
    let mut tree = NamespaceTree::with_default_layout();
    tree.write_file("/home/Guest/diary.txt", "dear diary", "Guest").unwrap();
    tree.chmod("/home/Guest/diary.txt", Mode::new(0o60), "Guest").unwrap();

    assert!(tree.read_file("/home/Guest/diary.txt", "alice").is_err());
    assert_eq!(tree.read_file("/home/Guest/diary.txt", "root"), Ok("dear diary"));
}
