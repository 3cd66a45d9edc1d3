/*!
 * Path Resolution Tests
 */

use proptest::prelude::*;
use termfs::vfs::paths::{home_dir, resolve};

#[test]
fn test_relative_parent_hop() {
    assert_eq!(resolve("../bob/file.txt", "/home/alice"), "/home/bob/file.txt");
}

#[test]
fn test_empty_and_root_targets() {
    assert_eq!(resolve("", "/home/alice"), "/home/alice");
    assert_eq!(resolve("/", "/home/alice"), "/");
    assert_eq!(resolve("/", "/"), "/");
}

#[test]
fn test_parent_past_root_is_noop() {
    assert_eq!(resolve("../../../..", "/home"), "/");
    assert_eq!(resolve("/../etc", "/home/alice"), "/etc");
}

#[test]
fn test_redundant_separators_and_dots() {
    assert_eq!(resolve("a//b/./c/", "/x"), "/x/a/b/c");
    assert_eq!(resolve("./", "/x/y"), "/x/y");
}

#[test]
fn test_home_dir() {
    assert_eq!(home_dir("alice"), "/home/alice");
}

fn path_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just(String::new()),
            Just(".".to_string()),
            Just("..".to_string()),
            "[a-z]{1,6}",
        ],
        0..8,
    )
    .prop_flat_map(|segments| {
        any::<bool>().prop_map(move |absolute| {
            let joined = segments.join("/");
            if absolute {
                format!("/{}", joined)
            } else {
                joined
            }
        })
    })
}

proptest! {
    #[test]
    fn prop_resolve_is_idempotent(target in path_strategy(), base in path_strategy()) {
        let base = resolve(&base, "/");
        let once = resolve(&target, &base);
        prop_assert_eq!(resolve(&once, &base), once.clone());
        prop_assert!(once.starts_with('/'));
    }

    #[test]
    fn prop_resolved_paths_are_normalized(target in path_strategy()) {
        let resolved = resolve(&target, "/base");
        prop_assert!(!resolved.contains("//"));
        prop_assert!(resolved == "/" || !resolved.ends_with('/'));
        prop_assert!(!resolved.split('/').any(|s| s == "." || s == ".."));
    }
}
