/*!
 * Path Resolution
 * Normalization of (target, base) pairs into absolute namespace paths
 */

use crate::config::{HOME_ROOT, ROOT_PATH};

/// Path separator
pub const SEPARATOR: char = '/';

/// Current-directory symbol
pub const CURRENT_DIR: &str = ".";

/// Parent-directory symbol
pub const PARENT_DIR: &str = "..";

/// Resolve `target` against `base` into a normalized absolute path
///
/// Empty segments and "." are skipped, ".." pops the last segment (and is
/// a no-op at the root). An empty target means the current directory. The
/// function is total and idempotent.
pub fn resolve(target: &str, base: &str) -> String {
    let target = if target.is_empty() { CURRENT_DIR } else { target };

    let mut segments: Vec<&str> = Vec::with_capacity(8);
    if !target.starts_with(SEPARATOR) {
        // Base may itself be unnormalized, so push it through the same rules
        push_segments(&mut segments, base);
    }
    push_segments(&mut segments, target);

    join(&segments)
}

fn push_segments<'a>(segments: &mut Vec<&'a str>, path: &'a str) {
    for segment in path.split(SEPARATOR) {
        match segment {
            "" | CURRENT_DIR => {}
            PARENT_DIR => {
                segments.pop();
            }
            name => segments.push(name),
        }
    }
}

fn join(segments: &[&str]) -> String {
    if segments.is_empty() {
        return ROOT_PATH.to_string();
    }
    let mut out = String::with_capacity(segments.iter().map(|s| s.len() + 1).sum());
    for segment in segments {
        out.push(SEPARATOR);
        out.push_str(segment);
    }
    out
}

/// Segments of an already-resolved absolute path
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(SEPARATOR).filter(|s| !s.is_empty())
}

/// Split a resolved path into its parent path and final name
///
/// Returns `None` for the root, which has no parent.
pub fn split_parent(path: &str) -> Option<(&str, &str)> {
    if path == ROOT_PATH {
        return None;
    }
    let idx = path.rfind(SEPARATOR)?;
    let name = &path[idx + 1..];
    let parent = if idx == 0 { ROOT_PATH } else { &path[..idx] };
    Some((parent, name))
}

/// Whether `name` can be used as a directory entry
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name != CURRENT_DIR && name != PARENT_DIR && !name.contains(SEPARATOR)
}

/// Home directory of `user`
pub fn home_dir(user: &str) -> String {
    format!("{}/{}", HOME_ROOT, user)
}
