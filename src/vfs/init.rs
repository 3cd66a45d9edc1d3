/*!
 * Namespace Initialization
 * Default tree layout and legacy snapshot backfill
 */

use serde_json::{Map, Value};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{info, warn};

use super::paths::{home_dir, is_valid_name};
use super::types::*;
use crate::config::{
    BOOTSTRAP_USERS, DEFAULT_DIR_MODE, DEFAULT_FILE_MODE, HOME_ROOT, ROOT_HOME_MODE, ROOT_USER,
};

/// Build the default tree: root, the home area and a home per bootstrap user
pub fn default_tree(now: OffsetDateTime) -> Node {
    let mut home = Node::directory(ROOT_USER, DEFAULT_DIR_MODE, now);
    if let Some(children) = home.children_mut() {
        for user in BOOTSTRAP_USERS {
            let mode = if *user == ROOT_USER {
                ROOT_HOME_MODE
            } else {
                DEFAULT_DIR_MODE
            };
            children.insert(user.to_string(), Node::directory(*user, mode, now));
        }
    }

    let mut root = Node::directory(ROOT_USER, DEFAULT_DIR_MODE, now);
    if let Some(children) = root.children_mut() {
        children.insert(HOME_ROOT.trim_start_matches('/').to_string(), home);
    }

    info!(
        users = BOOTSTRAP_USERS.len(),
        homes = ?BOOTSTRAP_USERS.iter().map(|u| home_dir(u)).collect::<Vec<_>>(),
        "Default namespace synthesized"
    );
    root
}

/// Counts of fields filled in during backfill
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackfillReport {
    pub owners: usize,
    pub modes: usize,
    pub mtimes: usize,
    pub payloads: usize,
    /// Entries with no usable type or name, removed from their directory
    pub dropped: usize,
}

impl BackfillReport {
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

/// Decode a raw snapshot, backfilling fields legacy snapshots may lack
///
/// Missing owners become root, missing or out-of-range modes become the
/// type default, missing or unparsable mtimes become `now`, and missing
/// children/content become empty. Entries with an unknown type or an
/// unusable name are dropped. Fails with `CorruptSnapshot` if the root is
/// not a directory or the result still does not decode.
pub fn decode_snapshot(mut raw: Value, now: OffsetDateTime) -> FsResult<(Node, BackfillReport)> {
    let root_is_dir = raw
        .as_object()
        .and_then(|obj| obj.get("type"))
        .and_then(Value::as_str)
        == Some("directory");
    if !root_is_dir {
        return Err(FsError::CorruptSnapshot(
            "root is missing or not a directory".to_string(),
        ));
    }

    let stamp = now
        .format(&Rfc3339)
        .map_err(|e| FsError::Malformed(format!("cannot format timestamp: {}", e)))?;

    let mut report = BackfillReport::default();
    backfill(&mut raw, "/", &stamp, &mut report);

    if !report.is_clean() {
        warn!(
            owners = report.owners,
            modes = report.modes,
            mtimes = report.mtimes,
            payloads = report.payloads,
            dropped = report.dropped,
            "Malformed nodes backfilled while loading snapshot"
        );
    }

    let root: Node = serde_json::from_value(raw)
        .map_err(|e| FsError::CorruptSnapshot(format!("snapshot does not decode: {}", e)))?;
    Ok((root, report))
}

/// The `type` tag of a raw node, if it is one we can decode
fn node_type_of(value: &Value) -> Option<NodeType> {
    match value.get("type").and_then(Value::as_str) {
        Some("directory") => Some(NodeType::Directory),
        Some("file") => Some(NodeType::File),
        _ => None,
    }
}

fn backfill(value: &mut Value, path: &str, stamp: &str, report: &mut BackfillReport) {
    let Some(obj) = value.as_object_mut() else {
        return;
    };

    let is_dir = obj.get("type").and_then(Value::as_str) == Some("directory");

    if !obj.get("owner").is_some_and(|o| o.as_str().is_some_and(|s| !s.is_empty())) {
        warn!(path = %path, "node has no owner, assigning root");
        obj.insert("owner".into(), Value::from(ROOT_USER));
        report.owners += 1;
    }

    let mode_ok = obj
        .get("mode")
        .and_then(Value::as_u64)
        .is_some_and(|m| m <= u64::from(MODE_MASK));
    if !mode_ok {
        let default = if is_dir { DEFAULT_DIR_MODE } else { DEFAULT_FILE_MODE };
        warn!(path = %path, default = %default, "node has no valid mode, using default");
        obj.insert("mode".into(), Value::from(default.bits()));
        report.modes += 1;
    }

    let mtime_ok = obj
        .get("mtime")
        .and_then(Value::as_str)
        .is_some_and(|m| OffsetDateTime::parse(m, &Rfc3339).is_ok());
    if !mtime_ok {
        warn!(path = %path, "node has no valid mtime, using load time");
        obj.insert("mtime".into(), Value::from(stamp));
        report.mtimes += 1;
    }

    if is_dir {
        if !obj.get("children").is_some_and(Value::is_object) {
            obj.insert("children".into(), Value::Object(Map::new()));
            report.payloads += 1;
        }
        if let Some(Value::Object(children)) = obj.get_mut("children") {
            children.retain(|name, child| {
                let keep = is_valid_name(name) && node_type_of(child).is_some();
                if !keep {
                    warn!(path = %path, entry = %name, "dropping entry with no usable type or name");
                    report.dropped += 1;
                }
                keep
            });
            for (name, child) in children.iter_mut() {
                let child_path = if path == "/" {
                    format!("/{}", name)
                } else {
                    format!("{}/{}", path, name)
                };
                backfill(child, &child_path, stamp, report);
            }
        }
    } else if !obj.get("content").is_some_and(Value::is_string) {
        obj.insert("content".into(), Value::from(""));
        report.payloads += 1;
    }
}
