/*!
 * Session State Types
 * Per-user terminal state and the live session context
 */

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::config::ROOT_PATH;
use crate::vfs::{home_dir, NamespaceTree, Node};

/// Opaque "append message" hook status lines and prompts are emitted into
pub trait MessageSink {
    fn append_message(&mut self, line: &str);
}

impl MessageSink for Vec<String> {
    fn append_message(&mut self, line: &str) {
        self.push(line.to_string());
    }
}

/// Automatic per-user state, saved on every user switch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoState {
    pub current_path: String,
    #[serde(default)]
    pub transcript: Vec<String>,
    #[serde(default)]
    pub input_buffer: String,
    #[serde(default)]
    pub command_history: Vec<String>,
}

impl AutoState {
    /// State for a user with nothing saved: home directory if present, else root
    pub fn fresh(user: &str, tree: &NamespaceTree) -> Self {
        let home = home_dir(user);
        let current_path = if tree.get_node(&home).is_some_and(Node::is_dir) {
            home
        } else {
            ROOT_PATH.to_string()
        };
        Self {
            current_path,
            ..Self::default()
        }
    }
}

/// Manual per-user state: automatic state plus a full namespace copy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualState {
    pub user: String,
    pub os_version_tag: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    #[serde(flatten)]
    pub state: AutoState,
    pub fs_snapshot: Node,
}

/// Everything one interactive session owns
///
/// The context is the single owner of the live namespace tree.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub user: String,
    pub tree: NamespaceTree,
    pub transcript: Vec<String>,
    pub input_buffer: String,
    pub command_history: Vec<String>,
}

impl SessionContext {
    pub fn new(user: impl Into<String>, tree: NamespaceTree) -> Self {
        Self {
            user: user.into(),
            tree,
            transcript: Vec::new(),
            input_buffer: String::new(),
            command_history: Vec::new(),
        }
    }

    /// Capture the automatic state of this session
    pub fn to_auto_state(&self) -> AutoState {
        AutoState {
            current_path: self.tree.cwd().to_string(),
            transcript: self.transcript.clone(),
            input_buffer: self.input_buffer.clone(),
            command_history: self.command_history.clone(),
        }
    }

    /// Apply saved automatic state
    ///
    /// A working path that no longer names a directory falls back to the
    /// user's home, then to the root.
    pub fn apply_auto_state(&mut self, state: AutoState) {
        if !self.tree.try_restore_cwd(&state.current_path) {
            warn!(
                user = %self.user,
                path = %state.current_path,
                "saved working path is gone, falling back"
            );
            if !self.tree.try_restore_cwd(&home_dir(&self.user)) {
                self.tree.try_restore_cwd(ROOT_PATH);
            }
        }
        self.transcript = state.transcript;
        self.input_buffer = state.input_buffer;
        self.command_history = state.command_history;
        debug!(user = %self.user, cwd = %self.tree.cwd(), "automatic state applied");
    }

    /// Replace the namespace and terminal state with a manual snapshot
    pub fn apply_manual_state(&mut self, manual: ManualState) {
        if let Err(e) = self.tree.replace_root(manual.fs_snapshot) {
            warn!(error = %e, "manual snapshot rejected");
            self.append_message(&format!("Restore failed: {}", e));
            return;
        }
        self.apply_auto_state(manual.state);
        self.append_message("Session restored.");
    }
}

impl MessageSink for SessionContext {
    fn append_message(&mut self, line: &str) {
        self.transcript.push(line.to_string());
    }
}
