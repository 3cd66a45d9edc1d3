/*!
 * Configuration and Constants
 *
 * Centralized location for reserved identities, default modes, store keys and
 * environment-driven settings.
 */

use std::path::PathBuf;

use crate::vfs::types::Mode;

// =============================================================================
// IDENTITIES
// =============================================================================

/// Reserved superuser, bypasses every permission check
pub const ROOT_USER: &str = "root";

/// Anonymous user a fresh session starts as
pub const DEFAULT_USER: &str = "Guest";

/// Users that always get a home directory in a synthesized tree
pub const BOOTSTRAP_USERS: &[&str] = &[DEFAULT_USER, ROOT_USER];

// =============================================================================
// NAMESPACE LAYOUT
// =============================================================================

/// Root of the namespace
pub const ROOT_PATH: &str = "/";

/// Reserved area holding per-user home directories
pub const HOME_ROOT: &str = "/home";

/// Default mode for new directories (rwx r-x)
pub const DEFAULT_DIR_MODE: Mode = Mode::new(0o75);

/// Default mode for new files (rw- r--)
pub const DEFAULT_FILE_MODE: Mode = Mode::new(0o64);

/// Mode of the root user's home directory (rwx ---)
pub const ROOT_HOME_MODE: Mode = Mode::new(0o70);

// =============================================================================
// PERSISTENCE
// =============================================================================

/// Well-known key the namespace snapshot lives under
pub const FS_STORE_KEY: &str = "fs::root";

/// Key prefix for automatic per-user session state
pub const AUTO_STATE_PREFIX: &str = "session::auto::";

/// Key prefix for manual per-user session state
pub const MANUAL_STATE_PREFIX: &str = "session::manual::";

/// Version tag recorded in manual snapshots
pub const OS_VERSION_TAG: &str = concat!("termfs-", env!("CARGO_PKG_VERSION"));

// =============================================================================
// CONFIRMATION
// =============================================================================

/// Literal, case-sensitive token accepted as confirmation
pub const CONFIRMATION_TOKEN: &str = "YES";

/// Runtime configuration
///
/// Environment variables:
/// - TERMFS_STORE_PATH: directory for the file-backed store (default: in-memory)
/// - TERMFS_USER: initial acting user (default: Guest)
/// - TERMFS_TRACE_JSON: enable JSON log output (default: false)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub store_path: Option<PathBuf>,
    pub user: String,
    pub trace_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: None,
            user: DEFAULT_USER.to_string(),
            trace_json: false,
        }
    }
}

impl Config {
    /// Build configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let store_path = lookup("TERMFS_STORE_PATH")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let user = lookup("TERMFS_USER")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_USER.to_string());

        let trace_json = lookup("TERMFS_TRACE_JSON")
            .map(|v| v == "1" || v == "true")
            .unwrap_or(false);

        Self {
            store_path,
            user,
            trace_json,
        }
    }
}
