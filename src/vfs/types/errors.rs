/*!
 * Namespace Error Types
 * Structured, type-safe error handling for namespace and persistence operations
 */

use miette::Diagnostic;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use super::file_type::NodeType;

/// Namespace operation result
///
/// # Must Use
/// Namespace operations can fail and must be handled so collaborators can
/// render a user-facing message. `Result` itself carries `#[must_use]`.
pub type FsResult<T> = Result<T, FsError>;

/// Namespace errors
///
/// NotFound, WrongType and PermissionDenied are ordinary outcomes returned to
/// the caller. Malformed and CorruptSnapshot are self-healed where possible,
/// StoreUnavailable degrades the session to memory-only.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(rename_all = "snake_case", tag = "error", content = "details")]
pub enum FsError {
    #[error("No such file or directory: {0}")]
    #[diagnostic(
        code(fs::not_found),
        help("Check the path. Relative paths resolve against the working directory.")
    )]
    NotFound(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("'{path}' is not a {expected}")]
    #[diagnostic(code(fs::wrong_type))]
    WrongType { path: String, expected: NodeType },

    #[error("Permission denied: {0}")]
    #[diagnostic(
        code(fs::permission_denied),
        help("The owner or root can change the mode with chmod.")
    )]
    PermissionDenied(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("Malformed node: {0}")]
    #[diagnostic(
        code(fs::malformed),
        help("A node is missing owner, mode or mtime. The snapshot may be corrupted.")
    )]
    Malformed(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("Backing store unavailable: {0}")]
    #[diagnostic(
        code(fs::store_unavailable),
        help("Changes are kept in memory only for this session.")
    )]
    StoreUnavailable(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("Corrupt snapshot: {0}")]
    #[diagnostic(code(fs::corrupt_snapshot))]
    CorruptSnapshot(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("Invalid path: {0}")]
    #[diagnostic(code(fs::invalid_path))]
    InvalidPath(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("Already exists: {0}")]
    #[diagnostic(code(fs::already_exists))]
    AlreadyExists(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("Directory not empty: {0}")]
    #[diagnostic(code(fs::not_empty), help("Remove recursively to delete its contents."))]
    NotEmpty(#[serde(deserialize_with = "deserialize_nonempty_string")] String),
}

impl FsError {
    /// Shorthand for a type mismatch at `path`
    pub fn wrong_type(path: impl Into<String>, expected: NodeType) -> Self {
        Self::WrongType {
            path: path.into(),
            expected,
        }
    }

    /// Errors collaborators render to the user rather than log
    pub fn is_user_facing(&self) -> bool {
        !matches!(
            self,
            FsError::Malformed(_) | FsError::StoreUnavailable(_) | FsError::CorruptSnapshot(_)
        )
    }
}

/// Deserialize and validate non-empty string for error messages
pub(super) fn deserialize_nonempty_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    if s.is_empty() {
        return Err(serde::de::Error::custom("error message must not be empty"));
    }
    Ok(s)
}
