/*!
 * Namespace Permissions
 * Owner/other permission bits with validation
 *
 * A mode is six bits: bits 5-3 are the owner triad, bits 2-0 apply to every
 * other non-root user. There is no group tier.
 */

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use tracing::warn;

use super::node::Node;
use crate::config::ROOT_USER;

/// Highest representable mode (rwx rwx)
pub const MODE_MASK: u8 = 0o77;

/// Six-bit permission mode
///
/// # Performance
/// - Single byte, copied freely
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mode(#[serde(deserialize_with = "deserialize_mode")] u8);

impl Mode {
    /// Create a mode, masking to the six defined bits
    #[inline]
    #[must_use]
    pub const fn new(bits: u8) -> Self {
        Self(bits & MODE_MASK)
    }

    /// Parse a mode from up to two octal digits (e.g. "75")
    pub fn from_octal(text: &str) -> Option<Self> {
        if text.is_empty() || text.len() > 2 {
            return None;
        }
        u8::from_str_radix(text, 8).ok().map(Self::new)
    }

    #[inline]
    #[must_use]
    pub const fn bits(&self) -> u8 {
        self.0
    }

    /// Owner triad (rwx)
    #[inline]
    #[must_use]
    pub const fn owner_bits(&self) -> u8 {
        (self.0 >> 3) & 0o7
    }

    /// Other triad (rwx)
    #[inline]
    #[must_use]
    pub const fn other_bits(&self) -> u8 {
        self.0 & 0o7
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:02o}", self.0)
    }
}

/// Deserialize and validate a mode (must be <= 0o77)
fn deserialize_mode<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let mode = u8::deserialize(deserializer)?;
    if mode > MODE_MASK {
        return Err(serde::de::Error::custom(format!(
            "invalid permission mode: 0o{:o} exceeds maximum 0o77",
            mode
        )));
    }
    Ok(mode)
}

/// Kind of access being checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    Read,
    Write,
    Execute,
}

impl Access {
    /// Three-bit mask of this access within a triad
    #[inline(always)]
    #[must_use]
    pub const fn mask(&self) -> u8 {
        match self {
            Access::Read => 0b100,
            Access::Write => 0b010,
            Access::Execute => 0b001,
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Access::Read => write!(f, "read"),
            Access::Write => write!(f, "write"),
            Access::Execute => write!(f, "execute"),
        }
    }
}

/// Check whether `username` may perform `access` on `node`
///
/// The root user always passes. A node without an owner is treated as
/// corrupted and denies every other caller.
///
/// # Performance
/// Hot path - consulted before every mutation
pub fn has_permission(node: &Node, username: &str, access: Access) -> bool {
    if username == ROOT_USER {
        return true;
    }

    if node.owner().is_empty() {
        warn!(
            user = %username,
            access = %access,
            "node has no owner, denying access"
        );
        return false;
    }

    let triad = if username == node.owner() {
        node.mode().owner_bits()
    } else {
        node.mode().other_bits()
    };

    let mask = access.mask();
    triad & mask == mask
}

/// Render a node's permission string
///
/// Layout is seven characters: the type flag ('d' or '-') followed by the
/// owner triad and the other triad, e.g. `drwxr-x`.
pub fn format_mode(node: &Node) -> String {
    let mode = node.mode();
    let mut out = String::with_capacity(7);
    out.push(node.node_type().flag());
    push_triad(&mut out, mode.owner_bits());
    push_triad(&mut out, mode.other_bits());
    out
}

fn push_triad(out: &mut String, bits: u8) {
    out.push(if bits & 0b100 != 0 { 'r' } else { '-' });
    out.push(if bits & 0b010 != 0 { 'w' } else { '-' });
    out.push(if bits & 0b001 != 0 { 'x' } else { '-' });
}
