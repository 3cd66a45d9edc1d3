/*!
 * Session Module
 * Per-user terminal state, user switching and confirmation-gated restores
 *
 * ## Features
 * - Automatic state saved on every user switch, fresh default on first login
 * - Manual snapshots carrying a full namespace copy
 * - Single-slot confirmation gate for operations that overwrite live state
 */

pub mod confirm;
pub mod manager;
pub mod state;

// Re-exports
pub use confirm::{
    ConfirmCallback, ConfirmationGate, ConfirmationRequest, RequestOutcome, Resolution,
};
pub use manager::{RestoreGate, SessionStateManager};
pub use state::{AutoState, ManualState, MessageSink, SessionContext};
