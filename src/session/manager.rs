/*!
 * Session State Manager
 * Automatic and manual per-user state in the shared backing store
 */

use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use super::confirm::{ConfirmationGate, ConfirmationRequest, RequestOutcome};
use super::state::{AutoState, ManualState, MessageSink, SessionContext};
use crate::config::{AUTO_STATE_PREFIX, MANUAL_STATE_PREFIX, OS_VERSION_TAG};
use crate::store::KvStore;
use crate::vfs::{decode_snapshot, FsError, FsResult, NamespaceTree};

/// Gate type used for confirmation-gated manual restores
pub type RestoreGate = ConfirmationGate<ManualState, SessionContext>;

const FS_SNAPSHOT_FIELD: &str = "fsSnapshot";

/// Persists per-user session state next to the namespace snapshot
#[derive(Clone)]
pub struct SessionStateManager {
    store: Arc<dyn KvStore>,
}

impl std::fmt::Debug for SessionStateManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStateManager")
            .field("store", &self.store.name())
            .finish()
    }
}

impl SessionStateManager {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    fn auto_key(user: &str) -> String {
        format!("{}{}", AUTO_STATE_PREFIX, user)
    }

    fn manual_key(user: &str) -> String {
        format!("{}{}", MANUAL_STATE_PREFIX, user)
    }

    /// Write a record prepared at call time
    fn write(
        &self,
        key: String,
        prepared: FsResult<Value>,
    ) -> impl Future<Output = FsResult<()>> + Send + 'static {
        let store = Arc::clone(&self.store);
        async move {
            let value = prepared?;
            store.put(&key, value).await.map_err(|e| {
                warn!(key = %key, error = %e, "Failed to persist session state");
                FsError::from(e)
            })?;
            debug!(key = %key, "session state saved");
            Ok(())
        }
    }

    // =========================================================================
    // Automatic state
    // =========================================================================

    /// Save the automatic state of the context's user
    ///
    /// The state is captured before this returns.
    pub fn save_automatic(
        &self,
        ctx: &SessionContext,
    ) -> impl Future<Output = FsResult<()>> + Send + 'static {
        let prepared = serde_json::to_value(ctx.to_auto_state())
            .map_err(|e| FsError::Malformed(format!("cannot serialize session state: {}", e)));
        self.write(Self::auto_key(&ctx.user), prepared)
    }

    /// Load a user's automatic state
    ///
    /// Missing, unreadable or unreachable state yields a fresh default.
    pub async fn load_automatic(&self, user: &str, tree: &NamespaceTree) -> AutoState {
        let raw = match self.store.get(&Self::auto_key(user)).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(user = %user, "no saved session, starting fresh");
                return AutoState::fresh(user, tree);
            }
            Err(e) => {
                warn!(user = %user, error = %e, "Session state unavailable, starting fresh");
                return AutoState::fresh(user, tree);
            }
        };

        serde_json::from_value(raw).unwrap_or_else(|e| {
            warn!(user = %user, error = %e, "Saved session state is malformed, starting fresh");
            AutoState::fresh(user, tree)
        })
    }

    /// Save the outgoing user's state and load the incoming user's
    pub async fn switch_user(&self, ctx: &mut SessionContext, new_user: &str) {
        if let Err(e) = self.save_automatic(ctx).await {
            warn!(user = %ctx.user, error = %e, "Could not save session before switching user");
        }

        let state = self.load_automatic(new_user, &ctx.tree).await;
        info!(from = %ctx.user, to = %new_user, "Switching user");
        ctx.user = new_user.to_string();
        ctx.apply_auto_state(state);
    }

    // =========================================================================
    // Manual state
    // =========================================================================

    /// Save automatic state plus a full copy of the namespace
    pub fn save_manual(
        &self,
        ctx: &SessionContext,
    ) -> impl Future<Output = FsResult<()>> + Send + 'static {
        let manual = ManualState {
            user: ctx.user.clone(),
            os_version_tag: OS_VERSION_TAG.to_string(),
            timestamp: OffsetDateTime::now_utc(),
            state: ctx.to_auto_state(),
            fs_snapshot: ctx.tree.root().clone(),
        };
        let prepared = serde_json::to_value(manual)
            .map_err(|e| FsError::Malformed(format!("cannot serialize session snapshot: {}", e)));
        self.write(Self::manual_key(&ctx.user), prepared)
    }

    /// Read the context user's manual snapshot and ask for confirmation
    ///
    /// Returns `Ok(false)` when nothing was placed on the gate: there is no
    /// snapshot, or another confirmation is already pending. The restore
    /// itself happens when the gate is resolved with the token.
    pub async fn load_manual(&self, ctx: &mut SessionContext, gate: &mut RestoreGate) -> FsResult<bool> {
        let raw = self
            .store
            .get(&Self::manual_key(&ctx.user))
            .await
            .map_err(FsError::from)?;

        let Some(raw) = raw else {
            ctx.append_message("No saved session found.");
            return Ok(false);
        };

        let manual = match Self::decode_manual(raw) {
            Ok(manual) => manual,
            Err(e) => {
                warn!(user = %ctx.user, error = %e, "Saved session snapshot is corrupt");
                ctx.append_message("Saved session is unreadable.");
                return Err(e);
            }
        };

        let prompt = vec![
            format!(
                "Restore session saved by {} at {} ({})?",
                manual.user, manual.timestamp, manual.os_version_tag
            ),
            "This overwrites the current filesystem and terminal state.".to_string(),
        ];
        let request = ConfirmationRequest::new(prompt, manual, |manual, ctx: &mut SessionContext| {
            ctx.apply_manual_state(manual)
        })
        .on_cancel(|_, ctx: &mut SessionContext| ctx.append_message("Session restore cancelled."));

        Ok(gate.request(request, ctx) == RequestOutcome::Pending)
    }

    /// Decode a manual record, backfilling legacy fields of its tree copy
    fn decode_manual(mut raw: Value) -> FsResult<ManualState> {
        let object = raw
            .as_object_mut()
            .ok_or_else(|| FsError::CorruptSnapshot("session record is not an object".to_string()))?;
        let snapshot = object
            .remove(FS_SNAPSHOT_FIELD)
            .ok_or_else(|| FsError::CorruptSnapshot("session record has no filesystem copy".to_string()))?;

        let (root, report) = decode_snapshot(snapshot, OffsetDateTime::now_utc())?;
        if !report.is_clean() {
            debug!(?report, "backfilled legacy session snapshot");
        }
        let root = serde_json::to_value(root)
            .map_err(|e| FsError::Malformed(format!("cannot re-encode snapshot: {}", e)))?;
        object.insert(FS_SNAPSHOT_FIELD.to_string(), root);

        serde_json::from_value(raw)
            .map_err(|e| FsError::CorruptSnapshot(format!("bad session record: {}", e)))
    }

    /// Drop both saved states of `user`
    pub async fn clear_user(&self, user: &str) -> FsResult<()> {
        self.store.delete(&Self::auto_key(user)).await?;
        self.store.delete(&Self::manual_key(user)).await?;
        info!(user = %user, "Session state cleared");
        Ok(())
    }
}
