/*!
 * termfs - Main Entry Point
 *
 * Boots one session over the configured backing store:
 * - Loads (or self-heals) the namespace snapshot
 * - Restores the acting user's automatic session state
 * - Saves the session and the namespace again before exiting
 */

use anyhow::Context;
use std::sync::Arc;
use tracing::{info, warn};

use termfs::{
    init_tracing, span_operation, Config, FileStore, KvStore, MemoryStore, NamespaceTree,
    PersistenceStore, SessionContext, SessionStateManager, SnapshotOrigin,
};

async fn open_store(config: &Config) -> Arc<dyn KvStore> {
    let Some(path) = &config.store_path else {
        info!("No store path configured, using in-memory store");
        return Arc::new(MemoryStore::new());
    };

    match FileStore::open(path).await {
        Ok(store) => {
            info!(path = %path.display(), "File store opened");
            Arc::new(store)
        }
        Err(e) => {
            warn!(error = %e, "File store unavailable, falling back to in-memory store");
            Arc::new(MemoryStore::new())
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    init_tracing(config.trace_json);

    info!(version = env!("CARGO_PKG_VERSION"), user = %config.user, "termfs starting");

    let store = open_store(&config).await;
    let persistence = PersistenceStore::new(Arc::clone(&store));
    let sessions = SessionStateManager::new(store);

    let loaded = {
        let span = span_operation("load_namespace");
        let loaded = persistence.load().await;
        span.record_outcome(&format!("{:?}", loaded.origin));
        loaded
    };
    if loaded.origin == SnapshotOrigin::InMemoryOnly {
        warn!("Namespace is not durable this session");
    }

    let tree = NamespaceTree::new(loaded.root).context("loaded namespace has no directory root")?;
    let mut ctx = SessionContext::new(config.user.clone(), tree);
    let state = sessions.load_automatic(&ctx.user, &ctx.tree).await;
    ctx.apply_auto_state(state);

    info!(
        user = %ctx.user,
        cwd = %ctx.tree.cwd(),
        bytes = NamespaceTree::compute_size(Some(ctx.tree.root())),
        history = ctx.command_history.len(),
        "Session ready"
    );

    if persistence.is_degraded() {
        warn!("Store was unreadable at startup, leaving stored namespace and session untouched");
        info!("termfs stopped");
        return Ok(());
    }

    {
        let _span = span_operation("shutdown_save");
        sessions
            .save_automatic(&ctx)
            .await
            .context("failed to save session state")?;
        persistence
            .save(ctx.tree.root())
            .await
            .context("failed to save namespace")?;
    }

    info!("termfs stopped");
    Ok(())
}
