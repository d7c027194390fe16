//! Application context - dependency injection container
//!
//! Replaces process-wide singletons with an explicit container constructed
//! at startup and torn down explicitly. State ownership is visible: whoever
//! holds the context owns the stores and the running sync worker.

use std::sync::Arc;
use std::time::Duration;

use openbooks_core::{ChatStore, DraftService, DraftStore, ImageStore};
use openbooks_domain::{BooksError, Config, Result};
use openbooks_infra::api::{ApiClient, ApiClientConfig, QueryClient};
use openbooks_infra::database::{
    DbManager, SqliteChatStore, SqliteDraftStore, SqliteImageStore,
};
use openbooks_infra::sync::{DraftForwarder, DraftSyncWorker, SyncWorkerConfig};
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Type alias for draft store port trait object
type DynDraftStore = dyn DraftStore + 'static;

/// Type alias for chat store port trait object
type DynChatStore = dyn ChatStore + 'static;

/// Type alias for image store port trait object
type DynImageStore = dyn ImageStore + 'static;

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    pub db: Arc<DbManager>,
    pub drafts: Arc<DraftService>,
    pub draft_store: Arc<DynDraftStore>,
    pub chat_store: Arc<DynChatStore>,
    pub image_store: Arc<DynImageStore>,
    pub api: Arc<ApiClient>,
    pub queries: Arc<QueryClient>,
    sync_worker: Mutex<Option<DraftSyncWorker>>,
}

impl AppContext {
    /// Build the full dependency graph and, when sync is enabled, start the
    /// background sync worker.
    pub async fn init(config: Config) -> Result<Self> {
        info!("Initialising application context");

        let db = Arc::new(DbManager::new(&config.database.path, config.database.pool_size)?);
        db.run_migrations()?;
        db.health_check()?;

        let draft_store: Arc<DynDraftStore> = Arc::new(SqliteDraftStore::new(Arc::clone(&db)));
        let chat_store: Arc<DynChatStore> = Arc::new(SqliteChatStore::new(Arc::clone(&db)));
        let image_store: Arc<DynImageStore> = Arc::new(SqliteImageStore::new(Arc::clone(&db)));

        let drafts = Arc::new(DraftService::new(Arc::clone(&draft_store)));

        let api = Arc::new(
            ApiClient::with_config(ApiClientConfig::from(&config.sync))
                .map_err(|e| BooksError::Config(e.to_string()))?,
        );
        let queries = Arc::new(QueryClient::new(Arc::clone(&api)));

        let sync_worker = if config.sync.enabled {
            let forwarder: Arc<dyn DraftForwarder> = api.clone();
            let mut worker = DraftSyncWorker::new(
                Arc::clone(&draft_store),
                forwarder,
                SyncWorkerConfig {
                    poll_interval: Duration::from_secs(config.sync.interval_seconds),
                    ..Default::default()
                },
            );
            worker.start().await.map_err(BooksError::Internal)?;
            Some(worker)
        } else {
            info!("Background sync disabled by configuration");
            None
        };

        info!(db_path = %config.database.path, sync_enabled = config.sync.enabled, "Application context ready");

        Ok(Self {
            config,
            db,
            drafts,
            draft_store,
            chat_store,
            image_store,
            api,
            queries,
            sync_worker: Mutex::new(sync_worker),
        })
    }

    /// Stop background work. Safe to call more than once.
    pub async fn shutdown(&self) {
        let mut guard = self.sync_worker.lock().await;
        if let Some(worker) = guard.as_mut() {
            if let Err(e) = worker.stop().await {
                warn!(error = %e, "sync worker did not stop cleanly");
            }
        }
        *guard = None;
        info!("Application context shut down");
    }

    /// Whether the background sync worker is currently running.
    pub async fn sync_running(&self) -> bool {
        self.sync_worker.lock().await.as_ref().map_or(false, DraftSyncWorker::is_running)
    }
}

#[cfg(test)]
mod tests {
    use openbooks_domain::DatabaseConfig;
    use tempfile::TempDir;

    use super::*;

    fn test_config(dir: &TempDir) -> Config {
        Config {
            database: DatabaseConfig {
                path: dir.path().join("books.db").to_string_lossy().into_owned(),
                pool_size: 2,
            },
            ..Config::default()
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn init_without_sync_leaves_worker_stopped() {
        let dir = TempDir::new().expect("temp dir");
        let ctx = AppContext::init(test_config(&dir)).await.expect("context initialised");

        assert!(!ctx.sync_running().await);
        ctx.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn init_with_sync_starts_and_shutdown_stops_worker() {
        let dir = TempDir::new().expect("temp dir");
        let mut config = test_config(&dir);
        config.sync.enabled = true;

        let ctx = AppContext::init(config).await.expect("context initialised");
        assert!(ctx.sync_running().await);

        ctx.shutdown().await;
        assert!(!ctx.sync_running().await);

        // Shutdown is idempotent
        ctx.shutdown().await;
    }
}
