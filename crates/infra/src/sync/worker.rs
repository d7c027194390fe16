//! Draft sync worker for periodic batch forwarding.
//!
//! Polls the local store for drafts in the `local` sync state, forwards each
//! one to the remote bookkeeping API, and advances the per-draft sync status
//! based on the outcome. Join handles are tracked, cancellation is explicit,
//! and batch processing is wrapped in a timeout.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use openbooks_core::DraftStore;
use openbooks_domain::constants::{DEFAULT_SYNC_BATCH_SIZE, DEFAULT_SYNC_POLL_SECS};
use openbooks_domain::{DraftDocument, SyncStatus};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::sync::errors::SyncError;

/// Configuration for the draft sync worker.
#[derive(Debug, Clone)]
pub struct SyncWorkerConfig {
    /// Maximum number of drafts to process per batch
    pub batch_size: usize,
    /// Interval between polling attempts
    pub poll_interval: Duration,
    /// Timeout for processing a single batch
    pub processing_timeout: Duration,
    /// Join timeout when stopping
    pub join_timeout: Duration,
}

impl Default for SyncWorkerConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_SYNC_BATCH_SIZE,
            poll_interval: Duration::from_secs(DEFAULT_SYNC_POLL_SECS),
            processing_timeout: Duration::from_secs(300),
            join_timeout: Duration::from_secs(5),
        }
    }
}

/// Interface for submitting drafts to a remote destination.
#[async_trait]
pub trait DraftForwarder: Send + Sync {
    /// Push a draft to the remote system using the provided idempotency key,
    /// returning the remote identifier.
    async fn forward_draft(
        &self,
        draft: &DraftDocument,
        idempotency_key: &str,
    ) -> Result<String, SyncError>;
}

/// Idempotency key for a draft push. Keyed on id and revision so a retried
/// push of the same revision deduplicates server-side, while a re-dirtied
/// draft gets a fresh key.
fn idempotency_key(draft: &DraftDocument) -> String {
    format!("{}:{}", draft.id, draft.updated_at)
}

/// Draft sync worker with explicit lifecycle management.
pub struct DraftSyncWorker {
    store: Arc<dyn DraftStore>,
    forwarder: Arc<dyn DraftForwarder>,
    config: SyncWorkerConfig,
    cancellation: CancellationToken,
    task_handle: Option<JoinHandle<()>>,
}

impl DraftSyncWorker {
    /// Create a new sync worker with the given configuration.
    pub fn new(
        store: Arc<dyn DraftStore>,
        forwarder: Arc<dyn DraftForwarder>,
        config: SyncWorkerConfig,
    ) -> Self {
        Self {
            store,
            forwarder,
            config,
            cancellation: CancellationToken::new(),
            task_handle: None,
        }
    }

    /// Start the worker, spawning the background processing task.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> Result<(), String> {
        if self.is_running() {
            return Err("Worker already running".to_string());
        }

        info!("Starting draft sync worker");

        self.cancellation = CancellationToken::new();

        let store = Arc::clone(&self.store);
        let forwarder = Arc::clone(&self.forwarder);
        let poll_interval = self.config.poll_interval;
        let batch_size = self.config.batch_size;
        let processing_timeout = self.config.processing_timeout;
        let cancel = self.cancellation.clone();

        let handle = tokio::spawn(async move {
            Self::process_loop(store, forwarder, poll_interval, batch_size, processing_timeout, cancel)
                .await;
        });

        self.task_handle = Some(handle);
        info!("Draft sync worker started");

        Ok(())
    }

    /// Stop the worker and wait for the processing task to finish.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> Result<(), String> {
        if !self.is_running() {
            return Err("Worker not running".to_string());
        }

        info!("Stopping draft sync worker");

        self.cancellation.cancel();

        if let Some(handle) = self.task_handle.take() {
            let join_timeout = self.config.join_timeout;
            match tokio::time::timeout(join_timeout, handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    warn!("Worker task panicked: {}", e);
                    return Err("Worker task panicked".to_string());
                }
                Err(_) => {
                    warn!("Worker task did not complete within timeout");
                    return Err("Worker task timeout".to_string());
                }
            }
        }

        info!("Draft sync worker stopped");
        self.cancellation = CancellationToken::new();

        Ok(())
    }

    /// Returns true when a worker instance is active.
    pub fn is_running(&self) -> bool {
        self.task_handle.is_some()
    }

    /// Background processing loop.
    async fn process_loop(
        store: Arc<dyn DraftStore>,
        forwarder: Arc<dyn DraftForwarder>,
        poll_interval: Duration,
        batch_size: usize,
        processing_timeout: Duration,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Draft sync process loop cancelled");
                    break;
                }
                _ = tokio::time::sleep(poll_interval) => {
                    match tokio::time::timeout(
                        processing_timeout,
                        Self::process_batch(&store, &forwarder, batch_size),
                    )
                    .await
                    {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => {
                            error!(error = %e, "Batch processing failed");
                        }
                        Err(_) => {
                            warn!(
                                timeout_secs = processing_timeout.as_secs(),
                                "Batch processing timed out"
                            );
                        }
                    }
                }
            }
        }
    }

    /// Process a single batch of dirty drafts.
    ///
    /// Each draft moves `local -> syncing` before the push, then `syncing ->
    /// synced` on success or `syncing -> local` on failure, so a crash
    /// mid-push leaves at most one draft stuck in `syncing`.
    async fn process_batch(
        store: &Arc<dyn DraftStore>,
        forwarder: &Arc<dyn DraftForwarder>,
        batch_size: usize,
    ) -> Result<(), String> {
        let drafts = store
            .list_drafts_by_sync_status(SyncStatus::Local, batch_size)
            .await
            .map_err(|e| format!("Failed to list pending drafts: {e}"))?;

        if drafts.is_empty() {
            debug!("No pending drafts to sync");
            return Ok(());
        }

        info!(count = drafts.len(), "Syncing draft batch");

        let mut fatal_errors: Vec<String> = Vec::new();
        let mut forwarded = 0_u32;
        let mut failures = 0_u32;

        for draft in drafts {
            if let Err(err) = store.set_sync_status(&draft.id, SyncStatus::Syncing).await {
                let msg = err.to_string();
                warn!(draft_id = %draft.id, error = %msg, "failed to mark draft syncing");
                fatal_errors.push(format!("set_sync_status error for {}: {}", draft.id, msg));
                continue;
            }

            match forwarder.forward_draft(&draft, &idempotency_key(&draft)).await {
                Ok(remote_id) => {
                    debug!(draft_id = %draft.id, remote_id = %remote_id, "Forwarded draft");
                    if let Err(err) = store.set_sync_status(&draft.id, SyncStatus::Synced).await {
                        let msg = err.to_string();
                        warn!(draft_id = %draft.id, error = %msg, "failed to mark draft synced");
                        fatal_errors
                            .push(format!("set_sync_status error for {}: {}", draft.id, msg));
                    } else {
                        forwarded = forwarded.saturating_add(1);
                    }
                }
                Err(err) => {
                    warn!(
                        draft_id = %draft.id,
                        error = %err,
                        retryable = err.should_retry(),
                        "Forwarding draft failed"
                    );
                    if let Err(mark_err) = store.set_sync_status(&draft.id, SyncStatus::Local).await
                    {
                        let msg = mark_err.to_string();
                        warn!(draft_id = %draft.id, error = %msg, "failed to re-dirty draft");
                        fatal_errors
                            .push(format!("set_sync_status error for {}: {}", draft.id, msg));
                    }
                    failures = failures.saturating_add(1);
                }
            }
        }

        debug!(forwarded = forwarded, failures = failures, "Draft batch completed");

        if !fatal_errors.is_empty() {
            return Err(fatal_errors.join("; "));
        }

        Ok(())
    }
}

impl Drop for DraftSyncWorker {
    fn drop(&mut self) {
        if self.is_running() {
            warn!("DraftSyncWorker dropped while running; cancelling tasks");
            self.cancellation.cancel();
        }
    }
}
