//! Draft document commands
//!
//! CRUD over locally persisted drafts plus explicit submission to the
//! remote system. Submission deletes the local draft on success; failures
//! leave the draft in the `local` sync state for the background worker.

use std::time::Instant;

use openbooks_domain::{BooksError, DraftDocument, DraftKind, Result, SyncStatus};
use tracing::{info, warn};

use crate::context::AppContext;
use crate::utils::logging::{error_label, log_command_execution};

/// Create a new draft in the local store.
pub async fn create_draft(
    ctx: &AppContext,
    owner_id: &str,
    kind: DraftKind,
    payload: serde_json::Value,
) -> Result<DraftDocument> {
    let started = Instant::now();
    let result = ctx.drafts.create_draft(owner_id, kind, "draft", payload).await;
    log_command_execution("drafts::create_draft", started.elapsed(), result.is_ok());
    result
}

/// Replace a draft's payload, re-dirtying it for sync.
pub async fn update_draft(
    ctx: &AppContext,
    id: &str,
    payload: serde_json::Value,
) -> Result<DraftDocument> {
    let started = Instant::now();
    let result = ctx.drafts.update_draft(id, "draft", payload).await;
    log_command_execution("drafts::update_draft", started.elapsed(), result.is_ok());
    result
}

/// Fetch a single draft by id.
pub async fn get_draft(ctx: &AppContext, id: &str) -> Result<Option<DraftDocument>> {
    let started = Instant::now();
    let result = ctx.drafts.get_draft(id).await;
    log_command_execution("drafts::get_draft", started.elapsed(), result.is_ok());
    result
}

/// List drafts for an owner, optionally filtered by document kind.
pub async fn list_drafts(
    ctx: &AppContext,
    owner_id: &str,
    kind: Option<DraftKind>,
) -> Result<Vec<DraftDocument>> {
    let started = Instant::now();
    let result = ctx.drafts.list_drafts(owner_id, kind).await;
    log_command_execution("drafts::list_drafts", started.elapsed(), result.is_ok());
    result
}

/// Discard a draft.
pub async fn delete_draft(ctx: &AppContext, id: &str) -> Result<()> {
    let started = Instant::now();
    let result = ctx.drafts.delete_draft(id).await;
    log_command_execution("drafts::delete_draft", started.elapsed(), result.is_ok());
    result
}

/// Submit a draft to the remote system and remove it locally.
///
/// On forwarding failure the draft is re-dirtied so the sync worker retries
/// it later, and the server-reported message is surfaced to the caller.
pub async fn submit_draft(ctx: &AppContext, id: &str) -> Result<String> {
    let started = Instant::now();
    let result = submit_draft_inner(ctx, id).await;
    log_command_execution("drafts::submit_draft", started.elapsed(), result.is_ok());
    if let Err(e) = &result {
        warn!(draft_id = id, error_kind = error_label(e), "draft submission failed");
    }
    result
}

async fn submit_draft_inner(ctx: &AppContext, id: &str) -> Result<String> {
    let draft = ctx
        .drafts
        .get_draft(id)
        .await?
        .ok_or_else(|| BooksError::NotFound(format!("draft {id} not found")))?;

    let idempotency_key = format!("{}:{}", draft.id, draft.updated_at);

    match draft.sync_status {
        // The background worker already pushed this revision. The server
        // deduplicates on the idempotency key, so resubmitting returns the
        // existing record's id; all that is left is the local delete.
        SyncStatus::Synced => {
            let remote_id = ctx
                .api
                .submit_draft(&draft, &idempotency_key)
                .await
                .map_err(|err| BooksError::Network(err.to_string()))?;
            info!(draft_id = id, remote_id = %remote_id, "already-synced draft submitted");
            ctx.drafts.delete_draft(id).await?;
            Ok(remote_id)
        }
        SyncStatus::Syncing => Err(BooksError::InvalidInput(format!(
            "draft {id} is being synced, retry shortly"
        ))),
        SyncStatus::Local => {
            ctx.drafts.transition_sync_status(id, SyncStatus::Syncing).await?;

            match ctx.api.submit_draft(&draft, &idempotency_key).await {
                Ok(remote_id) => {
                    info!(draft_id = id, remote_id = %remote_id, "draft submitted");
                    ctx.drafts.delete_draft(id).await?;
                    Ok(remote_id)
                }
                Err(err) => {
                    ctx.drafts.transition_sync_status(id, SyncStatus::Local).await?;
                    Err(BooksError::Network(err.to_string()))
                }
            }
        }
    }
}
