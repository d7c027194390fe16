//! Draft lifecycle service.
//!
//! Wraps a [`DraftStore`] port with the lifecycle rules for offline drafts:
//! new drafts start in the `local` sync state, edits to a synced draft dirty
//! it back to `local`, and sync-state changes only follow the legal edges of
//! the status machine.

use std::sync::Arc;

use chrono::Utc;
use openbooks_domain::{BooksError, DraftDocument, DraftKind, Result, SyncStatus};
use tracing::{debug, warn};
use uuid::Uuid;

use super::ports::DraftStore;

/// Business-level operations over stored drafts.
pub struct DraftService {
    store: Arc<dyn DraftStore>,
}

impl DraftService {
    pub fn new(store: Arc<dyn DraftStore>) -> Self {
        Self { store }
    }

    /// Create a new draft in the `local` sync state and persist it.
    pub async fn create_draft(
        &self,
        owner_id: &str,
        kind: DraftKind,
        status: &str,
        payload: serde_json::Value,
    ) -> Result<DraftDocument> {
        let now = Utc::now().timestamp();
        let draft = DraftDocument {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            kind,
            status: status.to_string(),
            sync_status: SyncStatus::Local,
            payload,
            created_at: now,
            updated_at: now,
        };
        self.store.save_draft(&draft).await?;
        debug!(draft_id = %draft.id, kind = %kind, "created draft");
        Ok(draft)
    }

    /// Replace a draft's payload and document status.
    ///
    /// Editing always dirties the draft: whatever sync state it was in, it
    /// comes back as `local` so the sync worker picks it up again.
    pub async fn update_draft(
        &self,
        id: &str,
        status: &str,
        payload: serde_json::Value,
    ) -> Result<DraftDocument> {
        let mut draft = self.require_draft(id).await?;
        draft.status = status.to_string();
        draft.payload = payload;
        draft.sync_status = SyncStatus::Local;
        draft.updated_at = Utc::now().timestamp();
        self.store.save_draft(&draft).await?;
        Ok(draft)
    }

    pub async fn get_draft(&self, id: &str) -> Result<Option<DraftDocument>> {
        self.store.get_draft(id).await
    }

    pub async fn list_drafts(
        &self,
        owner_id: &str,
        kind: Option<DraftKind>,
    ) -> Result<Vec<DraftDocument>> {
        self.store.list_drafts(owner_id, kind).await
    }

    pub async fn delete_draft(&self, id: &str) -> Result<()> {
        self.store.delete_draft(id).await
    }

    /// Drafts waiting to be pushed, oldest first.
    pub async fn pending_drafts(&self, limit: usize) -> Result<Vec<DraftDocument>> {
        self.store.list_drafts_by_sync_status(SyncStatus::Local, limit).await
    }

    /// Move a draft along the sync status machine.
    ///
    /// Rejects edges the machine does not allow (e.g. `local` -> `synced`
    /// without passing through `syncing`).
    pub async fn transition_sync_status(&self, id: &str, to: SyncStatus) -> Result<()> {
        let draft = self.require_draft(id).await?;
        if !draft.sync_status.can_transition_to(to) {
            warn!(
                draft_id = %id,
                from = %draft.sync_status,
                to = %to,
                "rejected sync status transition"
            );
            return Err(BooksError::InvalidInput(format!(
                "illegal sync transition {} -> {}",
                draft.sync_status, to
            )));
        }
        self.store.set_sync_status(id, to).await
    }

    async fn require_draft(&self, id: &str) -> Result<DraftDocument> {
        self.store
            .get_draft(id)
            .await?
            .ok_or_else(|| BooksError::NotFound(format!("draft {id} not found")))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;

    #[derive(Default)]
    struct MockDraftStore {
        drafts: Mutex<HashMap<String, DraftDocument>>,
    }

    #[async_trait]
    impl DraftStore for MockDraftStore {
        async fn save_draft(&self, draft: &DraftDocument) -> Result<()> {
            self.drafts.lock().unwrap().insert(draft.id.clone(), draft.clone());
            Ok(())
        }

        async fn get_draft(&self, id: &str) -> Result<Option<DraftDocument>> {
            Ok(self.drafts.lock().unwrap().get(id).cloned())
        }

        async fn list_drafts(
            &self,
            owner_id: &str,
            kind: Option<DraftKind>,
        ) -> Result<Vec<DraftDocument>> {
            let drafts = self.drafts.lock().unwrap();
            let mut out: Vec<_> = drafts
                .values()
                .filter(|d| d.owner_id == owner_id && kind.map_or(true, |k| d.kind == k))
                .cloned()
                .collect();
            out.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
            Ok(out)
        }

        async fn list_drafts_by_sync_status(
            &self,
            status: SyncStatus,
            limit: usize,
        ) -> Result<Vec<DraftDocument>> {
            let drafts = self.drafts.lock().unwrap();
            let mut out: Vec<_> =
                drafts.values().filter(|d| d.sync_status == status).cloned().collect();
            out.sort_by_key(|d| d.updated_at);
            out.truncate(limit);
            Ok(out)
        }

        async fn set_sync_status(&self, id: &str, status: SyncStatus) -> Result<()> {
            let mut drafts = self.drafts.lock().unwrap();
            let draft = drafts
                .get_mut(id)
                .ok_or_else(|| BooksError::NotFound(format!("draft {id} not found")))?;
            draft.sync_status = status;
            Ok(())
        }

        async fn delete_draft(&self, id: &str) -> Result<()> {
            self.drafts.lock().unwrap().remove(id);
            Ok(())
        }
    }

    fn service() -> (DraftService, Arc<MockDraftStore>) {
        let store = Arc::new(MockDraftStore::default());
        (DraftService::new(store.clone()), store)
    }

    #[tokio::test]
    async fn new_drafts_start_local() {
        let (service, _) = service();
        let draft = service
            .create_draft("owner-1", DraftKind::Invoice, "draft", json!({"items": []}))
            .await
            .unwrap();
        assert_eq!(draft.sync_status, SyncStatus::Local);
        assert_eq!(draft.created_at, draft.updated_at);
    }

    #[tokio::test]
    async fn editing_a_synced_draft_dirties_it() {
        let (service, store) = service();
        let draft = service
            .create_draft("owner-1", DraftKind::Quotation, "draft", json!({}))
            .await
            .unwrap();

        service.transition_sync_status(&draft.id, SyncStatus::Syncing).await.unwrap();
        service.transition_sync_status(&draft.id, SyncStatus::Synced).await.unwrap();

        let updated = service.update_draft(&draft.id, "sent", json!({"rev": 2})).await.unwrap();
        assert_eq!(updated.sync_status, SyncStatus::Local);

        let stored = store.get_draft(&draft.id).await.unwrap().unwrap();
        assert_eq!(stored.sync_status, SyncStatus::Local);
        assert_eq!(stored.payload, json!({"rev": 2}));
    }

    #[tokio::test]
    async fn illegal_transition_is_rejected() {
        let (service, _) = service();
        let draft = service
            .create_draft("owner-1", DraftKind::CreditNote, "draft", json!({}))
            .await
            .unwrap();

        let err = service
            .transition_sync_status(&draft.id, SyncStatus::Synced)
            .await
            .unwrap_err();
        assert!(matches!(err, BooksError::InvalidInput(_)));

        // Draft is untouched
        let stored = service.get_draft(&draft.id).await.unwrap().unwrap();
        assert_eq!(stored.sync_status, SyncStatus::Local);
    }

    #[tokio::test]
    async fn failed_sync_rolls_back_to_local() {
        let (service, _) = service();
        let draft = service
            .create_draft("owner-1", DraftKind::DebitNote, "draft", json!({}))
            .await
            .unwrap();

        service.transition_sync_status(&draft.id, SyncStatus::Syncing).await.unwrap();
        service.transition_sync_status(&draft.id, SyncStatus::Local).await.unwrap();

        let pending = service.pending_drafts(10).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, draft.id);
    }

    #[tokio::test]
    async fn list_drafts_filters_by_kind() {
        let (service, _) = service();
        service.create_draft("owner-1", DraftKind::Invoice, "draft", json!({})).await.unwrap();
        service.create_draft("owner-1", DraftKind::Quotation, "draft", json!({})).await.unwrap();
        service.create_draft("owner-2", DraftKind::Invoice, "draft", json!({})).await.unwrap();

        let all = service.list_drafts("owner-1", None).await.unwrap();
        assert_eq!(all.len(), 2);

        let invoices = service.list_drafts("owner-1", Some(DraftKind::Invoice)).await.unwrap();
        assert_eq!(invoices.len(), 1);
        assert_eq!(invoices[0].kind, DraftKind::Invoice);
    }

    #[tokio::test]
    async fn missing_draft_yields_not_found() {
        let (service, _) = service();
        let err = service.update_draft("nope", "draft", json!({})).await.unwrap_err();
        assert!(matches!(err, BooksError::NotFound(_)));
    }
}
