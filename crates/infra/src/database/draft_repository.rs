//! SQLite-backed implementation of the `DraftStore` port.
//!
//! Persists offline draft documents with their sync status. All queries go
//! through the shared `DbManager` pool and run on the blocking thread pool.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use openbooks_core::DraftStore;
use openbooks_domain::{BooksError, DraftDocument, DraftKind, Result, SyncStatus};
use rusqlite::{params, OptionalExtension, Row, ToSql};
use tokio::task;

use super::manager::DbManager;
use crate::errors::InfraError;

/// SQLite-backed draft repository.
pub struct SqliteDraftStore {
    db: Arc<DbManager>,
}

impl SqliteDraftStore {
    /// Create a new repository backed by the shared `DbManager`.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DraftStore for SqliteDraftStore {
    async fn save_draft(&self, draft: &DraftDocument) -> Result<()> {
        let db = Arc::clone(&self.db);
        let draft = draft.clone();

        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            let payload_json =
                serde_json::to_string(&draft.payload).map_err(InfraError::from)?;
            conn.execute(
                INSERT_DRAFT_SQL,
                params![
                    draft.id,
                    draft.owner_id,
                    draft.kind.as_str(),
                    draft.status,
                    draft.sync_status.as_str(),
                    payload_json,
                    draft.created_at,
                    draft.updated_at,
                ],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn get_draft(&self, id: &str) -> Result<Option<DraftDocument>> {
        let db = Arc::clone(&self.db);
        let id = id.to_owned();

        task::spawn_blocking(move || -> Result<Option<DraftDocument>> {
            let conn = db.get_connection()?;
            conn.query_row(DRAFT_SELECT_BY_ID, params![id], map_draft_row)
                .optional()
                .map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn list_drafts(
        &self,
        owner_id: &str,
        kind: Option<DraftKind>,
    ) -> Result<Vec<DraftDocument>> {
        let db = Arc::clone(&self.db);
        let owner_id = owner_id.to_owned();

        task::spawn_blocking(move || -> Result<Vec<DraftDocument>> {
            let conn = db.get_connection()?;
            match kind {
                Some(kind) => {
                    let kind_str = kind.as_str();
                    let params: [&dyn ToSql; 2] = [&owner_id, &kind_str];
                    query_drafts(&conn, DRAFT_SELECT_BY_OWNER_AND_KIND, &params)
                }
                None => {
                    let params: [&dyn ToSql; 1] = [&owner_id];
                    query_drafts(&conn, DRAFT_SELECT_BY_OWNER, &params)
                }
            }
        })
        .await
        .map_err(map_join_error)?
    }

    async fn list_drafts_by_sync_status(
        &self,
        status: SyncStatus,
        limit: usize,
    ) -> Result<Vec<DraftDocument>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<Vec<DraftDocument>> {
            let conn = db.get_connection()?;
            let limit = limit as i64;
            let status_str = status.as_str();
            let params: [&dyn ToSql; 2] = [&status_str, &limit];
            query_drafts(&conn, DRAFT_SELECT_BY_SYNC_STATUS, &params)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn set_sync_status(&self, id: &str, status: SyncStatus) -> Result<()> {
        let db = Arc::clone(&self.db);
        let id = id.to_owned();

        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            let changed = conn
                .execute(
                    "UPDATE draft_documents SET sync_status = ?1 WHERE id = ?2",
                    params![status.as_str(), id],
                )
                .map_err(map_sql_error)?;
            if changed == 0 {
                return Err(BooksError::NotFound(format!("draft {id} not found")));
            }
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn delete_draft(&self, id: &str) -> Result<()> {
        let db = Arc::clone(&self.db);
        let id = id.to_owned();

        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            conn.execute("DELETE FROM draft_documents WHERE id = ?1", params![id])
                .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }
}

const INSERT_DRAFT_SQL: &str = "INSERT OR REPLACE INTO draft_documents (
        id, owner_id, kind, status, sync_status, payload_json, created_at, updated_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";

const DRAFT_SELECT_BY_ID: &str = "SELECT
        id, owner_id, kind, status, sync_status, payload_json, created_at, updated_at
    FROM draft_documents
    WHERE id = ?1";

const DRAFT_SELECT_BY_OWNER: &str = "SELECT
        id, owner_id, kind, status, sync_status, payload_json, created_at, updated_at
    FROM draft_documents
    WHERE owner_id = ?1
    ORDER BY updated_at DESC";

const DRAFT_SELECT_BY_OWNER_AND_KIND: &str = "SELECT
        id, owner_id, kind, status, sync_status, payload_json, created_at, updated_at
    FROM draft_documents
    WHERE owner_id = ?1 AND kind = ?2
    ORDER BY updated_at DESC";

const DRAFT_SELECT_BY_SYNC_STATUS: &str = "SELECT
        id, owner_id, kind, status, sync_status, payload_json, created_at, updated_at
    FROM draft_documents
    WHERE sync_status = ?1
    ORDER BY updated_at ASC
    LIMIT ?2";

fn query_drafts(
    conn: &rusqlite::Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> Result<Vec<DraftDocument>> {
    let mut stmt = conn.prepare(sql).map_err(map_sql_error)?;
    let rows = stmt.query_map(params, map_draft_row).map_err(map_sql_error)?;
    rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)
}

fn map_draft_row(row: &Row<'_>) -> rusqlite::Result<DraftDocument> {
    let kind_raw: String = row.get(2)?;
    let kind = DraftKind::from_str(&kind_raw)
        .map_err(|e| invalid_column(2, &e))?;
    let sync_raw: String = row.get(4)?;
    let sync_status = SyncStatus::from_str(&sync_raw)
        .map_err(|e| invalid_column(4, &e))?;
    let payload_raw: String = row.get(5)?;
    let payload: serde_json::Value = serde_json::from_str(&payload_raw)
        .map_err(|e| invalid_column(5, &e))?;

    Ok(DraftDocument {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        kind,
        status: row.get(3)?,
        sync_status,
        payload,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn invalid_column(index: usize, err: &dyn std::fmt::Display) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        index,
        rusqlite::types::Type::Text,
        err.to_string().into(),
    )
}

fn map_sql_error(err: rusqlite::Error) -> BooksError {
    BooksError::from(InfraError::from(err))
}

fn map_join_error(err: task::JoinError) -> BooksError {
    if err.is_cancelled() {
        BooksError::Internal("blocking draft repository task cancelled".into())
    } else {
        BooksError::Internal(format!("blocking draft repository task failed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    async fn setup() -> (SqliteDraftStore, Arc<DbManager>, TempDir) {
        let temp_dir = TempDir::new().expect("temp dir created");
        let db_path = temp_dir.path().join("drafts.db");

        let manager = Arc::new(DbManager::new(&db_path, 4).expect("db manager created"));
        manager.run_migrations().expect("migrations run");

        let store = SqliteDraftStore::new(manager.clone());
        (store, manager, temp_dir)
    }

    fn sample_draft(id: &str, owner: &str, kind: DraftKind, updated_at: i64) -> DraftDocument {
        DraftDocument {
            id: id.to_string(),
            owner_id: owner.to_string(),
            kind,
            status: "draft".to_string(),
            sync_status: SyncStatus::Local,
            payload: json!({"items": [{"quantity": 2.0, "unit_price": 50.0}]}),
            created_at: updated_at,
            updated_at,
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn saves_and_fetches_draft() {
        let (store, _manager, _dir) = setup().await;
        let draft = sample_draft("draft-1", "owner-1", DraftKind::Invoice, 1_750_000_000);

        store.save_draft(&draft).await.expect("draft saved");

        let fetched = store.get_draft("draft-1").await.expect("fetched").expect("present");
        assert_eq!(fetched, draft);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn save_replaces_existing_row() {
        let (store, _manager, _dir) = setup().await;
        let mut draft = sample_draft("draft-2", "owner-1", DraftKind::Quotation, 1_750_000_000);
        store.save_draft(&draft).await.expect("saved");

        draft.payload = json!({"rev": 2});
        draft.updated_at = 1_750_000_100;
        store.save_draft(&draft).await.expect("replaced");

        let fetched = store.get_draft("draft-2").await.unwrap().unwrap();
        assert_eq!(fetched.payload, json!({"rev": 2}));
        assert_eq!(fetched.updated_at, 1_750_000_100);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn lists_by_owner_and_kind() {
        let (store, _manager, _dir) = setup().await;
        store
            .save_draft(&sample_draft("a", "owner-1", DraftKind::Invoice, 1))
            .await
            .unwrap();
        store
            .save_draft(&sample_draft("b", "owner-1", DraftKind::Quotation, 2))
            .await
            .unwrap();
        store
            .save_draft(&sample_draft("c", "owner-2", DraftKind::Invoice, 3))
            .await
            .unwrap();

        let all = store.list_drafts("owner-1", None).await.unwrap();
        assert_eq!(all.len(), 2);
        // Most recently updated first
        assert_eq!(all[0].id, "b");

        let invoices = store.list_drafts("owner-1", Some(DraftKind::Invoice)).await.unwrap();
        assert_eq!(invoices.len(), 1);
        assert_eq!(invoices[0].id, "a");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn lists_pending_by_sync_status_oldest_first() {
        let (store, _manager, _dir) = setup().await;
        let mut synced = sample_draft("synced", "owner-1", DraftKind::Invoice, 1);
        synced.sync_status = SyncStatus::Synced;
        store.save_draft(&synced).await.unwrap();
        store
            .save_draft(&sample_draft("new", "owner-1", DraftKind::Invoice, 5))
            .await
            .unwrap();
        store
            .save_draft(&sample_draft("old", "owner-1", DraftKind::Invoice, 2))
            .await
            .unwrap();

        let pending = store.list_drafts_by_sync_status(SyncStatus::Local, 10).await.unwrap();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].id, "old");
        assert_eq!(pending[1].id, "new");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn set_sync_status_updates_row() {
        let (store, manager, _dir) = setup().await;
        store
            .save_draft(&sample_draft("draft-3", "owner-1", DraftKind::DebitNote, 1))
            .await
            .unwrap();

        store.set_sync_status("draft-3", SyncStatus::Syncing).await.expect("status set");

        let conn = manager.get_connection().unwrap();
        let status: String = conn
            .query_row(
                "SELECT sync_status FROM draft_documents WHERE id = 'draft-3'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(status, "syncing");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn set_sync_status_on_missing_draft_fails() {
        let (store, _manager, _dir) = setup().await;
        let err = store.set_sync_status("missing", SyncStatus::Syncing).await.unwrap_err();
        assert!(matches!(err, BooksError::NotFound(_)));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn delete_removes_draft() {
        let (store, _manager, _dir) = setup().await;
        store
            .save_draft(&sample_draft("draft-4", "owner-1", DraftKind::CreditNote, 1))
            .await
            .unwrap();

        store.delete_draft("draft-4").await.expect("deleted");
        assert!(store.get_draft("draft-4").await.unwrap().is_none());
    }
}
