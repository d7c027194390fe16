//! SQLite-backed implementation of the `ImageStore` port.
//!
//! Image payloads are stored as BLOBs next to their metadata. Uploads are
//! small scans and receipts, so no size-based chunking is done here.

use std::sync::Arc;

use async_trait::async_trait;
use openbooks_core::ImageStore;
use openbooks_domain::{BooksError, Result, StoredImage};
use rusqlite::{params, OptionalExtension, Row};
use tokio::task;

use super::manager::DbManager;
use crate::errors::InfraError;

/// SQLite-backed image repository.
pub struct SqliteImageStore {
    db: Arc<DbManager>,
}

impl SqliteImageStore {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ImageStore for SqliteImageStore {
    async fn save_image(&self, image: &StoredImage) -> Result<()> {
        let db = Arc::clone(&self.db);
        let image = image.clone();

        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            conn.execute(
                "INSERT OR REPLACE INTO stored_images (id, owner_id, file_name, mime_type, data, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    image.id,
                    image.owner_id,
                    image.file_name,
                    image.mime_type,
                    image.data,
                    image.created_at
                ],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn get_image(&self, id: &str) -> Result<Option<StoredImage>> {
        let db = Arc::clone(&self.db);
        let id = id.to_owned();

        task::spawn_blocking(move || -> Result<Option<StoredImage>> {
            let conn = db.get_connection()?;
            conn.query_row(IMAGE_SELECT_BY_ID, params![id], map_image_row)
                .optional()
                .map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn list_images(&self, owner_id: &str) -> Result<Vec<StoredImage>> {
        let db = Arc::clone(&self.db);
        let owner_id = owner_id.to_owned();

        task::spawn_blocking(move || -> Result<Vec<StoredImage>> {
            let conn = db.get_connection()?;
            let mut stmt = conn.prepare(IMAGE_SELECT_BY_OWNER).map_err(map_sql_error)?;
            let rows =
                stmt.query_map(params![owner_id], map_image_row).map_err(map_sql_error)?;
            rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn delete_image(&self, id: &str) -> Result<()> {
        let db = Arc::clone(&self.db);
        let id = id.to_owned();

        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            conn.execute("DELETE FROM stored_images WHERE id = ?1", params![id])
                .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }
}

const IMAGE_SELECT_BY_ID: &str = "SELECT id, owner_id, file_name, mime_type, data, created_at
    FROM stored_images
    WHERE id = ?1";

const IMAGE_SELECT_BY_OWNER: &str = "SELECT id, owner_id, file_name, mime_type, data, created_at
    FROM stored_images
    WHERE owner_id = ?1
    ORDER BY created_at DESC";

fn map_image_row(row: &Row<'_>) -> rusqlite::Result<StoredImage> {
    Ok(StoredImage {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        file_name: row.get(2)?,
        mime_type: row.get(3)?,
        data: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn map_sql_error(err: rusqlite::Error) -> BooksError {
    BooksError::from(InfraError::from(err))
}

fn map_join_error(err: task::JoinError) -> BooksError {
    if err.is_cancelled() {
        BooksError::Internal("blocking image repository task cancelled".into())
    } else {
        BooksError::Internal(format!("blocking image repository task failed: {err}"))
    }
}
