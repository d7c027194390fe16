//! SQLite-backed implementation of the `ChatStore` port.
//!
//! Threads and messages live in separate tables; deleting a thread cascades
//! to its messages. Appending a message bumps the parent thread's
//! `updated_at` so the thread list stays ordered by recency.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use openbooks_core::ChatStore;
use openbooks_domain::{BooksError, ChatMessage, ChatThread, MessageRole, Result};
use rusqlite::{params, OptionalExtension, Row};
use tokio::task;

use super::manager::DbManager;
use crate::errors::InfraError;

/// SQLite-backed chat repository.
pub struct SqliteChatStore {
    db: Arc<DbManager>,
}

impl SqliteChatStore {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ChatStore for SqliteChatStore {
    async fn create_thread(&self, thread: &ChatThread) -> Result<()> {
        let db = Arc::clone(&self.db);
        let thread = thread.clone();

        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            conn.execute(
                "INSERT INTO chat_threads (id, owner_id, title, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    thread.id,
                    thread.owner_id,
                    thread.title,
                    thread.created_at,
                    thread.updated_at
                ],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn get_thread(&self, id: &str) -> Result<Option<ChatThread>> {
        let db = Arc::clone(&self.db);
        let id = id.to_owned();

        task::spawn_blocking(move || -> Result<Option<ChatThread>> {
            let conn = db.get_connection()?;
            conn.query_row(THREAD_SELECT_BY_ID, params![id], map_thread_row)
                .optional()
                .map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn list_threads(&self, owner_id: &str) -> Result<Vec<ChatThread>> {
        let db = Arc::clone(&self.db);
        let owner_id = owner_id.to_owned();

        task::spawn_blocking(move || -> Result<Vec<ChatThread>> {
            let conn = db.get_connection()?;
            let mut stmt = conn.prepare(THREAD_SELECT_BY_OWNER).map_err(map_sql_error)?;
            let rows =
                stmt.query_map(params![owner_id], map_thread_row).map_err(map_sql_error)?;
            rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn rename_thread(&self, id: &str, title: &str) -> Result<()> {
        let db = Arc::clone(&self.db);
        let id = id.to_owned();
        let title = title.to_owned();

        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            let changed = conn
                .execute(
                    "UPDATE chat_threads SET title = ?1 WHERE id = ?2",
                    params![title, id],
                )
                .map_err(map_sql_error)?;
            if changed == 0 {
                return Err(BooksError::NotFound(format!("thread {id} not found")));
            }
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn delete_thread(&self, id: &str) -> Result<()> {
        let db = Arc::clone(&self.db);
        let id = id.to_owned();

        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            conn.execute("DELETE FROM chat_threads WHERE id = ?1", params![id])
                .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn append_message(&self, message: &ChatMessage) -> Result<()> {
        let db = Arc::clone(&self.db);
        let message = message.clone();

        task::spawn_blocking(move || -> Result<()> {
            let mut conn = db.get_connection()?;
            let tx = conn.transaction().map_err(map_sql_error)?;
            tx.execute(
                "INSERT INTO chat_messages (id, thread_id, role, body, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    message.id,
                    message.thread_id,
                    message.role.as_str(),
                    message.body,
                    message.created_at
                ],
            )
            .map_err(map_sql_error)?;
            tx.execute(
                "UPDATE chat_threads SET updated_at = ?1 WHERE id = ?2",
                params![message.created_at, message.thread_id],
            )
            .map_err(map_sql_error)?;
            tx.commit().map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn list_messages(&self, thread_id: &str) -> Result<Vec<ChatMessage>> {
        let db = Arc::clone(&self.db);
        let thread_id = thread_id.to_owned();

        task::spawn_blocking(move || -> Result<Vec<ChatMessage>> {
            let conn = db.get_connection()?;
            let mut stmt = conn.prepare(MESSAGE_SELECT_BY_THREAD).map_err(map_sql_error)?;
            let rows =
                stmt.query_map(params![thread_id], map_message_row).map_err(map_sql_error)?;
            rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }
}

const THREAD_SELECT_BY_ID: &str = "SELECT id, owner_id, title, created_at, updated_at
    FROM chat_threads
    WHERE id = ?1";

const THREAD_SELECT_BY_OWNER: &str = "SELECT id, owner_id, title, created_at, updated_at
    FROM chat_threads
    WHERE owner_id = ?1
    ORDER BY updated_at DESC";

const MESSAGE_SELECT_BY_THREAD: &str = "SELECT id, thread_id, role, body, created_at
    FROM chat_messages
    WHERE thread_id = ?1
    ORDER BY created_at ASC";

fn map_thread_row(row: &Row<'_>) -> rusqlite::Result<ChatThread> {
    Ok(ChatThread {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        title: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

fn map_message_row(row: &Row<'_>) -> rusqlite::Result<ChatMessage> {
    let role_raw: String = row.get(2)?;
    let role = MessageRole::from_str(&role_raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            e.to_string().into(),
        )
    })?;

    Ok(ChatMessage {
        id: row.get(0)?,
        thread_id: row.get(1)?,
        role,
        body: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn map_sql_error(err: rusqlite::Error) -> BooksError {
    BooksError::from(InfraError::from(err))
}

fn map_join_error(err: task::JoinError) -> BooksError {
    if err.is_cancelled() {
        BooksError::Internal("blocking chat repository task cancelled".into())
    } else {
        BooksError::Internal(format!("blocking chat repository task failed: {err}"))
    }
}
