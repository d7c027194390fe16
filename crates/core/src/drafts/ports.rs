//! Port interfaces for local draft storage

use async_trait::async_trait;
use openbooks_domain::{ChatMessage, ChatThread, DraftDocument, DraftKind, Result, StoredImage, SyncStatus};

/// Trait for persisting offline draft documents
#[async_trait]
pub trait DraftStore: Send + Sync {
    /// Insert or replace a draft
    async fn save_draft(&self, draft: &DraftDocument) -> Result<()>;

    /// Get a draft by id
    async fn get_draft(&self, id: &str) -> Result<Option<DraftDocument>>;

    /// List drafts for an owner, optionally filtered by kind
    async fn list_drafts(&self, owner_id: &str, kind: Option<DraftKind>) -> Result<Vec<DraftDocument>>;

    /// List drafts in a given sync state, oldest first
    async fn list_drafts_by_sync_status(
        &self,
        status: SyncStatus,
        limit: usize,
    ) -> Result<Vec<DraftDocument>>;

    /// Update the sync status of a draft
    async fn set_sync_status(&self, id: &str, status: SyncStatus) -> Result<()>;

    /// Delete a draft by id
    async fn delete_draft(&self, id: &str) -> Result<()>;
}

/// Trait for persisting chat threads and messages
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Create a new thread
    async fn create_thread(&self, thread: &ChatThread) -> Result<()>;

    /// Get a thread by id
    async fn get_thread(&self, id: &str) -> Result<Option<ChatThread>>;

    /// List threads for an owner, most recently updated first
    async fn list_threads(&self, owner_id: &str) -> Result<Vec<ChatThread>>;

    /// Rename a thread
    async fn rename_thread(&self, id: &str, title: &str) -> Result<()>;

    /// Delete a thread and its messages
    async fn delete_thread(&self, id: &str) -> Result<()>;

    /// Append a message to a thread
    async fn append_message(&self, message: &ChatMessage) -> Result<()>;

    /// List messages in a thread in chronological order
    async fn list_messages(&self, thread_id: &str) -> Result<Vec<ChatMessage>>;
}

/// Trait for persisting uploaded images alongside drafts
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store an image blob
    async fn save_image(&self, image: &StoredImage) -> Result<()>;

    /// Get an image by id
    async fn get_image(&self, id: &str) -> Result<Option<StoredImage>>;

    /// List images for an owner (metadata plus data)
    async fn list_images(&self, owner_id: &str) -> Result<Vec<StoredImage>>;

    /// Delete an image by id
    async fn delete_image(&self, id: &str) -> Result<()>;
}
