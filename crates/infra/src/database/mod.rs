//! SQLite persistence for the local draft store.

pub mod chat_repository;
pub mod draft_repository;
pub mod image_repository;
pub mod manager;

pub use chat_repository::SqliteChatStore;
pub use draft_repository::SqliteDraftStore;
pub use image_repository::SqliteImageStore;
pub use manager::DbManager;
