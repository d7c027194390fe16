//! # OpenBooks Infrastructure
//!
//! Infrastructure layer: SQLite persistence, remote API access, sync worker,
//! configuration loading and migration tooling.
//!
//! This crate implements the port traits defined in `openbooks-core`:
//! - `database`: pooled SQLite stores for drafts, chat threads and images
//! - `api`: HTTP client for the remote bookkeeping API and a cached query layer
//! - `sync`: background worker pushing dirty drafts to the remote system
//! - `config`: environment/file configuration loading
//! - `migrations`: SQL migration runner used by the `openbooks-migrate` binary

pub mod api;
pub mod config;
pub mod database;
pub mod errors;
pub mod migrations;
pub mod sync;

pub use api::{ApiClient, ApiClientConfig, QueryClient};
pub use database::{
    DbManager, SqliteChatStore, SqliteDraftStore, SqliteImageStore,
};
pub use errors::InfraError;
pub use migrations::MigrationRunner;
pub use sync::{DraftForwarder, DraftSyncWorker, SyncError, SyncWorkerConfig};
