//! Background synchronization of local drafts to the remote API.

pub mod errors;
pub mod worker;

pub use errors::{SyncError, SyncErrorCategory};
pub use worker::{DraftForwarder, DraftSyncWorker, SyncWorkerConfig};
