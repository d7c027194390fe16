//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Local store identity
pub const STORE_NAME: &str = "open-bookkeeping";

// Aging bucket boundaries (inclusive upper bounds, in days past due)
pub const AGING_CURRENT_MAX_DAYS: i64 = 0;
pub const AGING_BUCKET_1_MAX_DAYS: i64 = 30;
pub const AGING_BUCKET_2_MAX_DAYS: i64 = 60;
pub const AGING_BUCKET_3_MAX_DAYS: i64 = 90;

// Sync worker defaults
pub const DEFAULT_SYNC_BATCH_SIZE: usize = 50;
pub const DEFAULT_SYNC_POLL_SECS: u64 = 60;

// Migration runner
pub const STATEMENT_BREAKPOINT: &str = "--> statement-breakpoint";
pub const MIGRATIONS_TRACKING_TABLE: &str = "applied_migrations";
