//! # OpenBooks Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Billing calculations (subtotals, totals, adjustments)
//! - Aging classification for receivables/payables
//! - Draft lifecycle service and storage port traits
//!
//! ## Architecture Principles
//! - Only depends on `openbooks-domain`
//! - No database or HTTP code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod billing;
pub mod drafts;
pub mod reports;

// Re-export specific items to avoid ambiguity
pub use billing::calc::{adjustment_contribution, document_totals, subtotal, total};
pub use drafts::ports::{ChatStore, DraftStore, ImageStore};
pub use drafts::service::DraftService;
pub use reports::aging::{age_document, bucket_summary, classify, days_overdue, BucketTotal};
