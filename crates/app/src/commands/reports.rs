//! Reporting commands
//!
//! Aging classification over outstanding receivables/payables supplied by
//! the caller (fetched from the remote API by the view layer).

use chrono::{DateTime, Utc};
use openbooks_core::reports::aging;
use openbooks_core::BucketTotal;
use openbooks_domain::types::aging::AgingRecord;
use serde::{Deserialize, Serialize};

/// An outstanding document to classify.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutstandingDocument {
    pub document_id: String,
    pub due_date: Option<DateTime<Utc>>,
    pub amount: f64,
}

/// Classify each outstanding document into its aging bucket.
pub fn receivables_aging(documents: &[OutstandingDocument], as_of: DateTime<Utc>) -> Vec<AgingRecord> {
    documents
        .iter()
        .map(|doc| aging::age_document(doc.document_id.clone(), doc.due_date, as_of))
        .collect()
}

/// Roll outstanding amounts up into per-bucket totals for the report view.
pub fn aging_summary(documents: &[OutstandingDocument], as_of: DateTime<Utc>) -> Vec<BucketTotal> {
    let entries: Vec<_> = documents.iter().map(|doc| (doc.due_date, doc.amount)).collect();
    aging::bucket_summary(&entries, as_of)
}
