//! Domain types and models

pub mod aging;
pub mod documents;
pub mod drafts;

use serde::{Deserialize, Serialize};

// Re-export for convenience
pub use aging::{AgingBucket, AgingRecord, Severity};
pub use documents::ExtractedDocument;
pub use drafts::{ChatMessage, ChatThread, DraftDocument, DraftKind, MessageRole, StoredImage, SyncStatus};

// ============================================================================
// Billing Types
// ============================================================================

/// A single line on a financial document (invoice, quotation, note).
///
/// No validation happens at this layer; malformed numeric input propagates
/// into the computed totals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub quantity: f64,
    pub unit_price: f64,
}

impl LineItem {
    /// Amount this line contributes to the document subtotal.
    pub fn amount(&self) -> f64 {
        self.quantity * self.unit_price
    }
}

/// A fixed or percentage modifier applied to a document subtotal.
///
/// Percentage adjustments are always computed against the pre-adjustment
/// subtotal, never against a running total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum BillingAdjustment {
    /// Literal signed amount added to the total (negative = discount).
    Fixed(f64),
    /// Signed percentage of the pre-adjustment subtotal.
    Percentage(f64),
}

/// Computed subtotal and total for a document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DocumentTotals {
    pub subtotal: f64,
    pub total: f64,
}
