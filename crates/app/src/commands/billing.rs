//! Billing calculation commands
//!
//! Thin wrappers over the pure calculators in `openbooks-core`.

use openbooks_core::billing::calc;
use openbooks_domain::{BillingAdjustment, DocumentTotals, LineItem};

/// Compute the subtotal and total for a document's items and adjustments.
pub fn document_totals(items: &[LineItem], adjustments: &[BillingAdjustment]) -> DocumentTotals {
    calc::document_totals(items, adjustments)
}
