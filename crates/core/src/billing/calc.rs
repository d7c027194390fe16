//! Subtotal and total reducers for quotations, credit notes and debit notes.
//!
//! These are pure functions over item and adjustment lists. No validation or
//! currency-aware rounding happens here; malformed numeric input (NaN)
//! propagates into the result, and display formatting is left to callers.

use openbooks_domain::{BillingAdjustment, DocumentTotals, LineItem};

/// Sum of `quantity * unit_price` across all items. Empty list yields 0.
pub fn subtotal(items: &[LineItem]) -> f64 {
    items.iter().map(LineItem::amount).sum()
}

/// Contribution of a single adjustment against the pre-adjustment subtotal.
///
/// Percentage adjustments are computed against the original subtotal, not an
/// evolving running total, so contributions never compound and the adjustment
/// order is irrelevant. This mirrors the billing policy of the remote system;
/// do not replace it with sequential application.
pub fn adjustment_contribution(subtotal: f64, adjustment: &BillingAdjustment) -> f64 {
    match adjustment {
        BillingAdjustment::Fixed(value) => *value,
        BillingAdjustment::Percentage(value) => subtotal * value / 100.0,
    }
}

/// Subtotal plus the sum of all adjustment contributions.
pub fn total(items: &[LineItem], adjustments: &[BillingAdjustment]) -> f64 {
    let base = subtotal(items);
    base + adjustments.iter().map(|adj| adjustment_contribution(base, adj)).sum::<f64>()
}

/// Compute both values in one pass over the adjustments.
pub fn document_totals(items: &[LineItem], adjustments: &[BillingAdjustment]) -> DocumentTotals {
    let base = subtotal(items);
    let total =
        base + adjustments.iter().map(|adj| adjustment_contribution(base, adj)).sum::<f64>();
    DocumentTotals { subtotal: base, total }
}
