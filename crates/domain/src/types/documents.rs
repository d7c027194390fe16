//! Extracted-document payloads for vault uploads.
//!
//! Scanned uploads are classified into one of a closed set of shapes,
//! discriminated by the `document_type` field. Modelled as a sum type
//! rather than a loose bag of optional fields.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{BillingAdjustment, LineItem};

/// Data extracted from an uploaded vault document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "document_type", rename_all = "snake_case")]
pub enum ExtractedDocument {
    Invoice {
        vendor_name: Option<String>,
        invoice_number: Option<String>,
        issue_date: Option<NaiveDate>,
        due_date: Option<NaiveDate>,
        items: Vec<LineItem>,
        adjustments: Vec<BillingAdjustment>,
        currency: Option<String>,
    },
    BankStatement {
        bank_name: Option<String>,
        account_number: Option<String>,
        period_start: Option<NaiveDate>,
        period_end: Option<NaiveDate>,
        closing_balance: Option<f64>,
    },
    Receipt {
        merchant_name: Option<String>,
        purchased_at: Option<NaiveDate>,
        total: Option<f64>,
    },
}

impl ExtractedDocument {
    /// The discriminant value used on the wire.
    pub fn document_type(&self) -> &'static str {
        match self {
            ExtractedDocument::Invoice { .. } => "invoice",
            ExtractedDocument::BankStatement { .. } => "bank_statement",
            ExtractedDocument::Receipt { .. } => "receipt",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_by_document_type() {
        let doc = ExtractedDocument::Receipt {
            merchant_name: Some("Corner Cafe".into()),
            purchased_at: None,
            total: Some(12.5),
        };
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["document_type"], "receipt");

        let back: ExtractedDocument = serde_json::from_value(json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn rejects_unknown_document_type() {
        let raw = r#"{"document_type":"payslip"}"#;
        assert!(serde_json::from_str::<ExtractedDocument>(raw).is_err());
    }
}
