//! Aging classification types for outstanding receivables and payables.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Classification of an outstanding document by days past its due date.
///
/// Bucket boundaries are inclusive upper bounds: <=0, <=30, <=60, <=90, >90.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgingBucket {
    Current,
    Days1To30,
    Days31To60,
    Days61To90,
    Over90,
}

/// Presentation severity hint attached to each aging bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Normal,
    Low,
    Medium,
    High,
    Critical,
}

impl AgingBucket {
    /// Display label used by report views.
    pub fn label(&self) -> &'static str {
        match self {
            AgingBucket::Current => "Current",
            AgingBucket::Days1To30 => "1-30 Days",
            AgingBucket::Days31To60 => "31-60 Days",
            AgingBucket::Days61To90 => "61-90 Days",
            AgingBucket::Over90 => "90+ Days",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            AgingBucket::Current => Severity::Normal,
            AgingBucket::Days1To30 => Severity::Low,
            AgingBucket::Days31To60 => Severity::Medium,
            AgingBucket::Days61To90 => Severity::High,
            AgingBucket::Over90 => Severity::Critical,
        }
    }

    /// All buckets in report display order.
    pub fn all() -> [AgingBucket; 5] {
        [
            AgingBucket::Current,
            AgingBucket::Days1To30,
            AgingBucket::Days31To60,
            AgingBucket::Days61To90,
            AgingBucket::Over90,
        ]
    }
}

/// A classified outstanding document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgingRecord {
    pub document_id: String,
    pub due_date: Option<DateTime<Utc>>,
    pub days_overdue: i64,
    pub bucket: AgingBucket,
}
