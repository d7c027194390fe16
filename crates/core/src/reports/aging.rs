//! Aging classification for outstanding receivables and payables.
//!
//! Documents are bucketed by whole days elapsed past their due date, with
//! inclusive upper bounds on every bucket. A document with no due date is
//! treated as not overdue.

use chrono::{DateTime, Utc};
use openbooks_domain::constants::{
    AGING_BUCKET_1_MAX_DAYS, AGING_BUCKET_2_MAX_DAYS, AGING_BUCKET_3_MAX_DAYS,
    AGING_CURRENT_MAX_DAYS,
};
use openbooks_domain::types::aging::{AgingBucket, AgingRecord};
use serde::{Deserialize, Serialize};

const SECONDS_PER_DAY: i64 = 86_400;

/// Whole days elapsed between `due_date` and `as_of`, floored. Negative when
/// the due date is still in the future, so a document due in 12 hours reports
/// -1 rather than 0.
pub fn days_overdue(due_date: Option<DateTime<Utc>>, as_of: DateTime<Utc>) -> i64 {
    match due_date {
        Some(due) => {
            as_of.signed_duration_since(due).num_seconds().div_euclid(SECONDS_PER_DAY)
        }
        None => 0,
    }
}

/// Map a day count onto its aging bucket.
pub fn classify(days_overdue: i64) -> AgingBucket {
    if days_overdue <= AGING_CURRENT_MAX_DAYS {
        AgingBucket::Current
    } else if days_overdue <= AGING_BUCKET_1_MAX_DAYS {
        AgingBucket::Days1To30
    } else if days_overdue <= AGING_BUCKET_2_MAX_DAYS {
        AgingBucket::Days31To60
    } else if days_overdue <= AGING_BUCKET_3_MAX_DAYS {
        AgingBucket::Days61To90
    } else {
        AgingBucket::Over90
    }
}

/// Classify a single document into an aging record.
pub fn age_document(
    document_id: impl Into<String>,
    due_date: Option<DateTime<Utc>>,
    as_of: DateTime<Utc>,
) -> AgingRecord {
    let days = days_overdue(due_date, as_of);
    AgingRecord {
        document_id: document_id.into(),
        due_date,
        days_overdue: days,
        bucket: classify(days),
    }
}

/// Aggregated outstanding amount for one bucket of an aging report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketTotal {
    pub bucket: AgingBucket,
    pub label: &'static str,
    pub count: usize,
    pub amount: f64,
}

/// Roll up `(due_date, outstanding_amount)` pairs into per-bucket totals.
///
/// All five buckets are always present in display order, including empty
/// ones, so report rendering never has to special-case gaps.
pub fn bucket_summary(
    entries: &[(Option<DateTime<Utc>>, f64)],
    as_of: DateTime<Utc>,
) -> Vec<BucketTotal> {
    let mut totals: Vec<BucketTotal> = AgingBucket::all()
        .into_iter()
        .map(|bucket| BucketTotal { bucket, label: bucket.label(), count: 0, amount: 0.0 })
        .collect();

    for (due_date, amount) in entries {
        let bucket = classify(days_overdue(*due_date, as_of));
        if let Some(slot) = totals.iter_mut().find(|t| t.bucket == bucket) {
            slot.count += 1;
            slot.amount += amount;
        }
    }

    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn missing_due_date_is_current() {
        let record = age_document("doc-1", None, at(2025, 6, 1));
        assert_eq!(record.days_overdue, 0);
        assert_eq!(record.bucket, AgingBucket::Current);
    }

    #[test]
    fn future_due_date_is_current() {
        let as_of = at(2025, 6, 1);
        let due = at(2025, 6, 15);
        let record = age_document("doc-2", Some(due), as_of);
        assert!(record.days_overdue < 0);
        assert_eq!(record.bucket, AgingBucket::Current);
    }

    #[test]
    fn bucket_upper_bounds_are_inclusive() {
        assert_eq!(classify(0), AgingBucket::Current);
        assert_eq!(classify(1), AgingBucket::Days1To30);
        assert_eq!(classify(30), AgingBucket::Days1To30);
        assert_eq!(classify(31), AgingBucket::Days31To60);
        assert_eq!(classify(60), AgingBucket::Days31To60);
        assert_eq!(classify(61), AgingBucket::Days61To90);
        assert_eq!(classify(90), AgingBucket::Days61To90);
        assert_eq!(classify(91), AgingBucket::Over90);
        assert_eq!(classify(365), AgingBucket::Over90);
    }

    #[test]
    fn thirty_days_overdue_lands_in_first_bucket() {
        let as_of = at(2025, 6, 1);
        let due = as_of - Duration::days(30);
        let record = age_document("doc-3", Some(due), as_of);
        assert_eq!(record.days_overdue, 30);
        assert_eq!(record.bucket.label(), "1-30 Days");
    }

    #[test]
    fn thirty_one_days_overdue_lands_in_second_bucket() {
        let as_of = at(2025, 6, 1);
        let due = as_of - Duration::days(31);
        let record = age_document("doc-4", Some(due), as_of);
        assert_eq!(record.bucket.label(), "31-60 Days");
    }

    #[test]
    fn partial_days_floor() {
        let as_of = at(2025, 6, 1);
        let due = as_of - Duration::hours(30);
        assert_eq!(days_overdue(Some(due), as_of), 1);
    }

    #[test]
    fn partial_future_days_floor_below_zero() {
        let as_of = at(2025, 6, 1);
        let due = as_of + Duration::hours(12);
        assert_eq!(days_overdue(Some(due), as_of), -1);
        assert_eq!(classify(days_overdue(Some(due), as_of)), AgingBucket::Current);
    }

    #[test]
    fn summary_always_contains_all_buckets() {
        let totals = bucket_summary(&[], at(2025, 6, 1));
        assert_eq!(totals.len(), 5);
        assert!(totals.iter().all(|t| t.count == 0 && t.amount == 0.0));
        assert_eq!(totals[0].label, "Current");
        assert_eq!(totals[4].label, "90+ Days");
    }

    #[test]
    fn summary_accumulates_amounts_per_bucket() {
        let as_of = at(2025, 6, 1);
        let entries = [
            (None, 100.0),
            (Some(as_of - Duration::days(10)), 50.0),
            (Some(as_of - Duration::days(25)), 25.0),
            (Some(as_of - Duration::days(120)), 500.0),
        ];
        let totals = bucket_summary(&entries, as_of);

        assert_eq!(totals[0].count, 1);
        assert_eq!(totals[0].amount, 100.0);
        assert_eq!(totals[1].count, 2);
        assert_eq!(totals[1].amount, 75.0);
        assert_eq!(totals[2].count, 0);
        assert_eq!(totals[4].amount, 500.0);
    }
}
