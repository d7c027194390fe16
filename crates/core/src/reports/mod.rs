//! Reporting calculations (receivables/payables aging).

pub mod aging;
