//! Billing calculations for financial documents.

pub mod calc;
