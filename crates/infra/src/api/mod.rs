//! HTTP access to the remote bookkeeping API.

pub mod client;
pub mod queries;

pub use client::{ApiClient, ApiClientConfig};
pub use queries::{QueryClient, QueryKey};
