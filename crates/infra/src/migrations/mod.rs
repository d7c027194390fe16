//! SQL migration tooling for the `openbooks-migrate` binary.

pub mod runner;

pub use runner::{MigrationReport, MigrationRunner};
