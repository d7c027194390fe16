//! # OpenBooks Application
//!
//! Application layer - command surface and dependency wiring.
//!
//! This crate contains:
//! - The application context (dependency injection container)
//! - Async command functions exposed to the host UI shell
//! - The `openbooks-migrate` binary
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires up the hexagonal architecture
//! - No business logic of its own

pub mod commands;
pub mod context;
pub mod utils;

pub use commands::*;
pub use context::AppContext;
