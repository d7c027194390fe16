//! Async command surface exposed to the host UI shell.
//!
//! Commands are plain async functions over `&AppContext`. Each logs its
//! outcome with structured fields.

pub mod billing;
pub mod chat;
pub mod drafts;
pub mod reports;
pub mod vault;

pub use billing::*;
pub use chat::*;
pub use drafts::*;
pub use reports::*;
pub use vault::*;
