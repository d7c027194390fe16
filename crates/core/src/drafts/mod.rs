//! Offline draft lifecycle: storage ports and the draft service.

pub mod ports;
pub mod service;
