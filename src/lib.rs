//! Library entrypoint for quarter-streak-scanner.
//!
//! Exposes all modules so integration tests can import them.

pub mod analysis;
pub mod api;
pub mod config;
pub mod data;
pub mod notify;
pub mod report;
pub mod scanner;
