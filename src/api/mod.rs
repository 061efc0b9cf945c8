//! API-Basketball access layer.

pub mod budget;
pub mod client;
pub mod errors;
