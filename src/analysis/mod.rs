//! Quarter-scoring observations and streak statistics.

pub mod observation;
pub mod streak;
