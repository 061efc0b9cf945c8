pub mod ranking;
pub mod render;
