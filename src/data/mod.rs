pub mod loader;
pub mod sample;
pub mod types;
