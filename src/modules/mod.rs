// Declare all modules
pub mod gate;
pub mod prompt;
pub mod security;
pub mod utils;

// No re-exports here as they're handled in lib.rs
