//! Environment model
//!
//! environment → group → vm resource → instance → record/script

mod environment;
mod group;
mod instance;

// Re-exports
pub use environment::*;
pub use group::*;
pub use instance::*;
