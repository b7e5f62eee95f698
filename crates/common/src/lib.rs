//! Shared constants for the sacco-records crates.
//!
//! This crate carries the values that must agree across the registry and
//! asset subsystems: attachment slot names, identifier prefixes and padding
//! widths, the policy-pinned bucket year, and object-store limits.

pub mod constants;

// Re-export commonly used items at crate root
pub use constants::*;
