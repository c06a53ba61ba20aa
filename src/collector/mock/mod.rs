//! Mock filesystem implementations for testing.
//!
//! This module provides `MockFs` and pre-built scenarios for testing
//! collectors without requiring a real profile directory.

mod filesystem;
mod scenarios;

pub use filesystem::MockFs;
pub use scenarios::PROFILE_ROOT;
