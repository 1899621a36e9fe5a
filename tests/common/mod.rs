//! Common test utilities and helpers
//!
//! This module provides shared utilities for all tests including:
//! - An in-memory store fixture with seeding helpers
//! - Custom assertion macros

pub mod assertions;

// Re-export commonly used utilities
pub use database::*;
