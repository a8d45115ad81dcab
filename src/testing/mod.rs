//! Testing utilities for camctl
//!
//! Provides an in-memory platform so the whole control stack can be
//! exercised without a camera attached.

pub mod memory;

pub use memory::{CallCounts, MemoryPlatform, Operation};
