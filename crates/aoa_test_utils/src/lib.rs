//! # Age of Agents Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Determinism test harness
//! - World-state fixtures
//! - Property-based strategies for untrusted intents

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;

/// Re-export proptest for convenience.
pub use proptest;
