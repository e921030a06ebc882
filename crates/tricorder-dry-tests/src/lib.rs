// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared test doubles and fixtures for Tricorder crates.
//!
//! This crate provides commonly used test utilities to reduce duplication
//! across the Tricorder test suite.
//!
//! # Modules
//!
//! - [`sinks`] - Envelope sink and writer doubles for pipeline tests
//! - [`streams`] - Complete, internally consistent trace streams
#![forbid(unsafe_code)]

pub mod sinks;
pub mod streams;

// Re-export commonly used items at crate root for convenience
pub use sinks::{BrokenWriter, CollectingSink, SharedBuffer};
pub use streams::{passing_run, reimplemented_run};
