// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Compatibility validator for Tricorder trace streams.
//!
//! This crate decides whether a trace stream recorded by one implementation
//! is an acceptable reproduction of a stream recorded by another. Validation
//! runs in two phases over cross-referenced, decoded streams:
//!
//! 1. **Structural**: per content type, the actual stream must carry the
//!    same number of envelopes as the expected stream (hooks may exceed it),
//!    and no id may be claimed twice within a stream.
//! 2. **Deep**: comparable elements are paired up and checked field by
//!    field under explicit [`EquivalenceRules`]. Ids never participate;
//!    references are chased to their declarations and the declarations are
//!    compared instead.
//!
//! Every divergence is aggregated into a [`ValidationReport`]; nothing
//! short-circuits on the first finding.
//!
//! # Modules
//!
//! - [`xref`]: per-kind and per-id index over a decoded stream
//! - [`rules`]: tolerances the deep comparison applies
//! - [`report`]: mismatch records and the aggregated report
//! - [`validator`]: the two-phase validation entry points

#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::cargo)]
#![allow(clippy::module_name_repetitions)]

pub mod report;
pub mod rules;
pub mod validator;
pub mod xref;

mod compare;

pub use report::{Mismatch, MismatchCode, ValidationReport};
pub use rules::EquivalenceRules;
pub use validator::{validate, validate_files, CompatError};
pub use xref::{CrossReference, Node, NodeKind, CANONICAL_CONTENT};
