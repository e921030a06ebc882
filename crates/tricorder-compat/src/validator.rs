// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Validation entry points.
//!
//! [`validate`] checks an actual trace stream against an expected one in two
//! phases. The structural phase compares envelope counts per content type;
//! the deep phase pairs up comparable elements and checks equivalence under
//! the rules. Both phases always run to completion and their findings are
//! aggregated into one [`ValidationReport`].

use std::path::Path;

use thiserror::Error;
use tricorder_proto::{read_envelopes_from_path, Envelope, WireError};

use crate::compare::DeepComparison;
use crate::report::{Mismatch, MismatchCode, ValidationReport};
use crate::rules::EquivalenceRules;
use crate::xref::{CrossReference, NodeKind, CANONICAL_CONTENT};

/// Failure to load a trace stream for validation.
#[derive(Debug, Error)]
pub enum CompatError {
    /// A trace file could not be read or decoded.
    #[error("[COMPAT_READ] cannot load `{path}`: {source}")]
    Read {
        /// Path of the offending file.
        path: String,
        /// Underlying wire failure.
        #[source]
        source: WireError,
    },
}

/// Validates an actual stream against an expected stream.
#[must_use]
pub fn validate(
    actual: &[Envelope],
    expected: &[Envelope],
    rules: &EquivalenceRules,
) -> ValidationReport {
    let actual_xref = CrossReference::build(actual);
    let expected_xref = CrossReference::build(expected);
    let mut mismatches = structural_mismatches(&actual_xref, &expected_xref);
    mismatches.extend(DeepComparison::run(rules, &actual_xref, &expected_xref));
    ValidationReport { mismatches }
}

/// Loads two NDJSON trace files and validates one against the other.
///
/// # Errors
///
/// Returns [`CompatError::Read`] when either file cannot be read or decoded.
pub fn validate_files(
    actual: &Path,
    expected: &Path,
    rules: &EquivalenceRules,
) -> Result<ValidationReport, CompatError> {
    let actual_stream = read_envelopes_from_path(actual).map_err(|source| CompatError::Read {
        path: actual.display().to_string(),
        source,
    })?;
    let expected_stream = read_envelopes_from_path(expected).map_err(|source| CompatError::Read {
        path: expected.display().to_string(),
        source,
    })?;
    Ok(validate(&actual_stream, &expected_stream, rules))
}

/// Stream-shape checks that run before any element comparison.
fn structural_mismatches(
    actual: &CrossReference<'_>,
    expected: &CrossReference<'_>,
) -> Vec<Mismatch> {
    let mut mismatches = Vec::new();

    if actual.envelope_count() < expected.envelope_count() {
        mismatches.push(
            Mismatch::new(
                MismatchCode::StreamTooShort,
                "stream",
                "actual stream carries fewer envelopes than the expected stream",
            )
            .with_expected(format!("at least {}", expected.envelope_count()))
            .with_actual(actual.envelope_count().to_string()),
        );
    }

    for kind in CANONICAL_CONTENT {
        let actual_count = actual.count(kind);
        let expected_count = expected.count(kind);

        // Hooks come from support code, so a reimplementation may declare
        // more of them than the reference run did, never fewer.
        if kind == NodeKind::Hook {
            if actual_count < expected_count {
                mismatches.push(
                    Mismatch::new(
                        MismatchCode::HookCountShortfall,
                        kind.name(),
                        "actual stream declares fewer hooks than the expected stream",
                    )
                    .with_expected(format!("at least {expected_count}"))
                    .with_actual(actual_count.to_string()),
                );
            }
            continue;
        }

        match (actual_count > 0, expected_count > 0) {
            (false, false) => {}
            (false, true) => {
                mismatches.push(
                    Mismatch::new(
                        MismatchCode::MissingContentType,
                        kind.name(),
                        "content type never appears in the actual stream",
                    )
                    .with_expected(expected_count.to_string()),
                );
            }
            (true, false) => {
                mismatches.push(
                    Mismatch::new(
                        MismatchCode::UnexpectedContentType,
                        kind.name(),
                        "content type appears in the actual stream but not in the expected stream",
                    )
                    .with_actual(actual_count.to_string()),
                );
            }
            (true, true) => {
                if actual_count != expected_count {
                    mismatches.push(
                        Mismatch::new(
                            MismatchCode::ContentCountMismatch,
                            kind.name(),
                            "content type appears a different number of times",
                        )
                        .with_expected(expected_count.to_string())
                        .with_actual(actual_count.to_string()),
                    );
                }
            }
        }
    }

    for (stream, xref) in [("actual", actual), ("expected", expected)] {
        for (id, claims) in xref.id_collisions() {
            mismatches.push(Mismatch::new(
                MismatchCode::IdCollision,
                format!("{stream} stream"),
                format!("id `{id}` is claimed by {claims} elements"),
            ));
        }
    }

    mismatches
}
