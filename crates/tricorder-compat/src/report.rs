// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Structured mismatch records and the validation report.
//!
//! Every divergence the validator finds becomes a [`Mismatch`]: what kind of
//! divergence, where in the stream it sits, and (when it helps) the two values
//! that disagreed. Mismatches are aggregated into a [`ValidationReport`];
//! checking never stops at the first finding.

use std::fmt;

/// Classification of stream divergences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MismatchCode {
    // ─── Stream Shape ────────────────────────────────────────────────────────
    /// Actual stream carries fewer envelopes than the expected stream.
    StreamTooShort,
    /// A content type present in the expected stream never appears in the
    /// actual stream.
    MissingContentType,
    /// A content type absent from the expected stream appears in the actual
    /// stream.
    UnexpectedContentType,
    /// Both streams carry a content type, but not the same number of times.
    ContentCountMismatch,
    /// Actual stream declares fewer hooks than the expected stream.
    HookCountShortfall,
    /// More than one element in a stream claims the same id.
    IdCollision,

    // ─── Element Equivalence ─────────────────────────────────────────────────
    /// Two paired elements disagree on a field value.
    ValueMismatch,
    /// Two paired collections have different lengths.
    SequenceLengthMismatch,
    /// An expected element has no equivalent member in the actual stream.
    MissingCounterpart,
    /// An element references an id that resolves to nothing in its own stream.
    DanglingReference,
}

impl fmt::Display for MismatchCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::StreamTooShort => "STREAM_TOO_SHORT",
            Self::MissingContentType => "MISSING_CONTENT_TYPE",
            Self::UnexpectedContentType => "UNEXPECTED_CONTENT_TYPE",
            Self::ContentCountMismatch => "CONTENT_COUNT_MISMATCH",
            Self::HookCountShortfall => "HOOK_COUNT_SHORTFALL",
            Self::IdCollision => "ID_COLLISION",
            Self::ValueMismatch => "VALUE_MISMATCH",
            Self::SequenceLengthMismatch => "SEQUENCE_LENGTH_MISMATCH",
            Self::MissingCounterpart => "MISSING_COUNTERPART",
            Self::DanglingReference => "DANGLING_REFERENCE",
        };
        write!(f, "{s}")
    }
}

/// A single divergence between the actual and expected streams.
///
/// The `path` names the location in dotted wire-field notation, indexed by
/// position within the stream (`testCase[0].testSteps[1].pickleStep.text`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    /// Classification code.
    pub code: MismatchCode,
    /// Location of the divergence within the stream.
    pub path: String,
    /// Human-readable description.
    pub message: String,
    /// Value the expected stream carries (if applicable).
    pub expected: Option<String>,
    /// Value the actual stream carries (if applicable).
    pub actual: Option<String>,
}

impl Mismatch {
    /// Creates a new mismatch record.
    #[must_use]
    pub fn new(code: MismatchCode, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            path: path.into(),
            message: message.into(),
            expected: None,
            actual: None,
        }
    }

    /// Attaches the value found in the expected stream.
    #[must_use]
    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    /// Attaches the value found in the actual stream.
    #[must_use]
    pub fn with_actual(mut self, actual: impl Into<String>) -> Self {
        self.actual = Some(actual.into());
        self
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.path, self.message)?;
        match (&self.expected, &self.actual) {
            (Some(expected), Some(actual)) => {
                write!(f, " (expected {expected}, got {actual})")
            }
            (Some(expected), None) => write!(f, " (expected {expected})"),
            (None, Some(actual)) => write!(f, " (got {actual})"),
            (None, None) => Ok(()),
        }
    }
}

/// Aggregated outcome of a validation run.
///
/// An empty mismatch list means the actual stream is an acceptable
/// reimplementation of the expected stream under the rules in force.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Every divergence found, in checking order.
    pub mismatches: Vec<Mismatch>,
}

impl ValidationReport {
    /// Returns `true` when no divergence was found.
    #[must_use]
    pub fn is_pass(&self) -> bool {
        self.mismatches.is_empty()
    }

    /// Returns `true` when some mismatch carries the given code.
    #[must_use]
    pub fn contains(&self, code: MismatchCode) -> bool {
        self.mismatches.iter().any(|mismatch| mismatch.code == code)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_pass() {
            return write!(f, "PASS: streams are equivalent");
        }
        writeln!(f, "FAIL: {} mismatch(es)", self.mismatches.len())?;
        for mismatch in &self.mismatches {
            writeln!(f, "  {mismatch}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_render_screaming_snake() {
        assert_eq!(MismatchCode::HookCountShortfall.to_string(), "HOOK_COUNT_SHORTFALL");
        assert_eq!(MismatchCode::ValueMismatch.to_string(), "VALUE_MISMATCH");
    }

    #[test]
    fn mismatch_display_carries_both_sides() {
        let mismatch = Mismatch::new(MismatchCode::ValueMismatch, "pickle[0].name", "text differs")
            .with_expected("cukes")
            .with_actual("bananas");
        assert_eq!(
            mismatch.to_string(),
            "[VALUE_MISMATCH] pickle[0].name: text differs (expected cukes, got bananas)"
        );
    }

    #[test]
    fn empty_report_passes() {
        let report = ValidationReport::default();
        assert!(report.is_pass());
        assert_eq!(report.to_string(), "PASS: streams are equivalent");
    }

    #[test]
    fn report_lists_every_mismatch() {
        let report = ValidationReport {
            mismatches: vec![
                Mismatch::new(MismatchCode::StreamTooShort, "stream", "too short"),
                Mismatch::new(MismatchCode::IdCollision, "actual stream", "id `7` claimed twice"),
            ],
        };
        assert!(!report.is_pass());
        assert!(report.contains(MismatchCode::IdCollision));
        assert!(!report.contains(MismatchCode::ValueMismatch));
        let rendered = report.to_string();
        assert!(rendered.starts_with("FAIL: 2 mismatch(es)"), "{rendered}");
        assert!(rendered.contains("STREAM_TOO_SHORT"), "{rendered}");
    }
}
