// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The `Envelope` union: every message a trace stream can carry.
//!
//! An envelope wraps exactly one payload and serializes as a single-key
//! JSON object, the key naming the content type (`{"testCaseStarted":
//! {...}}`). One envelope per NDJSON line.

use crate::attachment::Attachment;
use crate::bindings::{Hook, ParameterType, StepDefinition};
use crate::execution::{
    TestCase, TestCaseFinished, TestCaseStarted, TestRunFinished, TestRunStarted, TestStepFinished,
    TestStepStarted,
};
use crate::gherkin::GherkinDocument;
use crate::meta::Meta;
use crate::pickle::Pickle;
use crate::source::Source;
use serde::{Deserialize, Serialize};

/// One message of a trace stream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Envelope {
    /// Producer and environment metadata. First message of a stream.
    Meta(Meta),
    /// Raw text of a source document.
    Source(Source),
    /// Parsed source document.
    GherkinDocument(GherkinDocument),
    /// Compiled runnable scenario.
    Pickle(Pickle),
    /// Step definition declaration.
    StepDefinition(StepDefinition),
    /// Parameter type declaration.
    ParameterType(ParameterType),
    /// Lifecycle hook declaration.
    Hook(Hook),
    /// Run started.
    TestRunStarted(TestRunStarted),
    /// Execution plan for one pickle.
    TestCase(TestCase),
    /// One execution attempt of a test case started.
    TestCaseStarted(TestCaseStarted),
    /// One planned step started.
    TestStepStarted(TestStepStarted),
    /// Artifact captured during execution.
    Attachment(Attachment),
    /// One planned step finished.
    TestStepFinished(TestStepFinished),
    /// One execution attempt of a test case finished.
    TestCaseFinished(TestCaseFinished),
    /// Run finished, with the overall verdict.
    TestRunFinished(TestRunFinished),
}

impl Envelope {
    /// Wire name of the carried content type, matching the JSON tag.
    #[must_use]
    pub fn content_name(&self) -> &'static str {
        match self {
            Self::Meta(_) => "meta",
            Self::Source(_) => "source",
            Self::GherkinDocument(_) => "gherkinDocument",
            Self::Pickle(_) => "pickle",
            Self::StepDefinition(_) => "stepDefinition",
            Self::ParameterType(_) => "parameterType",
            Self::Hook(_) => "hook",
            Self::TestRunStarted(_) => "testRunStarted",
            Self::TestCase(_) => "testCase",
            Self::TestCaseStarted(_) => "testCaseStarted",
            Self::TestStepStarted(_) => "testStepStarted",
            Self::Attachment(_) => "attachment",
            Self::TestStepFinished(_) => "testStepFinished",
            Self::TestCaseFinished(_) => "testCaseFinished",
            Self::TestRunFinished(_) => "testRunFinished",
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]
    use super::*;
    use crate::timestamp::Timestamp;

    #[test]
    fn envelope_serializes_as_single_key_object() {
        let envelope = Envelope::TestRunStarted(TestRunStarted {
            timestamp: Timestamp::new(10, 0),
        });
        let json = serde_json::to_string(&envelope).expect("serialize");
        assert_eq!(json, r#"{"testRunStarted":{"timestamp":{"seconds":10,"nanos":0}}}"#);
    }

    #[test]
    fn content_name_matches_wire_tag() {
        let envelope = Envelope::TestCaseStarted(TestCaseStarted {
            attempt: 0,
            id: "20".into(),
            test_case_id: "19".into(),
            worker_id: None,
            timestamp: Timestamp::new(11, 0),
        });
        let json = serde_json::to_string(&envelope).expect("serialize");
        let tag = format!(r#"{{"{}""#, envelope.content_name());
        assert!(json.starts_with(&tag), "tag mismatch: {json}");
    }

    #[test]
    fn unknown_tag_fails_to_decode() {
        let err = serde_json::from_str::<Envelope>(r#"{"warpFrame":{}}"#);
        assert!(err.is_err());
    }
}
