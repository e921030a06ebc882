// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Wire schema for behavioral-test trace streams.
//!
//! A run is recorded as a stream of [`Envelope`]s, one JSON object per
//! NDJSON line. Payloads cover the whole lifecycle: source documents and
//! their parsed/compiled forms, binding declarations, run/case/step
//! execution messages, attachments, and producer metadata.
//!
//! This crate is pure data plus the line codec. Emission policy lives in
//! `tricorder-record`, stream comparison in `tricorder-compat`.

pub mod attachment;
pub mod bindings;
pub mod envelope;
pub mod execution;
pub mod gherkin;
pub mod meta;
pub mod ndjson;
pub mod pickle;
pub mod source;
pub mod timestamp;

pub use attachment::{Attachment, ContentEncoding};
pub use bindings::{
    Hook, HookType, ParameterType, SourceReference, StepDefinition, StepDefinitionPattern,
    StepDefinitionPatternType,
};
pub use envelope::Envelope;
pub use execution::{
    Group, StepMatchArgument, StepMatchArgumentsList, TestCase, TestCaseFinished, TestCaseStarted,
    TestRunFinished, TestRunStarted, TestStep, TestStepFinished, TestStepResult,
    TestStepResultStatus, TestStepStarted,
};
pub use gherkin::{
    Background, Comment, DataTable, DocString, Examples, Feature, FeatureChild, GherkinDocument,
    Location, Rule, RuleChild, Scenario, Step, StepKeywordType, TableCell, TableRow, Tag,
};
pub use meta::{Ci, Git, Meta, Product};
pub use ndjson::{
    encode_line, read_envelopes, read_envelopes_from_path, write_envelope, WireError,
};
pub use pickle::{
    Pickle, PickleDocString, PickleStep, PickleStepArgument, PickleStepType, PickleTable,
    PickleTableCell, PickleTableRow, PickleTag,
};
pub use source::Source;
pub use timestamp::{Duration, Timestamp};

/// Version of the message protocol this crate speaks.
pub const PROTOCOL_VERSION: &str = "1.0.0";
