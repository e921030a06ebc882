// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Execution lifecycle payloads: run, test case, and test step messages,
//! plus step results.
//!
//! Correlation flows through ids: a `TestCase` plans steps against a
//! pickle, each execution attempt gets its own `TestCaseStarted` id, and
//! every step/attachment message of that attempt carries it.

use crate::timestamp::{Duration, Timestamp};
use serde::{Deserialize, Serialize};

/// Signals the start of the whole run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TestRunStarted {
    /// When the run began.
    pub timestamp: Timestamp,
}

/// Signals the end of the whole run, with the overall verdict.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TestRunFinished {
    /// Failure summary, present only when `success` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// True when every test case passed.
    pub success: bool,
    /// When the run ended.
    pub timestamp: Timestamp,
}

/// The execution plan for one pickle: an ordered list of planned steps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    /// Run-unique identifier.
    pub id: String,
    /// Pickle this plan executes.
    pub pickle_id: String,
    /// Planned steps in execution order, hooks included.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub test_steps: Vec<TestStep>,
}

/// One planned step: either a hook invocation or a pickle step with its
/// matched bindings. Exactly one of `hook_id` and `pickle_step_id` is set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TestStep {
    /// Hook this step invokes, for hook steps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hook_id: Option<String>,
    /// Run-unique identifier.
    pub id: String,
    /// Pickle step this step executes, for scenario steps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickle_step_id: Option<String>,
    /// Matched step definitions. Empty means undefined, more than one
    /// means ambiguous; a runnable step has exactly one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_definition_ids: Option<Vec<String>>,
    /// Captured arguments, one list per matched definition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_match_arguments_lists: Option<Vec<StepMatchArgumentsList>>,
}

impl TestStep {
    /// True when this step invokes a hook rather than a pickle step.
    #[must_use]
    pub fn is_hook_step(&self) -> bool {
        self.hook_id.is_some()
    }
}

/// Arguments captured by one matched step definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StepMatchArgumentsList {
    /// Captured arguments in pattern order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub step_match_arguments: Vec<StepMatchArgument>,
}

/// One captured argument.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StepMatchArgument {
    /// Capture group tree for this argument.
    pub group: Group,
    /// Parameter type that converted the capture, when one applied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter_type_name: Option<String>,
}

/// A capture group and its nested captures.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    /// Nested capture groups, in pattern order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Group>,
    /// Byte offset of the capture within the step text, when captured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<u32>,
    /// Captured text, when the group participated in the match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Signals the start of one execution attempt of a test case.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseStarted {
    /// Zero-based attempt counter, incremented on retry.
    pub attempt: u32,
    /// Run-unique identifier; the correlation key for all step and
    /// attachment messages of this attempt.
    pub id: String,
    /// Test case being executed.
    pub test_case_id: String,
    /// Identifier of the worker executing the attempt, when parallelized.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_id: Option<String>,
    /// When the attempt began.
    pub timestamp: Timestamp,
}

/// Signals the end of one execution attempt of a test case.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseFinished {
    /// Attempt this message closes.
    pub test_case_started_id: String,
    /// When the attempt ended.
    pub timestamp: Timestamp,
    /// True when a further attempt of the same case will follow.
    pub will_be_retried: bool,
}

/// Signals the start of one planned step within an attempt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TestStepStarted {
    /// Attempt the step belongs to.
    pub test_case_started_id: String,
    /// Planned step being executed.
    pub test_step_id: String,
    /// When the step began.
    pub timestamp: Timestamp,
}

/// Signals the end of one planned step within an attempt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TestStepFinished {
    /// Attempt the step belongs to.
    pub test_case_started_id: String,
    /// Planned step that finished.
    pub test_step_id: String,
    /// Outcome of the step.
    pub test_step_result: TestStepResult,
    /// When the step ended.
    pub timestamp: Timestamp,
}

/// Outcome of one executed step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TestStepResult {
    /// Elapsed execution time.
    pub duration: Duration,
    /// Failure details, present for failed outcomes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Outcome classification.
    pub status: TestStepResultStatus,
}

/// Closed outcome domain for executed steps.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TestStepResultStatus {
    /// Outcome could not be classified.
    Unknown,
    /// Step ran and succeeded.
    Passed,
    /// Step was not run because an earlier step failed.
    Skipped,
    /// Step matched a binding that is declared but not yet implemented.
    Pending,
    /// Step text matched no binding.
    Undefined,
    /// Step text matched more than one binding.
    Ambiguous,
    /// Step ran and failed.
    Failed,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]
    use super::*;

    #[test]
    fn status_uses_screaming_wire_names() {
        let json = serde_json::to_string(&TestStepResultStatus::Undefined).expect("serialize");
        assert_eq!(json, r#""UNDEFINED""#);
        let back: TestStepResultStatus = serde_json::from_str(r#""AMBIGUOUS""#).expect("decode");
        assert_eq!(back, TestStepResultStatus::Ambiguous);
    }

    #[test]
    fn hook_step_and_scenario_step_are_distinguishable() {
        let hook_step = TestStep {
            hook_id: Some("11".into()),
            id: "12".into(),
            pickle_step_id: None,
            step_definition_ids: None,
            step_match_arguments_lists: None,
        };
        assert!(hook_step.is_hook_step());
        let json = serde_json::to_string(&hook_step).expect("serialize");
        assert!(!json.contains("pickleStepId"));

        let scenario_step = TestStep {
            hook_id: None,
            id: "13".into(),
            pickle_step_id: Some("4".into()),
            step_definition_ids: Some(vec!["2".into()]),
            step_match_arguments_lists: Some(vec![]),
        };
        assert!(!scenario_step.is_hook_step());
    }

    #[test]
    fn nested_groups_round_trip() {
        let group = Group {
            children: vec![Group {
                children: vec![],
                start: Some(7),
                value: Some("42".into()),
            }],
            start: Some(0),
            value: Some("42 cukes".into()),
        };
        let json = serde_json::to_string(&group).expect("serialize");
        let back: Group = serde_json::from_str(&json).expect("decode");
        assert_eq!(back, group);
    }
}
