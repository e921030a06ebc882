// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Message factory: pure constructors turning runner events into protocol
//! payloads.
//!
//! Every function is total over well-formed inputs and deterministic given
//! the same inputs; id issuance happens in the caller (the recorder), never
//! here. Only CI detection reads the environment, through an injectable
//! lookup.

use crate::b64;
use crate::events::{
    CapturedArgument, CapturedGroup, HookEvent, ParameterTypeEvent, StepDefinitionEvent,
    StepExecutionStatus, StepOutcome,
};
use crate::ident::MessageId;
use crate::mime::{media_type_for_path, LOG_MEDIA_TYPE};
use std::path::Path;
use std::time::SystemTime;
use tricorder_proto::{
    Attachment, Ci, ContentEncoding, Envelope, Group, Hook, Meta, ParameterType, Product,
    StepDefinition, StepDefinitionPattern, StepMatchArgument, StepMatchArgumentsList, TestCase,
    TestCaseFinished, TestCaseStarted, TestRunFinished, TestRunStarted, TestStep,
    TestStepFinished, TestStepResult, TestStepStarted, Timestamp, PROTOCOL_VERSION,
};

/// Maps the runner's execution status onto the protocol result domain.
#[must_use]
pub fn result_status(status: StepExecutionStatus) -> tricorder_proto::TestStepResultStatus {
    use tricorder_proto::TestStepResultStatus as Wire;
    match status {
        StepExecutionStatus::Passed => Wire::Passed,
        StepExecutionStatus::Pending => Wire::Pending,
        StepExecutionStatus::Undefined => Wire::Undefined,
        StepExecutionStatus::BindingError => Wire::Ambiguous,
        StepExecutionStatus::TestError => Wire::Failed,
        StepExecutionStatus::Skipped => Wire::Skipped,
    }
}

/// Builds the stream-opening metadata payload.
///
/// Platform facts come from the build target; CI context from
/// [`detect_ci`] over the process environment.
#[must_use]
pub fn meta(implementation: Product) -> Meta {
    Meta {
        protocol_version: PROTOCOL_VERSION.to_string(),
        implementation,
        runtime: Product::unversioned("rust"),
        os: Product::unversioned(std::env::consts::OS),
        cpu: Product::unversioned(std::env::consts::ARCH),
        ci: detect_ci(|name| std::env::var(name).ok()),
    }
}

/// CI systems recognized by [`detect_ci`]: display name plus the
/// environment variable proving the system is active.
const CI_SYSTEMS: &[(&str, &str)] = &[
    ("GitHub Actions", "GITHUB_ACTIONS"),
    ("GitLab CI", "GITLAB_CI"),
    ("Jenkins", "JENKINS_URL"),
    ("Azure Pipelines", "TF_BUILD"),
    ("CircleCI", "CIRCLECI"),
];

/// Detects a CI system from environment variables, reading them through
/// `get` so detection stays testable.
pub fn detect_ci<F>(get: F) -> Option<Ci>
where
    F: Fn(&str) -> Option<String>,
{
    let (name, _) = CI_SYSTEMS
        .iter()
        .find(|(_, marker)| get(marker).is_some())?;
    let git = match (get("GITHUB_SERVER_URL"), get("GITHUB_REPOSITORY"), get("GITHUB_SHA")) {
        (Some(server), Some(repo), Some(revision)) => Some(tricorder_proto::Git {
            remote: format!("{server}/{repo}.git"),
            revision,
            branch: get("GITHUB_REF_NAME"),
            tag: None,
        }),
        _ => None,
    };
    Some(Ci {
        name: (*name).to_string(),
        url: get("GITHUB_RUN_ID").and_then(|run| {
            let server = get("GITHUB_SERVER_URL")?;
            let repo = get("GITHUB_REPOSITORY")?;
            Some(format!("{server}/{repo}/actions/runs/{run}"))
        }),
        build_number: get("GITHUB_RUN_NUMBER").or_else(|| get("BUILD_NUMBER")),
        git,
    })
}

/// Builds the run-started message.
#[must_use]
pub fn test_run_started(at: SystemTime) -> Envelope {
    Envelope::TestRunStarted(TestRunStarted {
        timestamp: Timestamp::from_system_time(at),
    })
}

/// Builds the run-finished message carrying the overall verdict.
#[must_use]
pub fn test_run_finished(success: bool, at: SystemTime, message: Option<String>) -> Envelope {
    Envelope::TestRunFinished(TestRunFinished {
        message,
        success,
        timestamp: Timestamp::from_system_time(at),
    })
}

/// Builds a step definition declaration under an issued id.
#[must_use]
pub fn step_definition(id: MessageId, event: &StepDefinitionEvent) -> Envelope {
    Envelope::StepDefinition(StepDefinition {
        id,
        pattern: StepDefinitionPattern {
            source: event.pattern.clone(),
            pattern_type: event.pattern_type,
        },
        source_reference: event.source.clone(),
    })
}

/// Builds a hook declaration under an issued id.
#[must_use]
pub fn hook(id: MessageId, event: &HookEvent) -> Envelope {
    Envelope::Hook(Hook {
        id,
        name: event.name.clone(),
        source_reference: event.source.clone(),
        tag_expression: event.tag_expression.clone(),
        hook_type: event.hook_type,
    })
}

/// Builds a parameter type declaration under an issued id.
#[must_use]
pub fn parameter_type(id: MessageId, event: &ParameterTypeEvent) -> Envelope {
    Envelope::ParameterType(ParameterType {
        id,
        name: event.name.clone(),
        regular_expressions: event.regular_expressions.clone(),
        prefer_for_regular_expression_match: event.prefer_for_regular_expression_match,
        use_for_snippets: event.use_for_snippets,
        source_reference: None,
    })
}

/// Builds a planned hook step.
#[must_use]
pub fn hook_test_step(id: MessageId, hook_id: MessageId) -> TestStep {
    TestStep {
        hook_id: Some(hook_id),
        id,
        pickle_step_id: None,
        step_definition_ids: None,
        step_match_arguments_lists: None,
    }
}

/// Builds a planned scenario step from its matched definitions.
#[must_use]
pub fn pickle_test_step(
    id: MessageId,
    pickle_step_id: String,
    definition_ids: Vec<MessageId>,
    argument_lists: Vec<StepMatchArgumentsList>,
) -> TestStep {
    TestStep {
        hook_id: None,
        id,
        pickle_step_id: Some(pickle_step_id),
        step_definition_ids: Some(definition_ids),
        step_match_arguments_lists: Some(argument_lists),
    }
}

/// Maps captured arguments onto one wire argument list.
#[must_use]
pub fn match_arguments(arguments: &[CapturedArgument]) -> StepMatchArgumentsList {
    StepMatchArgumentsList {
        step_match_arguments: arguments
            .iter()
            .map(|argument| StepMatchArgument {
                group: group(&argument.group),
                parameter_type_name: argument.parameter_type_name.clone(),
            })
            .collect(),
    }
}

/// Maps a captured group tree onto the wire shape. Recursion is bounded
/// by the capture tree's actual depth.
#[must_use]
pub fn group(captured: &CapturedGroup) -> Group {
    Group {
        children: captured.children.iter().map(group).collect(),
        start: captured.start,
        value: captured.value.clone(),
    }
}

/// Builds the execution plan message for one pickle.
#[must_use]
pub fn test_case(id: MessageId, pickle_id: String, test_steps: Vec<TestStep>) -> Envelope {
    Envelope::TestCase(TestCase {
        id,
        pickle_id,
        test_steps,
    })
}

/// Builds the attempt-started message.
#[must_use]
pub fn test_case_started(
    id: MessageId,
    test_case_id: MessageId,
    attempt: u32,
    worker_id: Option<String>,
    at: SystemTime,
) -> Envelope {
    Envelope::TestCaseStarted(TestCaseStarted {
        attempt,
        id,
        test_case_id,
        worker_id,
        timestamp: Timestamp::from_system_time(at),
    })
}

/// Builds the attempt-finished message.
#[must_use]
pub fn test_case_finished(
    test_case_started_id: MessageId,
    at: SystemTime,
    will_be_retried: bool,
) -> Envelope {
    Envelope::TestCaseFinished(TestCaseFinished {
        test_case_started_id,
        timestamp: Timestamp::from_system_time(at),
        will_be_retried,
    })
}

/// Builds the step-started message.
#[must_use]
pub fn test_step_started(
    test_case_started_id: MessageId,
    test_step_id: MessageId,
    at: SystemTime,
) -> Envelope {
    Envelope::TestStepStarted(TestStepStarted {
        test_case_started_id,
        test_step_id,
        timestamp: Timestamp::from_system_time(at),
    })
}

/// Builds the step-finished message from the runner's outcome.
#[must_use]
pub fn test_step_finished(
    test_case_started_id: MessageId,
    test_step_id: MessageId,
    outcome: &StepOutcome,
    at: SystemTime,
) -> Envelope {
    Envelope::TestStepFinished(TestStepFinished {
        test_case_started_id,
        test_step_id,
        test_step_result: TestStepResult {
            duration: outcome.duration.into(),
            message: outcome.error_message.clone(),
            status: result_status(outcome.status),
        },
        timestamp: Timestamp::from_system_time(at),
    })
}

/// Builds a binary file attachment: base64 body, media type resolved from
/// the file extension, file name preserved for consumers.
#[must_use]
pub fn file_attachment(
    test_case_started_id: Option<MessageId>,
    test_step_id: Option<MessageId>,
    path: &Path,
    content: &[u8],
) -> Envelope {
    Envelope::Attachment(Attachment {
        body: b64::encode(content),
        content_encoding: ContentEncoding::Base64,
        file_name: path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned()),
        media_type: media_type_for_path(path).to_string(),
        test_case_started_id,
        test_step_id,
    })
}

/// Builds a textual log attachment: identity body, log media type.
#[must_use]
pub fn log_attachment(
    test_case_started_id: Option<MessageId>,
    test_step_id: Option<MessageId>,
    text: impl Into<String>,
) -> Envelope {
    Envelope::Attachment(Attachment {
        body: text.into(),
        content_encoding: ContentEncoding::Identity,
        file_name: None,
        media_type: LOG_MEDIA_TYPE.to_string(),
        test_case_started_id,
        test_step_id,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]
    #![allow(clippy::panic)]
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration as StdDuration;
    use tricorder_proto::TestStepResultStatus as Wire;

    #[test]
    fn status_mapping_is_total_and_fixed() {
        let expected = [
            (StepExecutionStatus::Passed, Wire::Passed),
            (StepExecutionStatus::Pending, Wire::Pending),
            (StepExecutionStatus::Undefined, Wire::Undefined),
            (StepExecutionStatus::BindingError, Wire::Ambiguous),
            (StepExecutionStatus::TestError, Wire::Failed),
            (StepExecutionStatus::Skipped, Wire::Skipped),
        ];
        for (input, output) in expected {
            assert_eq!(result_status(input), output, "{input:?}");
        }
    }

    #[test]
    fn step_finished_carries_duration_and_message() {
        let outcome = StepOutcome {
            status: StepExecutionStatus::TestError,
            duration: StdDuration::from_millis(250),
            error_message: Some("assertion failed".into()),
        };
        let envelope =
            test_step_finished("31".into(), "27".into(), &outcome, SystemTime::UNIX_EPOCH);
        let Envelope::TestStepFinished(finished) = envelope else {
            panic!("wrong content type");
        };
        assert_eq!(finished.test_step_result.status, Wire::Failed);
        assert_eq!(finished.test_step_result.duration.nanos, 250_000_000);
        assert_eq!(
            finished.test_step_result.message.as_deref(),
            Some("assertion failed")
        );
    }

    #[test]
    fn file_attachment_encodes_and_names() {
        let envelope = file_attachment(
            Some("31".into()),
            Some("27".into()),
            Path::new("captures/shot.png"),
            b"foobar",
        );
        let Envelope::Attachment(attachment) = envelope else {
            panic!("wrong content type");
        };
        assert_eq!(attachment.body, "Zm9vYmFy");
        assert_eq!(attachment.content_encoding, ContentEncoding::Base64);
        assert_eq!(attachment.media_type, "image/png");
        assert_eq!(attachment.file_name.as_deref(), Some("shot.png"));
    }

    #[test]
    fn log_attachment_uses_identity_encoding() {
        let envelope = log_attachment(Some("31".into()), None, "calculator ready");
        let Envelope::Attachment(attachment) = envelope else {
            panic!("wrong content type");
        };
        assert_eq!(attachment.content_encoding, ContentEncoding::Identity);
        assert_eq!(attachment.media_type, LOG_MEDIA_TYPE);
        assert_eq!(attachment.body, "calculator ready");
    }

    #[test]
    fn nested_captures_map_recursively() {
        let captured = CapturedGroup {
            value: Some("42 cukes".into()),
            start: Some(7),
            children: vec![CapturedGroup::leaf("42", 7)],
        };
        let wire = group(&captured);
        assert_eq!(wire.value.as_deref(), Some("42 cukes"));
        assert_eq!(wire.children.len(), 1);
        assert_eq!(wire.children[0].value.as_deref(), Some("42"));
    }

    #[test]
    fn ci_detection_reads_injected_environment() {
        let mut env = HashMap::new();
        env.insert("GITHUB_ACTIONS", "true");
        env.insert("GITHUB_SERVER_URL", "https://github.com");
        env.insert("GITHUB_REPOSITORY", "flyingrobots/tricorder");
        env.insert("GITHUB_SHA", "abc123");
        env.insert("GITHUB_RUN_ID", "77");
        let ci = detect_ci(|name| env.get(name).map(|v| (*v).to_string())).expect("detected");
        assert_eq!(ci.name, "GitHub Actions");
        assert_eq!(
            ci.url.as_deref(),
            Some("https://github.com/flyingrobots/tricorder/actions/runs/77")
        );
        let git = ci.git.expect("git context");
        assert_eq!(git.remote, "https://github.com/flyingrobots/tricorder.git");
        assert_eq!(git.revision, "abc123");
    }

    #[test]
    fn no_ci_markers_means_no_ci() {
        assert!(detect_ci(|_| None).is_none());
    }
}
