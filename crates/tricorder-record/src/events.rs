// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Producer-boundary event types: what the host runner reports, in its own
//! vocabulary, for the recorder to turn into protocol messages.
//!
//! Events carry timestamps and all state the factory needs; the recorder
//! never calls back into the runner.

use crate::ident::BindingSignature;
use tricorder_proto::{HookType, SourceReference, StepDefinitionPatternType};

/// Declaration of a step definition binding.
#[derive(Debug, Clone)]
pub struct StepDefinitionEvent {
    /// Identity of the implementing member.
    pub signature: BindingSignature,
    /// Pattern source the runner matches step text against.
    pub pattern: String,
    /// Dialect of `pattern`.
    pub pattern_type: StepDefinitionPatternType,
    /// Where the implementation lives.
    pub source: SourceReference,
}

/// Declaration of a lifecycle hook binding.
#[derive(Debug, Clone)]
pub struct HookEvent {
    /// Identity of the implementing member.
    pub signature: BindingSignature,
    /// Display name, when the runner provides one.
    pub name: Option<String>,
    /// Tag expression restricting the hook's scope.
    pub tag_expression: Option<String>,
    /// Lifecycle point the hook attaches to.
    pub hook_type: Option<HookType>,
    /// Where the implementation lives.
    pub source: SourceReference,
}

/// Declaration of a custom parameter type.
#[derive(Debug, Clone)]
pub struct ParameterTypeEvent {
    /// Identity of the declaring member.
    pub signature: BindingSignature,
    /// Name used inside `{braces}` in expressions.
    pub name: String,
    /// Regular expressions the parameter matches.
    pub regular_expressions: Vec<String>,
    /// Whether this type wins when several regexps match.
    pub prefer_for_regular_expression_match: bool,
    /// Whether snippet generation should offer this type.
    pub use_for_snippets: bool,
}

/// Execution plan for one pickle, reported when the runner has matched
/// every step.
#[derive(Debug, Clone)]
pub struct CasePlan {
    /// Pickle the plan executes.
    pub pickle_id: String,
    /// Planned steps in execution order, hooks included.
    pub steps: Vec<PlannedStep>,
}

/// One planned step of a test case.
#[derive(Debug, Clone)]
pub enum PlannedStep {
    /// Invocation of a registered lifecycle hook.
    Hook {
        /// Identity of the hook binding; must already be registered.
        signature: BindingSignature,
    },
    /// Execution of a pickle step against its matched bindings.
    Pickle {
        /// Pickle step this planned step executes.
        pickle_step_id: String,
        /// Matched bindings: empty means undefined, one means runnable,
        /// several means ambiguous.
        matches: Vec<MatchedBinding>,
    },
}

/// A step definition matched to a pickle step, with captured arguments.
#[derive(Debug, Clone)]
pub struct MatchedBinding {
    /// Identity of the step definition; must already be registered.
    pub signature: BindingSignature,
    /// Captured arguments in pattern order.
    pub arguments: Vec<CapturedArgument>,
}

/// One argument captured by a pattern match.
#[derive(Debug, Clone)]
pub struct CapturedArgument {
    /// Capture group tree for the argument.
    pub group: CapturedGroup,
    /// Parameter type that converted the capture, when one applied.
    pub parameter_type_name: Option<String>,
}

/// A capture group and its nested captures.
#[derive(Debug, Clone, Default)]
pub struct CapturedGroup {
    /// Captured text, when the group participated in the match.
    pub value: Option<String>,
    /// Byte offset of the capture within the step text.
    pub start: Option<u32>,
    /// Nested capture groups in pattern order.
    pub children: Vec<CapturedGroup>,
}

impl CapturedGroup {
    /// Builds a leaf capture from its text and offset.
    #[must_use]
    pub fn leaf(value: impl Into<String>, start: u32) -> Self {
        Self {
            value: Some(value.into()),
            start: Some(start),
            children: Vec::new(),
        }
    }
}

/// Outcome of one executed step, in the runner's own status domain.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    /// Execution status reported by the runner.
    pub status: StepExecutionStatus,
    /// Elapsed execution time.
    pub duration: std::time::Duration,
    /// Failure details, for error statuses.
    pub error_message: Option<String>,
}

/// Runner-side execution statuses. The factory maps these onto the
/// protocol's result domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepExecutionStatus {
    /// Step ran and succeeded.
    Passed,
    /// Step matched a binding marked pending.
    Pending,
    /// Step text matched no binding.
    Undefined,
    /// Binding selection or invocation failed (for example, an ambiguous
    /// match).
    BindingError,
    /// Step ran and the test assertion failed.
    TestError,
    /// Step was skipped because of an earlier failure.
    Skipped,
}
