// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Binding declarations: how host-side code attaches to scenario steps.
//!
//! Each of these is emitted once per canonical signature, before any
//! execution message that references its id.

use crate::gherkin::Location;
use serde::{Deserialize, Serialize};

/// Pointer into implementation source, for tooling to display.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SourceReference {
    /// URI of the implementation source file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// Position within that file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

/// A step definition: pattern plus the code location implementing it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StepDefinition {
    /// Run-unique identifier.
    pub id: String,
    /// Pattern the runner matches step text against.
    pub pattern: StepDefinitionPattern,
    /// Where the implementation lives.
    pub source_reference: SourceReference,
}

/// The match pattern of a step definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StepDefinitionPattern {
    /// Pattern source text.
    pub source: String,
    /// Pattern dialect.
    #[serde(rename = "type")]
    pub pattern_type: StepDefinitionPatternType,
}

/// Dialect of a step definition pattern.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepDefinitionPatternType {
    /// Parameter-typed expression dialect.
    CucumberExpression,
    /// Plain regular expression.
    RegularExpression,
}

/// A lifecycle hook registered by the implementation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Hook {
    /// Run-unique identifier.
    pub id: String,
    /// Display name, when the implementation provides one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Where the hook implementation lives.
    pub source_reference: SourceReference,
    /// Tag expression restricting which scenarios the hook applies to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_expression: Option<String>,
    /// Lifecycle point the hook attaches to.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub hook_type: Option<HookType>,
}

/// Lifecycle points a hook can attach to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HookType {
    /// Runs once before the whole run.
    BeforeTestRun,
    /// Runs once after the whole run.
    AfterTestRun,
    /// Runs before each test case.
    BeforeTestCase,
    /// Runs after each test case.
    AfterTestCase,
    /// Runs before each test step.
    BeforeTestStep,
    /// Runs after each test step.
    AfterTestStep,
}

/// A custom parameter type usable inside expression patterns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ParameterType {
    /// Run-unique identifier.
    pub id: String,
    /// Name used inside `{braces}` in expressions.
    pub name: String,
    /// Regular expressions the parameter matches.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub regular_expressions: Vec<String>,
    /// Whether this type wins when several regexps match.
    pub prefer_for_regular_expression_match: bool,
    /// Whether snippet generation should offer this type.
    pub use_for_snippets: bool,
    /// Where the parameter type is declared, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_reference: Option<SourceReference>,
}
