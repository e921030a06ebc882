// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Compiled scenarios ("pickles"): the runnable form a source document
//! expands into, with outlines flattened and backgrounds folded in.

use serde::{Deserialize, Serialize};

/// One runnable scenario after compilation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pickle {
    /// Run-unique identifier issued by the compiler.
    pub id: String,
    /// URI of the source document this pickle came from.
    pub uri: String,
    /// Scenario name with outline placeholders substituted.
    pub name: String,
    /// Dialect inherited from the source document.
    pub language: String,
    /// Steps in execution order, backgrounds included.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<PickleStep>,
    /// Effective tags, inherited ones included.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<PickleTag>,
    /// Ids of the source nodes this pickle was compiled from, outermost first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ast_node_ids: Vec<String>,
}

/// One step of a compiled scenario.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PickleStep {
    /// Attached argument block, if the source step carried one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub argument: Option<PickleStepArgument>,
    /// Ids of the source nodes this step was compiled from.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ast_node_ids: Vec<String>,
    /// Run-unique identifier issued by the compiler.
    pub id: String,
    /// Semantic role resolved from the source keyword chain.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub step_type: Option<PickleStepType>,
    /// Step text with outline placeholders substituted.
    pub text: String,
}

/// Semantic role of a compiled step.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PickleStepType {
    /// Role could not be determined.
    Unknown,
    /// Establishes preconditions.
    Context,
    /// Performs the action under test.
    Action,
    /// States the expected outcome.
    Outcome,
}

/// Argument block attached to a compiled step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PickleStepArgument {
    /// Multi-line string argument.
    DocString(PickleDocString),
    /// Tabular argument.
    DataTable(PickleTable),
}

/// Doc string argument with delimiters stripped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PickleDocString {
    /// Declared media type, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    /// Content with outline placeholders substituted.
    pub content: String,
}

/// Data table argument with placeholders substituted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PickleTable {
    /// Rows in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rows: Vec<PickleTableRow>,
}

/// One row of a data table argument.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PickleTableRow {
    /// Cells in column order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cells: Vec<PickleTableCell>,
}

/// One cell of a data table argument.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PickleTableCell {
    /// Cell text.
    pub value: String,
}

/// A tag effective on a compiled scenario.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PickleTag {
    /// Tag text, leading `@` included.
    pub name: String,
    /// Id of the source tag node.
    pub ast_node_id: String,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]
    use super::*;

    #[test]
    fn step_argument_tags_by_shape() {
        let arg = PickleStepArgument::DocString(PickleDocString {
            media_type: None,
            content: "payload".into(),
        });
        let json = serde_json::to_string(&arg).expect("serialize");
        assert!(json.starts_with(r#"{"docString":"#), "unexpected tag: {json}");
    }

    #[test]
    fn step_type_uses_wire_name() {
        let step = PickleStep {
            argument: None,
            ast_node_ids: vec!["7".into()],
            id: "9".into(),
            step_type: Some(PickleStepType::Action),
            text: "I press add".into(),
        };
        let json = serde_json::to_string(&step).expect("serialize");
        assert!(json.contains(r#""type":"ACTION""#));
        let back: PickleStep = serde_json::from_str(&json).expect("decode");
        assert_eq!(back, step);
    }
}
