// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Source-document tree: the parsed shape of a feature file.
//!
//! These payloads are produced by the host runner's parser and carried
//! through the stream untouched; the recorder never inspects them beyond
//! serialization, and the validator walks them structurally.

use serde::{Deserialize, Serialize};

/// A line/column position inside a source document. Both are 1-based.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number, when the producer tracks columns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

impl Location {
    /// Builds a location from a line number alone.
    #[must_use]
    pub fn at_line(line: u32) -> Self {
        Self { line, column: None }
    }
}

/// A tag as written in the source document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    /// Position of the tag.
    pub location: Location,
    /// Tag text, leading `@` included.
    pub name: String,
    /// Document-unique identifier issued by the parser.
    pub id: String,
}

/// A comment line preserved from the source document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Where the comment sits in the document.
    pub location: Location,
    /// Raw comment text, marker included.
    pub text: String,
}

/// Root of a parsed source document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GherkinDocument {
    /// Source URI the document was parsed from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// Top-level feature, absent for empty documents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature: Option<Feature>,
    /// All comment lines in the document.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<Comment>,
}

/// A feature: the top-level named block of a document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    /// Position of the feature keyword.
    pub location: Location,
    /// Tags attached above the feature line.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    /// Dialect of the document, as an IETF language tag (e.g. `en`, `en-US`).
    pub language: String,
    /// Localized keyword as written (e.g. `Feature`).
    pub keyword: String,
    /// Feature name.
    pub name: String,
    /// Free-form description lines under the feature line.
    #[serde(default)]
    pub description: String,
    /// Child blocks in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FeatureChild>,
}

/// One child block of a feature.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum FeatureChild {
    /// A rule grouping its own backgrounds and scenarios.
    Rule(Rule),
    /// A background block shared by sibling scenarios.
    Background(Background),
    /// A concrete or outlined scenario.
    Scenario(Scenario),
}

/// A rule block grouping related scenarios.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    /// Position of the rule keyword.
    pub location: Location,
    /// Tags attached above the rule line.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    /// Localized keyword as written.
    pub keyword: String,
    /// Rule name.
    pub name: String,
    /// Free-form description lines.
    #[serde(default)]
    pub description: String,
    /// Child blocks in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RuleChild>,
    /// Document-unique identifier issued by the parser.
    pub id: String,
}

/// One child block of a rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum RuleChild {
    /// A background block scoped to the rule.
    Background(Background),
    /// A scenario inside the rule.
    Scenario(Scenario),
}

/// Steps executed before every scenario in scope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Background {
    /// Position of the background keyword.
    pub location: Location,
    /// Localized keyword as written.
    pub keyword: String,
    /// Background name.
    pub name: String,
    /// Free-form description lines.
    #[serde(default)]
    pub description: String,
    /// Steps in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<Step>,
    /// Document-unique identifier issued by the parser.
    pub id: String,
}

/// A scenario (or scenario outline, when `examples` is non-empty).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    /// Position of the scenario keyword.
    pub location: Location,
    /// Tags attached above the scenario line.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    /// Localized keyword as written.
    pub keyword: String,
    /// Scenario name.
    pub name: String,
    /// Free-form description lines.
    #[serde(default)]
    pub description: String,
    /// Steps in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<Step>,
    /// Examples tables, non-empty only for outlines.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<Examples>,
    /// Document-unique identifier issued by the parser.
    pub id: String,
}

/// An examples table attached to a scenario outline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Examples {
    /// Position of the examples keyword.
    pub location: Location,
    /// Tags attached above the examples line.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    /// Localized keyword as written.
    pub keyword: String,
    /// Examples block name.
    pub name: String,
    /// Free-form description lines.
    #[serde(default)]
    pub description: String,
    /// Header row naming the placeholder columns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_header: Option<TableRow>,
    /// Value rows, one scenario expansion each.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub table_body: Vec<TableRow>,
    /// Document-unique identifier issued by the parser.
    pub id: String,
}

/// A single step line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    /// Position of the step keyword.
    pub location: Location,
    /// Localized keyword as written, trailing space included.
    pub keyword: String,
    /// Semantic role of the keyword, when the dialect resolves one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword_type: Option<StepKeywordType>,
    /// Step text after the keyword.
    pub text: String,
    /// Attached doc string block, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_string: Option<DocString>,
    /// Attached data table, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_table: Option<DataTable>,
    /// Document-unique identifier issued by the parser.
    pub id: String,
}

/// Semantic role of a step keyword, independent of dialect.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepKeywordType {
    /// Role could not be determined.
    Unknown,
    /// Establishes preconditions (`Given`).
    Context,
    /// Performs the action under test (`When`).
    Action,
    /// States the expected outcome (`Then`).
    Outcome,
    /// Continues the previous step's role (`And`, `But`).
    Conjunction,
}

/// A row of an examples table or data table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    /// Position of the first cell delimiter.
    pub location: Location,
    /// Cells in column order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cells: Vec<TableCell>,
    /// Document-unique identifier issued by the parser.
    pub id: String,
}

/// One cell of a table row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TableCell {
    /// Position of the cell content.
    pub location: Location,
    /// Cell text with escapes resolved.
    pub value: String,
}

/// A multi-line string block attached to a step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DocString {
    /// Position of the opening delimiter.
    pub location: Location,
    /// Declared media type of the content, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    /// Block content between the delimiters.
    pub content: String,
    /// Delimiter as written (triple quotes or three backticks).
    pub delimiter: String,
}

/// A data table attached to a step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DataTable {
    /// Position of the first row.
    pub location: Location,
    /// Rows in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rows: Vec<TableRow>,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]
    use super::*;

    #[test]
    fn feature_child_tags_by_shape() {
        let child = FeatureChild::Scenario(Scenario {
            location: Location::at_line(3),
            tags: vec![],
            keyword: "Scenario".into(),
            name: "adds".into(),
            description: String::new(),
            steps: vec![],
            examples: vec![],
            id: "5".into(),
        });
        let json = serde_json::to_string(&child).expect("serialize");
        assert!(json.starts_with(r#"{"scenario":"#), "unexpected tag: {json}");
    }

    #[test]
    fn absent_options_are_omitted() {
        let step = Step {
            location: Location::at_line(4),
            keyword: "Given ".into(),
            keyword_type: Some(StepKeywordType::Context),
            text: "a calculator".into(),
            doc_string: None,
            data_table: None,
            id: "1".into(),
        };
        let json = serde_json::to_string(&step).expect("serialize");
        assert!(!json.contains("docString"));
        assert!(!json.contains("dataTable"));
        assert!(json.contains(r#""keywordType":"CONTEXT""#));
    }

    #[test]
    fn missing_collections_default_to_empty() {
        let doc: GherkinDocument =
            serde_json::from_str(r#"{"uri":"features/a.feature"}"#).expect("decode");
        assert!(doc.comments.is_empty());
        assert!(doc.feature.is_none());
    }
}
