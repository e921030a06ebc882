// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Cross-reference index over a decoded trace stream.
//!
//! [`CrossReference::build`] walks every envelope once and files each visited
//! node into per-kind bags, preserving stream order. Id-bearing nodes are
//! additionally indexed by id, so the validator can chase references
//! (`hook_id` to its [`Hook`], `pickle_step_id` to its [`PickleStep`]) and
//! detect id collisions.
//!
//! The walk is an explicit visitor over the closed node set below; recursion
//! is bounded by the owned, acyclic data shape.

use std::collections::HashMap;

use tricorder_proto::{
    Attachment, Background, Envelope, Examples, Feature, FeatureChild, GherkinDocument, Hook, Meta,
    ParameterType, Pickle, PickleStep, Rule, RuleChild, Scenario, Source, Step, StepDefinition,
    TableRow, Tag, TestCase, TestCaseFinished, TestCaseStarted, TestRunFinished, TestRunStarted,
    TestStep, TestStepFinished, TestStepStarted,
};

/// Kinds of nodes the cross-reference indexes.
///
/// The first fifteen are top-level envelope content types; the rest are the
/// id-bearing substructures nested inside them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// `meta` envelope content.
    Meta,
    /// `source` envelope content.
    Source,
    /// `gherkinDocument` envelope content.
    GherkinDocument,
    /// `pickle` envelope content.
    Pickle,
    /// `stepDefinition` envelope content.
    StepDefinition,
    /// `parameterType` envelope content.
    ParameterType,
    /// `hook` envelope content.
    Hook,
    /// `testRunStarted` envelope content.
    TestRunStarted,
    /// `testCase` envelope content.
    TestCase,
    /// `testCaseStarted` envelope content.
    TestCaseStarted,
    /// `testStepStarted` envelope content.
    TestStepStarted,
    /// `attachment` envelope content.
    Attachment,
    /// `testStepFinished` envelope content.
    TestStepFinished,
    /// `testCaseFinished` envelope content.
    TestCaseFinished,
    /// `testRunFinished` envelope content.
    TestRunFinished,
    /// Tag on a feature, rule, scenario, or examples table.
    Tag,
    /// Rule node inside a gherkin document.
    Rule,
    /// Background node inside a feature or rule.
    Background,
    /// Scenario node inside a feature or rule.
    Scenario,
    /// Examples table attached to a scenario.
    Examples,
    /// Step node inside a background or scenario.
    Step,
    /// Table row inside an examples table or a step data table.
    TableRow,
    /// Step inside a pickle.
    PickleStep,
    /// Step inside a test case plan.
    TestStep,
}

impl NodeKind {
    /// Wire-style name of the kind, used in mismatch paths.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Meta => "meta",
            Self::Source => "source",
            Self::GherkinDocument => "gherkinDocument",
            Self::Pickle => "pickle",
            Self::StepDefinition => "stepDefinition",
            Self::ParameterType => "parameterType",
            Self::Hook => "hook",
            Self::TestRunStarted => "testRunStarted",
            Self::TestCase => "testCase",
            Self::TestCaseStarted => "testCaseStarted",
            Self::TestStepStarted => "testStepStarted",
            Self::Attachment => "attachment",
            Self::TestStepFinished => "testStepFinished",
            Self::TestCaseFinished => "testCaseFinished",
            Self::TestRunFinished => "testRunFinished",
            Self::Tag => "tag",
            Self::Rule => "rule",
            Self::Background => "background",
            Self::Scenario => "scenario",
            Self::Examples => "examples",
            Self::Step => "step",
            Self::TableRow => "tableRow",
            Self::PickleStep => "pickleStep",
            Self::TestStep => "testStep",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Top-level content kinds in canonical stream order.
///
/// The structural phase of validation iterates this list, so mismatch reports
/// come out in a stable order regardless of bag internals.
pub const CANONICAL_CONTENT: [NodeKind; 15] = [
    NodeKind::Meta,
    NodeKind::Source,
    NodeKind::GherkinDocument,
    NodeKind::Pickle,
    NodeKind::StepDefinition,
    NodeKind::ParameterType,
    NodeKind::Hook,
    NodeKind::TestRunStarted,
    NodeKind::TestCase,
    NodeKind::TestCaseStarted,
    NodeKind::TestStepStarted,
    NodeKind::Attachment,
    NodeKind::TestStepFinished,
    NodeKind::TestCaseFinished,
    NodeKind::TestRunFinished,
];

/// A reference to one indexed node, borrowed from the decoded stream.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    /// `meta` payload.
    Meta(&'a Meta),
    /// `source` payload.
    Source(&'a Source),
    /// `gherkinDocument` payload.
    GherkinDocument(&'a GherkinDocument),
    /// `pickle` payload.
    Pickle(&'a Pickle),
    /// `stepDefinition` payload.
    StepDefinition(&'a StepDefinition),
    /// `parameterType` payload.
    ParameterType(&'a ParameterType),
    /// `hook` payload.
    Hook(&'a Hook),
    /// `testRunStarted` payload.
    TestRunStarted(&'a TestRunStarted),
    /// `testCase` payload.
    TestCase(&'a TestCase),
    /// `testCaseStarted` payload.
    TestCaseStarted(&'a TestCaseStarted),
    /// `testStepStarted` payload.
    TestStepStarted(&'a TestStepStarted),
    /// `attachment` payload.
    Attachment(&'a Attachment),
    /// `testStepFinished` payload.
    TestStepFinished(&'a TestStepFinished),
    /// `testCaseFinished` payload.
    TestCaseFinished(&'a TestCaseFinished),
    /// `testRunFinished` payload.
    TestRunFinished(&'a TestRunFinished),
    /// Tag nested in a gherkin document.
    Tag(&'a Tag),
    /// Rule nested in a gherkin document.
    Rule(&'a Rule),
    /// Background nested in a gherkin document.
    Background(&'a Background),
    /// Scenario nested in a gherkin document.
    Scenario(&'a Scenario),
    /// Examples table nested in a scenario.
    Examples(&'a Examples),
    /// Step nested in a background or scenario.
    Step(&'a Step),
    /// Table row nested in an examples table or data table.
    TableRow(&'a TableRow),
    /// Step nested in a pickle.
    PickleStep(&'a PickleStep),
    /// Step nested in a test case plan.
    TestStep(&'a TestStep),
}

impl<'a> Node<'a> {
    /// Kind of the referenced node.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Meta(_) => NodeKind::Meta,
            Self::Source(_) => NodeKind::Source,
            Self::GherkinDocument(_) => NodeKind::GherkinDocument,
            Self::Pickle(_) => NodeKind::Pickle,
            Self::StepDefinition(_) => NodeKind::StepDefinition,
            Self::ParameterType(_) => NodeKind::ParameterType,
            Self::Hook(_) => NodeKind::Hook,
            Self::TestRunStarted(_) => NodeKind::TestRunStarted,
            Self::TestCase(_) => NodeKind::TestCase,
            Self::TestCaseStarted(_) => NodeKind::TestCaseStarted,
            Self::TestStepStarted(_) => NodeKind::TestStepStarted,
            Self::Attachment(_) => NodeKind::Attachment,
            Self::TestStepFinished(_) => NodeKind::TestStepFinished,
            Self::TestCaseFinished(_) => NodeKind::TestCaseFinished,
            Self::TestRunFinished(_) => NodeKind::TestRunFinished,
            Self::Tag(_) => NodeKind::Tag,
            Self::Rule(_) => NodeKind::Rule,
            Self::Background(_) => NodeKind::Background,
            Self::Scenario(_) => NodeKind::Scenario,
            Self::Examples(_) => NodeKind::Examples,
            Self::Step(_) => NodeKind::Step,
            Self::TableRow(_) => NodeKind::TableRow,
            Self::PickleStep(_) => NodeKind::PickleStep,
            Self::TestStep(_) => NodeKind::TestStep,
        }
    }

    /// Id the node declares, when its shape carries one.
    #[must_use]
    pub fn id(&self) -> Option<&'a str> {
        match *self {
            Self::Pickle(pickle) => Some(&pickle.id),
            Self::StepDefinition(definition) => Some(&definition.id),
            Self::ParameterType(parameter) => Some(&parameter.id),
            Self::Hook(hook) => Some(&hook.id),
            Self::TestCase(case) => Some(&case.id),
            Self::TestCaseStarted(started) => Some(&started.id),
            Self::Tag(tag) => Some(&tag.id),
            Self::Rule(rule) => Some(&rule.id),
            Self::Background(background) => Some(&background.id),
            Self::Scenario(scenario) => Some(&scenario.id),
            Self::Examples(examples) => Some(&examples.id),
            Self::Step(step) => Some(&step.id),
            Self::TableRow(row) => Some(&row.id),
            Self::PickleStep(step) => Some(&step.id),
            Self::TestStep(step) => Some(&step.id),
            Self::Meta(_)
            | Self::Source(_)
            | Self::GherkinDocument(_)
            | Self::TestRunStarted(_)
            | Self::TestStepStarted(_)
            | Self::Attachment(_)
            | Self::TestStepFinished(_)
            | Self::TestCaseFinished(_)
            | Self::TestRunFinished(_) => None,
        }
    }
}

/// Index of every node in a trace stream, by kind and by id.
#[derive(Debug, Default)]
pub struct CrossReference<'a> {
    elements_by_type: HashMap<NodeKind, Vec<Node<'a>>>,
    elements_by_id: HashMap<&'a str, Vec<Node<'a>>>,
    ids_by_type: HashMap<NodeKind, Vec<&'a str>>,
    envelope_count: usize,
}

impl<'a> CrossReference<'a> {
    /// Indexes every envelope in the stream.
    #[must_use]
    pub fn build(envelopes: &'a [Envelope]) -> Self {
        let mut xref = Self {
            envelope_count: envelopes.len(),
            ..Self::default()
        };
        for envelope in envelopes {
            xref.visit_envelope(envelope);
        }
        xref
    }

    /// Number of envelopes the stream carried.
    #[must_use]
    pub fn envelope_count(&self) -> usize {
        self.envelope_count
    }

    /// Number of indexed nodes of the given kind.
    #[must_use]
    pub fn count(&self, kind: NodeKind) -> usize {
        self.elements_by_type.get(&kind).map_or(0, Vec::len)
    }

    /// Returns `true` when at least one node of the kind was indexed.
    #[must_use]
    pub fn has(&self, kind: NodeKind) -> bool {
        self.count(kind) > 0
    }

    /// All indexed nodes of the kind, in stream order.
    #[must_use]
    pub fn elements(&self, kind: NodeKind) -> &[Node<'a>] {
        self.elements_by_type.get(&kind).map_or(&[], |nodes| nodes.as_slice())
    }

    /// Ids declared by nodes of the kind, in stream order.
    #[must_use]
    pub fn ids(&self, kind: NodeKind) -> &[&'a str] {
        self.ids_by_type.get(&kind).map_or(&[], |ids| ids.as_slice())
    }

    /// All nodes claiming the given id.
    #[must_use]
    pub fn by_id(&self, id: &str) -> &[Node<'a>] {
        self.elements_by_id.get(id).map_or(&[], |nodes| nodes.as_slice())
    }

    /// Ids claimed by more than one node, sorted, with claim counts.
    #[must_use]
    pub fn id_collisions(&self) -> Vec<(&'a str, usize)> {
        let mut collisions: Vec<(&'a str, usize)> = self
            .elements_by_id
            .iter()
            .filter(|(_, nodes)| nodes.len() > 1)
            .map(|(id, nodes)| (*id, nodes.len()))
            .collect();
        collisions.sort_unstable();
        collisions
    }

    /// Resolves a `hook_id` reference to its declaration.
    #[must_use]
    pub fn find_hook(&self, id: &str) -> Option<&'a Hook> {
        self.by_id(id).iter().find_map(|node| match *node {
            Node::Hook(hook) => Some(hook),
            _ => None,
        })
    }

    /// Resolves a `pickle_step_id` reference to its pickle step.
    #[must_use]
    pub fn find_pickle_step(&self, id: &str) -> Option<&'a PickleStep> {
        self.by_id(id).iter().find_map(|node| match *node {
            Node::PickleStep(step) => Some(step),
            _ => None,
        })
    }

    /// Resolves a `step_definition_ids` entry to its declaration.
    #[must_use]
    pub fn find_step_definition(&self, id: &str) -> Option<&'a StepDefinition> {
        self.by_id(id).iter().find_map(|node| match *node {
            Node::StepDefinition(definition) => Some(definition),
            _ => None,
        })
    }

    /// All `source` payloads, in stream order.
    #[must_use]
    pub fn sources(&self) -> Vec<&'a Source> {
        self.extract(NodeKind::Source, |node| match node {
            Node::Source(source) => Some(source),
            _ => None,
        })
    }

    /// All `gherkinDocument` payloads, in stream order.
    #[must_use]
    pub fn documents(&self) -> Vec<&'a GherkinDocument> {
        self.extract(NodeKind::GherkinDocument, |node| match node {
            Node::GherkinDocument(document) => Some(document),
            _ => None,
        })
    }

    /// All `pickle` payloads, in stream order.
    #[must_use]
    pub fn pickles(&self) -> Vec<&'a Pickle> {
        self.extract(NodeKind::Pickle, |node| match node {
            Node::Pickle(pickle) => Some(pickle),
            _ => None,
        })
    }

    /// All `stepDefinition` payloads, in stream order.
    #[must_use]
    pub fn step_definitions(&self) -> Vec<&'a StepDefinition> {
        self.extract(NodeKind::StepDefinition, |node| match node {
            Node::StepDefinition(definition) => Some(definition),
            _ => None,
        })
    }

    /// All `parameterType` payloads, in stream order.
    #[must_use]
    pub fn parameter_types(&self) -> Vec<&'a ParameterType> {
        self.extract(NodeKind::ParameterType, |node| match node {
            Node::ParameterType(parameter) => Some(parameter),
            _ => None,
        })
    }

    /// All `hook` payloads, in stream order.
    #[must_use]
    pub fn hooks(&self) -> Vec<&'a Hook> {
        self.extract(NodeKind::Hook, |node| match node {
            Node::Hook(hook) => Some(hook),
            _ => None,
        })
    }

    /// All `testCase` payloads, in stream order.
    #[must_use]
    pub fn test_cases(&self) -> Vec<&'a TestCase> {
        self.extract(NodeKind::TestCase, |node| match node {
            Node::TestCase(case) => Some(case),
            _ => None,
        })
    }

    /// All `attachment` payloads, in stream order.
    #[must_use]
    pub fn attachments(&self) -> Vec<&'a Attachment> {
        self.extract(NodeKind::Attachment, |node| match node {
            Node::Attachment(attachment) => Some(attachment),
            _ => None,
        })
    }

    fn extract<T>(&self, kind: NodeKind, pick: impl Fn(Node<'a>) -> Option<&'a T>) -> Vec<&'a T> {
        self.elements(kind).iter().copied().filter_map(pick).collect()
    }

    fn record(&mut self, node: Node<'a>) {
        let kind = node.kind();
        if let Some(id) = node.id() {
            self.elements_by_id.entry(id).or_default().push(node);
            self.ids_by_type.entry(kind).or_default().push(id);
        }
        self.elements_by_type.entry(kind).or_default().push(node);
    }

    fn visit_envelope(&mut self, envelope: &'a Envelope) {
        match envelope {
            Envelope::Meta(meta) => self.record(Node::Meta(meta)),
            Envelope::Source(source) => self.record(Node::Source(source)),
            Envelope::GherkinDocument(document) => {
                self.record(Node::GherkinDocument(document));
                if let Some(feature) = &document.feature {
                    self.visit_feature(feature);
                }
            }
            Envelope::Pickle(pickle) => {
                self.record(Node::Pickle(pickle));
                for step in &pickle.steps {
                    self.record(Node::PickleStep(step));
                }
            }
            Envelope::StepDefinition(definition) => self.record(Node::StepDefinition(definition)),
            Envelope::ParameterType(parameter) => self.record(Node::ParameterType(parameter)),
            Envelope::Hook(hook) => self.record(Node::Hook(hook)),
            Envelope::TestRunStarted(started) => self.record(Node::TestRunStarted(started)),
            Envelope::TestCase(case) => {
                self.record(Node::TestCase(case));
                for step in &case.test_steps {
                    self.record(Node::TestStep(step));
                }
            }
            Envelope::TestCaseStarted(started) => self.record(Node::TestCaseStarted(started)),
            Envelope::TestStepStarted(started) => self.record(Node::TestStepStarted(started)),
            Envelope::Attachment(attachment) => self.record(Node::Attachment(attachment)),
            Envelope::TestStepFinished(finished) => self.record(Node::TestStepFinished(finished)),
            Envelope::TestCaseFinished(finished) => self.record(Node::TestCaseFinished(finished)),
            Envelope::TestRunFinished(finished) => self.record(Node::TestRunFinished(finished)),
        }
    }

    fn visit_feature(&mut self, feature: &'a Feature) {
        for tag in &feature.tags {
            self.record(Node::Tag(tag));
        }
        for child in &feature.children {
            match child {
                FeatureChild::Rule(rule) => self.visit_rule(rule),
                FeatureChild::Background(background) => self.visit_background(background),
                FeatureChild::Scenario(scenario) => self.visit_scenario(scenario),
            }
        }
    }

    fn visit_rule(&mut self, rule: &'a Rule) {
        self.record(Node::Rule(rule));
        for tag in &rule.tags {
            self.record(Node::Tag(tag));
        }
        for child in &rule.children {
            match child {
                RuleChild::Background(background) => self.visit_background(background),
                RuleChild::Scenario(scenario) => self.visit_scenario(scenario),
            }
        }
    }

    fn visit_background(&mut self, background: &'a Background) {
        self.record(Node::Background(background));
        for step in &background.steps {
            self.visit_step(step);
        }
    }

    fn visit_scenario(&mut self, scenario: &'a Scenario) {
        self.record(Node::Scenario(scenario));
        for tag in &scenario.tags {
            self.record(Node::Tag(tag));
        }
        for step in &scenario.steps {
            self.visit_step(step);
        }
        for examples in &scenario.examples {
            self.visit_examples(examples);
        }
    }

    fn visit_examples(&mut self, examples: &'a Examples) {
        self.record(Node::Examples(examples));
        for tag in &examples.tags {
            self.record(Node::Tag(tag));
        }
        if let Some(header) = &examples.table_header {
            self.record(Node::TableRow(header));
        }
        for row in &examples.table_body {
            self.record(Node::TableRow(row));
        }
    }

    fn visit_step(&mut self, step: &'a Step) {
        self.record(Node::Step(step));
        if let Some(table) = &step.data_table {
            for row in &table.rows {
                self.record(Node::TableRow(row));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]
    use super::*;
    use tricorder_dry_tests::passing_run;

    #[test]
    fn counts_follow_the_stream() {
        let stream = passing_run();
        let xref = CrossReference::build(&stream);
        assert_eq!(xref.envelope_count(), stream.len());
        assert_eq!(xref.count(NodeKind::Meta), 1);
        assert_eq!(xref.count(NodeKind::Hook), 1);
        assert_eq!(xref.count(NodeKind::StepDefinition), 2);
        assert_eq!(xref.count(NodeKind::TestStepStarted), 3);
        assert_eq!(xref.count(NodeKind::PickleStep), 2);
        assert_eq!(xref.count(NodeKind::TestStep), 3);
        assert_eq!(xref.count(NodeKind::Scenario), 1);
        assert!(!xref.has(NodeKind::Rule));
    }

    #[test]
    fn ids_resolve_to_their_declarations() {
        let stream = passing_run();
        let xref = CrossReference::build(&stream);
        let hook = xref.find_hook("h").expect("hook declared");
        assert_eq!(hook.name.as_deref(), Some("reset calculator"));
        let step = xref.find_pickle_step("ps1").expect("pickle step declared");
        assert_eq!(step.text, "I have 4 cukes");
        let definition = xref.find_step_definition("sd2").expect("definition declared");
        assert_eq!(definition.pattern.source, "I eat {int} cukes");
        assert!(xref.find_hook("ps1").is_none());
    }

    #[test]
    fn nested_gherkin_nodes_land_in_the_id_index() {
        let stream = passing_run();
        let xref = CrossReference::build(&stream);
        assert!(matches!(xref.by_id("sc"), [Node::Scenario(_)]));
        assert!(matches!(xref.by_id("tg"), [Node::Tag(_)]));
        assert!(matches!(xref.by_id("s2"), [Node::Step(_)]));
        assert_eq!(xref.ids(NodeKind::PickleStep), ["ps1", "ps2"]);
    }

    #[test]
    fn duplicated_envelope_is_an_id_collision() {
        let mut stream = passing_run();
        let hook = stream
            .iter()
            .find(|envelope| matches!(envelope, Envelope::Hook(_)))
            .expect("fixture declares a hook")
            .clone();
        stream.push(hook);
        let xref = CrossReference::build(&stream);
        assert_eq!(xref.id_collisions(), [("h", 2)]);
    }

    #[test]
    fn clean_stream_has_no_collisions() {
        let stream = passing_run();
        let xref = CrossReference::build(&stream);
        assert!(xref.id_collisions().is_empty());
    }
}
