// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Deep equivalence pass over two cross-referenced streams.
//!
//! Ids never cross the comparison boundary: wherever an element references
//! another by id, the reference is chased through its own stream's index and
//! the referents are compared instead. Every divergence is recorded and the
//! walk continues; nothing short-circuits.

use std::fmt;

use tricorder_proto::{
    Background, Comment, DataTable, DocString, Examples, Feature, FeatureChild, GherkinDocument,
    Group, Hook, PickleStep, PickleStepArgument, PickleTable, Rule, RuleChild, Scenario, Step,
    StepMatchArgument, TableRow, Tag, TestCase, TestStep, Timestamp,
};

use crate::report::{Mismatch, MismatchCode};
use crate::rules::EquivalenceRules;
use crate::xref::{CrossReference, Node, NodeKind};

/// One deep pass over the comparable content types.
pub(crate) struct DeepComparison<'a> {
    rules: &'a EquivalenceRules,
    actual: &'a CrossReference<'a>,
    expected: &'a CrossReference<'a>,
    mismatches: Vec<Mismatch>,
}

impl<'a> DeepComparison<'a> {
    /// Runs the pass and returns every divergence found.
    pub(crate) fn run(
        rules: &'a EquivalenceRules,
        actual: &'a CrossReference<'a>,
        expected: &'a CrossReference<'a>,
    ) -> Vec<Mismatch> {
        let mut comparison = Self {
            rules,
            actual,
            expected,
            mismatches: Vec::new(),
        };
        comparison.compare_sources();
        comparison.compare_documents();
        comparison.compare_pickles();
        comparison.compare_step_definitions();
        comparison.compare_parameter_types();
        comparison.compare_hooks();
        comparison.compare_test_cases();
        comparison.compare_attachments();
        if !rules.ignore_clocks {
            comparison.compare_clocks();
        }
        comparison.mismatches
    }

    // ─── Recording helpers ───────────────────────────────────────────────────

    fn strings(&mut self, path: &str, actual: &str, expected: &str) {
        if self.rules.strings_match(actual, expected) {
            return;
        }
        self.mismatches.push(
            Mismatch::new(MismatchCode::ValueMismatch, path, "text differs")
                .with_expected(expected)
                .with_actual(actual),
        );
    }

    fn option_strings(&mut self, path: &str, actual: Option<&str>, expected: Option<&str>) {
        if self.rules.option_strings_match(actual, expected) {
            return;
        }
        self.mismatches.push(
            Mismatch::new(MismatchCode::ValueMismatch, path, "text differs")
                .with_expected(format!("{expected:?}"))
                .with_actual(format!("{actual:?}")),
        );
    }

    fn languages(&mut self, path: &str, actual: &str, expected: &str) {
        if self.rules.languages_match(actual, expected) {
            return;
        }
        self.mismatches.push(
            Mismatch::new(MismatchCode::ValueMismatch, path, "language differs")
                .with_expected(expected)
                .with_actual(actual),
        );
    }

    fn values<T: fmt::Debug + PartialEq>(&mut self, path: &str, actual: &T, expected: &T) {
        if actual == expected {
            return;
        }
        self.mismatches.push(
            Mismatch::new(MismatchCode::ValueMismatch, path, "value differs")
                .with_expected(format!("{expected:?}"))
                .with_actual(format!("{actual:?}")),
        );
    }

    fn presence(&mut self, path: &str, actual: bool, expected: bool) {
        if actual == expected {
            return;
        }
        let word = |present: bool| if present { "present" } else { "absent" };
        self.mismatches.push(
            Mismatch::new(MismatchCode::ValueMismatch, path, "presence differs")
                .with_expected(word(expected))
                .with_actual(word(actual)),
        );
    }

    fn lengths(&mut self, path: &str, actual: usize, expected: usize) {
        if actual == expected {
            return;
        }
        self.mismatches.push(
            Mismatch::new(MismatchCode::SequenceLengthMismatch, path, "collection lengths differ")
                .with_expected(expected.to_string())
                .with_actual(actual.to_string()),
        );
    }

    // ─── Sources and documents ───────────────────────────────────────────────

    fn compare_sources(&mut self) {
        let actual = self.actual.sources();
        let expected = self.expected.sources();
        for (index, (actual, expected)) in actual.iter().zip(&expected).enumerate() {
            let path = format!("source[{index}]");
            self.strings(&format!("{path}.uri"), &actual.uri, &expected.uri);
            self.strings(&format!("{path}.data"), &actual.data, &expected.data);
            self.strings(&format!("{path}.mediaType"), &actual.media_type, &expected.media_type);
        }
    }

    fn compare_documents(&mut self) {
        let actual = self.actual.documents();
        let expected = self.expected.documents();
        for (index, (actual, expected)) in actual.iter().zip(&expected).enumerate() {
            let path = format!("gherkinDocument[{index}]");
            self.compare_document(&path, actual, expected);
        }
    }

    fn compare_document(&mut self, path: &str, actual: &GherkinDocument, expected: &GherkinDocument) {
        self.option_strings(&format!("{path}.uri"), actual.uri.as_deref(), expected.uri.as_deref());
        match (&actual.feature, &expected.feature) {
            (Some(actual_feature), Some(expected_feature)) => {
                self.compare_feature(&format!("{path}.feature"), actual_feature, expected_feature);
            }
            (None, None) => {}
            (actual_feature, expected_feature) => {
                self.presence(
                    &format!("{path}.feature"),
                    actual_feature.is_some(),
                    expected_feature.is_some(),
                );
            }
        }
        let comments_path = format!("{path}.comments");
        self.lengths(&comments_path, actual.comments.len(), expected.comments.len());
        for (index, (actual, expected)) in actual.comments.iter().zip(&expected.comments).enumerate()
        {
            self.compare_comment(&format!("{comments_path}[{index}]"), actual, expected);
        }
    }

    fn compare_comment(&mut self, path: &str, actual: &Comment, expected: &Comment) {
        self.values(&format!("{path}.location"), &actual.location, &expected.location);
        self.strings(&format!("{path}.text"), &actual.text, &expected.text);
    }

    fn compare_feature(&mut self, path: &str, actual: &Feature, expected: &Feature) {
        self.values(&format!("{path}.location"), &actual.location, &expected.location);
        self.compare_tags(path, &actual.tags, &expected.tags);
        self.languages(&format!("{path}.language"), &actual.language, &expected.language);
        self.strings(&format!("{path}.keyword"), &actual.keyword, &expected.keyword);
        self.strings(&format!("{path}.name"), &actual.name, &expected.name);
        self.strings(&format!("{path}.description"), &actual.description, &expected.description);
        let children_path = format!("{path}.children");
        self.lengths(&children_path, actual.children.len(), expected.children.len());
        for (index, (actual, expected)) in actual.children.iter().zip(&expected.children).enumerate()
        {
            let child_path = format!("{children_path}[{index}]");
            match (actual, expected) {
                (FeatureChild::Rule(actual), FeatureChild::Rule(expected)) => {
                    self.compare_rule(&child_path, actual, expected);
                }
                (FeatureChild::Background(actual), FeatureChild::Background(expected)) => {
                    self.compare_background(&child_path, actual, expected);
                }
                (FeatureChild::Scenario(actual), FeatureChild::Scenario(expected)) => {
                    self.compare_scenario(&child_path, actual, expected);
                }
                (actual, expected) => {
                    self.mismatches.push(
                        Mismatch::new(MismatchCode::ValueMismatch, &child_path, "child kind differs")
                            .with_expected(feature_child_kind(expected))
                            .with_actual(feature_child_kind(actual)),
                    );
                }
            }
        }
    }

    fn compare_rule(&mut self, path: &str, actual: &Rule, expected: &Rule) {
        self.values(&format!("{path}.location"), &actual.location, &expected.location);
        self.compare_tags(path, &actual.tags, &expected.tags);
        self.strings(&format!("{path}.keyword"), &actual.keyword, &expected.keyword);
        self.strings(&format!("{path}.name"), &actual.name, &expected.name);
        self.strings(&format!("{path}.description"), &actual.description, &expected.description);
        let children_path = format!("{path}.children");
        self.lengths(&children_path, actual.children.len(), expected.children.len());
        for (index, (actual, expected)) in actual.children.iter().zip(&expected.children).enumerate()
        {
            let child_path = format!("{children_path}[{index}]");
            match (actual, expected) {
                (RuleChild::Background(actual), RuleChild::Background(expected)) => {
                    self.compare_background(&child_path, actual, expected);
                }
                (RuleChild::Scenario(actual), RuleChild::Scenario(expected)) => {
                    self.compare_scenario(&child_path, actual, expected);
                }
                (actual, expected) => {
                    self.mismatches.push(
                        Mismatch::new(MismatchCode::ValueMismatch, &child_path, "child kind differs")
                            .with_expected(rule_child_kind(expected))
                            .with_actual(rule_child_kind(actual)),
                    );
                }
            }
        }
    }

    fn compare_background(&mut self, path: &str, actual: &Background, expected: &Background) {
        self.values(&format!("{path}.location"), &actual.location, &expected.location);
        self.strings(&format!("{path}.keyword"), &actual.keyword, &expected.keyword);
        self.strings(&format!("{path}.name"), &actual.name, &expected.name);
        self.strings(&format!("{path}.description"), &actual.description, &expected.description);
        self.compare_steps(path, &actual.steps, &expected.steps);
    }

    fn compare_scenario(&mut self, path: &str, actual: &Scenario, expected: &Scenario) {
        self.values(&format!("{path}.location"), &actual.location, &expected.location);
        self.compare_tags(path, &actual.tags, &expected.tags);
        self.strings(&format!("{path}.keyword"), &actual.keyword, &expected.keyword);
        self.strings(&format!("{path}.name"), &actual.name, &expected.name);
        self.strings(&format!("{path}.description"), &actual.description, &expected.description);
        self.compare_steps(path, &actual.steps, &expected.steps);
        let examples_path = format!("{path}.examples");
        self.lengths(&examples_path, actual.examples.len(), expected.examples.len());
        for (index, (actual, expected)) in actual.examples.iter().zip(&expected.examples).enumerate()
        {
            self.compare_examples(&format!("{examples_path}[{index}]"), actual, expected);
        }
    }

    fn compare_examples(&mut self, path: &str, actual: &Examples, expected: &Examples) {
        self.values(&format!("{path}.location"), &actual.location, &expected.location);
        self.compare_tags(path, &actual.tags, &expected.tags);
        self.strings(&format!("{path}.keyword"), &actual.keyword, &expected.keyword);
        self.strings(&format!("{path}.name"), &actual.name, &expected.name);
        self.strings(&format!("{path}.description"), &actual.description, &expected.description);
        match (&actual.table_header, &expected.table_header) {
            (Some(actual_header), Some(expected_header)) => {
                self.compare_table_row(&format!("{path}.tableHeader"), actual_header, expected_header);
            }
            (None, None) => {}
            (actual_header, expected_header) => {
                self.presence(
                    &format!("{path}.tableHeader"),
                    actual_header.is_some(),
                    expected_header.is_some(),
                );
            }
        }
        let body_path = format!("{path}.tableBody");
        self.lengths(&body_path, actual.table_body.len(), expected.table_body.len());
        for (index, (actual, expected)) in
            actual.table_body.iter().zip(&expected.table_body).enumerate()
        {
            self.compare_table_row(&format!("{body_path}[{index}]"), actual, expected);
        }
    }

    fn compare_steps(&mut self, path: &str, actual: &[Step], expected: &[Step]) {
        let steps_path = format!("{path}.steps");
        self.lengths(&steps_path, actual.len(), expected.len());
        for (index, (actual, expected)) in actual.iter().zip(expected).enumerate() {
            self.compare_step(&format!("{steps_path}[{index}]"), actual, expected);
        }
    }

    fn compare_step(&mut self, path: &str, actual: &Step, expected: &Step) {
        self.values(&format!("{path}.location"), &actual.location, &expected.location);
        self.strings(&format!("{path}.keyword"), &actual.keyword, &expected.keyword);
        self.values(&format!("{path}.keywordType"), &actual.keyword_type, &expected.keyword_type);
        self.strings(&format!("{path}.text"), &actual.text, &expected.text);
        match (&actual.doc_string, &expected.doc_string) {
            (Some(actual_doc), Some(expected_doc)) => {
                self.compare_doc_string(&format!("{path}.docString"), actual_doc, expected_doc);
            }
            (None, None) => {}
            (actual_doc, expected_doc) => {
                self.presence(&format!("{path}.docString"), actual_doc.is_some(), expected_doc.is_some());
            }
        }
        match (&actual.data_table, &expected.data_table) {
            (Some(actual_table), Some(expected_table)) => {
                self.compare_data_table(&format!("{path}.dataTable"), actual_table, expected_table);
            }
            (None, None) => {}
            (actual_table, expected_table) => {
                self.presence(
                    &format!("{path}.dataTable"),
                    actual_table.is_some(),
                    expected_table.is_some(),
                );
            }
        }
    }

    fn compare_doc_string(&mut self, path: &str, actual: &DocString, expected: &DocString) {
        self.values(&format!("{path}.location"), &actual.location, &expected.location);
        self.option_strings(
            &format!("{path}.mediaType"),
            actual.media_type.as_deref(),
            expected.media_type.as_deref(),
        );
        self.strings(&format!("{path}.content"), &actual.content, &expected.content);
        self.strings(&format!("{path}.delimiter"), &actual.delimiter, &expected.delimiter);
    }

    fn compare_data_table(&mut self, path: &str, actual: &DataTable, expected: &DataTable) {
        self.values(&format!("{path}.location"), &actual.location, &expected.location);
        let rows_path = format!("{path}.rows");
        self.lengths(&rows_path, actual.rows.len(), expected.rows.len());
        for (index, (actual, expected)) in actual.rows.iter().zip(&expected.rows).enumerate() {
            self.compare_table_row(&format!("{rows_path}[{index}]"), actual, expected);
        }
    }

    fn compare_table_row(&mut self, path: &str, actual: &TableRow, expected: &TableRow) {
        self.values(&format!("{path}.location"), &actual.location, &expected.location);
        let cells_path = format!("{path}.cells");
        self.lengths(&cells_path, actual.cells.len(), expected.cells.len());
        for (index, (actual, expected)) in actual.cells.iter().zip(&expected.cells).enumerate() {
            let cell_path = format!("{cells_path}[{index}]");
            self.values(&format!("{cell_path}.location"), &actual.location, &expected.location);
            self.strings(&format!("{cell_path}.value"), &actual.value, &expected.value);
        }
    }

    fn compare_tags(&mut self, path: &str, actual: &[Tag], expected: &[Tag]) {
        let tags_path = format!("{path}.tags");
        self.lengths(&tags_path, actual.len(), expected.len());
        for (index, (actual, expected)) in actual.iter().zip(expected).enumerate() {
            let tag_path = format!("{tags_path}[{index}]");
            self.values(&format!("{tag_path}.location"), &actual.location, &expected.location);
            self.strings(&format!("{tag_path}.name"), &actual.name, &expected.name);
        }
    }

    // ─── Pickles ─────────────────────────────────────────────────────────────

    fn compare_pickles(&mut self) {
        let actual = self.actual.pickles();
        let expected = self.expected.pickles();
        for (index, (actual, expected)) in actual.iter().zip(&expected).enumerate() {
            let path = format!("pickle[{index}]");
            self.strings(&format!("{path}.uri"), &actual.uri, &expected.uri);
            self.strings(&format!("{path}.name"), &actual.name, &expected.name);
            self.languages(&format!("{path}.language"), &actual.language, &expected.language);
            let steps_path = format!("{path}.steps");
            self.lengths(&steps_path, actual.steps.len(), expected.steps.len());
            for (step_index, (actual, expected)) in
                actual.steps.iter().zip(&expected.steps).enumerate()
            {
                self.compare_pickle_step(&format!("{steps_path}[{step_index}]"), actual, expected);
            }
            let tags_path = format!("{path}.tags");
            self.lengths(&tags_path, actual.tags.len(), expected.tags.len());
            for (tag_index, (actual, expected)) in actual.tags.iter().zip(&expected.tags).enumerate()
            {
                self.strings(&format!("{tags_path}[{tag_index}].name"), &actual.name, &expected.name);
            }
        }
    }

    fn compare_pickle_step(&mut self, path: &str, actual: &PickleStep, expected: &PickleStep) {
        self.values(&format!("{path}.type"), &actual.step_type, &expected.step_type);
        self.strings(&format!("{path}.text"), &actual.text, &expected.text);
        match (&actual.argument, &expected.argument) {
            (
                Some(PickleStepArgument::DocString(actual_doc)),
                Some(PickleStepArgument::DocString(expected_doc)),
            ) => {
                let doc_path = format!("{path}.argument.docString");
                self.option_strings(
                    &format!("{doc_path}.mediaType"),
                    actual_doc.media_type.as_deref(),
                    expected_doc.media_type.as_deref(),
                );
                self.strings(&format!("{doc_path}.content"), &actual_doc.content, &expected_doc.content);
            }
            (
                Some(PickleStepArgument::DataTable(actual_table)),
                Some(PickleStepArgument::DataTable(expected_table)),
            ) => {
                self.compare_pickle_table(&format!("{path}.argument.dataTable"), actual_table, expected_table);
            }
            (None, None) => {}
            (Some(actual_argument), Some(expected_argument)) => {
                self.mismatches.push(
                    Mismatch::new(
                        MismatchCode::ValueMismatch,
                        format!("{path}.argument"),
                        "argument kind differs",
                    )
                    .with_expected(pickle_argument_kind(expected_argument))
                    .with_actual(pickle_argument_kind(actual_argument)),
                );
            }
            (actual_argument, expected_argument) => {
                self.presence(
                    &format!("{path}.argument"),
                    actual_argument.is_some(),
                    expected_argument.is_some(),
                );
            }
        }
    }

    fn compare_pickle_table(&mut self, path: &str, actual: &PickleTable, expected: &PickleTable) {
        let rows_path = format!("{path}.rows");
        self.lengths(&rows_path, actual.rows.len(), expected.rows.len());
        for (row_index, (actual, expected)) in actual.rows.iter().zip(&expected.rows).enumerate() {
            let cells_path = format!("{rows_path}[{row_index}].cells");
            self.lengths(&cells_path, actual.cells.len(), expected.cells.len());
            for (cell_index, (actual, expected)) in
                actual.cells.iter().zip(&expected.cells).enumerate()
            {
                self.strings(&format!("{cells_path}[{cell_index}].value"), &actual.value, &expected.value);
            }
        }
    }

    // ─── Bindings ────────────────────────────────────────────────────────────

    fn compare_step_definitions(&mut self) {
        let actual = self.actual.step_definitions();
        let expected = self.expected.step_definitions();
        for (index, (actual, expected)) in actual.iter().zip(&expected).enumerate() {
            let path = format!("stepDefinition[{index}].pattern");
            self.strings(&format!("{path}.source"), &actual.pattern.source, &expected.pattern.source);
            self.values(&format!("{path}.type"), &actual.pattern.pattern_type, &expected.pattern.pattern_type);
        }
    }

    fn compare_parameter_types(&mut self) {
        let actual = self.actual.parameter_types();
        let expected = self.expected.parameter_types();
        for (index, (actual, expected)) in actual.iter().zip(&expected).enumerate() {
            let path = format!("parameterType[{index}]");
            self.strings(&format!("{path}.name"), &actual.name, &expected.name);
            let regexps_path = format!("{path}.regularExpressions");
            self.lengths(&regexps_path, actual.regular_expressions.len(), expected.regular_expressions.len());
            for (regexp_index, (actual, expected)) in actual
                .regular_expressions
                .iter()
                .zip(&expected.regular_expressions)
                .enumerate()
            {
                self.strings(&format!("{regexps_path}[{regexp_index}]"), actual, expected);
            }
            self.values(
                &format!("{path}.preferForRegularExpressionMatch"),
                &actual.prefer_for_regular_expression_match,
                &expected.prefer_for_regular_expression_match,
            );
            self.values(&format!("{path}.useForSnippets"), &actual.use_for_snippets, &expected.use_for_snippets);
        }
    }

    fn compare_hooks(&mut self) {
        let actual = self.actual.hooks();
        let expected = self.expected.hooks();
        if self.rules.hook_containment {
            for hook in &expected {
                if actual.iter().any(|candidate| self.hooks_equivalent(candidate, hook)) {
                    continue;
                }
                self.mismatches.push(Mismatch::new(
                    MismatchCode::MissingCounterpart,
                    "hook",
                    format!("no actual hook is equivalent to `{}`", hook_label(hook)),
                ));
            }
        } else {
            self.lengths("hook", actual.len(), expected.len());
            for (index, (actual, expected)) in actual.iter().zip(&expected).enumerate() {
                if self.hooks_equivalent(actual, expected) {
                    continue;
                }
                self.mismatches.push(
                    Mismatch::new(MismatchCode::ValueMismatch, format!("hook[{index}]"), "hooks differ")
                        .with_expected(hook_label(expected))
                        .with_actual(hook_label(actual)),
                );
            }
        }
    }

    fn hooks_equivalent(&self, actual: &Hook, expected: &Hook) -> bool {
        self.rules.option_strings_match(actual.name.as_deref(), expected.name.as_deref())
            && self
                .rules
                .option_strings_match(actual.tag_expression.as_deref(), expected.tag_expression.as_deref())
            && actual.hook_type == expected.hook_type
    }

    // ─── Test cases ──────────────────────────────────────────────────────────

    fn compare_test_cases(&mut self) {
        let actual = self.actual.test_cases();
        let expected = self.expected.test_cases();
        for (index, (actual, expected)) in actual.iter().zip(&expected).enumerate() {
            let path = format!("testCase[{index}]");
            self.compare_test_steps(&path, actual, expected);
        }
    }

    fn compare_test_steps(&mut self, path: &str, actual: &TestCase, expected: &TestCase) {
        let (actual_hooks, actual_steps): (Vec<&TestStep>, Vec<&TestStep>) =
            actual.test_steps.iter().partition(|step| step.is_hook_step());
        let (expected_hooks, expected_steps): (Vec<&TestStep>, Vec<&TestStep>) =
            expected.test_steps.iter().partition(|step| step.is_hook_step());

        let steps_path = format!("{path}.testSteps");
        self.dangling_hook_refs(&steps_path, &actual_hooks, self.actual, "actual");
        self.dangling_hook_refs(&steps_path, &expected_hooks, self.expected, "expected");

        if self.rules.hook_containment {
            for step in &expected_hooks {
                if actual_hooks
                    .iter()
                    .any(|candidate| self.hook_steps_equivalent(candidate, step))
                {
                    continue;
                }
                self.mismatches.push(
                    Mismatch::new(
                        MismatchCode::MissingCounterpart,
                        &steps_path,
                        "no equivalent hook step in the actual stream",
                    )
                    .with_expected(self.describe_hook_step(step)),
                );
            }
        } else {
            self.lengths(&format!("{steps_path}[hooks]"), actual_hooks.len(), expected_hooks.len());
            for (index, (actual, expected)) in
                actual_hooks.iter().zip(&expected_hooks).enumerate()
            {
                if self.hook_steps_equivalent(actual, expected) {
                    continue;
                }
                self.mismatches.push(
                    Mismatch::new(
                        MismatchCode::ValueMismatch,
                        format!("{steps_path}[{index}]"),
                        "hook steps differ",
                    )
                    .with_expected(self.describe_hook_step(expected))
                    .with_actual(self.describe_hook_step(actual)),
                );
            }
        }

        self.lengths(&steps_path, actual_steps.len(), expected_steps.len());
        for (index, (actual, expected)) in actual_steps.iter().zip(&expected_steps).enumerate() {
            self.compare_pickle_test_step(&format!("{steps_path}[{index}]"), actual, expected);
        }
    }

    fn dangling_hook_refs(
        &mut self,
        path: &str,
        steps: &[&TestStep],
        xref: &CrossReference<'a>,
        stream: &str,
    ) {
        for step in steps {
            let Some(hook_id) = step.hook_id.as_deref() else {
                continue;
            };
            if xref.find_hook(hook_id).is_some() {
                continue;
            }
            self.mismatches.push(
                Mismatch::new(
                    MismatchCode::DanglingReference,
                    path,
                    format!("{stream} stream hook step references an undeclared hook"),
                )
                .with_actual(hook_id),
            );
        }
    }

    fn hook_steps_equivalent(&self, actual: &TestStep, expected: &TestStep) -> bool {
        let resolved = match (actual.hook_id.as_deref(), expected.hook_id.as_deref()) {
            (Some(actual_id), Some(expected_id)) => {
                (self.actual.find_hook(actual_id), self.expected.find_hook(expected_id))
            }
            _ => return false,
        };
        match resolved {
            (Some(actual_hook), Some(expected_hook)) => {
                self.hooks_equivalent(actual_hook, expected_hook)
            }
            _ => false,
        }
    }

    fn describe_hook_step(&self, step: &TestStep) -> String {
        match step.hook_id.as_deref() {
            Some(id) => match self.expected.find_hook(id).or_else(|| self.actual.find_hook(id)) {
                Some(hook) => hook_label(hook).to_string(),
                None => id.to_string(),
            },
            None => String::from("(no hook reference)"),
        }
    }

    fn compare_pickle_test_step(&mut self, path: &str, actual: &TestStep, expected: &TestStep) {
        match (actual.pickle_step_id.as_deref(), expected.pickle_step_id.as_deref()) {
            (Some(actual_id), Some(expected_id)) => {
                let actual_step = self.actual.find_pickle_step(actual_id);
                let expected_step = self.expected.find_pickle_step(expected_id);
                if actual_step.is_none() {
                    self.mismatches.push(
                        Mismatch::new(
                            MismatchCode::DanglingReference,
                            path,
                            "actual stream test step references an undeclared pickle step",
                        )
                        .with_actual(actual_id),
                    );
                }
                if expected_step.is_none() {
                    self.mismatches.push(
                        Mismatch::new(
                            MismatchCode::DanglingReference,
                            path,
                            "expected stream test step references an undeclared pickle step",
                        )
                        .with_expected(expected_id),
                    );
                }
                if let (Some(actual_step), Some(expected_step)) = (actual_step, expected_step) {
                    self.compare_pickle_step(&format!("{path}.pickleStep"), actual_step, expected_step);
                }
            }
            (None, None) => {}
            (actual_id, expected_id) => {
                self.presence(&format!("{path}.pickleStepId"), actual_id.is_some(), expected_id.is_some());
            }
        }

        let actual_arity = actual.step_definition_ids.as_ref().map(Vec::len);
        let expected_arity = expected.step_definition_ids.as_ref().map(Vec::len);
        self.values(&format!("{path}.stepDefinitionIds"), &actual_arity, &expected_arity);

        match (&actual.step_match_arguments_lists, &expected.step_match_arguments_lists) {
            (Some(actual_lists), Some(expected_lists)) => {
                let lists_path = format!("{path}.stepMatchArgumentsLists");
                self.lengths(&lists_path, actual_lists.len(), expected_lists.len());
                for (list_index, (actual, expected)) in
                    actual_lists.iter().zip(expected_lists).enumerate()
                {
                    let list_path = format!("{lists_path}[{list_index}].stepMatchArguments");
                    self.lengths(
                        &list_path,
                        actual.step_match_arguments.len(),
                        expected.step_match_arguments.len(),
                    );
                    for (argument_index, (actual, expected)) in actual
                        .step_match_arguments
                        .iter()
                        .zip(&expected.step_match_arguments)
                        .enumerate()
                    {
                        self.compare_match_argument(
                            &format!("{list_path}[{argument_index}]"),
                            actual,
                            expected,
                        );
                    }
                }
            }
            (None, None) => {}
            (actual_lists, expected_lists) => {
                self.presence(
                    &format!("{path}.stepMatchArgumentsLists"),
                    actual_lists.is_some(),
                    expected_lists.is_some(),
                );
            }
        }
    }

    fn compare_match_argument(&mut self, path: &str, actual: &StepMatchArgument, expected: &StepMatchArgument) {
        self.option_strings(
            &format!("{path}.parameterTypeName"),
            actual.parameter_type_name.as_deref(),
            expected.parameter_type_name.as_deref(),
        );
        self.compare_group(&format!("{path}.group"), &actual.group, &expected.group);
    }

    fn compare_group(&mut self, path: &str, actual: &Group, expected: &Group) {
        self.option_strings(&format!("{path}.value"), actual.value.as_deref(), expected.value.as_deref());
        let children_path = format!("{path}.children");
        self.lengths(&children_path, actual.children.len(), expected.children.len());
        for (index, (actual, expected)) in actual.children.iter().zip(&expected.children).enumerate()
        {
            self.compare_group(&format!("{children_path}[{index}]"), actual, expected);
        }
    }

    // ─── Attachments ─────────────────────────────────────────────────────────

    fn compare_attachments(&mut self) {
        let actual = self.actual.attachments();
        let expected = self.expected.attachments();
        for (index, (actual, expected)) in actual.iter().zip(&expected).enumerate() {
            let path = format!("attachment[{index}]");
            self.values(&format!("{path}.body"), &actual.body, &expected.body);
            self.values(&format!("{path}.mediaType"), &actual.media_type, &expected.media_type);
            self.values(&format!("{path}.contentEncoding"), &actual.content_encoding, &expected.content_encoding);
            self.values(&format!("{path}.fileName"), &actual.file_name, &expected.file_name);
        }
    }

    // ─── Clocks (strict mode only) ───────────────────────────────────────────

    fn compare_clocks(&mut self) {
        const TIMED: [NodeKind; 6] = [
            NodeKind::TestRunStarted,
            NodeKind::TestCaseStarted,
            NodeKind::TestStepStarted,
            NodeKind::TestStepFinished,
            NodeKind::TestCaseFinished,
            NodeKind::TestRunFinished,
        ];
        for kind in TIMED {
            let actual = self.actual.elements(kind).to_vec();
            let expected = self.expected.elements(kind).to_vec();
            for (index, (actual, expected)) in actual.iter().zip(&expected).enumerate() {
                if let (Some(actual_clock), Some(expected_clock)) =
                    (node_timestamp(*actual), node_timestamp(*expected))
                {
                    let path = format!("{}[{index}].timestamp", kind.name());
                    self.values(&path, actual_clock, expected_clock);
                }
                if let (Node::TestStepFinished(actual), Node::TestStepFinished(expected)) =
                    (*actual, *expected)
                {
                    self.values(
                        &format!("{}[{index}].testStepResult.duration", kind.name()),
                        &actual.test_step_result.duration,
                        &expected.test_step_result.duration,
                    );
                }
            }
        }
    }
}

fn node_timestamp(node: Node<'_>) -> Option<&Timestamp> {
    match node {
        Node::TestRunStarted(event) => Some(&event.timestamp),
        Node::TestCaseStarted(event) => Some(&event.timestamp),
        Node::TestStepStarted(event) => Some(&event.timestamp),
        Node::TestStepFinished(event) => Some(&event.timestamp),
        Node::TestCaseFinished(event) => Some(&event.timestamp),
        Node::TestRunFinished(event) => Some(&event.timestamp),
        _ => None,
    }
}

fn hook_label(hook: &Hook) -> &str {
    hook.name.as_deref().unwrap_or(&hook.id)
}

fn feature_child_kind(child: &FeatureChild) -> &'static str {
    match child {
        FeatureChild::Rule(_) => "rule",
        FeatureChild::Background(_) => "background",
        FeatureChild::Scenario(_) => "scenario",
    }
}

fn rule_child_kind(child: &RuleChild) -> &'static str {
    match child {
        RuleChild::Background(_) => "background",
        RuleChild::Scenario(_) => "scenario",
    }
}

fn pickle_argument_kind(argument: &PickleStepArgument) -> &'static str {
    match argument {
        PickleStepArgument::DocString(_) => "docString",
        PickleStepArgument::DataTable(_) => "dataTable",
    }
}
