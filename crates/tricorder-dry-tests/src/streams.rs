// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Complete, internally consistent trace streams.
//!
//! Both fixtures record the same calculator scenario (one before hook,
//! two pickle steps, one log attachment, everything passing). The
//! [`passing_run`] is the reference recording; the [`reimplemented_run`]
//! is how an independent producer would capture the identical run, with
//! all the divergence a compatibility check must tolerate.

use tricorder_proto::{
    Attachment, Ci, ContentEncoding, Duration, Envelope, Feature, FeatureChild, GherkinDocument,
    Git, Group, Hook, HookType, Location, Meta, Pickle, PickleStep, PickleStepType, PickleTag,
    Product, Scenario, Source, SourceReference, Step, StepDefinition, StepDefinitionPattern,
    StepDefinitionPatternType, StepKeywordType, StepMatchArgument, StepMatchArgumentsList, Tag,
    TestCase, TestCaseFinished, TestCaseStarted, TestRunFinished, TestRunStarted, TestStep,
    TestStepFinished, TestStepResult, TestStepResultStatus, TestStepStarted, Timestamp,
    PROTOCOL_VERSION,
};

const FEATURE_URI: &str = "features/addition.feature";
const GHERKIN_MEDIA_TYPE: &str = "text/x.cucumber.gherkin+plain";

/// Producer-specific rendering knobs for the shared scenario.
struct Producer {
    id_prefix: &'static str,
    newline: &'static str,
    language: &'static str,
    base_seconds: i64,
    step_duration: Duration,
    group_starts: bool,
    worker_id: &'static str,
    definition_uri: &'static str,
    hook_uri: &'static str,
    declares_screenshot_hook: bool,
    meta: Meta,
}

impl Producer {
    fn id(&self, suffix: &str) -> String {
        format!("{}{suffix}", self.id_prefix)
    }

    fn at(&self, offset: i64) -> Timestamp {
        Timestamp::new(self.base_seconds + offset, 0)
    }
}

/// The reference recording of the calculator scenario.
///
/// Starts with `meta`, ends with `testRunFinished`, and every id
/// referenced by an execution message is declared earlier in the stream.
#[must_use]
pub fn passing_run() -> Vec<Envelope> {
    trace(&Producer {
        id_prefix: "",
        newline: "\n",
        language: "en",
        base_seconds: 100,
        step_duration: Duration::new(0, 5_000_000),
        group_starts: true,
        worker_id: "0",
        definition_uri: "src/steps/calculator.rs",
        hook_uri: "src/hooks.rs",
        declares_screenshot_hook: false,
        meta: Meta {
            protocol_version: PROTOCOL_VERSION.to_string(),
            implementation: Product::versioned("tricorder", "0.1.0"),
            runtime: Product::unversioned("rust"),
            os: Product::unversioned("linux"),
            cpu: Product::unversioned("x86_64"),
            ci: None,
        },
    })
}

/// The same run as an independent producer records it: fresh ids, CRLF
/// line endings, a regional language tag, shifted clocks and durations,
/// absent capture-group offsets, and one extra framework hook
/// declaration. A compatibility check against [`passing_run`] must
/// accept every one of these differences.
#[must_use]
pub fn reimplemented_run() -> Vec<Envelope> {
    trace(&Producer {
        id_prefix: "r-",
        newline: "\r\n",
        language: "en-US",
        base_seconds: 7_000,
        step_duration: Duration::new(0, 9_000_000),
        group_starts: false,
        worker_id: "worker-1",
        definition_uri: "features/step_definitions/calculator.ts",
        hook_uri: "features/support/hooks.ts",
        declares_screenshot_hook: true,
        meta: Meta {
            protocol_version: PROTOCOL_VERSION.to_string(),
            implementation: Product::versioned("recucumber", "2.3.1"),
            runtime: Product::unversioned("node"),
            os: Product::unversioned("darwin"),
            cpu: Product::unversioned("arm64"),
            ci: Some(Ci {
                name: "GitHub Actions".to_string(),
                url: Some("https://github.com/example/calc/actions/runs/311".to_string()),
                build_number: Some("311".to_string()),
                git: Some(Git {
                    remote: "https://github.com/example/calc.git".to_string(),
                    revision: "7d1f2a9c".to_string(),
                    branch: Some("main".to_string()),
                    tag: None,
                }),
            }),
        },
    })
}

fn trace(p: &Producer) -> Vec<Envelope> {
    let nl = p.newline;
    let mut stream = vec![
        Envelope::Meta(p.meta.clone()),
        Envelope::Source(Source {
            uri: FEATURE_URI.to_string(),
            data: format!(
                "Feature: Addition{nl}  Sums for{nl}  hungry QA.{nl}{nl}  \
                 @addition{nl}  Scenario: Add two numbers{nl}    \
                 Given I have 4 cukes{nl}    When I eat 2 cukes{nl}"
            ),
            media_type: GHERKIN_MEDIA_TYPE.to_string(),
        }),
        Envelope::GherkinDocument(document(p)),
        Envelope::Pickle(pickle(p)),
        Envelope::StepDefinition(definition(p, "sd1", "I have {int} cukes", 12)),
        Envelope::StepDefinition(definition(p, "sd2", "I eat {int} cukes", 20)),
        Envelope::Hook(Hook {
            id: p.id("h"),
            name: Some("reset calculator".to_string()),
            source_reference: SourceReference {
                uri: Some(p.hook_uri.to_string()),
                location: Some(Location::at_line(5)),
            },
            tag_expression: None,
            hook_type: Some(HookType::BeforeTestCase),
        }),
    ];
    if p.declares_screenshot_hook {
        stream.push(Envelope::Hook(Hook {
            id: p.id("h2"),
            name: Some("capture screenshot".to_string()),
            source_reference: SourceReference {
                uri: Some(p.hook_uri.to_string()),
                location: Some(Location::at_line(19)),
            },
            tag_expression: Some("@ui".to_string()),
            hook_type: Some(HookType::AfterTestCase),
        }));
    }
    stream.push(Envelope::TestRunStarted(TestRunStarted {
        timestamp: p.at(0),
    }));
    stream.push(Envelope::TestCase(test_case(p)));
    stream.push(Envelope::TestCaseStarted(TestCaseStarted {
        attempt: 0,
        id: p.id("tcs"),
        test_case_id: p.id("tc"),
        worker_id: Some(p.worker_id.to_string()),
        timestamp: p.at(1),
    }));
    let mut offset = 2;
    for step_suffix in ["t0", "t1", "t2"] {
        stream.push(Envelope::TestStepStarted(TestStepStarted {
            test_case_started_id: p.id("tcs"),
            test_step_id: p.id(step_suffix),
            timestamp: p.at(offset),
        }));
        if step_suffix == "t1" {
            stream.push(Envelope::Attachment(Attachment {
                body: "calculator ready".to_string(),
                content_encoding: ContentEncoding::Identity,
                file_name: None,
                media_type: "text/x-log".to_string(),
                test_case_started_id: Some(p.id("tcs")),
                test_step_id: Some(p.id(step_suffix)),
            }));
        }
        stream.push(Envelope::TestStepFinished(TestStepFinished {
            test_case_started_id: p.id("tcs"),
            test_step_id: p.id(step_suffix),
            test_step_result: TestStepResult {
                duration: p.step_duration,
                message: None,
                status: TestStepResultStatus::Passed,
            },
            timestamp: p.at(offset + 1),
        }));
        offset += 2;
    }
    stream.push(Envelope::TestCaseFinished(TestCaseFinished {
        test_case_started_id: p.id("tcs"),
        timestamp: p.at(9),
        will_be_retried: false,
    }));
    stream.push(Envelope::TestRunFinished(TestRunFinished {
        message: None,
        success: true,
        timestamp: p.at(10),
    }));
    stream
}

fn document(p: &Producer) -> GherkinDocument {
    let nl = p.newline;
    GherkinDocument {
        uri: Some(FEATURE_URI.to_string()),
        feature: Some(Feature {
            location: Location {
                line: 1,
                column: Some(1),
            },
            tags: Vec::new(),
            language: p.language.to_string(),
            keyword: "Feature".to_string(),
            name: "Addition".to_string(),
            description: format!("Sums for{nl}hungry QA."),
            children: vec![FeatureChild::Scenario(Scenario {
                location: Location {
                    line: 6,
                    column: Some(3),
                },
                tags: vec![Tag {
                    location: Location {
                        line: 5,
                        column: Some(3),
                    },
                    name: "@addition".to_string(),
                    id: p.id("tg"),
                }],
                keyword: "Scenario".to_string(),
                name: "Add two numbers".to_string(),
                description: String::new(),
                steps: vec![
                    Step {
                        location: Location {
                            line: 7,
                            column: Some(5),
                        },
                        keyword: "Given ".to_string(),
                        keyword_type: Some(StepKeywordType::Context),
                        text: "I have 4 cukes".to_string(),
                        doc_string: None,
                        data_table: None,
                        id: p.id("s1"),
                    },
                    Step {
                        location: Location {
                            line: 8,
                            column: Some(5),
                        },
                        keyword: "When ".to_string(),
                        keyword_type: Some(StepKeywordType::Action),
                        text: "I eat 2 cukes".to_string(),
                        doc_string: None,
                        data_table: None,
                        id: p.id("s2"),
                    },
                ],
                examples: Vec::new(),
                id: p.id("sc"),
            })],
        }),
        comments: Vec::new(),
    }
}

fn pickle(p: &Producer) -> Pickle {
    Pickle {
        id: p.id("p"),
        uri: FEATURE_URI.to_string(),
        name: "Add two numbers".to_string(),
        language: p.language.to_string(),
        steps: vec![
            PickleStep {
                argument: None,
                ast_node_ids: vec![p.id("s1")],
                id: p.id("ps1"),
                step_type: Some(PickleStepType::Context),
                text: "I have 4 cukes".to_string(),
            },
            PickleStep {
                argument: None,
                ast_node_ids: vec![p.id("s2")],
                id: p.id("ps2"),
                step_type: Some(PickleStepType::Action),
                text: "I eat 2 cukes".to_string(),
            },
        ],
        tags: vec![PickleTag {
            name: "@addition".to_string(),
            ast_node_id: p.id("tg"),
        }],
        ast_node_ids: vec![p.id("sc")],
    }
}

fn definition(p: &Producer, suffix: &str, pattern: &str, line: u32) -> StepDefinition {
    StepDefinition {
        id: p.id(suffix),
        pattern: StepDefinitionPattern {
            source: pattern.to_string(),
            pattern_type: StepDefinitionPatternType::CucumberExpression,
        },
        source_reference: SourceReference {
            uri: Some(p.definition_uri.to_string()),
            location: Some(Location::at_line(line)),
        },
    }
}

fn test_case(p: &Producer) -> TestCase {
    TestCase {
        id: p.id("tc"),
        pickle_id: p.id("p"),
        test_steps: vec![
            TestStep {
                hook_id: Some(p.id("h")),
                id: p.id("t0"),
                pickle_step_id: None,
                step_definition_ids: None,
                step_match_arguments_lists: None,
            },
            pickle_test_step(p, "t1", "ps1", "sd1", "4", 7),
            pickle_test_step(p, "t2", "ps2", "sd2", "2", 6),
        ],
    }
}

fn pickle_test_step(
    p: &Producer,
    suffix: &str,
    pickle_step: &str,
    definition: &str,
    captured: &str,
    start: u32,
) -> TestStep {
    TestStep {
        hook_id: None,
        id: p.id(suffix),
        pickle_step_id: Some(p.id(pickle_step)),
        step_definition_ids: Some(vec![p.id(definition)]),
        step_match_arguments_lists: Some(vec![StepMatchArgumentsList {
            step_match_arguments: vec![StepMatchArgument {
                group: Group {
                    children: Vec::new(),
                    start: p.group_starts.then_some(start),
                    value: Some(captured.to_string()),
                },
                parameter_type_name: Some("int".to_string()),
            }],
        }]),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]
    use super::*;

    fn declared_ids(stream: &[Envelope]) -> std::collections::HashSet<String> {
        let mut ids = std::collections::HashSet::new();
        for envelope in stream {
            match envelope {
                Envelope::Hook(hook) => {
                    ids.insert(hook.id.clone());
                }
                Envelope::StepDefinition(definition) => {
                    ids.insert(definition.id.clone());
                }
                Envelope::Pickle(pickle) => {
                    ids.insert(pickle.id.clone());
                    for step in &pickle.steps {
                        ids.insert(step.id.clone());
                    }
                }
                _ => {}
            }
        }
        ids
    }

    #[test]
    fn fixtures_frame_the_stream_correctly() {
        for stream in [passing_run(), reimplemented_run()] {
            assert_eq!(stream.first().map(Envelope::content_name), Some("meta"));
            assert_eq!(
                stream.last().map(Envelope::content_name),
                Some("testRunFinished")
            );
        }
    }

    #[test]
    fn every_execution_reference_is_declared_first() {
        for stream in [passing_run(), reimplemented_run()] {
            let ids = declared_ids(&stream);
            for envelope in &stream {
                let Envelope::TestCase(test_case) = envelope else {
                    continue;
                };
                for step in &test_case.test_steps {
                    if let Some(hook_id) = &step.hook_id {
                        assert!(ids.contains(hook_id), "undeclared hook {hook_id}");
                    }
                    if let Some(pickle_step_id) = &step.pickle_step_id {
                        assert!(ids.contains(pickle_step_id), "undeclared {pickle_step_id}");
                    }
                    for definition_id in step.step_definition_ids.iter().flatten() {
                        assert!(ids.contains(definition_id), "undeclared {definition_id}");
                    }
                }
            }
        }
    }

    #[test]
    fn reimplementation_shares_no_ids_with_the_reference() {
        let reference = declared_ids(&passing_run());
        let reimplemented = declared_ids(&reimplemented_run());
        assert!(reference.is_disjoint(&reimplemented));
    }

    #[test]
    fn fixtures_survive_the_wire() {
        let line = serde_json::to_string(&passing_run()[0]).expect("encode");
        let decoded: Envelope = serde_json::from_str(&line).expect("decode");
        assert_eq!(decoded.content_name(), "meta");
    }
}
