// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! End-to-end checks of the compatibility validator against the dry-run
//! fixture streams. The reimplemented run must pass against the reference
//! run under the default rules, and every class of divergence the validator
//! knows about must surface when injected into an otherwise clean stream.

#![allow(clippy::expect_used)]

use tricorder_compat::{validate, validate_files, EquivalenceRules, MismatchCode};
use tricorder_dry_tests::{passing_run, reimplemented_run};
use tricorder_proto::{
    encode_line, read_envelopes, Attachment, Envelope, Feature, Pickle, StepDefinition, TestCase,
};

// ─── Fixture surgery ─────────────────────────────────────────────────────────

fn attachment_mut(stream: &mut [Envelope]) -> &mut Attachment {
    stream
        .iter_mut()
        .find_map(|envelope| match envelope {
            Envelope::Attachment(attachment) => Some(attachment),
            _ => None,
        })
        .expect("fixture carries an attachment")
}

fn definition_mut(stream: &mut [Envelope]) -> &mut StepDefinition {
    stream
        .iter_mut()
        .find_map(|envelope| match envelope {
            Envelope::StepDefinition(definition) => Some(definition),
            _ => None,
        })
        .expect("fixture carries a step definition")
}

fn pickle_mut(stream: &mut [Envelope]) -> &mut Pickle {
    stream
        .iter_mut()
        .find_map(|envelope| match envelope {
            Envelope::Pickle(pickle) => Some(pickle),
            _ => None,
        })
        .expect("fixture carries a pickle")
}

fn test_case_mut(stream: &mut [Envelope]) -> &mut TestCase {
    stream
        .iter_mut()
        .find_map(|envelope| match envelope {
            Envelope::TestCase(test_case) => Some(test_case),
            _ => None,
        })
        .expect("fixture carries a test case")
}

fn feature_mut(stream: &mut [Envelope]) -> &mut Feature {
    stream
        .iter_mut()
        .find_map(|envelope| match envelope {
            Envelope::GherkinDocument(document) => document.feature.as_mut(),
            _ => None,
        })
        .expect("fixture carries a feature")
}

fn remove_first(stream: &mut Vec<Envelope>, wanted: fn(&Envelope) -> bool) {
    let index = stream
        .iter()
        .position(wanted)
        .expect("content type present in fixture");
    stream.remove(index);
}

fn wire_text(stream: &[Envelope]) -> String {
    stream
        .iter()
        .map(encode_line)
        .collect::<Result<String, _>>()
        .expect("fixture encodes")
}

// ─── Equivalence under the default rules ─────────────────────────────────────

#[test]
fn reimplementation_passes_against_the_reference() {
    let report = validate(&reimplemented_run(), &passing_run(), &EquivalenceRules::new());
    assert!(report.is_pass(), "{report}");
}

#[test]
fn tolerances_are_one_directional() {
    let report = validate(&passing_run(), &reimplemented_run(), &EquivalenceRules::new());
    assert!(!report.is_pass());
    assert!(report.contains(MismatchCode::StreamTooShort), "{report}");
    assert!(report.contains(MismatchCode::HookCountShortfall), "{report}");
    assert!(report.contains(MismatchCode::MissingCounterpart), "{report}");
    assert_eq!(report.mismatches.len(), 3, "{report}");
}

#[test]
fn identical_streams_pass_the_strict_rules() {
    let stream = passing_run();
    let report = validate(&stream, &stream, &EquivalenceRules::strict());
    assert!(report.is_pass(), "{report}");
}

#[test]
fn strict_rules_reject_the_reimplementation() {
    let report = validate(&reimplemented_run(), &passing_run(), &EquivalenceRules::strict());
    assert!(!report.is_pass());
    assert!(report.contains(MismatchCode::ValueMismatch), "{report}");
}

#[test]
fn equivalence_survives_the_wire() {
    let original = passing_run();
    let decoded = read_envelopes(wire_text(&original).as_bytes()).expect("fixture decodes");
    let report = validate(&decoded, &original, &EquivalenceRules::strict());
    assert!(report.is_pass(), "{report}");
}

// ─── Injected divergences ────────────────────────────────────────────────────

#[test]
fn missing_declaration_fails_structurally() {
    let mut actual = passing_run();
    remove_first(&mut actual, |envelope| {
        matches!(envelope, Envelope::StepDefinition(_))
    });
    let report = validate(&actual, &passing_run(), &EquivalenceRules::new());
    assert!(report.contains(MismatchCode::StreamTooShort), "{report}");
    assert!(report.contains(MismatchCode::ContentCountMismatch), "{report}");
    assert!(
        report.mismatches.iter().any(|mismatch| mismatch.path == "stepDefinition"),
        "{report}"
    );
}

#[test]
fn dropped_hook_is_reported_as_a_shortfall() {
    let mut actual = passing_run();
    remove_first(&mut actual, |envelope| matches!(envelope, Envelope::Hook(_)));
    let report = validate(&actual, &passing_run(), &EquivalenceRules::new());
    assert!(report.contains(MismatchCode::HookCountShortfall), "{report}");
    assert!(report.contains(MismatchCode::DanglingReference), "{report}");
}

#[test]
fn reordered_pickle_steps_are_value_mismatches() {
    let mut actual = passing_run();
    test_case_mut(&mut actual).test_steps.swap(1, 2);
    let report = validate(&actual, &passing_run(), &EquivalenceRules::new());
    assert!(!report.is_pass());
    assert!(report.contains(MismatchCode::ValueMismatch), "{report}");
    assert!(
        report.mismatches.iter().any(|mismatch| mismatch.path.contains("testSteps")),
        "{report}"
    );
}

#[test]
fn attachments_are_compared_byte_for_byte() {
    let mut actual = passing_run();
    let mut expected = passing_run();
    attachment_mut(&mut actual).body = String::from("calculator\r\nready");
    attachment_mut(&mut expected).body = String::from("calculator\nready");
    let report = validate(&actual, &expected, &EquivalenceRules::new());
    assert!(!report.is_pass());
    assert!(
        report.mismatches.iter().any(|mismatch| mismatch.path == "attachment[0].body"),
        "{report}"
    );
}

#[test]
fn changed_pattern_is_reported_with_its_path() {
    let mut actual = passing_run();
    definition_mut(&mut actual).pattern.source = String::from("I have {int} bananas");
    let report = validate(&actual, &passing_run(), &EquivalenceRules::new());
    assert!(report.contains(MismatchCode::ValueMismatch), "{report}");
    assert!(
        report
            .mismatches
            .iter()
            .any(|mismatch| mismatch.path == "stepDefinition[0].pattern.source"),
        "{report}"
    );
}

#[test]
fn languages_must_share_a_primary_subtag() {
    let mut actual = passing_run();
    feature_mut(&mut actual).language = String::from("fr");
    pickle_mut(&mut actual).language = String::from("fr");
    let report = validate(&actual, &passing_run(), &EquivalenceRules::new());
    assert!(!report.is_pass());
    assert!(
        report
            .mismatches
            .iter()
            .any(|mismatch| mismatch.path == "gherkinDocument[0].feature.language"),
        "{report}"
    );
    assert!(
        report.mismatches.iter().any(|mismatch| mismatch.path == "pickle[0].language"),
        "{report}"
    );
}

#[test]
fn duplicate_ids_are_collisions() {
    let mut actual = passing_run();
    let hook = actual
        .iter()
        .find(|envelope| matches!(envelope, Envelope::Hook(_)))
        .cloned()
        .expect("fixture carries a hook");
    actual.push(hook);
    let report = validate(&actual, &passing_run(), &EquivalenceRules::new());
    assert!(report.contains(MismatchCode::IdCollision), "{report}");
    assert_eq!(report.mismatches.len(), 1, "{report}");
    assert!(
        report.mismatches.iter().any(|mismatch| mismatch.path == "actual stream"),
        "{report}"
    );
}

#[test]
fn every_divergence_is_aggregated() {
    let mut actual = passing_run();
    definition_mut(&mut actual).pattern.source = String::from("I have {int} bananas");
    pickle_mut(&mut actual).name = String::from("Subtract two numbers");
    attachment_mut(&mut actual).body = String::from("calculator briefly ready");
    let report = validate(&actual, &passing_run(), &EquivalenceRules::new());
    assert_eq!(report.mismatches.len(), 3, "{report}");
    for path in [
        "stepDefinition[0].pattern.source",
        "pickle[0].name",
        "attachment[0].body",
    ] {
        assert!(
            report.mismatches.iter().any(|mismatch| mismatch.path == path),
            "missing {path} in {report}"
        );
    }
}

// ─── File-based validation ───────────────────────────────────────────────────

#[test]
fn trace_files_validate_end_to_end() {
    let dir = tempfile::tempdir().expect("temp dir");
    let actual_path = dir.path().join("actual.ndjson");
    let expected_path = dir.path().join("expected.ndjson");
    std::fs::write(&actual_path, wire_text(&reimplemented_run())).expect("write actual");
    std::fs::write(&expected_path, wire_text(&passing_run())).expect("write expected");

    let report = validate_files(&actual_path, &expected_path, &EquivalenceRules::new())
        .expect("both streams load");
    assert!(report.is_pass(), "{report}");
}

#[test]
fn unreadable_file_is_a_read_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let expected_path = dir.path().join("expected.ndjson");
    std::fs::write(&expected_path, wire_text(&passing_run())).expect("write expected");

    let missing = dir.path().join("absent.ndjson");
    let error = validate_files(&missing, &expected_path, &EquivalenceRules::new())
        .expect_err("missing file must not validate");
    let rendered = error.to_string();
    assert!(rendered.contains("[COMPAT_READ]"), "{rendered}");
    assert!(rendered.contains("absent.ndjson"), "{rendered}");
}
