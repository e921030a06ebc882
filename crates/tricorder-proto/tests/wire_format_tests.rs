// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]
#![allow(clippy::expect_used, clippy::panic)]

use tricorder_dry_tests::streams::passing_run;
use tricorder_proto::{
    encode_line, read_envelopes, Envelope, TestRunStarted, TestStepResult, TestStepResultStatus,
    Timestamp,
};

#[test]
fn full_stream_round_trips_through_ndjson() {
    let stream = passing_run();
    let mut buf = String::new();
    for envelope in &stream {
        buf.push_str(&encode_line(envelope).expect("encode"));
    }
    let back = read_envelopes(buf.as_bytes()).expect("decode");
    assert_eq!(back, stream);
}

#[test]
fn every_line_is_a_single_key_object() {
    for envelope in passing_run() {
        let line = encode_line(&envelope).expect("encode");
        let value: serde_json::Value = serde_json::from_str(line.trim_end()).expect("json");
        let object = value.as_object().expect("object");
        assert_eq!(object.len(), 1, "multi-key envelope: {line}");
        assert!(object.contains_key(envelope.content_name()));
    }
}

#[test]
fn golden_test_run_started_line() {
    let envelope = Envelope::TestRunStarted(TestRunStarted {
        timestamp: Timestamp::new(1_700_000_000, 500),
    });
    let line = encode_line(&envelope).expect("encode");
    assert_eq!(
        line,
        "{\"testRunStarted\":{\"timestamp\":{\"seconds\":1700000000,\"nanos\":500}}}\n"
    );
}

#[test]
fn golden_step_result_decodes_from_foreign_producer() {
    // Line shape as other implementations of the protocol emit it.
    let line = r#"{"testStepFinished":{"testCaseStartedId":"31","testStepId":"27","testStepResult":{"duration":{"seconds":0,"nanos":125000},"status":"PASSED"},"timestamp":{"seconds":1700000001,"nanos":0}}}"#;
    let envelopes = read_envelopes(line.as_bytes()).expect("decode");
    assert_eq!(envelopes.len(), 1);
    let Envelope::TestStepFinished(finished) = &envelopes[0] else {
        panic!("wrong content type");
    };
    assert_eq!(
        finished.test_step_result,
        TestStepResult {
            duration: tricorder_proto::Duration::new(0, 125_000),
            message: None,
            status: TestStepResultStatus::Passed,
        }
    );
}

#[test]
fn stream_starts_with_meta_and_ends_with_run_finished() {
    let stream = passing_run();
    assert!(matches!(stream.first(), Some(Envelope::Meta(_))));
    assert!(matches!(stream.last(), Some(Envelope::TestRunFinished(_))));
}
