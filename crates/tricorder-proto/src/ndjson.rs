// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! NDJSON line codec: one UTF-8 JSON envelope per `\n`-terminated line.

use crate::envelope::Envelope;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use thiserror::Error;

/// Codec and stream I/O failures.
#[derive(Debug, Error)]
pub enum WireError {
    /// An envelope could not be serialized.
    #[error("[WIRE_ENCODE] envelope does not serialize: {source}")]
    Encode {
        /// Underlying serializer failure.
        #[source]
        source: serde_json::Error,
    },
    /// A line of the stream could not be decoded as an envelope.
    #[error("[WIRE_DECODE] line {line} is not a valid envelope: {source}")]
    Decode {
        /// 1-based line number within the stream.
        line: usize,
        /// Underlying deserializer failure.
        #[source]
        source: serde_json::Error,
    },
    /// The underlying stream failed.
    #[error("[WIRE_IO] stream access failed: {source}")]
    Io {
        /// Underlying I/O failure.
        #[from]
        source: std::io::Error,
    },
}

/// Encodes one envelope as a newline-terminated NDJSON line.
///
/// The serializer escapes control characters inside strings, so the
/// returned line never contains a newline before its terminator.
pub fn encode_line(envelope: &Envelope) -> Result<String, WireError> {
    let mut line =
        serde_json::to_string(envelope).map_err(|source| WireError::Encode { source })?;
    line.push('\n');
    Ok(line)
}

/// Encodes one envelope and writes it to `out` as a single line.
pub fn write_envelope<W: Write>(out: &mut W, envelope: &Envelope) -> Result<(), WireError> {
    let line = encode_line(envelope)?;
    out.write_all(line.as_bytes())?;
    Ok(())
}

/// Reads a whole NDJSON stream into envelopes. Blank lines are skipped;
/// any other undecodable line fails with its line number.
pub fn read_envelopes<R: BufRead>(input: R) -> Result<Vec<Envelope>, WireError> {
    let mut envelopes = Vec::new();
    for (index, line) in input.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let envelope = serde_json::from_str(&line).map_err(|source| WireError::Decode {
            line: index + 1,
            source,
        })?;
        envelopes.push(envelope);
    }
    Ok(envelopes)
}

/// Reads an NDJSON file from disk into envelopes.
pub fn read_envelopes_from_path(path: &Path) -> Result<Vec<Envelope>, WireError> {
    let file = File::open(path)?;
    read_envelopes(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]
    #![allow(clippy::panic)]
    use super::*;
    use crate::execution::{TestRunFinished, TestRunStarted};
    use crate::timestamp::Timestamp;

    fn started(seconds: i64) -> Envelope {
        Envelope::TestRunStarted(TestRunStarted {
            timestamp: Timestamp::new(seconds, 0),
        })
    }

    #[test]
    fn encode_line_terminates_with_newline() {
        let line = encode_line(&started(5)).expect("encode");
        assert!(line.ends_with('\n'));
        assert_eq!(line.matches('\n').count(), 1);
    }

    #[test]
    fn embedded_newlines_stay_escaped() {
        let envelope = Envelope::TestRunFinished(TestRunFinished {
            message: Some("first\nsecond".into()),
            success: false,
            timestamp: Timestamp::new(9, 0),
        });
        let line = encode_line(&envelope).expect("encode");
        assert_eq!(line.matches('\n').count(), 1);
        assert!(line.contains(r"first\nsecond"));
    }

    #[test]
    fn read_skips_blank_lines() {
        let stream = "\n{\"testRunStarted\":{\"timestamp\":{\"seconds\":5,\"nanos\":0}}}\n\n";
        let envelopes = read_envelopes(stream.as_bytes()).expect("decode");
        assert_eq!(envelopes, vec![started(5)]);
    }

    #[test]
    fn undecodable_line_reports_its_number() {
        let stream = "{\"testRunStarted\":{\"timestamp\":{\"seconds\":5,\"nanos\":0}}}\nnot-json\n";
        let err = read_envelopes(stream.as_bytes()).expect_err("must fail");
        match err {
            WireError::Decode { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn round_trip_preserves_order() {
        let mut buf = Vec::new();
        for seconds in [1, 2, 3] {
            write_envelope(&mut buf, &started(seconds)).expect("write");
        }
        let back = read_envelopes(buf.as_slice()).expect("decode");
        assert_eq!(back, vec![started(1), started(2), started(3)]);
    }
}
