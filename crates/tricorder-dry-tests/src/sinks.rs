// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Envelope sink and writer doubles for pipeline tests.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tricorder_proto::Envelope;
use tricorder_record::EnvelopeSink;

/// Thread-safe in-memory sink that records every published envelope.
#[derive(Debug, Default)]
pub struct CollectingSink {
    seen: Mutex<Vec<Envelope>>,
}

impl CollectingSink {
    /// Copies out everything published so far, in arrival order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Envelope> {
        self.seen.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of envelopes published so far.
    #[must_use]
    pub fn count(&self) -> usize {
        self.seen.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl EnvelopeSink for CollectingSink {
    fn publish(&self, envelope: Envelope) {
        self.seen
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(envelope);
    }
}

/// Clonable in-memory writer; all clones share one buffer, so a test can
/// hand a clone to a writer thread and inspect the original.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    /// Copies out everything written so far.
    #[must_use]
    pub fn contents(&self) -> Vec<u8> {
        self.bytes.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Written bytes as (lossy) UTF-8 text.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.contents()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.bytes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Writer that rejects every write, counting the attempts. Clones share
/// the counter.
#[derive(Debug, Clone, Default)]
pub struct BrokenWriter {
    attempts: Arc<AtomicUsize>,
}

impl BrokenWriter {
    /// Number of writes attempted against this writer so far.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Write for BrokenWriter {
    fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe))
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]
    #![allow(clippy::panic)]
    use super::*;
    use tricorder_proto::{TestRunStarted, Timestamp};

    #[test]
    fn collecting_sink_preserves_arrival_order() {
        let sink = CollectingSink::default();
        for seconds in 1..=3 {
            sink.publish(Envelope::TestRunStarted(TestRunStarted {
                timestamp: Timestamp::new(seconds, 0),
            }));
        }
        let seen = sink.snapshot();
        assert_eq!(sink.count(), 3);
        let Envelope::TestRunStarted(first) = &seen[0] else {
            panic!("wrong content");
        };
        assert_eq!(first.timestamp.seconds, 1);
    }

    #[test]
    fn shared_buffer_clones_observe_the_same_bytes() {
        let buffer = SharedBuffer::default();
        let mut clone = buffer.clone();
        clone.write_all(b"line\n").expect("write");
        assert_eq!(buffer.text(), "line\n");
    }

    #[test]
    fn broken_writer_counts_and_rejects() {
        let writer = BrokenWriter::default();
        let mut clone = writer.clone();
        assert!(clone.write(b"x").is_err());
        assert!(clone.write(b"y").is_err());
        assert_eq!(writer.attempts(), 2);
    }
}
