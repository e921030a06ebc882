// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Broker fanning published envelopes out to registered sinks.

use crate::sink::EnvelopeSink;
use std::sync::Arc;
use tricorder_proto::Envelope;

/// Registry of active sinks.
///
/// Registration happens during recorder startup, before the broker is
/// shared; publishing is `&self` and safe from any thread. With no sinks
/// registered the broker is inert and producers can skip message
/// construction entirely.
#[derive(Default)]
pub struct MessageBroker {
    sinks: Vec<Arc<dyn EnvelopeSink>>,
}

impl std::fmt::Debug for MessageBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageBroker")
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

impl MessageBroker {
    /// Creates a broker with no sinks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sink. Setup-time only, hence `&mut`.
    pub fn register(&mut self, sink: Arc<dyn EnvelopeSink>) {
        self.sinks.push(sink);
    }

    /// True when at least one sink is registered.
    #[must_use]
    pub fn has_sinks(&self) -> bool {
        !self.sinks.is_empty()
    }

    /// Delivers one envelope to every registered sink.
    pub fn publish(&self, envelope: Envelope) {
        if let Some((last, rest)) = self.sinks.split_last() {
            for sink in rest {
                sink.publish(envelope.clone());
            }
            last.publish(envelope);
        }
    }
}

/// A broker is itself a sink, so fan-out composes wherever a single
/// sink is expected.
impl EnvelopeSink for MessageBroker {
    fn publish(&self, envelope: Envelope) {
        MessageBroker::publish(self, envelope);
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]
    use super::*;
    use std::sync::Mutex;
    use tricorder_proto::{TestRunStarted, Timestamp};

    #[derive(Default)]
    struct Collecting {
        seen: Mutex<Vec<Envelope>>,
    }

    impl EnvelopeSink for Collecting {
        fn publish(&self, envelope: Envelope) {
            self.seen
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(envelope);
        }
    }

    fn run_started() -> Envelope {
        Envelope::TestRunStarted(TestRunStarted {
            timestamp: Timestamp::new(1, 0),
        })
    }

    #[test]
    fn empty_broker_reports_no_sinks() {
        let broker = MessageBroker::new();
        assert!(!broker.has_sinks());
        broker.publish(run_started());
    }

    #[test]
    fn publish_fans_out_to_every_sink() {
        let first = Arc::new(Collecting::default());
        let second = Arc::new(Collecting::default());
        let mut broker = MessageBroker::new();
        broker.register(Arc::clone(&first) as Arc<dyn EnvelopeSink>);
        broker.register(Arc::clone(&second) as Arc<dyn EnvelopeSink>);
        assert!(broker.has_sinks());

        broker.publish(run_started());

        assert_eq!(first.seen.lock().expect("lock").len(), 1);
        assert_eq!(second.seen.lock().expect("lock").len(), 1);
    }
}
