// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Protocol time types: epoch-relative timestamps and elapsed durations.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Nanoseconds per second, used when normalizing remainders.
const NANOS_PER_SEC: u32 = 1_000_000_000;

/// A point in time, relative to the Unix epoch.
///
/// `nanos` always counts forward from the start of `seconds`, so times
/// before the epoch carry a negative `seconds` and a non-negative `nanos`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Timestamp {
    /// Whole seconds since 1970-01-01T00:00:00Z. Negative before the epoch.
    pub seconds: i64,
    /// Non-negative nanosecond remainder within the second (`0..1_000_000_000`).
    pub nanos: u32,
}

impl Timestamp {
    /// Builds a timestamp from raw parts.
    #[must_use]
    pub fn new(seconds: i64, nanos: u32) -> Self {
        Self { seconds, nanos }
    }

    /// Converts a wall-clock reading into a protocol timestamp.
    ///
    /// Readings before the epoch normalize to negative seconds with the
    /// nanosecond remainder counting forward.
    #[must_use]
    pub fn from_system_time(at: SystemTime) -> Self {
        match at.duration_since(UNIX_EPOCH) {
            Ok(since) => Self {
                seconds: i64::try_from(since.as_secs()).unwrap_or(i64::MAX),
                nanos: since.subsec_nanos(),
            },
            Err(before) => {
                let back = before.duration();
                let mut seconds = -i64::try_from(back.as_secs()).unwrap_or(i64::MAX);
                let mut nanos = back.subsec_nanos();
                if nanos > 0 {
                    seconds -= 1;
                    nanos = NANOS_PER_SEC - nanos;
                }
                Self { seconds, nanos }
            }
        }
    }
}

impl From<SystemTime> for Timestamp {
    fn from(at: SystemTime) -> Self {
        Self::from_system_time(at)
    }
}

/// A non-negative span of elapsed time.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Duration {
    /// Whole seconds of the span.
    pub seconds: u64,
    /// Nanosecond remainder within the second (`0..1_000_000_000`).
    pub nanos: u32,
}

impl Duration {
    /// Builds a duration from raw parts.
    #[must_use]
    pub fn new(seconds: u64, nanos: u32) -> Self {
        Self { seconds, nanos }
    }
}

impl From<std::time::Duration> for Duration {
    fn from(span: std::time::Duration) -> Self {
        Self {
            seconds: span.as_secs(),
            nanos: span.subsec_nanos(),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]
    use super::*;
    use std::time::Duration as StdDuration;

    #[test]
    fn epoch_reading_is_zero() {
        let ts = Timestamp::from_system_time(UNIX_EPOCH);
        assert_eq!(ts, Timestamp::new(0, 0));
    }

    #[test]
    fn post_epoch_reading_splits_seconds_and_nanos() {
        let at = UNIX_EPOCH + StdDuration::new(1_700_000_000, 250_000_000);
        let ts = Timestamp::from_system_time(at);
        assert_eq!(ts.seconds, 1_700_000_000);
        assert_eq!(ts.nanos, 250_000_000);
    }

    #[test]
    fn pre_epoch_reading_counts_nanos_forward() {
        let at = UNIX_EPOCH - StdDuration::new(1, 250_000_000);
        let ts = Timestamp::from_system_time(at);
        assert_eq!(ts.seconds, -2);
        assert_eq!(ts.nanos, 750_000_000);
    }

    #[test]
    fn std_duration_converts_losslessly() {
        let span = Duration::from(StdDuration::new(3, 5));
        assert_eq!(span, Duration::new(3, 5));
    }

    #[test]
    fn timestamp_serializes_as_flat_object() {
        let json = serde_json::to_string(&Timestamp::new(12, 34)).expect("serialize");
        assert_eq!(json, r#"{"seconds":12,"nanos":34}"#);
    }
}
