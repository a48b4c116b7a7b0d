//! Nanosecond timestamps for diagnostic lines.
//!
//! Wall-clock time can step backwards (NTP adjustments, manual changes), which
//! would make a progress log look like it travels in time. [`DiagnosticClock`]
//! reads the wall clock once and advances from there with a monotonic
//! [`Instant`], so stamps stay comparable with other epoch-based logs while
//! never decreasing within one run.

use std::time::Instant;

use chrono::Utc;

/// Epoch-anchored monotonic clock with nanosecond resolution.
#[derive(Debug, Clone, Copy)]
pub struct DiagnosticClock {
    anchor_nanos: u128,
    origin: Instant,
}

impl DiagnosticClock {
    /// Create a clock anchored at the current wall-clock time.
    #[must_use]
    pub fn new() -> Self {
        let anchor_nanos = Utc::now()
            .timestamp_nanos_opt()
            .and_then(|n| u128::try_from(n).ok())
            .unwrap_or_default();
        Self::anchored_at(anchor_nanos)
    }

    /// Create a clock whose first reading starts at `anchor_nanos`.
    #[must_use]
    pub fn anchored_at(anchor_nanos: u128) -> Self {
        Self {
            anchor_nanos,
            origin: Instant::now(),
        }
    }

    /// Nanoseconds since the Unix epoch.
    #[must_use]
    pub fn now_nanos(&self) -> u128 {
        self.anchor_nanos + self.origin.elapsed().as_nanos()
    }
}

impl Default for DiagnosticClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_never_decreases() {
        let clock = DiagnosticClock::new();
        let mut last = clock.now_nanos();
        for _ in 0..1000 {
            let now = clock.now_nanos();
            assert!(now >= last);
            last = now;
        }
    }

    #[test]
    fn test_clock_starts_at_anchor() {
        let clock = DiagnosticClock::anchored_at(1_000);
        assert!(clock.now_nanos() >= 1_000);
    }

    #[test]
    fn test_clock_is_epoch_based() {
        // 2020-01-01T00:00:00Z in nanoseconds
        let jan_2020: u128 = 1_577_836_800 * 1_000_000_000;
        assert!(DiagnosticClock::new().now_nanos() > jan_2020);
    }
}
