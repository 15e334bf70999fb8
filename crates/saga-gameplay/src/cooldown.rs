//! Elapsed-time gate.

use serde::{Deserialize, Serialize};

/// Cooldown between touch hits on one target, in milliseconds.
pub const HIT_COOLDOWN_MS: u64 = 500;

/// Answers "has at least `duration_ms` passed since the last trigger".
///
/// A gate that never fired is ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CooldownGate {
    duration_ms: u64,
    last_fired_at_ms: Option<u64>,
}

impl CooldownGate {
    /// Creates a ready gate.
    #[must_use]
    pub const fn new(duration_ms: u64) -> Self {
        Self {
            duration_ms,
            last_fired_at_ms: None,
        }
    }

    /// Configured duration.
    #[must_use]
    pub const fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// Time of the last trigger.
    #[must_use]
    pub const fn last_fired_at_ms(&self) -> Option<u64> {
        self.last_fired_at_ms
    }

    /// True when the duration elapsed since the last trigger (inclusive).
    #[must_use]
    pub fn is_ready(&self, now_ms: u64) -> bool {
        match self.last_fired_at_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.duration_ms,
        }
    }

    /// Milliseconds since the last trigger, `None` if it never fired.
    #[must_use]
    pub fn elapsed_ms(&self, now_ms: u64) -> Option<u64> {
        self.last_fired_at_ms.map(|last| now_ms.saturating_sub(last))
    }

    /// Records a trigger at `now_ms`.
    pub fn trigger(&mut self, now_ms: u64) {
        self.last_fired_at_ms = Some(now_ms);
    }

    /// Triggers if ready and reports whether it did.
    pub fn try_trigger(&mut self, now_ms: u64) -> bool {
        if self.is_ready(now_ms) {
            self.trigger(now_ms);
            true
        } else {
            false
        }
    }

    /// Forgets the last trigger.
    pub fn reset(&mut self) {
        self.last_fired_at_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_never_fired_is_ready() {
        let gate = CooldownGate::new(HIT_COOLDOWN_MS);
        assert!(gate.is_ready(0));
        assert_eq!(gate.elapsed_ms(10), None);
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let mut gate = CooldownGate::new(500);
        gate.trigger(1_000);
        assert!(!gate.is_ready(1_499));
        assert!(gate.is_ready(1_500));
    }

    #[test]
    fn test_try_trigger_and_reset() {
        let mut gate = CooldownGate::new(200);
        assert!(gate.try_trigger(0));
        assert!(!gate.try_trigger(100));
        gate.reset();
        assert!(gate.try_trigger(100));
        assert_eq!(gate.last_fired_at_ms(), Some(100));
    }

    proptest! {
        #[test]
        fn at_most_one_trigger_per_window(offsets in prop::collection::vec(0u64..2_000, 1..40)) {
            let mut gate = CooldownGate::new(500);
            let mut times: Vec<u64> = offsets;
            times.sort_unstable();
            let mut fired: Vec<u64> = Vec::new();
            for now in times {
                if gate.try_trigger(now) {
                    fired.push(now);
                }
            }
            for pair in fired.windows(2) {
                prop_assert!(pair[1] - pair[0] >= 500);
            }
        }
    }
}
