//! Cancellable scheduled tasks on the session clock
//!
//! Each purpose owns at most one pending deadline. Arming a key that is
//! already pending moves its deadline instead of stacking a second task.

use std::collections::BTreeMap;

/// What a scheduled task does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimerKey {
    /// Combo drops to 0
    ComboExpiry,
    /// Timed power-up effect lapses; multiplier drops to 1
    PowerUpExpiry,
    /// Boost ends and cooldown starts
    BoostActive,
    /// One second of boost cooldown elapses
    BoostCooldown,
    /// Synthesized auto-tap
    AutoTap,
    /// Periodic push to the game-state service
    AutoSave,
}

/// Pending deadlines (session clock, ms) keyed by purpose
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timers {
    deadlines: BTreeMap<TimerKey, u64>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `key` at `at_ms`, replacing any pending deadline for it
    pub fn arm(&mut self, key: TimerKey, at_ms: u64) {
        self.deadlines.insert(key, at_ms);
    }

    /// Returns true if something was pending
    pub fn cancel(&mut self, key: TimerKey) -> bool {
        self.deadlines.remove(&key).is_some()
    }

    pub fn cancel_all(&mut self) {
        self.deadlines.clear();
    }

    pub fn deadline(&self, key: TimerKey) -> Option<u64> {
        self.deadlines.get(&key).copied()
    }

    pub fn is_armed(&self, key: TimerKey) -> bool {
        self.deadlines.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }

    /// Earliest pending task due at or before `until_ms`. Ties resolve in
    /// `TimerKey` order.
    pub fn next_due(&self, until_ms: u64) -> Option<(TimerKey, u64)> {
        self.deadlines
            .iter()
            .filter(|(_, at)| **at <= until_ms)
            .min_by_key(|(key, at)| (**at, **key))
            .map(|(key, at)| (*key, *at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rearm_replaces_deadline() {
        let mut timers = Timers::new();
        timers.arm(TimerKey::ComboExpiry, 1500);
        timers.arm(TimerKey::ComboExpiry, 3000);
        assert_eq!(timers.len(), 1);
        assert_eq!(timers.deadline(TimerKey::ComboExpiry), Some(3000));
        assert_eq!(timers.next_due(2000), None);
    }

    #[test]
    fn test_next_due_in_deadline_order() {
        let mut timers = Timers::new();
        timers.arm(TimerKey::AutoSave, 100);
        timers.arm(TimerKey::ComboExpiry, 100);
        timers.arm(TimerKey::BoostActive, 50);

        let mut fired = Vec::new();
        while let Some((key, at)) = timers.next_due(200) {
            timers.cancel(key);
            fired.push((key, at));
        }
        // Same deadline: key order decides
        assert_eq!(
            fired,
            vec![
                (TimerKey::BoostActive, 50),
                (TimerKey::ComboExpiry, 100),
                (TimerKey::AutoSave, 100),
            ]
        );
    }

    #[test]
    fn test_cancel_all() {
        let mut timers = Timers::new();
        timers.arm(TimerKey::BoostCooldown, 10);
        timers.arm(TimerKey::PowerUpExpiry, 10);
        assert!(timers.cancel(TimerKey::BoostCooldown));
        assert!(!timers.cancel(TimerKey::BoostCooldown));
        timers.cancel_all();
        assert!(timers.is_empty());
    }
}
