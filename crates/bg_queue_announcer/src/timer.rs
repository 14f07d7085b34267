//! Per-bracket countdowns for timed announcements
//!
//! A negative value means the countdown is not running. Expired countdowns
//! read the same as ones that were never started.

use dashmap::DashMap;
use tracing::trace;

use crate::types::BracketId;

/// Value returned for brackets without a running countdown.
pub const TIMER_INACTIVE: i32 = -1;

#[derive(Debug, Default)]
pub struct AnnouncementTimers {
    timers: DashMap<BracketId, i32>,
}

impl AnnouncementTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remaining milliseconds for `bracket`, or [`TIMER_INACTIVE`] if absent.
    pub fn get(&self, bracket: BracketId) -> i32 {
        self.timers
            .get(&bracket)
            .map(|entry| *entry.value())
            .unwrap_or(TIMER_INACTIVE)
    }

    pub fn set(&self, bracket: BracketId, value: i32) {
        self.timers.insert(bracket, value);
    }

    pub fn clear(&self) {
        self.timers.clear();
    }

    pub fn is_running(&self, bracket: BracketId) -> bool {
        self.get(bracket) >= 0
    }

    /// Advance a running countdown by `elapsed_ms`.
    ///
    /// Inactive or missing entries are left untouched. Returns true when this
    /// call moved the countdown from running to expired.
    pub fn tick(&self, bracket: BracketId, elapsed_ms: i32) -> bool {
        match self.timers.get_mut(&bracket) {
            Some(mut remaining) if *remaining >= 0 => {
                *remaining = remaining.saturating_sub(elapsed_ms);
                trace!(bracket = bracket.0, remaining = *remaining, "countdown advanced");
                *remaining < 0
            }
            _ => false,
        }
    }

    /// Advance every running countdown and return the brackets that expired.
    pub fn tick_all(&self, elapsed_ms: i32) -> Vec<BracketId> {
        let mut expired = Vec::new();
        for mut entry in self.timers.iter_mut() {
            if *entry.value() < 0 {
                continue;
            }
            let remaining = entry.value().saturating_sub(elapsed_ms);
            *entry.value_mut() = remaining;
            if remaining < 0 {
                expired.push(*entry.key());
            }
        }
        expired.sort();
        expired
    }
}
