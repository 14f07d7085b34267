//! Per-player spam protection table
//!
//! Tracks when each player last triggered an announcement. A timestamp is only
//! written when an announcement is actually allowed, so a denied attempt never
//! extends the waiting window.

use dashmap::{mapref::entry::Entry, DashMap};
use tracing::debug;

use crate::types::PlayerGuid;

#[derive(Debug, Default)]
pub struct SpamProtection {
    /// Player → last allowed announcement (seconds since epoch)
    last_announced: DashMap<PlayerGuid, u64>,
}

impl SpamProtection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last allowed announcement of `player`, or 0 if never recorded.
    pub fn last_announcement(&self, player: PlayerGuid) -> u64 {
        self.last_announced
            .get(&player)
            .map(|entry| *entry.value())
            .unwrap_or(0)
    }

    /// Whether at least `delay_secs` have passed since the player's last
    /// allowed announcement.
    ///
    /// A clock that moved backwards counts as no time elapsed.
    pub fn is_correct_delay(&self, player: PlayerGuid, now: u64, delay_secs: u32) -> bool {
        now.saturating_sub(self.last_announcement(player)) >= u64::from(delay_secs)
    }

    /// Record an allowed announcement at `now`.
    pub fn record(&self, player: PlayerGuid, now: u64) {
        self.last_announced.insert(player, now);
    }

    /// Check the delay, run `gate`, and record `now` only if both pass.
    ///
    /// The player's entry stays locked for the whole check so two concurrent
    /// attempts cannot both be allowed.
    pub fn try_commit<F>(&self, player: PlayerGuid, now: u64, delay_secs: u32, gate: F) -> bool
    where
        F: FnOnce() -> bool,
    {
        let delay = u64::from(delay_secs);
        match self.last_announced.entry(player) {
            Entry::Occupied(mut entry) => {
                if now.saturating_sub(*entry.get()) < delay || !gate() {
                    return false;
                }
                entry.insert(now);
                true
            }
            Entry::Vacant(entry) => {
                // Never recorded reads as timestamp 0.
                if now < delay || !gate() {
                    return false;
                }
                entry.insert(now);
                true
            }
        }
    }

    /// Drop entries at least `max_age_secs` old. Returns how many were removed.
    pub fn sweep(&self, now: u64, max_age_secs: u64) -> usize {
        let before = self.last_announced.len();
        self.last_announced
            .retain(|_, last| now.saturating_sub(*last) < max_age_secs);
        let removed = before.saturating_sub(self.last_announced.len());
        if removed > 0 {
            debug!("Spam protection sweep removed {} stale entries", removed);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.last_announced.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_announced.is_empty()
    }
}
