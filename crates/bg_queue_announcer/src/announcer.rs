//! Queue announcer state and event reactions
//!
//! [`BgQueueAnnouncer`] owns the settings snapshot, the spam protection table,
//! the timed-mode countdowns and the pending timed announcements. The script
//! objects in [`crate::plugin`] forward host events to it.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::messages::{self, QueueSnapshot};
use crate::settings::Settings;
use crate::spam::SpamProtection;
use crate::timer::AnnouncementTimers;
use crate::types::{
    Battleground, BattlegroundQueue, BattlegroundTypeId, BracketEntry, BracketId,
    BroadcastFilter, ConfigSource, HostContext, Player,
};

/// How often stale spam protection entries are swept, in milliseconds.
pub const SPAM_SWEEP_INTERVAL_MS: u32 = 60_000;

/// Entries older than this many spam delays are swept.
pub const SPAM_SWEEP_AGE_FACTOR: u64 = 4;

/// Answer to the host when it offers a queue update for announcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueueAnnounceDecision {
    /// The plugin is not involved; the host sends its own announcement
    HostDefault,
    /// The plugin handled (or deliberately skipped) the announcement
    Suppress,
}

impl QueueAnnounceDecision {
    pub fn allows_host_announcement(self) -> bool {
        matches!(self, QueueAnnounceDecision::HostDefault)
    }
}

#[derive(Debug, Default)]
pub struct BgQueueAnnouncer {
    settings: RwLock<Arc<Settings>>,
    spam: SpamProtection,
    timers: AnnouncementTimers,
    /// Latest queue state per bracket waiting for its countdown to expire
    pending: DashMap<BracketId, QueueSnapshot>,
    sweep_elapsed_ms: Mutex<u32>,
}

impl BgQueueAnnouncer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings: RwLock::new(Arc::new(settings)),
            ..Self::default()
        }
    }

    /// Reload settings from the host configuration.
    ///
    /// The new snapshot replaces the old one wholesale. Settings that stop
    /// timed world broadcasts drop any countdowns and pending announcements.
    pub fn load_config(&self, source: &dyn ConfigSource) {
        self.apply_settings(Settings::load(source));
    }

    pub fn apply_settings(&self, settings: Settings) {
        if !broadcasts_timed(&settings) {
            if !self.pending.is_empty() {
                info!(
                    "Timed announcements inactive, dropping {} pending",
                    self.pending.len()
                );
            }
            self.pending.clear();
            self.timers.clear();
        }
        *self.settings.write() = Arc::new(settings);
    }

    /// Current settings snapshot.
    pub fn settings(&self) -> Arc<Settings> {
        Arc::clone(&self.settings.read())
    }

    pub fn is_enabled(&self) -> bool {
        self.settings().enabled
    }

    pub fn is_player_only(&self) -> bool {
        self.settings().player_only
    }

    pub fn is_timed(&self) -> bool {
        self.settings().timed
    }

    pub fn timer(&self) -> u32 {
        self.settings().timer_ms
    }

    pub fn is_on_start_enabled(&self) -> bool {
        self.settings().on_start_enabled
    }

    pub fn spam_protection(&self) -> &SpamProtection {
        &self.spam
    }

    pub fn timers(&self) -> &AnnouncementTimers {
        &self.timers
    }

    /// Pending timed announcement for `bracket`, if any.
    pub fn pending_announcement(&self, bracket: BracketId) -> Option<QueueSnapshot> {
        self.pending.get(&bracket).map(|entry| entry.value().clone())
    }

    /// Spam protection gate for a queue announcement by `player`.
    ///
    /// Denies while the player's delay has not elapsed, and denies limited
    /// queues that are still too small. Only an allowed call records `now` as
    /// the player's last announcement.
    ///
    /// # Arguments
    /// * `player` - Player whose queue join triggered the announcement
    /// * `bg` - Battleground template; `None` skips the population limit
    /// * `min_level` - Bracket minimum level, already clamped
    /// * `queue_total` - Players queued in the bracket across both factions
    /// * `now` - Current game time in seconds
    ///
    /// # Returns
    /// * `bool` - `true` if the announcement may be sent
    pub fn can_announce(
        &self,
        player: &dyn Player,
        bg: Option<&dyn Battleground>,
        min_level: u32,
        queue_total: u32,
        now: u64,
    ) -> bool {
        let settings = self.settings();
        self.can_announce_with(&settings, player, bg, min_level, queue_total, now)
    }

    fn can_announce_with(
        &self,
        settings: &Settings,
        player: &dyn Player,
        bg: Option<&dyn Battleground>,
        min_level: u32,
        queue_total: u32,
        now: u64,
    ) -> bool {
        self.spam
            .try_commit(player.guid(), now, settings.spam_delay_secs, || {
                let Some(bg) = bg else {
                    return true;
                };
                if settings.limit_min_level == 0 || min_level < settings.limit_min_level {
                    return true;
                }
                let limited = BattlegroundTypeId::limited_for_level(min_level);
                let too_small =
                    bg.type_id() == limited && queue_total < settings.limit_min_players;
                if too_small {
                    debug!(
                        player = %player.guid(),
                        queued = queue_total,
                        required = settings.limit_min_players,
                        "Queue below announcement limit"
                    );
                }
                !too_small
            })
    }

    pub fn get_announcement_timer(&self, bracket: BracketId) -> i32 {
        self.timers.get(bracket)
    }

    pub fn set_announcement_timer(&self, bracket: BracketId, value: i32) {
        self.timers.set(bracket, value);
    }

    pub fn update_announcement_timer(&self, bracket: BracketId, diff_ms: i32) {
        self.timers.tick(bracket, diff_ms);
    }

    /// Host asks whether it should announce a queue update itself.
    ///
    /// Depending on the settings the update is whispered to the leader,
    /// stored for the next timed broadcast, or broadcast to the world
    /// through the spam protection gate.
    ///
    /// # Arguments
    /// * `queue` - Queue holding the faction counts
    /// * `leader` - Player (or group leader) who joined the queue
    /// * `bg` - Battleground template, if the host has one
    /// * `bracket` - Level bracket the update belongs to
    /// * `ctx` - Host services for the clock and chat delivery
    ///
    /// # Returns
    /// * `QueueAnnounceDecision` - `HostDefault` when the plugin is disabled
    ///   or the queue is not a battleground queue, `Suppress` otherwise
    pub fn on_queue_update(
        &self,
        queue: &dyn BattlegroundQueue,
        leader: &dyn Player,
        bg: Option<&dyn Battleground>,
        bracket: &BracketEntry,
        ctx: &dyn HostContext,
    ) -> QueueAnnounceDecision {
        let settings = self.settings();
        if !settings.enabled {
            return QueueAnnounceDecision::HostDefault;
        }
        let Some(bg) = bg else {
            return QueueAnnounceDecision::HostDefault;
        };
        if bg.is_arena() {
            return QueueAnnounceDecision::HostDefault;
        }

        let snapshot = QueueSnapshot::capture(queue, bg, bracket);

        if settings.player_only {
            self.deliver_to_player(ctx, leader, &messages::player_queue_status(&snapshot));
        } else if settings.timed {
            if !self.timers.is_running(snapshot.bracket) {
                debug!(
                    bracket = snapshot.bracket.0,
                    timer = settings.timer_ms,
                    "Starting timed announcement countdown"
                );
                self.timers.set(snapshot.bracket, settings.timer_countdown());
            }
            self.pending.insert(snapshot.bracket, snapshot);
        } else {
            let now = ctx.game_time();
            if !self.can_announce_with(
                &settings,
                leader,
                Some(bg),
                snapshot.min_level,
                snapshot.total(),
                now,
            ) {
                debug!(leader = %leader.guid(), "Queue announcement throttled");
                return QueueAnnounceDecision::Suppress;
            }
            self.deliver_broadcast(
                ctx,
                &messages::world_queue_announcement(&snapshot),
                queue_filter(&settings),
            );
        }

        QueueAnnounceDecision::Suppress
    }

    pub fn on_battleground_start(&self, bg: &dyn Battleground, ctx: &dyn HostContext) {
        let settings = self.settings();
        if !settings.enabled || !settings.on_start_enabled || bg.is_arena() {
            return;
        }

        self.deliver_broadcast(ctx, &messages::battleground_started(bg), BroadcastFilter::All);
    }

    /// Per-battleground update tick.
    ///
    /// Countdowns are shared by every battleground of a bracket and are
    /// advanced once per world tick in [`Self::on_world_update`], so nothing
    /// is advanced here.
    pub fn on_battleground_update(&self, bg: &dyn Battleground, diff_ms: u32) {
        let settings = self.settings();
        if !settings.enabled || !settings.timed || bg.is_arena() {
            return;
        }
        trace!(battleground = bg.name(), diff = diff_ms, "battleground update");
    }

    /// World tick: sweeps the spam table and fires expired timed announcements.
    pub fn on_world_update(&self, diff_ms: u32, ctx: &dyn HostContext) {
        let settings = self.settings();
        self.maybe_sweep(&settings, diff_ms, ctx);

        if !broadcasts_timed(&settings) {
            return;
        }

        let elapsed = i32::try_from(diff_ms).unwrap_or(i32::MAX);
        for bracket in self.timers.tick_all(elapsed) {
            match self.pending.remove(&bracket) {
                Some((_, snapshot)) => {
                    debug!(bracket = bracket.0, "Timed announcement due");
                    self.deliver_broadcast(
                        ctx,
                        &messages::world_queue_announcement(&snapshot),
                        queue_filter(&settings),
                    );
                }
                None => trace!(bracket = bracket.0, "countdown expired with nothing pending"),
            }
        }
    }

    fn maybe_sweep(&self, settings: &Settings, diff_ms: u32, ctx: &dyn HostContext) {
        let due = {
            let mut elapsed = self.sweep_elapsed_ms.lock();
            *elapsed = elapsed.saturating_add(diff_ms);
            if *elapsed >= SPAM_SWEEP_INTERVAL_MS {
                *elapsed = 0;
                true
            } else {
                false
            }
        };
        if due {
            let max_age = u64::from(settings.spam_delay_secs) * SPAM_SWEEP_AGE_FACTOR;
            self.spam.sweep(ctx.game_time(), max_age);
        }
    }

    fn deliver_to_player(&self, ctx: &dyn HostContext, player: &dyn Player, text: &str) {
        if let Err(e) = ctx.send_to_player(player.guid(), text) {
            warn!("Failed to send queue status to {}: {}", player.name(), e);
        }
    }

    fn deliver_broadcast(&self, ctx: &dyn HostContext, text: &str, filter: BroadcastFilter) {
        if let Err(e) = ctx.broadcast(text, filter) {
            warn!("Failed to broadcast announcement: {}", e);
        }
    }
}

/// Timed world broadcasts need the module on, timed mode on and player-only off.
fn broadcasts_timed(settings: &Settings) -> bool {
    settings.enabled && settings.timed && !settings.player_only
}

fn queue_filter(settings: &Settings) -> BroadcastFilter {
    if settings.respect_announcer_opt_out {
        BroadcastFilter::SkipAnnouncerOptOut
    } else {
        BroadcastFilter::All
    }
}
