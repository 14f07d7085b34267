//! Plugin settings
//!
//! Settings are read from the host configuration on startup and on every
//! reload. Values are taken as-is: a zero spam delay simply disables
//! throttling.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::types::ConfigSource;

/// Prefix shared by every configuration key of this plugin.
pub const CONFIG_PREFIX: &str = "BgQueueAnnouncer";

/// Configuration key names, relative to [`CONFIG_PREFIX`].
pub mod keys {
    pub const ENABLE: &str = "Enable";
    pub const PLAYER_ONLY: &str = "PlayerOnly";
    pub const TIMED: &str = "Timed";
    pub const TIMER: &str = "Timer";
    pub const SPAM_DELAY: &str = "SpamProtection.Delay";
    pub const LIMIT_MIN_LEVEL: &str = "Limit.MinLevel";
    pub const LIMIT_MIN_PLAYERS: &str = "Limit.MinPlayers";
    pub const ON_START_ENABLE: &str = "OnStart.Enable";
    pub const RESPECT_OPT_OUT: &str = "RespectAnnouncerOptOut";
}

/// Snapshot of the plugin configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Master switch for the whole plugin
    pub enabled: bool,
    /// Only tell the queue leader instead of broadcasting
    pub player_only: bool,
    /// Batch world announcements per bracket on a fixed interval
    pub timed: bool,
    /// Countdown length for timed mode, in milliseconds
    pub timer_ms: u32,
    /// Minimum seconds between two announcements triggered by one player
    pub spam_delay_secs: u32,
    /// Bracket minimum level from which the population limit applies (0 = off)
    pub limit_min_level: u32,
    /// Queued players required before a limited queue is announced
    pub limit_min_players: u32,
    /// Announce battleground starts
    pub on_start_enabled: bool,
    /// Skip players who opted out of announcements when broadcasting queues
    pub respect_announcer_opt_out: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: false,
            player_only: false,
            timed: false,
            timer_ms: 30_000,
            spam_delay_secs: 30,
            limit_min_level: 0,
            limit_min_players: 3,
            on_start_enabled: true,
            respect_announcer_opt_out: false,
        }
    }
}

fn key(name: &str) -> String {
    format!("{}.{}", CONFIG_PREFIX, name)
}

impl Settings {
    /// Read every option from `source`, falling back to the defaults.
    pub fn load(source: &dyn ConfigSource) -> Self {
        let defaults = Settings::default();
        let settings = Self {
            enabled: source.get_bool(&key(keys::ENABLE), defaults.enabled),
            player_only: source.get_bool(&key(keys::PLAYER_ONLY), defaults.player_only),
            timed: source.get_bool(&key(keys::TIMED), defaults.timed),
            timer_ms: source.get_u32(&key(keys::TIMER), defaults.timer_ms),
            spam_delay_secs: source.get_u32(&key(keys::SPAM_DELAY), defaults.spam_delay_secs),
            limit_min_level: source.get_u32(&key(keys::LIMIT_MIN_LEVEL), defaults.limit_min_level),
            limit_min_players: source
                .get_u32(&key(keys::LIMIT_MIN_PLAYERS), defaults.limit_min_players),
            on_start_enabled: source
                .get_bool(&key(keys::ON_START_ENABLE), defaults.on_start_enabled),
            respect_announcer_opt_out: source
                .get_bool(&key(keys::RESPECT_OPT_OUT), defaults.respect_announcer_opt_out),
        };

        info!(
            enabled = settings.enabled,
            player_only = settings.player_only,
            timed = settings.timed,
            spam_delay = settings.spam_delay_secs,
            "📣 BgQueueAnnouncer settings loaded"
        );
        settings
    }

    /// Countdown start value for timed mode, saturated to the timer table range.
    pub fn timer_countdown(&self) -> i32 {
        i32::try_from(self.timer_ms).unwrap_or(i32::MAX)
    }
}
