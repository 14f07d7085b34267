//! # BgQueueAnnouncer
//!
//! Battleground queue announcer plugin. Replaces the host's default queue
//! announcements with:
//! - A private status line for the queue leader (player-only mode)
//! - Throttled world announcements with per-player spam protection
//! - Batched per-bracket announcements on a fixed interval (timed mode)
//! - A world announcement when a battleground begins
//!
//! The host object model (players, battlegrounds, queues, chat) is reached
//! only through the traits in [`types`], so the plugin can be driven by any
//! host that implements them.
//!
//! ```rust,ignore
//! let announcer = bg_queue_announcer::register_scripts(&mut host_registry)?;
//! ```

pub mod announcer;
pub mod config;
pub mod error;
pub mod messages;
pub mod plugin;
pub mod settings;
pub mod spam;
pub mod timer;
pub mod types;

pub use announcer::{BgQueueAnnouncer, QueueAnnounceDecision};
pub use config::TomlConfigSource;
pub use error::{ChatError, ConfigError, PluginError};
pub use messages::QueueSnapshot;
pub use plugin::{
    register_scripts, BattlegroundScript, BgQueueAnnouncerBg, BgQueueAnnouncerWorld,
    ScriptRegistry, WorldScript,
};
pub use settings::Settings;
pub use types::*;
