//! Script hooks and registration
//!
//! The host drives plugins through two script families: world scripts for
//! configuration and world ticks, and battleground scripts for queue and
//! battleground lifecycle events. [`register_scripts`] builds one shared
//! [`BgQueueAnnouncer`] and registers a script of each family around it.

use std::sync::Arc;

use tracing::info;

use crate::announcer::{BgQueueAnnouncer, QueueAnnounceDecision};
use crate::error::PluginResult;
use crate::types::{
    Battleground, BattlegroundQueue, BracketEntry, ConfigSource, HostContext, Player,
};

pub const WORLD_SCRIPT_NAME: &str = "BgQueueAnnouncerWorld";
pub const BATTLEGROUND_SCRIPT_NAME: &str = "BgQueueAnnouncerBG";

/// World lifecycle hooks.
pub trait WorldScript: Send + Sync {
    fn name(&self) -> &str;

    /// Called after the host (re)loaded its configuration.
    fn on_after_config_load(&self, _reload: bool, _config: &dyn ConfigSource) {}

    /// Called once per world update with the elapsed milliseconds.
    fn on_update(&self, _diff_ms: u32, _ctx: &dyn HostContext) {}
}

/// Battleground lifecycle hooks.
pub trait BattlegroundScript: Send + Sync {
    fn name(&self) -> &str;

    /// Called before the host announces a queue update.
    fn can_send_message_bg_queue(
        &self,
        _queue: &dyn BattlegroundQueue,
        _leader: &dyn Player,
        _bg: Option<&dyn Battleground>,
        _bracket: &BracketEntry,
        _ctx: &dyn HostContext,
    ) -> QueueAnnounceDecision {
        QueueAnnounceDecision::HostDefault
    }

    fn on_battleground_start(&self, _bg: &dyn Battleground, _ctx: &dyn HostContext) {}

    fn on_battleground_update(&self, _bg: &dyn Battleground, _diff_ms: u32, _ctx: &dyn HostContext) {}
}

/// Implemented by the host to accept script registrations.
pub trait ScriptRegistry {
    fn add_world_script(&mut self, script: Arc<dyn WorldScript>) -> PluginResult<()>;

    fn add_battleground_script(&mut self, script: Arc<dyn BattlegroundScript>) -> PluginResult<()>;
}

pub struct BgQueueAnnouncerWorld {
    announcer: Arc<BgQueueAnnouncer>,
}

impl BgQueueAnnouncerWorld {
    pub fn new(announcer: Arc<BgQueueAnnouncer>) -> Self {
        Self { announcer }
    }
}

impl WorldScript for BgQueueAnnouncerWorld {
    fn name(&self) -> &str {
        WORLD_SCRIPT_NAME
    }

    fn on_after_config_load(&self, reload: bool, config: &dyn ConfigSource) {
        if reload {
            info!("📣 Reloading BgQueueAnnouncer configuration");
        }
        self.announcer.load_config(config);
    }

    fn on_update(&self, diff_ms: u32, ctx: &dyn HostContext) {
        self.announcer.on_world_update(diff_ms, ctx);
    }
}

pub struct BgQueueAnnouncerBg {
    announcer: Arc<BgQueueAnnouncer>,
}

impl BgQueueAnnouncerBg {
    pub fn new(announcer: Arc<BgQueueAnnouncer>) -> Self {
        Self { announcer }
    }
}

impl BattlegroundScript for BgQueueAnnouncerBg {
    fn name(&self) -> &str {
        BATTLEGROUND_SCRIPT_NAME
    }

    fn can_send_message_bg_queue(
        &self,
        queue: &dyn BattlegroundQueue,
        leader: &dyn Player,
        bg: Option<&dyn Battleground>,
        bracket: &BracketEntry,
        ctx: &dyn HostContext,
    ) -> QueueAnnounceDecision {
        self.announcer.on_queue_update(queue, leader, bg, bracket, ctx)
    }

    fn on_battleground_start(&self, bg: &dyn Battleground, ctx: &dyn HostContext) {
        self.announcer.on_battleground_start(bg, ctx);
    }

    fn on_battleground_update(&self, bg: &dyn Battleground, diff_ms: u32, _ctx: &dyn HostContext) {
        self.announcer.on_battleground_update(bg, diff_ms);
    }
}

/// Register the announcer scripts with the host.
///
/// Both scripts share one [`BgQueueAnnouncer`]. Settings stay at their
/// defaults until the host delivers the first configuration load.
///
/// # Arguments
/// * `registry` - Host script registry
///
/// # Returns
/// * `PluginResult<Arc<BgQueueAnnouncer>>` - The shared announcer, so the
///   host can inspect its state, or the registry's rejection
pub fn register_scripts(registry: &mut dyn ScriptRegistry) -> PluginResult<Arc<BgQueueAnnouncer>> {
    let announcer = Arc::new(BgQueueAnnouncer::new());

    registry.add_world_script(Arc::new(BgQueueAnnouncerWorld::new(Arc::clone(&announcer))))?;
    registry.add_battleground_script(Arc::new(BgQueueAnnouncerBg::new(Arc::clone(&announcer))))?;

    info!(
        "📣 BgQueueAnnouncer v{} registered ({}, {})",
        env!("CARGO_PKG_VERSION"),
        WORLD_SCRIPT_NAME,
        BATTLEGROUND_SCRIPT_NAME
    );
    Ok(announcer)
}
