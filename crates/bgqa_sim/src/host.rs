//! In-memory host
//!
//! Implements the host side of the plugin boundary: game clock, chat delivery
//! and script registration. Every chat message is recorded as a [`Delivery`].

use std::collections::HashMap;
use std::sync::Arc;

use bg_queue_announcer::{
    Battleground, BattlegroundQueue, BattlegroundScript, BattlegroundTypeId, BracketEntry,
    BracketId, BroadcastFilter, ChatError, HostContext, Player, PluginError, PlayerGuid,
    ScriptRegistry, Team, WorldScript,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::scenario::{BattlegroundDef, PlayerDef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryKind {
    /// Private system message
    Whisper,
    /// World broadcast sent by the plugin
    World,
    /// The host's own queue announcement
    HostDefault,
}

/// One chat message as the host delivered it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    /// Game time in seconds since the Unix epoch
    pub at: u64,
    pub kind: DeliveryKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<PlayerGuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<BroadcastFilter>,
    /// Players left out of a filtered broadcast
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub excluded: Vec<PlayerGuid>,
    pub text: String,
}

pub struct SimHost {
    /// Game clock in milliseconds since the Unix epoch
    clock_ms: Mutex<u64>,
    players: HashMap<PlayerGuid, PlayerDef>,
    deliveries: Mutex<Vec<Delivery>>,
}

impl SimHost {
    pub fn new(start_time: u64, players: &[PlayerDef]) -> Self {
        Self {
            clock_ms: Mutex::new(start_time.saturating_mul(1000)),
            players: players.iter().map(|p| (p.guid, p.clone())).collect(),
            deliveries: Mutex::new(Vec::new()),
        }
    }

    pub fn advance_ms(&self, ms: u64) {
        let mut clock = self.clock_ms.lock();
        *clock = clock.saturating_add(ms);
    }

    pub fn record(&self, delivery: Delivery) {
        debug!(kind = ?delivery.kind, "chat: {}", delivery.text);
        self.deliveries.lock().push(delivery);
    }

    pub fn take_deliveries(&self) -> Vec<Delivery> {
        std::mem::take(&mut *self.deliveries.lock())
    }
}

impl HostContext for SimHost {
    fn game_time(&self) -> u64 {
        *self.clock_ms.lock() / 1000
    }

    fn send_to_player(&self, player: PlayerGuid, text: &str) -> Result<(), ChatError> {
        if !self.players.contains_key(&player) {
            return Err(ChatError::RecipientOffline(player));
        }
        self.record(Delivery {
            at: self.game_time(),
            kind: DeliveryKind::Whisper,
            recipient: Some(player),
            filter: None,
            excluded: Vec::new(),
            text: text.to_string(),
        });
        Ok(())
    }

    fn broadcast(&self, text: &str, filter: BroadcastFilter) -> Result<(), ChatError> {
        let mut excluded: Vec<PlayerGuid> = match filter {
            BroadcastFilter::All => Vec::new(),
            BroadcastFilter::SkipAnnouncerOptOut => self
                .players
                .values()
                .filter(|p| p.announcer_opt_out)
                .map(|p| p.guid)
                .collect(),
        };
        excluded.sort();
        self.record(Delivery {
            at: self.game_time(),
            kind: DeliveryKind::World,
            recipient: None,
            filter: Some(filter),
            excluded,
            text: text.to_string(),
        });
        Ok(())
    }
}

/// Scripts registered by plugins.
#[derive(Default)]
pub struct SimScripts {
    pub world: Vec<Arc<dyn WorldScript>>,
    pub battleground: Vec<Arc<dyn BattlegroundScript>>,
}

impl ScriptRegistry for SimScripts {
    fn add_world_script(&mut self, script: Arc<dyn WorldScript>) -> Result<(), PluginError> {
        if self.world.iter().any(|s| s.name() == script.name()) {
            return Err(PluginError::DuplicateScript(script.name().to_string()));
        }
        debug!("Registered world script {}", script.name());
        self.world.push(script);
        Ok(())
    }

    fn add_battleground_script(
        &mut self,
        script: Arc<dyn BattlegroundScript>,
    ) -> Result<(), PluginError> {
        if self.battleground.iter().any(|s| s.name() == script.name()) {
            return Err(PluginError::DuplicateScript(script.name().to_string()));
        }
        debug!("Registered battleground script {}", script.name());
        self.battleground.push(script);
        Ok(())
    }
}

pub struct SimPlayer<'a>(pub &'a PlayerDef);

impl Player for SimPlayer<'_> {
    fn guid(&self) -> PlayerGuid {
        self.0.guid
    }

    fn name(&self) -> &str {
        &self.0.name
    }
}

pub struct SimBattleground<'a>(pub &'a BattlegroundDef);

impl Battleground for SimBattleground<'_> {
    fn name(&self) -> &str {
        &self.0.name
    }

    fn type_id(&self) -> BattlegroundTypeId {
        self.0.type_id
    }

    fn is_arena(&self) -> bool {
        self.0.arena
    }

    fn min_level(&self) -> u32 {
        self.0.min_level
    }

    fn max_level(&self) -> u32 {
        self.0.max_level
    }

    fn min_players_per_team(&self, _bracket: &BracketEntry) -> u32 {
        self.0.min_players_per_team
    }
}

/// Queue holding fixed counts for a single bracket.
pub struct SimQueue {
    pub bracket: BracketId,
    pub alliance: u32,
    pub horde: u32,
}

impl BattlegroundQueue for SimQueue {
    fn players_in_queue(&self, bracket: BracketId, team: Team) -> u32 {
        if bracket != self.bracket {
            return 0;
        }
        match team {
            Team::Alliance => self.alliance,
            Team::Horde => self.horde,
        }
    }
}
