//! # Host Object Model
//!
//! The plugin never owns players, battlegrounds or queues. The host server hands
//! them to each hook through the traits in this module, together with a
//! [`HostContext`] for chat delivery and game time.
//!
//! ## Key Types
//!
//! - [`PlayerGuid`] - Stable player identity used as the spam protection key
//! - [`BracketId`] - Level bracket of a battleground matchmaking pool
//! - [`BattlegroundTypeId`] - Which battleground (or arena) a queue belongs to
//! - [`HostContext`] - Chat delivery and game clock provided by the host

use serde::{Deserialize, Serialize};

use crate::error::ChatResult;

/// Level cap used to clamp displayed bracket levels.
pub const MAX_LEVEL: u32 = 80;

/// Unique identifier for a player character.
///
/// Wraps the host's 64-bit object GUID so it cannot be confused with other ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerGuid(pub u64);

impl std::fmt::Display for PlayerGuid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player-{}", self.0)
    }
}

/// Identifier of a level bracket within a battleground queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BracketId(pub u8);

impl std::fmt::Display for BracketId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Battleground and arena types known to the host.
///
/// Discriminants match the host's battleground template ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum BattlegroundTypeId {
    AlteracValley = 1,
    WarsongGulch = 2,
    ArathiBasin = 3,
    NagrandArena = 4,
    BladesEdgeArena = 5,
    AllArenas = 6,
    EyeOfTheStorm = 7,
    RuinsOfLordaeron = 8,
    StrandOfTheAncients = 9,
    DalaranSewers = 10,
    RingOfValor = 11,
    IsleOfConquest = 30,
    RandomBattleground = 32,
}

impl BattlegroundTypeId {
    /// Battleground type whose queues are subject to the population limit for
    /// a bracket starting at `min_level`.
    ///
    /// Max level brackets are limited on the random battleground queue, every
    /// lower bracket on Warsong Gulch.
    pub fn limited_for_level(min_level: u32) -> Self {
        if min_level == MAX_LEVEL {
            BattlegroundTypeId::RandomBattleground
        } else {
            BattlegroundTypeId::WarsongGulch
        }
    }
}

/// Faction side of a queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    Alliance,
    Horde,
}

/// Who receives a world broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BroadcastFilter {
    /// Every online player
    All,
    /// Every online player except those who turned queue announcements off
    SkipAnnouncerOptOut,
}

/// Level bracket a queue update refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketEntry {
    pub id: BracketId,
    pub min_level: u32,
    pub max_level: u32,
}

pub trait Player {
    fn guid(&self) -> PlayerGuid;

    fn name(&self) -> &str;
}

pub trait Battleground {
    fn name(&self) -> &str;

    fn type_id(&self) -> BattlegroundTypeId;

    fn is_arena(&self) -> bool;

    fn min_level(&self) -> u32;

    fn max_level(&self) -> u32;

    /// Players per team required before this battleground can start in the
    /// given bracket.
    fn min_players_per_team(&self, bracket: &BracketEntry) -> u32;
}

pub trait BattlegroundQueue {
    /// Players waiting in the normal (non-premade) group queue of one side.
    fn players_in_queue(&self, bracket: BracketId, team: Team) -> u32;
}

/// Services the host exposes to the plugin while a hook runs.
///
/// Implementations route text through the host's chat system. Delivery
/// failures are reported but never retried by the plugin.
pub trait HostContext: Send + Sync {
    /// Current game time in seconds since the Unix epoch.
    fn game_time(&self) -> u64;

    /// Sends a system message to a single player.
    fn send_to_player(&self, player: PlayerGuid, text: &str) -> ChatResult<()>;

    /// Sends a world message to every online player matching `filter`.
    fn broadcast(&self, text: &str, filter: BroadcastFilter) -> ChatResult<()>;
}

/// Key/value configuration store provided by the host.
///
/// Missing keys resolve to `default`.
pub trait ConfigSource {
    fn get_bool(&self, key: &str, default: bool) -> bool;

    fn get_u32(&self, key: &str, default: u32) -> u32;
}
