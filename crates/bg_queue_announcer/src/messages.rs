//! Chat message formatting
//!
//! Messages use the client's inline colour codes (`|cAARRGGBB ... |r`).

use serde::{Deserialize, Serialize};

use crate::types::{
    Battleground, BattlegroundQueue, BracketEntry, BracketId, Team, MAX_LEVEL,
};

/// Queue state of one bracket at the time of a queue update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSnapshot {
    pub bracket: BracketId,
    pub battleground: String,
    pub min_players_per_team: u32,
    pub max_players: u32,
    pub min_level: u32,
    pub max_level: u32,
    pub alliance: u32,
    pub horde: u32,
}

impl QueueSnapshot {
    pub fn capture(
        queue: &dyn BattlegroundQueue,
        bg: &dyn Battleground,
        bracket: &BracketEntry,
    ) -> Self {
        let min_players_per_team = bg.min_players_per_team(bracket);
        Self {
            bracket: bracket.id,
            battleground: bg.name().to_string(),
            min_players_per_team,
            max_players: min_players_per_team.saturating_mul(2),
            min_level: clamp_level(bracket.min_level),
            max_level: clamp_level(bracket.max_level),
            alliance: queue.players_in_queue(bracket.id, Team::Alliance),
            horde: queue.players_in_queue(bracket.id, Team::Horde),
        }
    }

    pub fn total(&self) -> u32 {
        self.alliance.saturating_add(self.horde)
    }
}

pub fn clamp_level(level: u32) -> u32 {
    level.min(MAX_LEVEL)
}

/// Private status line for the queue leader.
pub fn player_queue_status(snapshot: &QueueSnapshot) -> String {
    format!(
        "|cff00ff00[BG Queue]|r {} |cffffff00(Lvl {}-{})|r - |cff0080ffAlliance:|r {} |cffff0000Horde:|r {} |cffaaaaaa[{}/{}]|r",
        snapshot.battleground,
        snapshot.min_level,
        snapshot.max_level,
        snapshot.alliance,
        snapshot.horde,
        snapshot.total(),
        snapshot.max_players
    )
}

/// World announcement for a queue update.
pub fn world_queue_announcement(snapshot: &QueueSnapshot) -> String {
    format!(
        "|cffff8000[BG Queue Announcer]|r |cff00ff00{}|r |cfffff000(Lvl {}-{})|r - |cff0080ffA:|r {} |cffff0000H:|r {} |cffaaaaaa[{}/{} players]|r",
        snapshot.battleground,
        snapshot.min_level,
        snapshot.max_level,
        snapshot.alliance,
        snapshot.horde,
        snapshot.total(),
        snapshot.max_players
    )
}

/// World announcement for a battleground that just started.
pub fn battleground_started(bg: &dyn Battleground) -> String {
    format!(
        "|cffff8000[BG Started]|r |cff00ff00{}|r |cffffff00(Lvl {}-{})|r |cffaaaaaahas begun!|r",
        bg.name(),
        clamp_level(bg.min_level()),
        clamp_level(bg.max_level())
    )
}

/// Remove colour codes, leaving only the readable text.
pub fn strip_color_codes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '|' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('c') => {
                chars.next();
                // AARRGGBB
                for _ in 0..8 {
                    chars.next();
                }
            }
            Some('r') => {
                chars.next();
            }
            _ => out.push(c),
        }
    }
    out
}
