//! Scenario files
//!
//! A scenario lists the players and battlegrounds the simulated host knows
//! about, followed by the ordered host events to replay.

use std::path::{Path, PathBuf};

use bg_queue_announcer::{BattlegroundTypeId, PlayerGuid};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("Failed to read scenario {0}: {1}")]
    FileRead(PathBuf, std::io::Error),

    #[error("Failed to parse scenario: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Unknown battleground '{0}'")]
    UnknownBattleground(String),

    #[error("Unknown player {0}")]
    UnknownPlayer(PlayerGuid),

    #[error("Plugin error: {0}")]
    Plugin(#[from] bg_queue_announcer::PluginError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Game time of the first step, in seconds since the Unix epoch
    #[serde(default = "default_start_time")]
    pub start_time: u64,
    #[serde(default)]
    pub players: Vec<PlayerDef>,
    #[serde(default)]
    pub battlegrounds: Vec<BattlegroundDef>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

fn default_start_time() -> u64 {
    1_700_000_000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerDef {
    pub guid: PlayerGuid,
    pub name: String,
    /// Player turned queue announcements off
    #[serde(default)]
    pub announcer_opt_out: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattlegroundDef {
    /// Name steps use to refer to this battleground
    pub key: String,
    pub name: String,
    #[serde(rename = "type")]
    pub type_id: BattlegroundTypeId,
    #[serde(default)]
    pub arena: bool,
    pub min_level: u32,
    pub max_level: u32,
    pub min_players_per_team: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// A queue update the host offers for announcement
    Queue {
        leader: PlayerGuid,
        /// Missing means the host had no battleground template at hand
        battleground: Option<String>,
        bracket: u8,
        bracket_min_level: u32,
        bracket_max_level: u32,
        alliance: u32,
        horde: u32,
    },
    /// A battleground started
    Start { battleground: String },
    /// Per-battleground update tick
    BgUpdate { battleground: String, diff: u32 },
    /// World update tick; advances the clock by `diff` milliseconds
    Tick { diff: u32 },
    /// Advance the clock without a world update
    Wait { secs: u64 },
    /// Configuration reload, optionally replacing the configuration
    Reload { config: Option<toml::Table> },
}

impl Scenario {
    pub fn parse(content: &str) -> Result<Self, ScenarioError> {
        Ok(toml::from_str(content)?)
    }

    pub async fn load(path: &Path) -> Result<Self, ScenarioError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ScenarioError::FileRead(path.to_path_buf(), e))?;
        Self::parse(&content)
    }

    pub fn battleground(&self, key: &str) -> Result<&BattlegroundDef, ScenarioError> {
        self.battlegrounds
            .iter()
            .find(|bg| bg.key == key)
            .ok_or_else(|| ScenarioError::UnknownBattleground(key.to_string()))
    }

    pub fn player(&self, guid: PlayerGuid) -> Result<&PlayerDef, ScenarioError> {
        self.players
            .iter()
            .find(|p| p.guid == guid)
            .ok_or(ScenarioError::UnknownPlayer(guid))
    }
}
