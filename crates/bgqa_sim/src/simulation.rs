//! Scenario replay
//!
//! Registers the announcer scripts with a [`SimHost`], loads the initial
//! configuration and forwards each scenario step to the registered scripts
//! the way the game server would.

use std::sync::Arc;

use bg_queue_announcer::{
    register_scripts, Battleground, BgQueueAnnouncer, BracketEntry, BracketId, HostContext,
    QueueAnnounceDecision, TomlConfigSource,
};
use tracing::{debug, info};

use crate::host::{Delivery, DeliveryKind, SimBattleground, SimHost, SimPlayer, SimQueue, SimScripts};
use crate::scenario::{Scenario, ScenarioError, Step};

pub struct Simulation {
    scenario: Scenario,
    host: SimHost,
    scripts: SimScripts,
    announcer: Arc<BgQueueAnnouncer>,
    config: TomlConfigSource,
}

impl Simulation {
    pub fn new(scenario: Scenario, config: TomlConfigSource) -> Result<Self, ScenarioError> {
        let host = SimHost::new(scenario.start_time, &scenario.players);
        let mut scripts = SimScripts::default();
        let announcer = register_scripts(&mut scripts)?;

        for script in &scripts.world {
            script.on_after_config_load(false, &config);
        }

        Ok(Self {
            scenario,
            host,
            scripts,
            announcer,
            config,
        })
    }

    pub fn announcer(&self) -> &BgQueueAnnouncer {
        &self.announcer
    }

    /// Replay every step and return the resulting chat transcript.
    pub fn run(&mut self) -> Result<Vec<Delivery>, ScenarioError> {
        let steps = self.scenario.steps.clone();
        info!("▶️ Replaying {} scenario steps", steps.len());
        for (index, step) in steps.iter().enumerate() {
            debug!(step = index, "{:?}", step);
            self.apply(step)?;
        }
        Ok(self.host.take_deliveries())
    }

    fn apply(&mut self, step: &Step) -> Result<(), ScenarioError> {
        match step {
            Step::Queue {
                leader,
                battleground,
                bracket,
                bracket_min_level,
                bracket_max_level,
                alliance,
                horde,
            } => {
                let leader = SimPlayer(self.scenario.player(*leader)?);
                let bg_def = battleground
                    .as_deref()
                    .map(|key| self.scenario.battleground(key))
                    .transpose()?;
                let bg = bg_def.map(SimBattleground);
                let bracket = BracketEntry {
                    id: BracketId(*bracket),
                    min_level: *bracket_min_level,
                    max_level: *bracket_max_level,
                };
                let queue = SimQueue {
                    bracket: bracket.id,
                    alliance: *alliance,
                    horde: *horde,
                };

                let mut decision = QueueAnnounceDecision::HostDefault;
                for script in &self.scripts.battleground {
                    let answer = script.can_send_message_bg_queue(
                        &queue,
                        &leader,
                        bg.as_ref().map(|bg| bg as &dyn Battleground),
                        &bracket,
                        &self.host,
                    );
                    if !answer.allows_host_announcement() {
                        decision = answer;
                    }
                }

                if decision.allows_host_announcement() {
                    let name = bg.as_ref().map(|bg| bg.name()).unwrap_or("battleground");
                    self.host.record(Delivery {
                        at: self.host.game_time(),
                        kind: DeliveryKind::HostDefault,
                        recipient: None,
                        filter: None,
                        excluded: Vec::new(),
                        text: format!(
                            "Queue status for {} [{}-{}]: A {} / H {}",
                            name, bracket.min_level, bracket.max_level, alliance, horde
                        ),
                    });
                }
            }
            Step::Start { battleground } => {
                let bg = SimBattleground(self.scenario.battleground(battleground)?);
                for script in &self.scripts.battleground {
                    script.on_battleground_start(&bg, &self.host);
                }
            }
            Step::BgUpdate { battleground, diff } => {
                let bg = SimBattleground(self.scenario.battleground(battleground)?);
                for script in &self.scripts.battleground {
                    script.on_battleground_update(&bg, *diff, &self.host);
                }
            }
            Step::Tick { diff } => {
                self.host.advance_ms(u64::from(*diff));
                for script in &self.scripts.world {
                    script.on_update(*diff, &self.host);
                }
            }
            Step::Wait { secs } => {
                self.host.advance_ms(secs.saturating_mul(1000));
            }
            Step::Reload { config } => {
                if let Some(table) = config {
                    self.config = TomlConfigSource::new(table.clone());
                }
                for script in &self.scripts.world {
                    script.on_after_config_load(true, &self.config);
                }
            }
        }
        Ok(())
    }
}
