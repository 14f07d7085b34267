//! Host simulator for the battleground queue announcer
//!
//! Loads the plugin configuration and a scenario, replays the scenario
//! through the registered scripts and prints the chat transcript.

use anyhow::{Context, Result};
use bg_queue_announcer::messages::strip_color_codes;
use bg_queue_announcer::TomlConfigSource;
use tracing::{error, info, warn};

mod cli;
mod host;
mod logging;
mod scenario;
mod simulation;

use cli::CliArgs;
use host::{Delivery, DeliveryKind};
use scenario::Scenario;
use simulation::Simulation;

/// Load the plugin configuration, falling back to defaults when the file is
/// missing.
async fn load_config(args: &CliArgs) -> Result<TomlConfigSource> {
    if !args.config_path.exists() {
        warn!(
            "Configuration file not found: {}, using defaults",
            args.config_path.display()
        );
        return Ok(TomlConfigSource::default());
    }

    let content = tokio::fs::read_to_string(&args.config_path)
        .await
        .with_context(|| format!("reading {}", args.config_path.display()))?;
    match TomlConfigSource::parse(&content) {
        Ok(config) => Ok(config),
        Err(e) => {
            warn!(
                "Failed to parse config file {}: {}",
                args.config_path.display(),
                e
            );
            Err(e.into())
        }
    }
}

fn render(delivery: &Delivery, start_time: u64, plain: bool) -> String {
    let text = if plain {
        strip_color_codes(&delivery.text)
    } else {
        delivery.text.clone()
    };
    let offset = delivery.at.saturating_sub(start_time);
    let channel = match (delivery.kind, delivery.recipient) {
        (DeliveryKind::Whisper, Some(guid)) => format!("to {}", guid),
        (DeliveryKind::Whisper, None) => "whisper".to_string(),
        (DeliveryKind::World, _) if !delivery.excluded.is_empty() => {
            format!("world, {} opted out", delivery.excluded.len())
        }
        (DeliveryKind::World, _) => "world".to_string(),
        (DeliveryKind::HostDefault, _) => "host".to_string(),
    };
    format!("[+{}s] ({}) {}", offset, channel, text)
}

async fn run(args: &CliArgs) -> Result<()> {
    let config = load_config(args).await?;
    let scenario = Scenario::load(&args.scenario_path).await?;
    let start_time = scenario.start_time;

    let mut simulation = Simulation::new(scenario, config)?;
    let transcript = simulation.run()?;

    for delivery in &transcript {
        if args.transcript_json {
            let mut delivery = delivery.clone();
            if args.plain {
                delivery.text = strip_color_codes(&delivery.text);
            }
            println!("{}", serde_json::to_string(&delivery)?);
        } else {
            println!("{}", render(delivery, start_time, args.plain));
        }
    }

    info!(
        "✅ Scenario complete: {} messages, {} players tracked by spam protection",
        transcript.len(),
        simulation.announcer().spam_protection().len()
    );
    Ok(())
}

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    if let Err(e) = logging::setup_logging(&args) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(&args).await {
        error!("❌ Simulation failed: {:#}", e);
        std::process::exit(1);
    }
}
