//! Command-line interface for the announcer simulator.

use clap::{Arg, ArgMatches, Command};
use std::path::PathBuf;

/// Command line arguments parsed from user input.
#[derive(Debug, Clone)]
pub struct CliArgs {
    /// Path to the plugin configuration file
    pub config_path: PathBuf,
    /// Path to the scenario to replay
    pub scenario_path: PathBuf,
    /// Optional override for log level
    pub log_level: Option<String>,
    /// Whether to force JSON log output
    pub json_logs: bool,
    /// Strip chat colour codes from the transcript
    pub plain: bool,
    /// Print the transcript as JSON lines
    pub transcript_json: bool,
}

fn command() -> Command {
    Command::new("BgQueueAnnouncer Simulator")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Replays battleground queue scenarios through the queue announcer plugin")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Plugin configuration file path")
                .default_value("bgqa.toml"),
        )
        .arg(
            Arg::new("scenario")
                .short('s')
                .long("scenario")
                .value_name("FILE")
                .help("Scenario file to replay")
                .required(true),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level (trace, debug, info, warn, error)"),
        )
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .help("Output logs in JSON format")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("plain")
                .long("plain")
                .help("Strip colour codes from chat messages")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("transcript-json")
                .long("transcript-json")
                .help("Print the chat transcript as JSON lines")
                .action(clap::ArgAction::SetTrue),
        )
}

impl CliArgs {
    /// Parse the process arguments, exiting with usage on error.
    pub fn parse() -> Self {
        Self::try_parse_from(std::env::args_os()).unwrap_or_else(|e| e.exit())
    }

    pub fn try_parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Ok(Self::from_matches(&command().try_get_matches_from(args)?))
    }

    fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            config_path: matches
                .get_one::<String>("config")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("bgqa.toml")),
            scenario_path: matches
                .get_one::<String>("scenario")
                .map(PathBuf::from)
                .unwrap_or_default(),
            log_level: matches.get_one::<String>("log-level").cloned(),
            json_logs: matches.get_flag("json-logs"),
            plain: matches.get_flag("plain"),
            transcript_json: matches.get_flag("transcript-json"),
        }
    }
}
