//! Logging system setup
//!
//! Structured logging through `tracing`, filtered by `RUST_LOG` when set and
//! by the `--log-level` flag otherwise.

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::cli::CliArgs;

/// Log level used when neither `RUST_LOG` nor `--log-level` is given.
pub const DEFAULT_LEVEL: &str = "info";

pub fn level_for(args: &CliArgs) -> &str {
    args.log_level.as_deref().unwrap_or(DEFAULT_LEVEL)
}

/// Initialize the global tracing subscriber.
///
/// Fails if a global subscriber is already installed.
pub fn setup_logging(args: &CliArgs) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_for(args)));

    let registry = tracing_subscriber::registry().with(filter);
    if args.json_logs {
        registry
            .with(fmt::layer().json().with_target(false).with_writer(std::io::stderr))
            .try_init()?;
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()?;
    }

    Ok(())
}
