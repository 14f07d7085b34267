//! Error types for the queue announcer plugin

use std::{io::Error as IoError, path::PathBuf};
use thiserror::Error;

use crate::types::PlayerGuid;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    FileRead(PathBuf, IoError),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Chat delivery errors reported by the host
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Player {0} is not online")]
    RecipientOffline(PlayerGuid),

    #[error("Chat delivery failed: {0}")]
    Delivery(String),
}

/// Plugin registration errors
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("Script {0} is already registered")]
    DuplicateScript(String),

    #[error("Plugin registration failed: {0}")]
    RegistrationFailed(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
pub type ChatResult<T> = Result<T, ChatError>;
pub type PluginResult<T> = Result<T, PluginError>;
