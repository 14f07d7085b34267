//! TOML backed configuration source
//!
//! Keys use the host's dotted naming (`BgQueueAnnouncer.SpamProtection.Delay`).
//! A key is looked up literally first and then by walking its dotted segments
//! through nested tables, so both flat quoted keys and regular TOML tables work.

use std::path::Path;

use toml::{Table, Value};
use tracing::{debug, warn};

use crate::error::{ConfigError, ConfigResult};
use crate::types::ConfigSource;

/// Configuration source over a parsed TOML document.
#[derive(Debug, Clone, Default)]
pub struct TomlConfigSource {
    table: Table,
}

impl TomlConfigSource {
    pub fn new(table: Table) -> Self {
        Self { table }
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> ConfigResult<Self> {
        let table: Table = toml::from_str(content)?;
        Ok(Self { table })
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_path_buf(), e))?;
        debug!("Loaded config file {}", path.display());
        Self::parse(&content)
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    fn lookup(&self, key: &str) -> Option<&Value> {
        if let Some(value) = self.table.get(key) {
            return Some(value);
        }

        let mut segments = key.split('.');
        let first = segments.next()?;
        let mut current = self.table.get(first)?;
        for segment in segments {
            current = current.as_table()?.get(segment)?;
        }
        Some(current)
    }
}

impl ConfigSource for TomlConfigSource {
    fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.lookup(key) {
            None => default,
            Some(Value::Boolean(b)) => *b,
            Some(Value::Integer(i)) => *i != 0,
            Some(other) => {
                warn!(
                    "Config key {} expects a boolean, got {}; using default {}",
                    key,
                    other.type_str(),
                    default
                );
                default
            }
        }
    }

    fn get_u32(&self, key: &str, default: u32) -> u32 {
        match self.lookup(key) {
            None => default,
            Some(Value::Integer(i)) => match u32::try_from(*i) {
                Ok(v) => v,
                Err(_) => {
                    warn!(
                        "Config key {} value {} is out of range; using default {}",
                        key, i, default
                    );
                    default
                }
            },
            Some(other) => {
                warn!(
                    "Config key {} expects an unsigned integer, got {}; using default {}",
                    key,
                    other.type_str(),
                    default
                );
                default
            }
        }
    }
}
