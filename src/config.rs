//! Layered configuration loading using figment.
//!
//! Sources, highest priority first:
//! 1. Environment variables (`TIMETABLE_*` prefix, `__` as section separator)
//! 2. `timetable.toml` in the working directory
//! 3. Built-in defaults
//!
//! `TIMETABLE_SERVER__PORT=9000` maps to `server.port`.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::Path;
use thiserror::Error;

use crate::schedule::{enumerate_slots_starting_at, GenerateOptions, OptionalOrder, Strategy, TimeOfDay, TimeOptions};

pub const CONFIG_FILE: &str = "timetable.toml";
pub const ENV_PREFIX: &str = "TIMETABLE_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Figment(#[from] figment::Error),

    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PlannerConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub slots: SlotConfig,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub generate: GenerateConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Selection choices offered for start/end times
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SlotConfig {
    pub start_hour: u8,
    pub count: usize,
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self { start_hour: 8, count: 21 }
    }
}

impl SlotConfig {
    pub fn options(&self) -> TimeOptions {
        enumerate_slots_starting_at(self.start_hour, self.count)
    }

    /// The last selectable time, used as the latest allowed end
    pub fn max_end(&self) -> Option<TimeOfDay> {
        self.options().last()
    }
}

/// Hour rows shown in the rendered timetable
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GridConfig {
    pub first_hour: u8,
    pub last_hour: u8,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { first_hour: 9, last_hour: 20 }
    }
}

impl GridConfig {
    pub fn hours(&self) -> RangeInclusive<u8> {
        self.first_hour..=self.last_hour
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct GenerateConfig {
    #[serde(default)]
    pub strategy: Strategy,
    /// Shuffle optional subjects with this seed; input order when unset
    #[serde(default)]
    pub seed: Option<u64>,
}

impl GenerateConfig {
    pub fn options(&self) -> GenerateOptions {
        GenerateOptions {
            strategy: self.strategy,
            optional_order: self
                .seed
                .map_or(OptionalOrder::Input, |seed| OptionalOrder::Shuffled { seed }),
        }
    }
}

impl PlannerConfig {
    /// Load from `timetable.toml` (if present) and `TIMETABLE_*` variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let config: Self = Self::figment(path).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Build the provider chain; public so tests can layer on top of it.
    pub fn figment(path: &Path) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if path.exists() {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.slots.count == 0 {
            return Err(invalid("slots.count", "must be at least 1"));
        }
        if self.slots.start_hour > 23 {
            return Err(invalid("slots.start_hour", "must be an hour between 0 and 23"));
        }
        if self.grid.last_hour > 23 {
            return Err(invalid("grid.last_hour", "must be an hour between 0 and 23"));
        }
        if self.grid.first_hour > self.grid.last_hour {
            return Err(invalid("grid.first_hour", "must not be after grid.last_hour"));
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
