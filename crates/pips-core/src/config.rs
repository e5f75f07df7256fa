use crate::roller::DEFAULT_ROLL_DELAY;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    /// Preferred output mode (`pretty`, `text`, or `json`).
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub roll: RollConfig,
    #[serde(default)]
    pub tui: TuiConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollConfig {
    /// Length of the roll animation in milliseconds.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    /// Fixed RNG seed; entropy-seeded when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for RollConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            seed: None,
        }
    }
}

impl RollConfig {
    #[must_use]
    pub const fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TuiConfig {
    /// Event poll timeout; also the granularity of the roll timer.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
        }
    }
}

impl TuiConfig {
    #[must_use]
    pub const fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

/// Location of the user config file, if a config directory exists.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("pips/config.toml"))
}

/// Load the user config, falling back to defaults when no file exists.
///
/// `PIPS_CONFIG` overrides the default location.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig> {
    let path = match env::var_os("PIPS_CONFIG") {
        Some(path) => PathBuf::from(path),
        None => match user_config_path() {
            Some(path) => path,
            None => return Ok(UserConfig::default()),
        },
    };
    load_config_file(&path)
}

/// Load a config file at `path`; a missing file yields defaults.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config_file(path: &Path) -> Result<UserConfig> {
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

#[allow(clippy::cast_possible_truncation)]
const fn default_delay_ms() -> u64 {
    DEFAULT_ROLL_DELAY.as_millis() as u64
}

const fn default_tick_ms() -> u64 {
    50
}
