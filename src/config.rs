use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_TEMPLATE: &str = "Listening to {name} --- performed by {artist}";
pub const DEFAULT_NO_TRACK_MESSAGE: &str = "currently not listening to anything";
pub const DEFAULT_POLL_INTERVAL: i64 = 5;

const DEFAULT_API_SCHEME: &str = "http";
const DEFAULT_API_HOST: &str = "ws.audioscrobbler.com";
const DEFAULT_API_PATH: &str = "/2.0";

/// Application settings loaded from a TOML file.
///
/// Missing keys fall back to their defaults and unrecognized keys are
/// ignored, so a partial (or absent) config file still produces a usable
/// configuration. `NOWPLAYING_USER` and `NOWPLAYING_API_KEY` environment
/// variables override their file counterparts at load time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the formatted track line is written. Nothing is written while
    /// this is unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file: Option<PathBuf>,
    /// Template for the output line; `{artist}`, `{name}` and `{album}` tags
    /// are substituted.
    pub template: String,
    /// Written instead of the template when nothing is playing. When unset,
    /// the output file is left untouched on trackless ticks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_track_message: Option<String>,
    pub lastfm: LastFmConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_file: None,
            template: DEFAULT_TEMPLATE.to_string(),
            no_track_message: Some(DEFAULT_NO_TRACK_MESSAGE.to_string()),
            lastfm: LastFmConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LastFmConfig {
    pub user: String,
    /// Seconds between polls. Must be positive; the poller refuses to act on
    /// degenerate values.
    pub poll_interval: i64,
    pub api_scheme: String,
    pub api_host: String,
    pub api_path: String,
    pub api_key: String,
}

impl Default for LastFmConfig {
    fn default() -> Self {
        Self {
            user: String::new(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            api_scheme: DEFAULT_API_SCHEME.to_string(),
            api_host: DEFAULT_API_HOST.to_string(),
            api_path: DEFAULT_API_PATH.to_string(),
            api_key: String::new(),
        }
    }
}

impl Config {
    /// Load settings from a TOML file, falling back to defaults when the file
    /// is missing.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            toml::from_str(&raw)
                .with_context(|| format!("failed to parse config file {}", path.display()))?
        } else {
            warn!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };
        config.lastfm.apply_env_overrides();
        Ok(config)
    }

    /// Write the settings back out as TOML.
    pub fn save(&self, path: &Path) -> Result<()> {
        let raw = toml::to_string_pretty(self).context("failed to serialize config")?;
        fs::write(path, raw)
            .with_context(|| format!("failed to write config file {}", path.display()))?;
        Ok(())
    }
}

impl LastFmConfig {
    fn apply_env_overrides(&mut self) {
        if let Ok(user) = std::env::var("NOWPLAYING_USER") {
            self.user = user;
        }
        if let Ok(key) = std::env::var("NOWPLAYING_API_KEY") {
            self.api_key = key;
        }
    }

    /// Check the fields the API calls depend on, warning about each invalid
    /// one. The poller itself does not enforce this; it uses whatever values
    /// are present.
    pub fn validate(&self) -> bool {
        let mut valid = true;
        if self.user.is_empty() {
            warn!("invalid user in config: blank");
            valid = false;
        }
        if self.poll_interval <= 0 {
            warn!(interval = self.poll_interval, "invalid poll interval in config");
            valid = false;
        }
        if self.api_scheme.is_empty() {
            warn!("invalid api scheme in config: blank");
            valid = false;
        }
        if self.api_host.is_empty() {
            warn!("invalid api host in config: blank");
            valid = false;
        }
        if self.api_path.is_empty() {
            warn!("invalid api path in config: blank");
            valid = false;
        }
        if self.api_key.is_empty() {
            warn!("invalid api key in config: blank");
            valid = false;
        }
        valid
    }
}
