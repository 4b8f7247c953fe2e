//! Configuration management for runnel.
//!
//! Configuration is read from `~/.config/runnel/config.toml`, or from the
//! path given with `--config`. Without a file the built-in defaults apply.
//!
//! ```toml
//! [browser]
//! headless = true
//! wait_after_load_ms = 2000
//!
//! [profiles.mastodon]
//! hosts = ["mastodon.social"]
//! post_selector = "article.status"
//! permalink_selector = "a.status__relative-time"
//!
//! [profiles.mastodon.timestamp]
//! selector = "time[datetime]"
//! attribute = "datetime"
//! format = "rfc3339"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::app::{Result, RunnelError};
use crate::extract::MarkupProfile;
use crate::source::BrowserConfig;

/// Profile used when nothing else matches.
pub const FALLBACK_PROFILE: &str = "generic";

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub browser: BrowserConfig,
    /// User profiles; a name shared with a built-in replaces it.
    pub profiles: BTreeMap<String, MarkupProfile>,
}

impl Config {
    /// Load configuration from `path`, or from the default location.
    ///
    /// An explicit path must exist. A missing default file is not an error.
    /// Missing fields in the config file use default values.
    pub fn load(path: Option<&Path>) -> std::result::Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default_path = Self::default_config_path()?;
                if !default_path.exists() {
                    debug!("No config at {}, using defaults", default_path.display());
                    return Ok(Self::default());
                }
                default_path
            }
        };

        let content = fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: config_path,
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/runnel/config.toml`
    pub fn default_config_path() -> std::result::Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("runnel").join("config.toml"))
    }

    /// Built-in profiles overlaid with the user's.
    pub fn profiles(&self) -> BTreeMap<String, MarkupProfile> {
        let mut profiles = MarkupProfile::builtin();
        for (name, profile) in &self.profiles {
            profiles.insert(name.clone(), profile.clone());
        }
        profiles
    }

    /// Pick the profile for `url`: the explicit name if given, else the
    /// first profile claiming the URL's host, else the generic one.
    pub fn select_profile(&self, explicit: Option<&str>, url: &str) -> Result<(String, MarkupProfile)> {
        let mut profiles = self.profiles();

        if let Some(name) = explicit {
            return profiles
                .remove_entry(name)
                .ok_or_else(|| RunnelError::Config(format!("Unknown profile: {}", name)));
        }

        let host = Url::parse(url)?.host_str().unwrap_or_default().to_string();
        if let Some(name) = profiles
            .iter()
            .find(|(_, p)| p.matches_host(&host))
            .map(|(name, _)| name.clone())
        {
            return profiles
                .remove_entry(&name)
                .ok_or_else(|| RunnelError::Config(format!("Unknown profile: {}", name)));
        }

        profiles
            .remove_entry(FALLBACK_PROFILE)
            .ok_or_else(|| RunnelError::Config(format!("Unknown profile: {}", FALLBACK_PROFILE)))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
