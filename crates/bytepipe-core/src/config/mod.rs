//! Configuration management for bytepipe.
//!
//! The copy itself takes no configuration: its only inputs are the two
//! endpoints. The file configures the network diagnostics.
//!
//! ## Configuration File Locations
//!
//! | Platform | Path |
//! |----------|------|
//! | Linux | `~/.config/bytepipe/config.toml` |
//! | macOS | `~/Library/Application Support/dev.bytepipe.bytepipe/config.toml` |
//! | Windows | `%APPDATA%\bytepipe\bytepipe\config\config.toml` |
//!
//! ## Example
//!
//! ```toml
//! [probe]
//! iterations = 500
//! report_every = 50
//! bind_address = "127.0.0.1"
//!
//! [bridge]
//! host = "127.0.0.1"
//! ```

use std::net::IpAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Main configuration struct for bytepipe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Port probe settings
    pub probe: ProbeConfig,
    /// Socket bridge settings
    pub bridge: BridgeConfig,
}

/// Port probe configuration options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Number of bind-and-inspect rounds
    pub iterations: u32,
    /// Emit a progress line every this many iterations
    pub report_every: u32,
    /// Address ephemeral sockets are bound to
    pub bind_address: IpAddr,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            iterations: crate::DEFAULT_PROBE_ITERATIONS,
            report_every: crate::DEFAULT_PROBE_REPORT_EVERY,
            bind_address: IpAddr::from([0, 0, 0, 0]),
        }
    }
}

/// Socket bridge configuration options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Host the bridge connects to when none is given
    pub host: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            host: crate::DEFAULT_BRIDGE_HOST.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from an explicit file.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigError(format!("Failed to read config: {e}")))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the probe loop cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.probe.report_every == 0 {
            return Err(Error::ConfigError(
                "probe.report_every must be at least 1".to_string(),
            ));
        }
        if self.bridge.host.trim().is_empty() {
            return Err(Error::ConfigError("bridge.host must not be empty".to_string()));
        }
        Ok(())
    }

    /// Get the default configuration directory path.
    #[must_use]
    pub fn config_dir() -> Option<PathBuf> {
        directories::ProjectDirs::from("dev", "bytepipe", "bytepipe")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the full path to the configuration file.
    #[must_use]
    pub fn config_path() -> PathBuf {
        Self::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("config.toml")
    }
}
