//! CLI configuration.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/procpause/config.toml`
//! (falling back to `~/.config/procpause/config.toml`). A missing file means
//! built-in defaults.
//!
//! ## Example Configuration
//!
//! ```toml
//! target = "gta5"
//! pause_secs = 8
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use procpause::{PauseWindow, ProcessQuery};
use serde::{Deserialize, Serialize};

use crate::error::{CliError, Result};

/// Settings read from the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Process name substring used when no query is given (default: "gta5")
    #[serde(default = "default_target")]
    pub target: String,

    /// Seconds the target stays suspended (default: 8)
    #[serde(default = "default_pause_secs")]
    pub pause_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target: default_target(),
            pause_secs: default_pause_secs(),
        }
    }
}

fn default_target() -> String {
    "gta5".to_string()
}

const fn default_pause_secs() -> u64 {
    PauseWindow::DEFAULT.duration().as_secs()
}

impl Config {
    /// Loads configuration from `path`, or the default location if `None`.
    ///
    /// A missing file at the default location yields the defaults; an
    /// explicitly requested file must exist.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config directory cannot be determined
    /// - An explicit path doesn't exist or cannot be read
    /// - Deserialization or validation fails
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (Self::config_path()?, false),
        };

        if !path.exists() {
            if required {
                return Err(CliError::Config(format!(
                    "Configuration file not found: {}",
                    path.display()
                )));
            }
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path).map_err(|e| {
            CliError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;

        let config: Self = toml::from_str(&contents)?;
        config.validate()?;

        Ok(config)
    }

    /// Returns the default configuration file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined.
    pub fn config_path() -> Result<PathBuf> {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(dirs::config_dir)
            .ok_or_else(|| CliError::Config("Failed to determine config directory".to_string()))?;

        Ok(base.join("procpause").join("config.toml"))
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the target is blank or the pause is zero.
    pub fn validate(&self) -> Result<()> {
        if self.target.trim().is_empty() {
            return Err(CliError::Config("target must not be empty".to_string()));
        }

        if self.pause_secs == 0 {
            return Err(CliError::Config(
                "pause_secs must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Resolves the query and pause window for a run.
    ///
    /// Command-line values win over the configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting query is blank or the pause is zero.
    pub fn resolve(
        &self,
        query: Option<&str>,
        pause_secs: Option<u64>,
    ) -> Result<(ProcessQuery, PauseWindow)> {
        let query = ProcessQuery::new(query.unwrap_or(&self.target))?;

        let secs = pause_secs.unwrap_or(self.pause_secs);
        if secs == 0 {
            return Err(CliError::Config(
                "pause must be at least 1 second".to_string(),
            ));
        }

        Ok((query, PauseWindow::from_secs(secs)))
    }
}
