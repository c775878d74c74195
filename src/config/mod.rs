//! Configuration management for Atrium
//!
//! This module handles loading, parsing, and validating configuration
//! from TOML files. It covers the shell's window wiring (home window,
//! startup window, named window aliases) and general runtime settings.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::registry::{WindowId, WINDOW_ID_INVALID, WINDOW_ID_STARTUP};

/// Main configuration struct containing all Atrium settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AtriumConfig {
    /// Window wiring for the shell
    #[serde(default)]
    pub shell: ShellConfig,

    /// General runtime settings
    #[serde(default)]
    pub general: GeneralConfig,
}

/// Shell window wiring
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShellConfig {
    /// Window activated when navigation has nowhere else to go
    pub home_window: WindowId,

    /// Window the startup pseudo-id resolves to (0 = use home_window)
    #[serde(default)]
    pub startup_window: WindowId,

    /// Named aliases for window ids, usable by embedders for scripted
    /// navigation ("settings" -> 120, ...)
    #[serde(default)]
    pub aliases: HashMap<String, WindowId>,
}

/// General runtime settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralConfig {
    /// Enable debug logging
    pub debug: bool,

    /// Frame rate cap for the demo driver loop (0 = uncapped)
    pub max_fps: u32,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            home_window: 100,
            startup_window: 0,
            aliases: HashMap::new(),
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            debug: false,
            max_fps: 60,
        }
    }
}

impl ShellConfig {
    /// Concrete id the startup pseudo-window resolves to
    pub fn resolved_startup_window(&self) -> WindowId {
        if self.startup_window == WINDOW_ID_INVALID {
            self.home_window
        } else {
            self.startup_window
        }
    }

    /// Look up a named window alias
    pub fn alias(&self, name: &str) -> Option<WindowId> {
        self.aliases.get(name).copied()
    }
}

impl AtriumConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // Expand ~ to home directory
        let expanded_path = if path.to_string_lossy().starts_with('~') {
            let home = std::env::var("HOME").context("Failed to get HOME environment variable")?;
            Path::new(&home).join(path.strip_prefix("~").unwrap_or(path))
        } else {
            path.to_path_buf()
        };

        let contents = fs::read_to_string(&expanded_path)
            .with_context(|| format!("Failed to read config file: {}", expanded_path.display()))?;

        let config: AtriumConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", expanded_path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.shell.home_window == WINDOW_ID_INVALID {
            anyhow::bail!("Invalid home_window: the invalid window id cannot be a destination");
        }
        if self.shell.home_window == WINDOW_ID_STARTUP
            || self.shell.startup_window == WINDOW_ID_STARTUP
        {
            anyhow::bail!("Invalid window wiring: the startup pseudo-id is not a concrete window");
        }
        for (name, &id) in &self.shell.aliases {
            if id == WINDOW_ID_INVALID || id == WINDOW_ID_STARTUP {
                anyhow::bail!("Invalid alias '{}': must name a concrete window id", name);
            }
        }

        Ok(())
    }

    /// Save configuration to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        fs::write(path, contents).context("Failed to write configuration file")?;

        Ok(())
    }
}
