//! Configuration management for the pinweave CLI.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "pinweave.toml";

/// Pinweave project configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub run: RunConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Filter used when `PINWEAVE_LOG` is unset, e.g. `"warn"` or
    /// `"pinweave_core=debug"`.
    #[serde(default = "default_level")]
    pub level: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Print every value leaving a node output.
    #[serde(default = "default_print_events")]
    pub print_events: bool,
}

fn default_level() -> String { "warn".to_string() }
fn default_print_events() -> bool { true }

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            print_events: default_print_events(),
        }
    }
}

impl Config {
    /// Load config from pinweave.toml in the current or parent directories.
    pub fn load() -> Result<Self> {
        match std::env::current_dir().ok().and_then(|dir| find_config_file(&dir)) {
            Some(path) => Self::load_from(&path),
            None => Ok(Config::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Save config to the specified path.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }
}

/// Find pinweave.toml in `start` or its parent directories.
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sections_use_defaults() {
        let config: Config = toml::from_str("[log]\nlevel = \"debug\"\n").unwrap();
        assert_eq!(config.log.level, "debug");
        assert!(config.run.print_events);
    }

    #[test]
    fn save_then_find_from_a_subdirectory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();

        let config = Config {
            run: RunConfig {
                print_events: false,
            },
            ..Config::default()
        };
        config.save(&dir.path().join(CONFIG_FILE)).unwrap();

        let found = find_config_file(&nested).unwrap();
        assert_eq!(Config::load_from(&found).unwrap(), config);
    }
}
