use anyhow::{Context, Result};
use dirs::config_dir;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::history::DEFAULT_HISTORY_LIMIT;

const APP_NAME: &str = "plotline";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Undo steps kept per editing session.
    pub history_limit: usize,
    /// Quiet period before a change is written to disk.
    pub autosave_quiet_ms: u64,
    /// Overrides the default database location.
    pub database_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            autosave_quiet_ms: 1500,
            database_path: None,
        }
    }
}

impl Config {
    /// Load the config file, then apply `PLOTLINE_*` environment overrides.
    /// Falls back to defaults if the file is missing or unreadable.
    pub fn load() -> Self {
        let mut config = match get_config_path().and_then(|path| Self::load_from(&path)) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config = serde_json::from_str(&content).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Apply overrides looked up by variable name.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("PLOTLINE_DB").filter(|v| !v.is_empty()) {
            self.database_path = Some(PathBuf::from(path));
        }
        if let Some(raw) = lookup("PLOTLINE_HISTORY_LIMIT") {
            match raw.parse() {
                Ok(limit) => self.history_limit = limit,
                Err(_) => tracing::warn!("Ignoring PLOTLINE_HISTORY_LIMIT={}", raw),
            }
        }
        if let Some(raw) = lookup("PLOTLINE_AUTOSAVE_MS") {
            match raw.parse() {
                Ok(ms) => self.autosave_quiet_ms = ms,
                Err(_) => tracing::warn!("Ignoring PLOTLINE_AUTOSAVE_MS={}", raw),
            }
        }
    }

    pub fn autosave_quiet_period(&self) -> Duration {
        Duration::from_millis(self.autosave_quiet_ms)
    }

    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.database_path {
            Some(path) => Ok(path.clone()),
            None => crate::db::default_path(),
        }
    }
}

fn get_config_path() -> Result<PathBuf> {
    let mut path =
        config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"history_limit": 10}"#).unwrap();

        let config = Config::load_from(&path).unwrap();

        assert_eq!(config.history_limit, 10);
        assert_eq!(config.autosave_quiet_ms, 1500);
        assert_eq!(config.database_path, None);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"autosave_quiet_ms": 250, "system_prompt": "Be brief"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();

        assert_eq!(config.autosave_quiet_period(), Duration::from_millis(250));
        assert_eq!(config.history_limit, DEFAULT_HISTORY_LIMIT);
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("PLOTLINE_DB", "/tmp/novel.db"),
            ("PLOTLINE_HISTORY_LIMIT", "5"),
            ("PLOTLINE_AUTOSAVE_MS", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.database_path, Some(PathBuf::from("/tmp/novel.db")));
        assert_eq!(config.history_limit, 5);
        assert_eq!(config.autosave_quiet_ms, 1500);
    }
}
