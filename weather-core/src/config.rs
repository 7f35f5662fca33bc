use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::{model::Unit, service::DEFAULT_ENDPOINT};

/// Environment variable that overrides the API key stored on disk.
pub const API_KEY_ENV: &str = "WEATHER_API_KEY";

/// Environment variable that overrides the endpoint stored on disk.
pub const ENDPOINT_ENV: &str = "WEATHER_API_ENDPOINT";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// unit = "c"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// weatherapi.com key. A missing key is forwarded as an empty string.
    pub api_key: Option<String>,

    /// Override for the `current.json` endpoint.
    pub endpoint: Option<String>,

    /// Display unit, "f" or "c".
    pub unit: Option<String>,

    /// Log status codes and response bodies of every request.
    pub verbose: bool,
}

impl Config {
    /// API key to send, empty if none is configured.
    pub fn api_key(&self) -> &str {
        self.api_key.as_deref().unwrap_or_default()
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    /// Stored display unit, Fahrenheit when unset.
    pub fn default_unit(&self) -> Result<Unit> {
        match &self.unit {
            Some(s) => s
                .parse()
                .with_context(|| format!("Invalid unit in config file: '{s}'")),
            None => Ok(Unit::default()),
        }
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key).filter(|k| !k.is_empty());
    }

    pub fn set_unit(&mut self, unit: Unit) {
        self.unit = Some(unit.as_str().to_string());
    }

    /// Apply `WEATHER_API_KEY` / `WEATHER_API_ENDPOINT` from the process environment.
    pub fn with_env_overrides(self) -> Self {
        let read = |name: &str| std::env::var(name).ok();
        self.apply_overrides(read(API_KEY_ENV), read(ENDPOINT_ENV))
    }

    /// Replace the key and endpoint with the given values when they are non-empty.
    pub fn apply_overrides(mut self, api_key: Option<String>, endpoint: Option<String>) -> Self {
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
        if let Some(endpoint) = endpoint.filter(|e| !e.trim().is_empty()) {
            self.endpoint = Some(endpoint);
        }
        self
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Invalid configuration TOML")
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Path to the saved-locations file.
    pub fn locations_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.data_dir().join("locations.json"))
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "weather-tracker", "weather-tracker")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_api_key_is_empty_not_an_error() {
        let cfg = Config::default();
        assert_eq!(cfg.api_key(), "");
    }

    #[test]
    fn endpoint_falls_back_to_default() {
        let mut cfg = Config::default();
        assert_eq!(cfg.endpoint(), DEFAULT_ENDPOINT);

        cfg.endpoint = Some("http://localhost:8080/current.json".into());
        assert_eq!(cfg.endpoint(), "http://localhost:8080/current.json");
    }

    #[test]
    fn default_unit_is_fahrenheit() {
        let cfg = Config::default();
        assert_eq!(cfg.default_unit().unwrap(), Unit::Fahrenheit);
    }

    #[test]
    fn set_unit_roundtrips_through_toml() {
        let mut cfg = Config::default();
        cfg.set_unit(Unit::Celsius);
        cfg.set_api_key("KEY".into());

        let toml = toml::to_string_pretty(&cfg).unwrap();
        let back = Config::from_toml(&toml).unwrap();

        assert_eq!(back.default_unit().unwrap(), Unit::Celsius);
        assert_eq!(back.api_key(), "KEY");
    }

    #[test]
    fn invalid_unit_errors() {
        let cfg = Config::from_toml("unit = \"kelvin\"").unwrap();
        let err = cfg.default_unit().unwrap_err();
        assert!(err.to_string().contains("Invalid unit in config file"));
    }

    #[test]
    fn partial_file_parses_with_defaults() {
        let cfg = Config::from_toml("api_key = \"abc\"").unwrap();
        assert_eq!(cfg.api_key(), "abc");
        assert!(!cfg.verbose);
        assert_eq!(cfg.endpoint(), DEFAULT_ENDPOINT);
    }

    #[test]
    fn empty_api_key_is_stored_as_none() {
        let mut cfg = Config::default();
        cfg.set_api_key(String::new());
        assert!(cfg.api_key.is_none());
    }

    #[test]
    fn overrides_replace_only_non_empty_values() {
        let cfg = Config::from_toml("api_key = \"file\"").unwrap();

        let cfg = cfg.apply_overrides(Some("env".into()), Some("  ".into()));
        assert_eq!(cfg.api_key(), "env");
        assert_eq!(cfg.endpoint(), DEFAULT_ENDPOINT);

        let cfg = cfg.apply_overrides(None, Some("http://127.0.0.1:9/x".into()));
        assert_eq!(cfg.api_key(), "env");
        assert_eq!(cfg.endpoint(), "http://127.0.0.1:9/x");
    }
}
