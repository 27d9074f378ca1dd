//! Configuration file support
//!
//! Loaded from TOML; every section is optional.
//!
//! ```toml
//! [detector]
//! name = "dcerpc2"
//!
//! [events]
//! enabled = ["memcap", "smb", "co", "cl"]   # or "all" / "none"
//!
//! [memory]
//! memcap = 104857600
//!
//! [logging]
//! level = "info"
//! json = false
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::filter::EventClassSet;
use crate::types::{DETECTOR_NAME, DETECTOR_PREFIX_MAX};

/// Root configuration structure
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub detector: DetectorSettings,
    pub events: EventsSettings,
    pub memory: MemorySettings,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;
        let mut config = Self::from_str(&content)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Serialize configuration to a TOML string
    #[allow(clippy::inherent_to_string)]
    pub fn to_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Save configuration to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = self.to_string()?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Check values the registry would otherwise reject at startup
    pub fn validate(&self) -> Result<()> {
        let name = &self.detector.name;
        if name.is_empty() {
            return Err(Error::Config("detector name must not be empty".to_string()));
        }
        // "(" + name + ") "
        let prefix_len = name.len() + 3;
        if prefix_len > DETECTOR_PREFIX_MAX {
            return Err(Error::DetectorNameTooLong {
                len: prefix_len,
                max: DETECTOR_PREFIX_MAX,
            });
        }
        Ok(())
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - DCE2_DETECTOR_NAME
    /// - DCE2_EVENTS (`all`, `none`, or a class list such as `smb,co`)
    /// - DCE2_MEMCAP (bytes)
    /// - DCE2_LOG_LEVEL, DCE2_LOG_JSON
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(v) = var("DCE2_DETECTOR_NAME") {
            self.detector.name = v;
        }
        if let Some(v) = var("DCE2_EVENTS") {
            if let Ok(set) = v.parse() {
                self.events.enabled = set;
            }
        }
        if let Some(v) = var("DCE2_MEMCAP") {
            if let Ok(bytes) = v.parse() {
                self.memory.memcap = bytes;
            }
        }
        if let Some(v) = var("DCE2_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Some(v) = var("DCE2_LOG_JSON") {
            self.logging.json = v.parse().unwrap_or(self.logging.json);
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorSettings {
    /// Name used in the `"(name) "` message prefix
    pub name: String,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            name: DETECTOR_NAME.to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsSettings {
    /// Alert classes to report; nothing is reported unless configured
    pub enabled: EventClassSet,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemorySettings {
    /// Memory cap in bytes, 0 = unlimited
    pub memcap: u64,
}

impl Default for MemorySettings {
    fn default() -> Self {
        Self {
            memcap: 100 * 1024 * 1024,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Emit JSON lines instead of plain text
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EventClass;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.detector.name, "dcerpc2");
        assert!(config.events.enabled.is_empty());
        assert_eq!(config.memory.memcap, 104_857_600);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_sections() {
        let config = Config::from_str(
            r#"
            [detector]
            name = "dce2-test"

            [events]
            enabled = ["smb", "cl"]

            [memory]
            memcap = 4096
            "#,
        )
        .unwrap();

        assert_eq!(config.detector.name, "dce2-test");
        assert!(config.events.enabled.contains(EventClass::Smb));
        assert!(!config.events.enabled.contains(EventClass::Co));
        assert_eq!(config.memory.memcap, 4096);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_events_keyword() {
        let config = Config::from_str("[events]\nenabled = \"all\"\n").unwrap();
        assert_eq!(config.events.enabled, EventClassSet::all());

        assert!(Config::from_str("[events]\nenabled = \"smb,bogus\"\n").is_err());
    }

    #[test]
    fn test_validate_name() {
        let mut config = Config::default();
        config.detector.name = "x".repeat(200);
        assert!(matches!(config.validate(), Err(Error::DetectorNameTooLong { .. })));

        config.detector.name.clear();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("DCE2_EVENTS", "co"),
            ("DCE2_MEMCAP", "not-a-number"),
            ("DCE2_LOG_LEVEL", "debug"),
        ]);
        let mut config = Config::default();
        config.apply_overrides(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.events.enabled, EventClassSet::none().with(EventClass::Co));
        assert_eq!(config.memory.memcap, MemorySettings::default().memcap);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dce2.toml");

        let mut config = Config::default();
        config.events.enabled = EventClassSet::all();
        config.save(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.events.enabled, EventClassSet::all());
    }

    #[test]
    fn test_missing_file() {
        let err = Config::from_file("/nonexistent/dce2.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
