//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Tick periods for the manual countdown and schedule-following loops
//! - Alarm behaviour (enabled, terminal bell, external sound command)
//! - Default labels for unnamed countdowns and exams
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use super::data_dir;
use crate::error::ConfigError;

/// Tick loop periods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Manual countdowns tick fast so the zero crossing is not perceptibly late.
    #[serde(default = "default_manual_tick_ms")]
    pub manual_tick_ms: u64,
    #[serde(default = "default_schedule_tick_ms")]
    pub schedule_tick_ms: u64,
}

/// Alarm configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlarmConfig {
    /// Sound is off until the user turns it on.
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub bell: bool,
    /// Command spawned to play a sound (e.g. `paplay alarm.wav`).
    #[serde(default)]
    pub command: Option<String>,
}

/// Fallback labels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelsConfig {
    #[serde(default = "default_manual_label")]
    pub manual_default: String,
    #[serde(default = "default_subject")]
    pub subject_default: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub alarm: AlarmConfig,
    #[serde(default)]
    pub labels: LabelsConfig,
}

fn default_manual_tick_ms() -> u64 {
    100
}
fn default_schedule_tick_ms() -> u64 {
    500
}
fn default_true() -> bool {
    true
}
fn default_manual_label() -> String {
    crate::timer::DEFAULT_MANUAL_LABEL.into()
}
fn default_subject() -> String {
    crate::schedule::DEFAULT_SUBJECT.into()
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            manual_tick_ms: default_manual_tick_ms(),
            schedule_tick_ms: default_schedule_tick_ms(),
        }
    }
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bell: true,
            command: None,
        }
    }
}

impl Default for LabelsConfig {
    fn default() -> Self {
        Self {
            manual_default: default_manual_label(),
            subject_default: default_subject(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current
                    .get_mut(part)
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
                continue;
            }

            let obj = current
                .as_object_mut()
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
            let existing = obj
                .get(part)
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value
                        .parse::<bool>()
                        .map_err(|e| invalid(e.to_string()))?,
                ),
                serde_json::Value::Number(_) => serde_json::Value::Number(
                    value
                        .parse::<u64>()
                        .map_err(|e| invalid(e.to_string()))?
                        .into(),
                ),
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                _ => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(ConfigError::UnknownKey(key.to_string()))
    }

    /// Default config location.
    pub fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from disk or create the default file.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Tick periods must be positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("timer.manual_tick_ms", self.timer.manual_tick_ms),
            ("timer.schedule_tick_ms", self.timer.schedule_tick_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: "must be greater than zero".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed
    /// or fails validation. `self` is unchanged on error.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Load from disk, returning default on error.
    ///
    /// The error is logged at `warn` so a broken file does not silently
    /// discard the user's settings.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            warn!(error = %e, "config unreadable, using defaults");
            Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.timer.manual_tick_ms, 100);
        assert_eq!(parsed.timer.schedule_tick_ms, 500);
        assert!(!parsed.alarm.enabled);
        assert!(parsed.alarm.command.is_none());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[alarm]\nenabled = true\n").unwrap();
        assert!(parsed.alarm.enabled);
        assert!(parsed.alarm.bell);
        assert_eq!(parsed.labels.subject_default, "Subject");
        assert_eq!(parsed.labels.manual_default, "Timer");
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("alarm.enabled").as_deref(), Some("false"));
        assert_eq!(cfg.get("timer.manual_tick_ms").as_deref(), Some("100"));
        assert_eq!(cfg.get("labels.subject_default").as_deref(), Some("Subject"));
        assert!(cfg.get("alarm.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_updates_nested_values() {
        let mut cfg = Config::default();
        cfg.set("alarm.enabled", "true").unwrap();
        cfg.set("timer.schedule_tick_ms", "1000").unwrap();
        cfg.set("labels.manual_default", "Quiz").unwrap();
        cfg.set("alarm.command", "paplay bell.wav").unwrap();
        assert!(cfg.alarm.enabled);
        assert_eq!(cfg.timer.schedule_tick_ms, 1000);
        assert_eq!(cfg.labels.manual_default, "Quiz");
        assert_eq!(cfg.alarm.command.as_deref(), Some("paplay bell.wav"));
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        let err = cfg.set("alarm.volume", "3").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownKey(_)));
        let err = cfg.set("nothing.here", "3").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownKey(_)));
    }

    #[test]
    fn set_rejects_invalid_type_and_zero_ticks() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("alarm.enabled", "loud"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            cfg.set("timer.manual_tick_ms", "0"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert_eq!(cfg.timer.manual_tick_ms, 100);
    }

    #[test]
    fn load_from_creates_default_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(cfg.timer.manual_tick_ms, 100);

        let mut changed = cfg.clone();
        changed.set("alarm.bell", "false").unwrap();
        changed.save_to(&path).unwrap();
        let reloaded = Config::load_from(&path).unwrap();
        assert!(!reloaded.alarm.bell);
    }

    #[test]
    fn load_from_rejects_broken_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "timer = [").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }
}
