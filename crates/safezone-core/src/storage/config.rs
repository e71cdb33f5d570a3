//! TOML-based application configuration.
//!
//! Stores:
//! - Countdown length and unit interval
//! - Distress detector keywords and loudness threshold
//! - An optional fixed emergency contact
//!
//! Configuration is stored at `~/.config/safezone/config.toml`. A missing
//! file means defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::data_dir;
use crate::error::ConfigError;

/// Escalation countdown settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountdownConfig {
    #[serde(default = "default_units")]
    pub units: u32,
    /// Length of one countdown unit in milliseconds.
    #[serde(default = "default_unit_ms")]
    pub unit_ms: u64,
}

/// Distress detector settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,
    /// Treat "loud sound" events as distress.
    #[serde(default = "default_true")]
    pub match_loud_sound: bool,
    /// Mean byte-frequency amplitude above which a frame counts as loud.
    #[serde(default = "default_loud_threshold")]
    pub loud_threshold: f32,
    #[serde(default = "default_fft_size")]
    pub fft_size: usize,
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
    /// Bound of the sandbox-to-host channel.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/safezone/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub countdown: CountdownConfig,
    #[serde(default)]
    pub detector: DetectorConfig,
    /// Fixed contact that takes precedence over the stored one.
    #[serde(default)]
    pub contact_override: Option<String>,
}

/// Upper bound on the whole escalation delay.
pub const MAX_COUNTDOWN_MS: u64 = 60 * 60 * 1000;

fn default_units() -> u32 {
    10
}
fn default_unit_ms() -> u64 {
    1000
}
fn default_keywords() -> Vec<String> {
    vec!["help".into(), "emergency".into()]
}
fn default_true() -> bool {
    true
}
fn default_loud_threshold() -> f32 {
    80.0
}
fn default_fft_size() -> usize {
    512
}
fn default_frame_interval_ms() -> u64 {
    16
}
fn default_channel_capacity() -> usize {
    64
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            units: default_units(),
            unit_ms: default_unit_ms(),
        }
    }
}

impl CountdownConfig {
    pub fn unit(&self) -> Duration {
        Duration::from_millis(self.unit_ms)
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            keywords: default_keywords(),
            match_loud_sound: true,
            loud_threshold: default_loud_threshold(),
            fft_size: default_fft_size(),
            frame_interval_ms: default_frame_interval_ms(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl DetectorConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    /// Number of frequency bins the analyser fills per frame.
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            countdown: CountdownConfig::default(),
            detector: DetectorConfig::default(),
            contact_override: None,
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
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Array(_) => serde_json::Value::Array(
                        value
                            .split(',')
                            .map(str::trim)
                            .filter(|s| !s.is_empty())
                            .map(|s| serde_json::Value::String(s.to_string()))
                            .collect(),
                    ),
                    serde_json::Value::Null if value.is_empty() => serde_json::Value::Null,
                    _ if value.is_empty() && part == "contact_override" => serde_json::Value::Null,
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/safezone"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from the default location or return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config =
                    toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
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
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
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

    /// Set a config value by key. The result must still validate.
    ///
    /// Array values (`detector.keywords`) take a comma-separated list; an
    /// empty `contact_override` clears it.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, message: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.to_string(),
        };

        if self.countdown.units == 0 {
            return Err(invalid("countdown.units", "must be at least 1"));
        }
        if self.countdown.unit_ms == 0 {
            return Err(invalid("countdown.unit_ms", "must be at least 1"));
        }
        let total_ms = u64::from(self.countdown.units).checked_mul(self.countdown.unit_ms);
        if !matches!(total_ms, Some(ms) if ms <= MAX_COUNTDOWN_MS) {
            return Err(invalid("countdown", "units * unit_ms must not exceed one hour"));
        }
        if self.detector.channel_capacity == 0 {
            return Err(invalid("detector.channel_capacity", "must be at least 1"));
        }
        if self.detector.frame_interval_ms == 0 {
            return Err(invalid("detector.frame_interval_ms", "must be at least 1"));
        }
        let fft = self.detector.fft_size;
        if fft < 32 || !fft.is_power_of_two() {
            return Err(invalid("detector.fft_size", "must be a power of two >= 32"));
        }
        if !self.detector.loud_threshold.is_finite() || self.detector.loud_threshold < 0.0 {
            return Err(invalid("detector.loud_threshold", "must be a non-negative number"));
        }
        if self.detector.keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(invalid("detector.keywords", "at least one keyword is required"));
        }
        Ok(())
    }

    /// Load from disk, returning defaults on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}
