// src/settings.rs
//
// Persisted user preferences (JSON in the platform config directory).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::codec::CodecMode;
use crate::io::{BaudRate, LineChoices, Parity, StopBits};
use crate::presets;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppSettings {
    #[serde(default)]
    pub rx_mode: CodecMode,
    #[serde(default)]
    pub tx_mode: CodecMode,
    #[serde(default = "default_notification_ms")]
    pub notification_ms: u64,
    #[serde(default = "default_rescan_interval_ms")]
    pub rescan_interval_ms: u64, // hot-plug poll period
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    #[serde(default)]
    pub parity: Parity,
    #[serde(default = "default_data_bits")]
    pub data_bits: u8,
    #[serde(default)]
    pub stop_bits: StopBits,
    #[serde(default)]
    pub log_dir: Option<PathBuf>, // enables file logging when set
}

fn default_notification_ms() -> u64 {
    2000
}
fn default_rescan_interval_ms() -> u64 {
    500
}
fn default_baud_rate() -> u32 {
    presets::DEFAULT_BAUD_RATE
}
fn default_data_bits() -> u8 {
    presets::DEFAULT_DATA_BITS
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            rx_mode: CodecMode::default(),
            tx_mode: CodecMode::default(),
            notification_ms: default_notification_ms(),
            rescan_interval_ms: default_rescan_interval_ms(),
            baud_rate: default_baud_rate(),
            parity: Parity::default(),
            data_bits: default_data_bits(),
            stop_bits: StopBits::default(),
            log_dir: None,
        }
    }
}

impl AppSettings {
    /// Line parameters the console starts with
    pub fn line_choices(&self) -> LineChoices {
        LineChoices {
            baud: BaudRate::Preset(self.baud_rate),
            parity: self.parity,
            data_bits: self.data_bits,
            stop_bits: self.stop_bits,
        }
    }

    pub fn notification_duration(&self) -> Duration {
        Duration::from_millis(self.notification_ms)
    }

    pub fn rescan_interval(&self) -> Duration {
        // A zero interval would make tokio::time::interval panic
        Duration::from_millis(self.rescan_interval_ms.max(1))
    }
}

pub fn default_settings_path() -> Result<PathBuf, String> {
    let config_dir =
        dirs::config_dir().ok_or_else(|| "Failed to get config dir".to_string())?;
    Ok(config_dir.join("serial-debug").join("settings.json"))
}

/// Load settings from `path`, writing defaults there on first run.
pub fn load_settings(path: &Path) -> Result<AppSettings, String> {
    if path.exists() {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read settings: {}", e))?;

        serde_json::from_str(&content).map_err(|e| format!("Failed to parse settings: {}", e))
    } else {
        // First run
        let settings = AppSettings::default();
        save_settings(path, &settings)?;
        tlog!("[settings] Created default settings at {}", path.display());
        Ok(settings)
    }
}

pub fn save_settings(path: &Path, settings: &AppSettings) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config dir: {}", e))?;
    }

    let content = serde_json::to_string_pretty(settings)
        .map_err(|e| format!("Failed to serialize settings: {}", e))?;

    std::fs::write(path, content).map_err(|e| format!("Failed to write settings: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_run_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let settings = load_settings(&path).unwrap();
        assert_eq!(settings, AppSettings::default());
        assert!(path.exists());

        // Second load reads the file back
        assert_eq!(load_settings(&path).unwrap(), settings);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "rx_mode": "hex", "baud_rate": 115200 }"#).unwrap();

        let settings = load_settings(&path).unwrap();
        assert_eq!(settings.rx_mode, CodecMode::Hex);
        assert_eq!(settings.tx_mode, CodecMode::PlainText);
        assert_eq!(settings.baud_rate, 115200);
        assert_eq!(settings.data_bits, 8);
        assert_eq!(settings.notification_ms, 2000);
        assert_eq!(settings.log_dir, None);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = load_settings(&path).unwrap_err();
        assert!(err.starts_with("Failed to parse settings"));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = AppSettings {
            tx_mode: CodecMode::Escape,
            parity: Parity::Even,
            stop_bits: StopBits::Two,
            log_dir: Some(dir.path().join("logs")),
            ..AppSettings::default()
        };
        save_settings(&path, &settings).unwrap();
        assert_eq!(load_settings(&path).unwrap(), settings);
    }

    #[test]
    fn test_line_choices_from_settings() {
        let settings = AppSettings {
            baud_rate: 57600,
            data_bits: 7,
            parity: Parity::Odd,
            ..AppSettings::default()
        };
        let config = settings.line_choices().resolve().unwrap();
        assert_eq!(config.to_string(), "57600 7O1");
        assert_eq!(settings.notification_duration(), Duration::from_millis(2000));
    }
}
