use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use engine::{ConfigSource, DisplayMode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config at {path} ({field}): {source}")]
    Parse {
        path: PathBuf,
        field: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
struct ConfigData {
    resolution: String,
    online: bool,
    nsfl: bool,
    played_before: bool,
    timer_seconds: Option<u32>,
    api_key: Option<String>,
}

impl Default for ConfigData {
    fn default() -> Self {
        Self {
            resolution: DisplayMode::Hd720.label().to_string(),
            online: false,
            nsfl: false,
            played_before: false,
            timer_seconds: None,
            api_key: None,
        }
    }
}

fn display_mode_from_label(label: &str) -> DisplayMode {
    DisplayMode::ALL
        .into_iter()
        .find(|mode| mode.label().eq_ignore_ascii_case(label))
        .unwrap_or_default()
}

/// `config.json` on disk: loaded once at startup, written back on every
/// mutation. The engine only sees the `ConfigSource` trait.
pub struct ConfigFile {
    path: PathBuf,
    data: Mutex<ConfigData>,
}

impl ConfigFile {
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        let data = if path.is_file() {
            let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            let mut deserializer = serde_json::Deserializer::from_str(&raw);
            serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
                ConfigError::Parse {
                    path: path.to_path_buf(),
                    field: error.path().to_string(),
                    source: error.into_inner(),
                }
            })?
        } else {
            ConfigData::default()
        };
        Ok(Self {
            path: path.to_path_buf(),
            data: Mutex::new(data),
        })
    }

    fn read(&self) -> ConfigData {
        match self.data.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn update(&self, mutate: impl FnOnce(&mut ConfigData)) {
        let mut guard = match self.data.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        mutate(&mut guard);
        self.persist(&guard);
    }

    fn persist(&self, data: &ConfigData) {
        let serialized = match serde_json::to_string_pretty(data) {
            Ok(serialized) => serialized,
            Err(error) => {
                warn!(%error, "config_serialize_failed");
                return;
            }
        };
        if let Err(error) = fs::write(&self.path, serialized) {
            warn!(path = %self.path.display(), %error, "config_write_failed");
        }
    }
}

impl ConfigSource for ConfigFile {
    fn display_mode(&self) -> DisplayMode {
        display_mode_from_label(&self.read().resolution)
    }

    fn set_display_mode(&self, mode: DisplayMode) {
        self.update(|data| data.resolution = mode.label().to_string());
    }

    fn is_online(&self) -> bool {
        self.read().online
    }

    fn is_nsfl_enabled(&self) -> bool {
        self.read().nsfl
    }

    fn set_nsfl_enabled(&self, enabled: bool) {
        self.update(|data| data.nsfl = enabled);
    }

    fn has_played_before(&self) -> bool {
        self.read().played_before
    }

    fn mark_played(&self) {
        self.update(|data| data.played_before = true);
    }

    fn timer_seconds(&self) -> Option<u32> {
        self.read().timer_seconds
    }

    fn set_timer_seconds(&self, seconds: Option<u32>) {
        self.update(|data| data.timer_seconds = seconds);
    }

    fn api_key(&self) -> Option<String> {
        self.read().api_key
    }

    fn set_api_key(&self, key: &str) {
        self.update(|data| data.api_key = Some(key.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().expect("tempdir");
        let config = ConfigFile::load_or_default(&dir.path().join("config.json")).expect("load");
        assert_eq!(config.display_mode(), DisplayMode::Hd720);
        assert!(!config.is_online());
        assert!(!config.has_played_before());
        assert_eq!(config.api_key(), None);
    }

    #[test]
    fn mutations_persist_across_reload() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("config.json");
        {
            let config = ConfigFile::load_or_default(&path).expect("load");
            config.set_display_mode(DisplayMode::Hd1080);
            config.set_api_key("ABCDEFGHIJKLMNOP");
            config.set_timer_seconds(Some(60));
            config.mark_played();
        }
        let reloaded = ConfigFile::load_or_default(&path).expect("reload");
        assert_eq!(reloaded.display_mode(), DisplayMode::Hd1080);
        assert_eq!(reloaded.api_key(), Some("ABCDEFGHIJKLMNOP".to_string()));
        assert_eq!(reloaded.timer_seconds(), Some(60));
        assert!(reloaded.has_played_before());
    }

    #[test]
    fn parse_errors_name_the_offending_field() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("config.json");
        fs::write(&path, "{\"timer_seconds\": \"soon\"}").expect("write");
        let err = ConfigFile::load_or_default(&path).expect_err("parse error");
        match err {
            ConfigError::Parse { field, .. } => assert!(field.contains("timer_seconds")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_resolution_label_falls_back_to_base_mode() {
        assert_eq!(display_mode_from_label("4096X2160"), DisplayMode::Hd720);
        assert_eq!(display_mode_from_label("1600x900"), DisplayMode::Hd900);
    }

    #[test]
    fn resolution_scalar_follows_the_mode() {
        let dir = TempDir::new().expect("tempdir");
        let config = ConfigFile::load_or_default(&dir.path().join("config.json")).expect("load");
        config.set_display_mode(DisplayMode::Hd900);
        assert_eq!(config.resolution_scalar(), 1.25);
    }
}
