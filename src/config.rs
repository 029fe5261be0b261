use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::mode::Mode;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub mode: Mode,
    pub word_set: String,
    /// Word set used by modes that refresh their words on retry.
    pub competitive_word_set: String,
    pub shuffle: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::FixedCount,
            word_set: "default".to_string(),
            competitive_word_set: "pro".to_string(),
            shuffle: false,
        }
    }
}

impl Config {
    pub fn word_set_for(&self, mode: Mode) -> &str {
        if mode.rules().refresh_words_on_retry {
            &self.competitive_word_set
        } else {
            &self.word_set
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> Result<(), ConfigError>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "oiltype") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("oiltype_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    /// Missing or unreadable files fall back to defaults.
    fn load(&self) -> Config {
        fs::read(&self.path)
            .ok()
            .and_then(|bytes| serde_json::from_slice::<Config>(&bytes).ok())
            .unwrap_or_default()
    }

    fn save(&self, cfg: &Config) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("config.json"));
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        assert_eq!(store.load(), cfg);
    }

    #[test]
    fn test_save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("nested").join("config.json"));
        let cfg = Config {
            mode: Mode::Survival,
            word_set: "pro".into(),
            competitive_word_set: "default".into(),
            shuffle: true,
        };
        store.save(&cfg).unwrap();
        assert_eq!(store.load(), cfg);
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("absent.json"));
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "mode": "sudden-death" }"#).unwrap();
        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.mode, Mode::SuddenDeath);
        assert_eq!(cfg.word_set, "default");
    }

    #[test]
    fn test_competitive_uses_its_own_set() {
        let cfg = Config::default();
        assert_eq!(cfg.word_set_for(Mode::Competitive), "pro");
        assert_eq!(cfg.word_set_for(Mode::TimeAttack), "default");
    }
}
