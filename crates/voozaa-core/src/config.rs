//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/voozaa/config.toml)
//! 3. Environment variables (VOOZAA_* prefix)
//!
//! Environment variables take precedence over config file values.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::storage::{FileBlobStore, DEFAULT_STORAGE_KEY};

/// Environment variable prefix
const ENV_PREFIX: &str = "VOOZAA";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Directory holding the stored state
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Key the state blob is stored under
    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    /// Start from the sample records when nothing is stored yet
    #[serde(default = "default_true")]
    pub seed_sample_data: bool,

    /// Write logs here instead of stderr
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            storage_key: default_storage_key(),
            seed_sample_data: true,
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (VOOZAA_DATA_DIR, VOOZAA_STORAGE_KEY, VOOZAA_SEED_SAMPLE_DATA)
    /// 2. Config file (~/.config/voozaa/config.toml or VOOZAA_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load from `path` when given, otherwise from the default location
    pub fn load_with_override(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // VOOZAA_DATA_DIR
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        // VOOZAA_STORAGE_KEY
        if let Ok(val) = std::env::var(format!("{}_STORAGE_KEY", ENV_PREFIX)) {
            if !val.trim().is_empty() {
                self.storage_key = val.trim().to_string();
            }
        }

        // VOOZAA_SEED_SAMPLE_DATA
        if let Ok(val) = std::env::var(format!("{}_SEED_SAMPLE_DATA", ENV_PREFIX)) {
            self.seed_sample_data = parse_bool(&val);
        }
    }

    /// Set a single option by its config file name
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "data_dir" => self.data_dir = PathBuf::from(value),
            "storage_key" => {
                if value.trim().is_empty() {
                    bail!("storage_key must not be empty");
                }
                self.storage_key = value.trim().to_string();
            }
            "seed_sample_data" => self.seed_sample_data = parse_bool(value),
            "log_file" => {
                self.log_file = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                }
            }
            other => bail!(
                "Unknown config key '{}'. Valid: data_dir, storage_key, seed_sample_data, log_file",
                other
            ),
        }
        Ok(())
    }

    /// Save configuration to the default config file
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_file_path())
    }

    /// Save configuration to `path`
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with VOOZAA_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("voozaa")
            .join("config.toml")
    }

    /// Blob store rooted at the data directory
    pub fn blob_store(&self) -> FileBlobStore {
        FileBlobStore::new(&self.data_dir)
    }

    /// Path of the file holding the stored state
    pub fn state_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.json", self.storage_key))
    }
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("voozaa")
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_true() -> bool {
    true
}

fn parse_bool(val: &str) -> bool {
    val.trim().eq_ignore_ascii_case("true") || val.trim() == "1"
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &[
        "VOOZAA_DATA_DIR",
        "VOOZAA_STORAGE_KEY",
        "VOOZAA_SEED_SAMPLE_DATA",
    ];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.storage_key, "voozaa_tracker_v2_state");
        assert!(config.seed_sample_data);
        assert!(config.log_file.is_none());
        assert!(config.data_dir.ends_with("voozaa"));
    }

    #[test]
    fn test_state_path() {
        let config = Config {
            data_dir: PathBuf::from("/data/voozaa"),
            ..Config::default()
        };
        assert_eq!(
            config.state_path(),
            PathBuf::from("/data/voozaa/voozaa_tracker_v2_state.json")
        );
    }

    #[test]
    fn test_env_override_data_dir() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("VOOZAA_DATA_DIR", "/tmp/voozaa-test");
        config.apply_env_overrides();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/voozaa-test"));
    }

    #[test]
    fn test_env_override_storage_key() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("VOOZAA_STORAGE_KEY", "tracker_test");
        config.apply_env_overrides();
        assert_eq!(config.storage_key, "tracker_test");

        // Blank values are ignored
        env::set_var("VOOZAA_STORAGE_KEY", "  ");
        config.apply_env_overrides();
        assert_eq!(config.storage_key, "tracker_test");
    }

    #[test]
    fn test_env_override_seed_sample_data() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("VOOZAA_SEED_SAMPLE_DATA", "false");
        config.apply_env_overrides();
        assert!(!config.seed_sample_data);

        env::set_var("VOOZAA_SEED_SAMPLE_DATA", "1");
        config.apply_env_overrides();
        assert!(config.seed_sample_data);
    }

    #[test]
    fn test_load_from_str() {
        let _guard = EnvGuard::new(ENV_VARS);

        let toml = r#"
            data_dir = "/custom/data"
            storage_key = "custom_key"
            seed_sample_data = false
            log_file = "/tmp/voozaa.log"
        "#;

        let config = Config::load_from_str(toml).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/custom/data"));
        assert_eq!(config.storage_key, "custom_key");
        assert!(!config.seed_sample_data);
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/voozaa.log")));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config::load_from_str("seed_sample_data = false").unwrap();
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
        assert!(config.data_dir.ends_with("voozaa"));
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);

        let path = PathBuf::from("/nonexistent/config.toml");
        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_reload() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.set("storage_key", "other_state").unwrap();
        config.set("seed_sample_data", "false").unwrap();
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_set_rejects_unknown_and_blank() {
        let mut config = Config::default();
        assert!(config.set("sync_url", "x").is_err());
        assert!(config.set("storage_key", " ").is_err());

        config.set("log_file", "/tmp/log").unwrap();
        assert!(config.log_file.is_some());
        config.set("log_file", "").unwrap();
        assert!(config.log_file.is_none());
    }
}
