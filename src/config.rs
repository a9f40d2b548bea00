use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ForgeError, Result};
use crate::processing::statistics::StdConvention;

pub const ENV_DATA_DIR: &str = "DATAFORGE_DATA_DIR";
pub const ENV_STATS_DIR: &str = "DATAFORGE_STATS_DIR";

/// Default upload limit, 16 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 16 * 1024 * 1024;

/// Settings shared by the loader, aggregator and store.
///
/// Missing fields in a config file fall back to [`Config::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory scanned for dataset files.
    pub data_dir: PathBuf,
    /// Directory where computed statistics are stored.
    pub stats_dir: PathBuf,
    /// Largest dataset file accepted, in bytes.
    pub max_file_size: u64,
    pub std_convention: StdConvention,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            stats_dir: PathBuf::from("./data/stats"),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            std_convention: StdConvention::default(),
        }
    }
}

impl Config {
    /// Defaults, then the JSON file at `path` if given, then environment
    /// overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| ForgeError::Config(format!("cannot read {path:?}: {e}")))?;
        serde_json::from_str(&json)
            .map_err(|e| ForgeError::Config(format!("cannot parse {path:?}: {e}")))
    }

    /// Apply directory overrides from an environment lookup.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup(ENV_STATS_DIR).filter(|v| !v.is_empty()) {
            self.stats_dir = PathBuf::from(dir);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_file_size == 0 {
            return Err(ForgeError::Config("max_file_size must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"std_convention": "population"}"#).unwrap();
        assert_eq!(config.std_convention, StdConvention::Population);
        assert_eq!(config.max_file_size, DEFAULT_MAX_FILE_SIZE);
        assert_eq!(config.data_dir, PathBuf::from("./data"));
    }

    #[test]
    fn env_overrides_directories() {
        let mut config = Config::default();
        config.apply_env(|key| match key {
            ENV_DATA_DIR => Some("/srv/uploads".to_string()),
            ENV_STATS_DIR => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.data_dir, PathBuf::from("/srv/uploads"));
        assert_eq!(config.stats_dir, PathBuf::from("./data/stats"));
    }

    #[test]
    fn zero_size_limit_is_invalid() {
        let config = Config {
            max_file_size: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ForgeError::Config(_))));
    }

    #[test]
    fn unknown_convention_is_rejected() {
        assert!(serde_json::from_str::<Config>(r#"{"std_convention": "median"}"#).is_err());
    }
}
