use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::data::datetime::timestamp_now;
use crate::error::{ForgeError, Result};
use crate::processing::statistics::StdConvention;
use crate::state::envelope::StatsEnvelope;

const STATS_SUFFIX: &str = ".stats.json";

/// Statistics as written next to a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredStats {
    pub dataset_id: String,
    /// File name the dataset was loaded from.
    pub source: String,
    /// RFC 3339 UTC time of computation.
    pub computed_at: String,
    pub std_convention: StdConvention,
    pub envelope: StatsEnvelope,
}

impl StoredStats {
    pub fn new(
        dataset_id: impl Into<String>,
        source: impl Into<String>,
        std_convention: StdConvention,
        envelope: StatsEnvelope,
    ) -> Self {
        Self {
            dataset_id: dataset_id.into(),
            source: source.into(),
            computed_at: timestamp_now(),
            std_convention,
            envelope,
        }
    }
}

/// Side-channel directory of stored statistics, one file per dataset id.
#[derive(Debug, Clone)]
pub struct StatsStore {
    dir: PathBuf,
}

impl StatsStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the stats file for `dataset_id`.
    pub fn path_for(&self, dataset_id: &str) -> Result<PathBuf> {
        validate_dataset_id(dataset_id)?;
        Ok(self.dir.join(format!("{dataset_id}{STATS_SUFFIX}")))
    }

    /// Write the record as pretty JSON, creating the directory if needed.
    pub fn save(&self, stats: &StoredStats) -> Result<PathBuf> {
        let path = self.path_for(&stats.dataset_id)?;
        std::fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(stats)?;
        std::fs::write(&path, json)?;
        tracing::info!("Statistics for '{}' saved to {:?}", stats.dataset_id, path);
        Ok(path)
    }

    pub fn load(&self, dataset_id: &str) -> Result<StoredStats> {
        let path = self.path_for(dataset_id)?;
        let json = match std::fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ForgeError::NotFound(format!(
                    "no statistics stored for dataset '{dataset_id}'"
                )));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&json)?)
    }

    /// Remove stored statistics; returns whether a file existed.
    pub fn remove(&self, dataset_id: &str) -> Result<bool> {
        let path = self.path_for(dataset_id)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// Ids become file names: ASCII letters, digits, `_`, `-`, `.`, not
/// starting with a dot.
pub fn validate_dataset_id(id: &str) -> Result<()> {
    let valid = !id.is_empty()
        && !id.starts_with('.')
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(ForgeError::InvalidDatasetId(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_ids() {
        assert!(validate_dataset_id("sales_2024-q1.v2").is_ok());
        assert!(validate_dataset_id("").is_err());
        assert!(validate_dataset_id("..").is_err());
        assert!(validate_dataset_id(".hidden").is_err());
        assert!(validate_dataset_id("a/b").is_err());
        assert!(validate_dataset_id("a b").is_err());
    }

    #[test]
    fn path_is_keyed_by_id() {
        let store = StatsStore::new("/tmp/stats");
        assert_eq!(
            store.path_for("sales").unwrap(),
            PathBuf::from("/tmp/stats/sales.stats.json")
        );
    }
}
