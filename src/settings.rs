use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::matching::MatchingConfig;

/// Store locations and matching parameters.
///
/// The directory keys keep the dotted names used by existing deployments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityConfig {
    #[serde(rename = "dir.learned.activities")]
    pub learned_dir: PathBuf,
    #[serde(rename = "dir.classified.activities")]
    pub classified_dir: PathBuf,
    #[serde(rename = "file.extension")]
    pub extension: String,
    pub matching: MatchingConfig,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            learned_dir: PathBuf::from("activities/learned"),
            classified_dir: PathBuf::from("activities/classified"),
            extension: "json".into(),
            matching: MatchingConfig::default(),
        }
    }
}

impl ActivityConfig {
    /// Read settings from a JSON file; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse settings in {}", path.display()))
    }

    /// Defaults with both activity directories placed under `root`.
    pub fn with_root(root: &Path) -> Self {
        Self {
            learned_dir: root.join("learned"),
            classified_dir: root.join("classified"),
            ..Self::default()
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let serialized = serde_json::to_string_pretty(self)?;
        fs::write(path, serialized)
            .with_context(|| format!("Failed to write settings to {}", path.display()))
    }
}
