use crate::error::ConfigError;
use crate::models::Score;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings for a scoring session
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// CSV file with question_id, question_text, llm and response columns
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,
    /// Where accumulated scores are written on export
    #[serde(default = "default_export_path")]
    pub export_path: PathBuf,
    /// Score a control starts at before the reviewer touches it (1 to 5)
    #[serde(default = "default_score")]
    pub default_score: i64,
}

fn default_data_path() -> PathBuf {
    PathBuf::from("llm_rag_drift_log_20250410_214712.csv")
}

fn default_export_path() -> PathBuf {
    PathBuf::from("llm_scoring_results.csv")
}

fn default_score() -> i64 {
    i64::from(Score::DEFAULT.value())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            export_path: default_export_path(),
            default_score: default_score(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config: {}", path.display()))?;

        config
            .initial_score()
            .with_context(|| format!("Invalid config: {}", path.display()))?;

        Ok(config)
    }

    /// The configured starting score for untouched controls
    pub fn initial_score(&self) -> Result<Score, ConfigError> {
        Score::new(self.default_score)
            .map_err(|_| ConfigError::InvalidDefaultScore(self.default_score))
    }
}
