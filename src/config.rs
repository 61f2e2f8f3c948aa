//! Study configuration.
//!
//! Loaded from a TOML file; missing keys fall back to the defaults.
//!
//! ```toml
//! dataset = "data/retail.txt"
//! support = 0.01
//! schedule = [100, 50, 10, 1]
//! algorithms = ["apriori", "pcy"]
//! parallel = false
//! top = 5
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{MiningError, Result};
use crate::round::Algorithm;
use crate::support::check_fraction;

/// Dataset sizes, in percent of the full dataset, visited by a study.
pub const DEFAULT_SCHEDULE: [u32; 12] = [100, 90, 80, 70, 60, 50, 40, 30, 20, 10, 5, 1];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyConfig {
    /// Dataset file, one basket per line
    pub dataset: PathBuf,

    /// Support threshold as a fraction of the baskets scanned
    pub support: f64,

    /// Percentages of the dataset, first entry must be 100
    pub schedule: Vec<u32>,

    /// Algorithms to benchmark, in order
    pub algorithms: Vec<Algorithm>,

    /// Load the dataset into memory and shard each pass across threads
    pub parallel: bool,

    /// Highest-count frequent pairs to report per round
    pub top: usize,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            dataset: PathBuf::from("retail.txt"),
            support: 0.01,
            schedule: DEFAULT_SCHEDULE.to_vec(),
            algorithms: vec![Algorithm::Apriori, Algorithm::Pcy],
            parallel: false,
            top: 0,
        }
    }
}

impl StudyConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> std::result::Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e.to_string()))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        check_fraction(self.support)?;

        if self.algorithms.is_empty() {
            return Err(MiningError::invalid("no algorithm selected"));
        }
        match self.schedule.first() {
            None => return Err(MiningError::invalid("schedule is empty")),
            Some(&first) if first != 100 => {
                return Err(MiningError::invalid(format!(
                    "schedule must start at 100%, got {}%",
                    first
                )))
            }
            Some(_) => {}
        }
        if let Some(bad) = self.schedule.iter().find(|&&p| p == 0 || p > 100) {
            return Err(MiningError::invalid(format!(
                "schedule percentages must be in 1..=100, got {}",
                bad
            )));
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    Io(PathBuf, String),

    #[error("Failed to parse config: {0}")]
    Parse(String),
}
