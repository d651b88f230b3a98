use std::{
  error::Error,
  path::{Path, PathBuf},
};

use serde::Deserialize;
use tagnet::model::TrainingConfig;

pub const DEFAULT_WEIGHTS_DIR: &str = "weights";

/// Settings from the config file and the command line. Every field is optional; missing ones
/// fall back to the network's defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
  pub epochs: Option<usize>,
  pub learning_rate: Option<f64>,
  pub progress_interval: Option<usize>,
  pub seed: Option<u64>,
  /// Stop after this many failed verifications instead of retrying forever
  pub max_attempts: Option<usize>,
  /// Directory holding the persisted weight matrices
  pub weights_dir: Option<PathBuf>,
}

impl AppConfig {
  pub fn from_file(path: &Path) -> Result<Self, Box<dyn Error>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&content)?)
  }

  // merge configs where the second overwrites the first
  pub fn merge(self, other: Self) -> Self {
    Self {
      epochs: other.epochs.or(self.epochs),
      learning_rate: other.learning_rate.or(self.learning_rate),
      progress_interval: other.progress_interval.or(self.progress_interval),
      seed: other.seed.or(self.seed),
      max_attempts: other.max_attempts.or(self.max_attempts),
      weights_dir: other.weights_dir.or(self.weights_dir),
    }
  }

  pub fn training_config(&self) -> TrainingConfig {
    let defaults = TrainingConfig::default();
    TrainingConfig {
      epochs: self.epochs.unwrap_or(defaults.epochs),
      learning_rate: self.learning_rate.unwrap_or(defaults.learning_rate),
      progress_interval: self.progress_interval.unwrap_or(defaults.progress_interval),
      ..defaults
    }
  }

  pub fn weights_dir(&self) -> PathBuf {
    self
      .weights_dir
      .clone()
      .unwrap_or_else(|| PathBuf::from(DEFAULT_WEIGHTS_DIR))
  }
}
