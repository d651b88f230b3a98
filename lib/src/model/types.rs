use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub const INPUT_DIMENSION: usize = 6;
pub const HIDDEN_DIMENSION: usize = 20;
pub const OUTPUT_DIMENSION: usize = 1;

/// Labels a prediction can snap to. Order matters: exact ties go to the earlier label.
pub const LABELS: [f64; 4] = [0.25, 0.5, 0.75, 1.0];

/// Named attributes behind the input vector, in positional order.
pub const INPUT_COLUMNS: [&str; INPUT_DIMENSION] = ["X", "Y", "Up", "Down", "Right", "Left"];
pub const LABEL_COLUMN: &str = "Tag";

pub type Input = Vec<f64>;

/// One labeled observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example {
  pub input: Input,
  pub label: f64,
}

impl Example {
  pub fn new(input: impl Into<Input>, label: f64) -> Self {
    Self {
      input: input.into(),
      label,
    }
  }
}

pub type Dataset = Vec<Example>;

/// Hyperparameters and layer sizes. The defaults are the values the network is designed around;
/// tests shrink `epochs` and occasionally raise `learning_rate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
  pub input_size: usize,
  pub hidden_size: usize,
  pub output_size: usize,
  pub learning_rate: f64,
  pub epochs: usize,
  /// Progress is reported after every epoch whose index is a multiple of this.
  pub progress_interval: usize,
}

impl Default for TrainingConfig {
  fn default() -> Self {
    Self {
      input_size: INPUT_DIMENSION,
      hidden_size: HIDDEN_DIMENSION,
      output_size: OUTPUT_DIMENSION,
      learning_rate: 0.0001,
      epochs: 80_000,
      progress_interval: 1_000,
    }
  }
}

impl TrainingConfig {
  pub fn with_epochs(self, epochs: usize) -> Self {
    Self { epochs, ..self }
  }

  pub fn with_learning_rate(self, learning_rate: f64) -> Self {
    Self {
      learning_rate,
      ..self
    }
  }

  pub fn validate(&self) -> Result<()> {
    if self.input_size == 0 || self.hidden_size == 0 {
      return Err(Error::InvalidConfig(format!(
        "layer sizes must be positive, got input={} hidden={}",
        self.input_size, self.hidden_size
      )));
    }
    if self.output_size != OUTPUT_DIMENSION {
      return Err(Error::InvalidConfig(format!(
        "the network has a single output unit, got output_size={}",
        self.output_size
      )));
    }
    if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
      return Err(Error::InvalidConfig(format!(
        "learning rate must be a positive finite number, got {}",
        self.learning_rate
      )));
    }
    if self.progress_interval == 0 {
      return Err(Error::InvalidConfig(
        "progress interval must be at least 1".to_string(),
      ));
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_match_the_designed_network() {
    let config = TrainingConfig::default();
    assert_eq!(config.input_size, 6);
    assert_eq!(config.hidden_size, 20);
    assert_eq!(config.output_size, 1);
    assert_eq!(config.learning_rate, 0.0001);
    assert_eq!(config.epochs, 80_000);
    assert_eq!(config.progress_interval, 1_000);
    assert!(config.validate().is_ok());
  }

  #[test]
  fn rejects_broken_configs() {
    let base = TrainingConfig::default();
    let broken = [
      TrainingConfig {
        output_size: 2,
        ..base.clone()
      },
      TrainingConfig {
        hidden_size: 0,
        ..base.clone()
      },
      base.clone().with_learning_rate(0.0),
      base.clone().with_learning_rate(f64::NAN),
      TrainingConfig {
        progress_interval: 0,
        ..base.clone()
      },
    ];
    for config in broken {
      assert!(
        matches!(config.validate(), Err(Error::InvalidConfig(_))),
        "{config:?} should be rejected"
      );
    }
  }

  #[test]
  fn partial_config_fills_in_defaults() {
    let config: TrainingConfig = serde_json::from_str(r#"{"epochs": 10}"#).unwrap();
    assert_eq!(config, TrainingConfig::default().with_epochs(10));
  }
}
