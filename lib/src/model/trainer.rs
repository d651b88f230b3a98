use std::time::Instant;

use tracing::{debug, info, instrument};

use super::{Example, NeuralNetwork, TrainingConfig};
use crate::{progress::ProgressSink, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSummary {
  pub epochs: usize,
  pub examples: usize,
  /// Mean squared error of the last epoch, measured before each update.
  pub final_loss: f64,
  /// Bias-corrected exponential average of the per-epoch mean squared error.
  pub smoothed_loss: f64,
}

/// Fixed-length training loop. Epoch count and progress cadence come from the trainer's config;
/// the learning rate is the network's own.
#[derive(Debug, Clone)]
pub struct Trainer {
  config: TrainingConfig,
}

/// Percentage reported after epoch index `epoch` of `epochs`.
pub fn progress_percent(epoch: usize, epochs: usize) -> f64 {
  if epochs == 0 {
    return 100.0;
  }
  epoch as f64 / epochs as f64 * 100.0
}

impl Trainer {
  pub fn new(config: TrainingConfig) -> Self {
    Self { config }
  }

  pub fn config(&self) -> &TrainingConfig {
    &self.config
  }

  /// Runs `epochs` full passes over `dataset`. After epoch index `e` with
  /// `e % progress_interval == 0` the sink gets `e / epochs` as a percentage; the sink must not
  /// block.
  #[instrument(level = "debug", skip_all, fields(epochs = self.config.epochs, examples = dataset.len()))]
  pub fn run(
    &self,
    network: &mut NeuralNetwork,
    dataset: &[Example],
    progress: &mut dyn ProgressSink,
  ) -> Result<TrainingSummary> {
    let epochs = self.config.epochs;
    let interval = self.config.progress_interval.max(1);
    let examples = dataset.len().max(1) as f64;

    let mut loss_avg = ExponentialAverage::new(0.0);
    let mut final_loss = 0.0;
    let start = Instant::now();

    for epoch in 0..epochs {
      final_loss = network.train_epoch(dataset)? / examples;
      loss_avg.update(final_loss);
      if epoch % interval == 0 {
        let percent = progress_percent(epoch, epochs);
        debug!(epoch, percent, loss = loss_avg.value, "training progress");
        progress.report(percent);
      }
    }

    if epochs > 0 {
      info!(
        "Finished {epochs} epochs over {} examples in {:.2}s, loss {:.6}",
        dataset.len(),
        start.elapsed().as_secs_f32(),
        loss_avg.value
      );
    }

    Ok(TrainingSummary {
      epochs,
      examples: dataset.len(),
      final_loss,
      smoothed_loss: loss_avg.value,
    })
  }
}

pub struct ExponentialAverage {
  beta: f64,
  moment: f64,
  pub value: f64,
  t: i32,
}

impl ExponentialAverage {
  pub fn new(initial: f64) -> Self {
    ExponentialAverage {
      beta: 0.999,
      moment: 0.,
      value: initial,
      t: 0,
    }
  }

  pub fn update(&mut self, value: f64) {
    self.t = self.t.saturating_add(1);
    self.moment = self.beta * self.moment + (1. - self.beta) * value;
    // bias correction
    self.value = self.moment / (1. - f64::powi(self.beta, self.t));
  }
}
