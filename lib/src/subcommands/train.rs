use std::{
  error::Error,
  path::{Path, PathBuf},
};

use rand::{rngs::StdRng, SeedableRng};
use tracing::{info, warn};

use crate::{
  dataset::TextDatasetSource,
  model::TrainingConfig,
  progress::ChannelProgress,
  store::JsonWeightStore,
  supervisor::{ConvergenceOutcome, ConvergenceSupervisor},
};

pub struct Train {
  data_path: PathBuf,
  weights_dir: PathBuf,
  config: TrainingConfig,
  seed: Option<u64>,
  max_attempts: Option<usize>,
}

impl Train {
  pub fn new(
    data_path: &Path,
    weights_dir: &Path,
    config: TrainingConfig,
    seed: Option<u64>,
    max_attempts: Option<usize>,
  ) -> Self {
    Self {
      data_path: PathBuf::from(data_path),
      weights_dir: PathBuf::from(weights_dir),
      config,
      seed,
      max_attempts,
    }
  }

  /// Trains on a blocking thread while a separate task logs progress as it arrives.
  pub async fn run(self) -> Result<ConvergenceOutcome, Box<dyn Error>> {
    let (progress, mut receiver) = ChannelProgress::channel();
    let reporter = tokio::spawn(async move {
      while let Some(percent) = receiver.recv().await {
        info!("Training progress: {percent:.1}%");
      }
    });

    let outcome = tokio::task::spawn_blocking(move || self.supervise(progress)).await??;
    reporter.await?;

    match outcome {
      ConvergenceOutcome::Succeeded { attempts } => {
        info!("Training succeeded after {attempts} attempt(s); predictions match the expected outputs")
      }
      ConvergenceOutcome::GaveUp { attempts } => {
        warn!("No convergence after {attempts} attempt(s); stored weights were cleared")
      }
    }
    Ok(outcome)
  }

  fn supervise(self, mut progress: ChannelProgress) -> crate::Result<ConvergenceOutcome> {
    let rng = match self.seed {
      Some(seed) => StdRng::seed_from_u64(seed),
      None => StdRng::from_entropy(),
    };
    let mut supervisor = ConvergenceSupervisor::new(
      self.config,
      TextDatasetSource::new(&self.data_path),
      JsonWeightStore::new(self.weights_dir),
      rng,
    )?;
    if let Some(max_attempts) = self.max_attempts {
      supervisor = supervisor.with_max_attempts(max_attempts);
    }
    supervisor.run(&mut progress)
  }
}
