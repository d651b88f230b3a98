//! Outer train / persist / verify loop.
//!
//! ```text
//! Training --> Verifying --> Succeeded
//!    ^             |
//!    |             v
//!    +-------- Retraining
//! ```
//!
//! Without a cap the loop runs until every training example is predicted exactly, which may be
//! never (for instance when one input carries two different labels).

use rand::Rng;
use tracing::{info, instrument, warn};

use crate::{
  dataset::DatasetSource,
  model::{quantize, Dataset, NeuralNetwork, Trainer, TrainingConfig},
  progress::ProgressSink,
  store::{clear_network, load_network, save_network, WeightStore},
  Result,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
  /// Next step fetches the dataset, trains and persists the weights.
  Training,
  /// Next step reloads the persisted weights and checks every training example.
  Verifying,
  /// Verification failed and the store was cleared; next step draws fresh weights.
  Retraining,
  Succeeded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvergenceOutcome {
  Succeeded { attempts: usize },
  /// Only reachable with [`ConvergenceSupervisor::with_max_attempts`].
  GaveUp { attempts: usize },
}

pub struct ConvergenceSupervisor<D, S, R> {
  source: D,
  store: S,
  rng: R,
  trainer: Trainer,
  network: NeuralNetwork,
  dataset: Dataset,
  state: SupervisorState,
  attempts: usize,
  max_attempts: Option<usize>,
}

impl<D: DatasetSource, S: WeightStore, R: Rng> ConvergenceSupervisor<D, S, R> {
  pub fn new(config: TrainingConfig, source: D, store: S, mut rng: R) -> Result<Self> {
    let network = NeuralNetwork::new(config.clone(), &mut rng)?;
    Ok(Self {
      source,
      store,
      rng,
      trainer: Trainer::new(config),
      network,
      dataset: Dataset::new(),
      state: SupervisorState::Training,
      attempts: 0,
      max_attempts: None,
    })
  }

  /// Stop with [`ConvergenceOutcome::GaveUp`] after `max_attempts` failed verifications.
  pub fn with_max_attempts(self, max_attempts: usize) -> Self {
    Self {
      max_attempts: Some(max_attempts),
      ..self
    }
  }

  pub fn state(&self) -> SupervisorState {
    self.state
  }

  /// Training attempts whose weights were persisted.
  pub fn attempts(&self) -> usize {
    self.attempts
  }

  pub fn network(&self) -> &NeuralNetwork {
    &self.network
  }

  pub fn store(&self) -> &S {
    &self.store
  }

  pub fn into_network(self) -> NeuralNetwork {
    self.network
  }

  /// Performs one transition and returns the new state. An error leaves the state unchanged, so
  /// a failed save never moves on to verification.
  pub fn step(&mut self, progress: &mut dyn ProgressSink) -> Result<SupervisorState> {
    self.state = match self.state {
      SupervisorState::Training => self.train(progress)?,
      SupervisorState::Verifying => self.verify()?,
      SupervisorState::Retraining => {
        self.network.reinitialize(&mut self.rng);
        SupervisorState::Training
      }
      SupervisorState::Succeeded => SupervisorState::Succeeded,
    };
    Ok(self.state)
  }

  /// Steps until success, or until the attempt cap is hit.
  #[instrument(level = "info", skip_all, fields(max_attempts = ?self.max_attempts))]
  pub fn run(&mut self, progress: &mut dyn ProgressSink) -> Result<ConvergenceOutcome> {
    loop {
      match self.step(progress)? {
        SupervisorState::Succeeded => {
          info!(
            attempts = self.attempts,
            "Training succeeded and predictions match the expected outputs"
          );
          return Ok(ConvergenceOutcome::Succeeded {
            attempts: self.attempts,
          });
        }
        SupervisorState::Retraining if self.max_attempts.is_some_and(|max| self.attempts >= max) => {
          warn!(attempts = self.attempts, "giving up without convergence");
          return Ok(ConvergenceOutcome::GaveUp {
            attempts: self.attempts,
          });
        }
        _ => {}
      }
    }
  }

  /// An attempt only counts once its weights are persisted. A failed attempt leaves fresh weights
  /// behind, so the next step never resumes from a half-trained network.
  fn train(&mut self, progress: &mut dyn ProgressSink) -> Result<SupervisorState> {
    let attempt = self.attempts + 1;
    if let Err(e) = self.train_and_save(attempt, progress) {
      warn!(attempt, "training attempt failed: {e}");
      self.network.reinitialize(&mut self.rng);
      return Err(e);
    }
    self.attempts = attempt;
    Ok(SupervisorState::Verifying)
  }

  fn train_and_save(&mut self, attempt: usize, progress: &mut dyn ProgressSink) -> Result<()> {
    self.dataset = self.source.fetch_training_examples()?;
    info!(attempt, examples = self.dataset.len(), "training attempt");
    self.trainer.run(&mut self.network, &self.dataset, progress)?;
    save_network(&mut self.store, &self.network)
  }

  fn verify(&mut self) -> Result<SupervisorState> {
    load_network(&self.store, &mut self.network)?;
    let mut mismatches = 0;
    for example in &self.dataset {
      let prediction = quantize(self.network.predict(&example.input)?);
      if !prediction.matches(example.label) {
        mismatches += 1;
      }
    }
    if mismatches == 0 {
      return Ok(SupervisorState::Succeeded);
    }
    info!(
      attempt = self.attempts,
      mismatches,
      examples = self.dataset.len(),
      "predictions do not match, clearing stored weights"
    );
    clear_network(&mut self.store)?;
    Ok(SupervisorState::Retraining)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    dataset::InMemoryDataset,
    model::{Example, Prediction, WeightMatrix},
    progress::NoProgress,
    store::{MemoryWeightStore, INPUT_HIDDEN_WEIGHTS},
    utils::init_logging_tests,
    Error,
  };
  use rand::{rngs::StdRng, SeedableRng};

  fn quick_config() -> TrainingConfig {
    TrainingConfig {
      epochs: 20,
      progress_interval: 5,
      ..TrainingConfig::default()
    }
  }

  fn supervisor(
    examples: Vec<Example>,
    seed: u64,
  ) -> ConvergenceSupervisor<InMemoryDataset, MemoryWeightStore, StdRng> {
    ConvergenceSupervisor::new(
      quick_config(),
      InMemoryDataset::from(examples),
      MemoryWeightStore::default(),
      StdRng::seed_from_u64(seed),
    )
    .unwrap()
  }

  fn contradictory() -> Vec<Example> {
    vec![
      Example::new(vec![0.3; 6], 0.25),
      Example::new(vec![0.3; 6], 1.0),
    ]
  }

  #[test]
  fn walks_the_state_machine() {
    let _scope = init_logging_tests();
    let mut sup = supervisor(contradictory(), 1);
    assert_eq!(sup.state(), SupervisorState::Training);
    assert_eq!(sup.step(&mut NoProgress).unwrap(), SupervisorState::Verifying);
    assert!(sup.store().contains(INPUT_HIDDEN_WEIGHTS));
    assert_eq!(sup.step(&mut NoProgress).unwrap(), SupervisorState::Retraining);
    assert!(sup.store().is_empty());

    let before = sup.network().clone();
    assert_eq!(sup.step(&mut NoProgress).unwrap(), SupervisorState::Training);
    assert_ne!(sup.network(), &before);
    assert_eq!(sup.attempts(), 1);
  }

  #[test]
  fn contradictory_labels_never_succeed() {
    let mut sup = supervisor(contradictory(), 2);
    for _ in 0..30 {
      assert_ne!(sup.step(&mut NoProgress).unwrap(), SupervisorState::Succeeded);
    }
    assert_eq!(sup.attempts(), 10);
  }

  #[test]
  fn cap_turns_the_endless_loop_into_a_give_up() {
    let mut sup = supervisor(contradictory(), 3).with_max_attempts(4);
    let outcome = sup.run(&mut NoProgress).unwrap();
    assert_eq!(outcome, ConvergenceOutcome::GaveUp { attempts: 4 });
    assert!(sup.store().is_empty());
  }

  #[test]
  fn consistent_single_example_converges() {
    let _scope = init_logging_tests();
    let examples = vec![Example::new(vec![0.0; 6], 0.5)];
    let mut sup = supervisor(examples, 4).with_max_attempts(50);
    let mut reports = vec![];
    let outcome = sup.run(&mut |p: f64| reports.push(p)).unwrap();

    let ConvergenceOutcome::Succeeded { attempts } = outcome else {
      panic!("expected convergence, got {outcome:?}");
    };
    assert!(attempts >= 1);
    assert_eq!(reports.len(), 4 * attempts);
    assert_eq!(sup.state(), SupervisorState::Succeeded);
    assert_eq!(sup.step(&mut NoProgress).unwrap(), SupervisorState::Succeeded);

    let stored = sup.store().load(INPUT_HIDDEN_WEIGHTS).unwrap();
    assert_eq!(&stored, sup.network().weights_ih());
    let prediction = quantize(sup.network().predict(&[0.0; 6]).unwrap());
    assert_eq!(prediction, Prediction::Label(0.5));
  }

  #[test]
  fn empty_dataset_is_trivially_converged() {
    let mut sup = supervisor(vec![], 5);
    let outcome = sup.run(&mut NoProgress).unwrap();
    assert_eq!(outcome, ConvergenceOutcome::Succeeded { attempts: 1 });
  }

  struct BrokenStore;

  impl WeightStore for BrokenStore {
    fn save(&mut self, name: &str, _matrix: &WeightMatrix) -> Result<()> {
      Err(Error::Storage(format!("cannot reach the store to write {name}")))
    }

    fn load(&self, name: &str) -> Result<WeightMatrix> {
      Err(Error::Storage(format!("cannot reach the store to read {name}")))
    }

    fn clear(&mut self, _name: &str) -> Result<()> {
      Ok(())
    }
  }

  #[test]
  fn failed_save_never_reaches_verification() {
    let mut sup = ConvergenceSupervisor::new(
      quick_config(),
      InMemoryDataset::from(vec![Example::new(vec![0.0; 6], 0.5)]),
      BrokenStore,
      StdRng::seed_from_u64(6),
    )
    .unwrap();
    assert!(matches!(sup.step(&mut NoProgress), Err(Error::Storage(_))));
    assert_eq!(sup.state(), SupervisorState::Training);
    assert_eq!(sup.attempts(), 0);
    assert!(matches!(sup.run(&mut NoProgress), Err(Error::Storage(_))));
  }

  /// Refuses the first `failures` saves, then behaves like a memory store.
  struct FlakyStore {
    failures: usize,
    inner: MemoryWeightStore,
  }

  impl WeightStore for FlakyStore {
    fn save(&mut self, name: &str, matrix: &WeightMatrix) -> Result<()> {
      if self.failures > 0 {
        self.failures -= 1;
        return Err(Error::Storage(format!("write of {name} timed out")));
      }
      self.inner.save(name, matrix)
    }

    fn load(&self, name: &str) -> Result<WeightMatrix> {
      self.inner.load(name)
    }

    fn clear(&mut self, name: &str) -> Result<()> {
      self.inner.clear(name)
    }
  }

  #[test]
  fn failed_attempt_restarts_from_fresh_weights() {
    let _scope = init_logging_tests();
    let seed = 8;
    let store = FlakyStore {
      failures: 1,
      inner: MemoryWeightStore::default(),
    };
    let mut sup = ConvergenceSupervisor::new(
      quick_config(),
      InMemoryDataset::from(vec![Example::new(vec![0.4; 6], 0.75)]),
      store,
      StdRng::seed_from_u64(seed),
    )
    .unwrap();
    assert!(matches!(sup.step(&mut NoProgress), Err(Error::Storage(_))));
    assert_eq!(sup.attempts(), 0);

    // training draws nothing from the rng, so the recovery weights are the second draw
    let mut rng = StdRng::seed_from_u64(seed);
    let mut expected = NeuralNetwork::new(quick_config(), &mut rng).unwrap();
    expected.reinitialize(&mut rng);
    assert_eq!(sup.network(), &expected);

    assert_eq!(sup.step(&mut NoProgress).unwrap(), SupervisorState::Verifying);
    assert_eq!(sup.attempts(), 1);
  }

  #[test]
  fn bad_inputs_surface_from_training() {
    let mut sup = supervisor(vec![Example::new(vec![0.0; 4], 0.5)], 7);
    assert!(matches!(
      sup.step(&mut NoProgress),
      Err(Error::InvalidInput { expected: 6, actual: 4 })
    ));
  }
}
