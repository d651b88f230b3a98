use std::{
  error::Error,
  path::{Path, PathBuf},
};

use crate::{
  dataset::{DatasetSource, TextDatasetSource},
  inference::{InferenceSession, PredictionRow},
  model::{NeuralNetwork, TrainingConfig},
  store::JsonWeightStore,
};

pub struct Predict {
  data_path: PathBuf,
  weights_dir: PathBuf,
  config: TrainingConfig,
}

impl Predict {
  pub fn new(data_path: &Path, weights_dir: &Path, config: TrainingConfig) -> Self {
    Self {
      data_path: PathBuf::from(data_path),
      weights_dir: PathBuf::from(weights_dir),
      config,
    }
  }

  pub fn predictions(&self) -> Result<Vec<PredictionRow>, Box<dyn Error>> {
    let store = JsonWeightStore::new(&self.weights_dir);
    let network = NeuralNetwork::new(self.config.clone(), &mut rand::thread_rng())?;
    let mut session = InferenceSession::new(network);
    let inputs = TextDatasetSource::new(&self.data_path).fetch_prediction_inputs()?;
    Ok(session.predict_all(&store, inputs)?)
  }

  /// Prints one JSON object per input row.
  pub fn run(self) -> Result<(), Box<dyn Error>> {
    for row in self.predictions()? {
      println!("{}", serde_json::to_string(&row)?);
    }
    Ok(())
  }
}
