use serde::Serialize;
use tracing::info;

use crate::{
  model::{quantize, Input, NeuralNetwork, Prediction},
  store::{load_network, WeightStore},
  Result,
};

/// One input with its raw and quantized prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRow {
  pub input: Input,
  pub raw: f64,
  pub prediction: Prediction,
}

/// A network used only for inference. Stored weights are pulled in on first use unless the
/// session was built from an already-trained network.
#[derive(Debug, Clone)]
pub struct InferenceSession {
  network: NeuralNetwork,
  weights_loaded: bool,
}

impl InferenceSession {
  /// Session whose weights still have to come from a store.
  pub fn new(network: NeuralNetwork) -> Self {
    Self {
      network,
      weights_loaded: false,
    }
  }

  /// Session over weights that are already the ones to use.
  pub fn trained(network: NeuralNetwork) -> Self {
    Self {
      network,
      weights_loaded: true,
    }
  }

  pub fn weights_loaded(&self) -> bool {
    self.weights_loaded
  }

  pub fn network(&self) -> &NeuralNetwork {
    &self.network
  }

  pub fn ensure_loaded<S: WeightStore + ?Sized>(&mut self, store: &S) -> Result<()> {
    if !self.weights_loaded {
      load_network(store, &mut self.network)?;
      self.weights_loaded = true;
      info!("loaded stored weights for inference");
    }
    Ok(())
  }

  pub fn predict_row(&self, input: Input) -> Result<PredictionRow> {
    let raw = self.network.predict(&input)?;
    Ok(PredictionRow {
      input,
      raw,
      prediction: quantize(raw),
    })
  }

  /// Predicts every input in order, loading weights from `store` first if needed.
  pub fn predict_all<S: WeightStore + ?Sized>(
    &mut self,
    store: &S,
    inputs: Vec<Input>,
  ) -> Result<Vec<PredictionRow>> {
    self.ensure_loaded(store)?;
    inputs.into_iter().map(|input| self.predict_row(input)).collect()
  }
}
