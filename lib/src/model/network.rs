use rand::Rng;

use super::{sigmoid, sigmoid_derivative, Example, Trainer, TrainingConfig, TrainingSummary, WeightMatrix};
use crate::{progress::ProgressSink, Error, Result};

/// Activations produced by one forward pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardPass {
  pub hidden: Vec<f64>,
  pub output: f64,
}

/// Single-hidden-layer sigmoid network with one output unit and no biases.
#[derive(Debug, Clone, PartialEq)]
pub struct NeuralNetwork {
  config: TrainingConfig,
  weights_ih: WeightMatrix,
  weights_ho: WeightMatrix,
}

impl NeuralNetwork {
  /// Fresh network with Xavier-uniform weights drawn from `rng`.
  pub fn new<R: Rng + ?Sized>(config: TrainingConfig, rng: &mut R) -> Result<Self> {
    config.validate()?;
    let weights_ih = WeightMatrix::xavier(config.input_size, config.hidden_size, rng);
    let weights_ho = WeightMatrix::xavier(config.hidden_size, config.output_size, rng);
    Ok(Self {
      config,
      weights_ih,
      weights_ho,
    })
  }

  pub fn from_weights(
    config: TrainingConfig,
    weights_ih: WeightMatrix,
    weights_ho: WeightMatrix,
  ) -> Result<Self> {
    config.validate()?;
    let mut network = Self {
      weights_ih: WeightMatrix::zeros(config.input_size, config.hidden_size),
      weights_ho: WeightMatrix::zeros(config.hidden_size, config.output_size),
      config,
    };
    network.load_weights(weights_ih, weights_ho)?;
    Ok(network)
  }

  pub fn config(&self) -> &TrainingConfig {
    &self.config
  }

  pub fn weights_ih(&self) -> &WeightMatrix {
    &self.weights_ih
  }

  pub fn weights_ho(&self) -> &WeightMatrix {
    &self.weights_ho
  }

  /// Throws away the current weights and draws new ones.
  pub fn reinitialize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
    self.weights_ih = WeightMatrix::xavier(self.config.input_size, self.config.hidden_size, rng);
    self.weights_ho = WeightMatrix::xavier(self.config.hidden_size, self.config.output_size, rng);
  }

  /// Replaces both matrices wholesale. Nothing changes unless both have the expected shape.
  pub fn load_weights(&mut self, weights_ih: WeightMatrix, weights_ho: WeightMatrix) -> Result<()> {
    check_shape(
      "input-to-hidden weights",
      (self.config.input_size, self.config.hidden_size),
      &weights_ih,
    )?;
    check_shape(
      "hidden-to-output weights",
      (self.config.hidden_size, self.config.output_size),
      &weights_ho,
    )?;
    self.weights_ih = weights_ih;
    self.weights_ho = weights_ho;
    Ok(())
  }

  fn check_input(&self, input: &[f64]) -> Result<()> {
    if input.len() == self.config.input_size {
      Ok(())
    } else {
      Err(Error::InvalidInput {
        expected: self.config.input_size,
        actual: input.len(),
      })
    }
  }

  pub fn forward(&self, input: &[f64]) -> Result<ForwardPass> {
    self.check_input(input)?;
    let hidden: Vec<f64> = (0..self.config.hidden_size)
      .map(|j| {
        let z: f64 = input
          .iter()
          .enumerate()
          .map(|(k, x)| x * self.weights_ih[(k, j)])
          .sum();
        sigmoid(z)
      })
      .collect();
    let z: f64 = hidden
      .iter()
      .enumerate()
      .map(|(j, h)| h * self.weights_ho[(j, 0)])
      .sum();
    Ok(ForwardPass {
      hidden,
      output: sigmoid(z),
    })
  }

  /// Raw network output in `[0, 1]` (or NaN once the weights have diverged).
  pub fn predict(&self, input: &[f64]) -> Result<f64> {
    Ok(self.forward(input)?.output)
  }

  /// One online update. Returns the squared error measured before the update.
  ///
  /// Each hidden unit's delta is `error * sigmoid_derivative(output) * w_ho[j]`, taken from the
  /// activated output and the hidden-to-output weight as it was before this example. That same
  /// delta moves both `w_ho[j]` and the column `w_ih[.., j]` (scaled by
  /// `sigmoid_derivative(hidden[j])`). This is not textbook backpropagation and must stay as is:
  /// trained weights produced elsewhere depend on it.
  pub fn train_one_example(&mut self, input: &[f64], target: f64) -> Result<f64> {
    let ForwardPass { hidden, output } = self.forward(input)?;
    let error = target - output;
    let output_slope = sigmoid_derivative(output);
    let deltas: Vec<f64> = (0..self.config.hidden_size)
      .map(|j| error * output_slope * self.weights_ho[(j, 0)])
      .collect();

    let learning_rate = self.config.learning_rate;
    for (j, delta) in deltas.iter().enumerate() {
      let hidden_slope = sigmoid_derivative(hidden[j]);
      for (k, x) in input.iter().enumerate() {
        self.weights_ih[(k, j)] += learning_rate * delta * hidden_slope * x;
      }
      self.weights_ho[(j, 0)] += learning_rate * delta;
    }
    Ok(error * error)
  }

  /// One pass over `dataset` in order. Returns the summed squared error.
  pub fn train_epoch(&mut self, dataset: &[Example]) -> Result<f64> {
    let mut loss = 0.0;
    for example in dataset {
      loss += self.train_one_example(&example.input, example.label)?;
    }
    Ok(loss)
  }

  /// Runs `epochs` epochs over `dataset`, reporting progress at the configured cadence.
  pub fn train(
    &mut self,
    dataset: &[Example],
    epochs: usize,
    progress: &mut dyn ProgressSink,
  ) -> Result<TrainingSummary> {
    Trainer::new(self.config.clone().with_epochs(epochs)).run(self, dataset, progress)
  }
}

fn check_shape(name: &str, expected: (usize, usize), matrix: &WeightMatrix) -> Result<()> {
  if matrix.shape() == expected {
    Ok(())
  } else {
    Err(Error::ShapeMismatch {
      name: name.to_string(),
      expected,
      actual: matrix.shape(),
    })
  }
}
