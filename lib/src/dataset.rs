use std::path::{Path, PathBuf};

use crate::{
  model::{parse_prediction_inputs, read_dataset, read_to_string, Dataset, Input, INPUT_DIMENSION},
  Result,
};

/// Where labeled examples and unlabeled inputs come from.
pub trait DatasetSource {
  fn fetch_training_examples(&self) -> Result<Dataset>;
  fn fetch_prediction_inputs(&self) -> Result<Vec<Input>>;
}

/// Examples held in memory. Prediction inputs are the example inputs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDataset {
  examples: Dataset,
}

impl InMemoryDataset {
  pub fn new(examples: Dataset) -> Self {
    Self { examples }
  }
}

impl From<Dataset> for InMemoryDataset {
  fn from(examples: Dataset) -> Self {
    Self::new(examples)
  }
}

impl DatasetSource for InMemoryDataset {
  fn fetch_training_examples(&self) -> Result<Dataset> {
    Ok(self.examples.clone())
  }

  fn fetch_prediction_inputs(&self) -> Result<Vec<Input>> {
    Ok(self.examples.iter().map(|e| e.input.clone()).collect())
  }
}

/// A text file of `X Y Up Down Right Left Tag` rows, re-read on every fetch.
#[derive(Debug, Clone)]
pub struct TextDatasetSource {
  path: PathBuf,
  input_size: usize,
}

impl TextDatasetSource {
  pub fn new(path: &Path) -> Self {
    Self {
      path: PathBuf::from(path),
      input_size: INPUT_DIMENSION,
    }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }
}

impl DatasetSource for TextDatasetSource {
  fn fetch_training_examples(&self) -> Result<Dataset> {
    read_dataset(&self.path, self.input_size)
  }

  fn fetch_prediction_inputs(&self) -> Result<Vec<Input>> {
    parse_prediction_inputs(&read_to_string(&self.path)?, self.input_size)
  }
}
