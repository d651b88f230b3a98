//! Persistence of the two weight matrices, keyed by `(matrix name, row, col)`.

pub mod json;
pub mod memory;

pub use json::JsonWeightStore;
pub use memory::MemoryWeightStore;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
  model::{NeuralNetwork, WeightMatrix},
  Error, Result,
};

pub const INPUT_HIDDEN_WEIGHTS: &str = "modelweights_ih";
pub const HIDDEN_OUTPUT_WEIGHTS: &str = "modelweights_ho";

pub trait WeightStore {
  /// Replaces whatever is stored under `name`. Implementations refuse NaN entries, so callers
  /// go through [`save_network`] or sanitize first.
  fn save(&mut self, name: &str, matrix: &WeightMatrix) -> Result<()>;

  /// The complete matrix stored under `name`. Missing or partial data is a storage error.
  fn load(&self, name: &str) -> Result<WeightMatrix>;

  /// Removes `name`. Clearing something that is not stored is not an error.
  fn clear(&mut self, name: &str) -> Result<()>;
}

/// One persisted weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightRecord {
  pub row: usize,
  pub col: usize,
  pub weight: f64,
}

pub fn records(matrix: &WeightMatrix) -> Vec<WeightRecord> {
  matrix
    .entries()
    .map(|(row, col, weight)| WeightRecord { row, col, weight })
    .collect()
}

/// Rebuilds a matrix from its records. The shape is taken from the largest indices, and every
/// cell must appear exactly once. Corrupt indices are storage errors, checked before anything is
/// allocated.
pub fn assemble(name: &str, records: impl IntoIterator<Item = WeightRecord>) -> Result<WeightMatrix> {
  let records: Vec<WeightRecord> = records.into_iter().collect();
  let (max_row, max_col) = records
    .iter()
    .map(|r| (r.row, r.col))
    .reduce(|a, b| (a.0.max(b.0), a.1.max(b.1)))
    .ok_or_else(|| Error::Storage(format!("no weights stored under {name}")))?;

  let shape = max_row
    .checked_add(1)
    .zip(max_col.checked_add(1))
    .and_then(|(rows, cols)| Some((rows, cols, rows.checked_mul(cols)?)));
  let (rows, cols) = match shape {
    Some((rows, cols, cells)) if cells == records.len() => (rows, cols),
    Some((rows, cols, cells)) => {
      return Err(Error::Storage(format!(
        "{name} does not fill a {rows}x{cols} matrix: {} of {cells} weights stored",
        records.len()
      )))
    }
    None => {
      return Err(Error::Storage(format!(
        "{name} has an out-of-range index ({max_row}, {max_col})"
      )))
    }
  };

  let mut matrix = WeightMatrix::zeros(rows, cols);
  let mut seen = vec![false; rows * cols];
  for record in &records {
    let cell = record.row * cols + record.col;
    if seen[cell] {
      return Err(Error::Storage(format!(
        "{name} has more than one weight at ({}, {})",
        record.row, record.col
      )));
    }
    seen[cell] = true;
    matrix.set(record.row, record.col, record.weight)?;
  }
  Ok(matrix)
}

/// Persists both matrices of `network`, with NaN weights written as `0.0`.
pub fn save_network<S: WeightStore + ?Sized>(store: &mut S, network: &NeuralNetwork) -> Result<()> {
  for (name, matrix) in [
    (INPUT_HIDDEN_WEIGHTS, network.weights_ih()),
    (HIDDEN_OUTPUT_WEIGHTS, network.weights_ho()),
  ] {
    if matrix.has_nan() {
      warn!("{name} contains NaN weights, persisting them as 0");
    }
    store.save(name, &matrix.sanitized())?;
    debug!(name, shape = ?matrix.shape(), "saved weights");
  }
  Ok(())
}

/// Overwrites the weights of `network` with the stored ones.
pub fn load_network<S: WeightStore + ?Sized>(store: &S, network: &mut NeuralNetwork) -> Result<()> {
  let weights_ih = store.load(INPUT_HIDDEN_WEIGHTS)?;
  let weights_ho = store.load(HIDDEN_OUTPUT_WEIGHTS)?;
  network.load_weights(weights_ih, weights_ho)
}

pub fn clear_network<S: WeightStore + ?Sized>(store: &mut S) -> Result<()> {
  store.clear(INPUT_HIDDEN_WEIGHTS)?;
  store.clear(HIDDEN_OUTPUT_WEIGHTS)
}
