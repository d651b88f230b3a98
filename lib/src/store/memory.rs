use std::collections::BTreeMap;

use super::{assemble, WeightRecord, WeightStore};
use crate::{model::WeightMatrix, Error, Result};

/// In-process store. Each weight is its own `(name, row, col)` entry.
#[derive(Debug, Default, Clone)]
pub struct MemoryWeightStore {
  entries: BTreeMap<(String, usize, usize), f64>,
}

impl MemoryWeightStore {
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn contains(&self, name: &str) -> bool {
    self.entries.keys().any(|(n, _, _)| n == name)
  }
}

impl WeightStore for MemoryWeightStore {
  fn save(&mut self, name: &str, matrix: &WeightMatrix) -> Result<()> {
    if matrix.has_nan() {
      return Err(Error::Storage(format!("refusing to persist NaN weights in {name}")));
    }
    self.clear(name)?;
    for (row, col, weight) in matrix.entries() {
      self.entries.insert((name.to_string(), row, col), weight);
    }
    Ok(())
  }

  fn load(&self, name: &str) -> Result<WeightMatrix> {
    let records = self
      .entries
      .iter()
      .filter(|((n, _, _), _)| n == name)
      .map(|(&(_, row, col), &weight)| WeightRecord { row, col, weight });
    assemble(name, records)
  }

  fn clear(&mut self, name: &str) -> Result<()> {
    self.entries.retain(|(n, _, _), _| n != name);
    Ok(())
  }
}
