use std::{
  io::ErrorKind,
  path::{Path, PathBuf},
};

use tracing::debug;

use super::{assemble, records, WeightRecord, WeightStore};
use crate::{
  model::WeightMatrix,
  utils::{deserialize_from_file, serialize_to_file},
  Error, Result,
};

/// Keeps each matrix as `<dir>/<name>.json`, a list of `{row, col, weight}` records.
#[derive(Debug, Clone)]
pub struct JsonWeightStore {
  dir: PathBuf,
}

impl JsonWeightStore {
  pub fn new(dir: impl Into<PathBuf>) -> Self {
    Self { dir: dir.into() }
  }

  pub fn dir(&self) -> &Path {
    &self.dir
  }

  pub fn path(&self, name: &str) -> PathBuf {
    self.dir.join(format!("{name}.json"))
  }
}

impl WeightStore for JsonWeightStore {
  fn save(&mut self, name: &str, matrix: &WeightMatrix) -> Result<()> {
    // JSON has no representation for NaN or infinities
    if !matrix.is_finite() {
      return Err(Error::Storage(format!(
        "refusing to persist non-finite weights in {name}"
      )));
    }
    std::fs::create_dir_all(&self.dir)
      .map_err(|e| Error::storage(format!("creating {}", self.dir.display()), e))?;
    let path = self.path(name);
    serialize_to_file(&path, &records(matrix))
      .map_err(|e| Error::storage(format!("writing {}", path.display()), e))?;
    debug!(path = %path.display(), "wrote weights");
    Ok(())
  }

  fn load(&self, name: &str) -> Result<WeightMatrix> {
    let path = self.path(name);
    let stored: Vec<WeightRecord> = deserialize_from_file(&path).map_err(|e| match e.kind() {
      ErrorKind::NotFound => Error::Storage(format!("no weights stored under {name}")),
      _ => Error::storage(format!("reading {}", path.display()), e),
    })?;
    assemble(name, stored)
  }

  fn clear(&mut self, name: &str) -> Result<()> {
    let path = self.path(name);
    match std::fs::remove_file(&path) {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
      Err(e) => Err(Error::storage(format!("removing {}", path.display()), e)),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::store::{load_network, save_network, INPUT_HIDDEN_WEIGHTS};
  use crate::model::{NeuralNetwork, TrainingConfig};
  use rand::{rngs::StdRng, SeedableRng};

  #[test]
  fn round_trips_exactly() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = JsonWeightStore::new(dir.path().join("weights"));
    let m = WeightMatrix::from_fn(6, 20, |r, c| (r as f64 - 2.5) / (c as f64 + 3.0));
    store.save(INPUT_HIDDEN_WEIGHTS, &m).unwrap();
    assert!(store.path(INPUT_HIDDEN_WEIGHTS).exists());
    assert_eq!(store.load(INPUT_HIDDEN_WEIGHTS).unwrap(), m);
  }

  #[test]
  fn network_survives_a_reload() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = JsonWeightStore::new(dir.path());
    let mut rng = StdRng::seed_from_u64(21);
    let network = NeuralNetwork::new(TrainingConfig::default(), &mut rng).unwrap();
    save_network(&mut store, &network).unwrap();

    let mut reloaded = NeuralNetwork::new(TrainingConfig::default(), &mut rng).unwrap();
    load_network(&JsonWeightStore::new(dir.path()), &mut reloaded).unwrap();
    assert_eq!(reloaded, network);
  }

  #[test]
  fn missing_and_corrupt_files_are_storage_errors() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = JsonWeightStore::new(dir.path());
    assert!(matches!(store.load("absent"), Err(Error::Storage(_))));

    std::fs::write(store.path("broken"), "[{\"row\": 0, \"col\": 0").unwrap();
    assert!(matches!(store.load("broken"), Err(Error::Storage(_))));

    store.clear("absent").unwrap();
  }

  #[test]
  fn edited_indices_are_storage_errors() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonWeightStore::new(dir.path());
    let cases = [
      r#"[{"row": 18446744073709551615, "col": 0, "weight": 0.0}]"#,
      r#"[{"row": 4294967296, "col": 4294967296, "weight": 0.0}]"#,
      r#"[{"row": 0, "col": 0, "weight": 0.5}, {"row": 999999, "col": 0, "weight": 0.5}]"#,
    ];
    for content in cases {
      std::fs::write(store.path("w"), content).unwrap();
      let result = store.load("w");
      assert!(matches!(result, Err(Error::Storage(_))), "{content} gave {result:?}");
    }
  }

  #[test]
  fn clear_removes_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = JsonWeightStore::new(dir.path());
    store.save("w", &WeightMatrix::zeros(2, 2)).unwrap();
    store.clear("w").unwrap();
    assert!(!store.path("w").exists());
  }

  #[test]
  fn non_finite_weights_are_refused() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = JsonWeightStore::new(dir.path());
    let mut m = WeightMatrix::zeros(2, 2);
    m[(1, 1)] = f64::INFINITY;
    assert!(matches!(store.save("w", &m), Err(Error::Storage(_))));
    assert!(!store.path("w").exists());
  }
}
