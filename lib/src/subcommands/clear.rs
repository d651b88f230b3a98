use std::path::{Path, PathBuf};

use tracing::info;

use crate::store::{clear_network, JsonWeightStore};

pub struct Clear {
  weights_dir: PathBuf,
}

impl Clear {
  pub fn new(weights_dir: &Path) -> Self {
    Self {
      weights_dir: PathBuf::from(weights_dir),
    }
  }

  pub fn run(self) -> crate::Result<()> {
    clear_network(&mut JsonWeightStore::new(&self.weights_dir))?;
    info!("Cleared stored weights in {}", self.weights_dir.display());
    Ok(())
  }
}
