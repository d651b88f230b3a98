use std::fmt::Display;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("invalid input: expected {expected} values, got {actual}")]
  InvalidInput { expected: usize, actual: usize },

  #[error("index ({row}, {col}) is out of bounds for a {rows}x{cols} matrix")]
  Index {
    row: usize,
    col: usize,
    rows: usize,
    cols: usize,
  },

  #[error("shape mismatch for {name}: expected {expected:?}, got {actual:?}")]
  ShapeMismatch {
    name: String,
    expected: (usize, usize),
    actual: (usize, usize),
  },

  #[error("invalid configuration: {0}")]
  InvalidConfig(String),

  #[error("storage error: {0}")]
  Storage(String),

  #[error("dataset error: {0}")]
  Dataset(String),
}

impl Error {
  pub(crate) fn storage(context: impl Display, cause: impl Display) -> Self {
    Error::Storage(format!("{context}: {cause}"))
  }

  pub(crate) fn dataset(context: impl Display, cause: impl Display) -> Self {
    Error::Dataset(format!("{context}: {cause}"))
  }
}
