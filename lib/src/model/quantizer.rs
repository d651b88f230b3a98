use std::fmt;

use serde::{Deserialize, Serialize};

use super::LABELS;

/// A raw network output snapped onto the label set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Prediction {
  Label(f64),
  /// The raw output was NaN or infinite. Never matches any label.
  Indeterminate,
}

impl Prediction {
  pub fn label(&self) -> Option<f64> {
    match self {
      Prediction::Label(label) => Some(*label),
      Prediction::Indeterminate => None,
    }
  }

  /// Exact comparison against a stored label.
  pub fn matches(&self, label: f64) -> bool {
    matches!(self, Prediction::Label(l) if *l == label)
  }
}

impl fmt::Display for Prediction {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      Prediction::Label(label) => write!(f, "{label}"),
      Prediction::Indeterminate => write!(f, "indeterminate"),
    }
  }
}

/// Nearest label by absolute distance. `min_by` keeps the first of equal elements, so exact ties
/// resolve to the earlier label in `LABELS`.
pub fn quantize(value: f64) -> Prediction {
  if !value.is_finite() {
    return Prediction::Indeterminate;
  }
  LABELS
    .iter()
    .copied()
    .min_by(|a, b| (value - a).abs().total_cmp(&(value - b).abs()))
    .map_or(Prediction::Indeterminate, Prediction::Label)
}
