/// Logistic function.
pub fn sigmoid(x: f64) -> f64 {
  1.0 / (1.0 + (-x).exp())
}

/// Slope of the logistic function at `x`. Recomputes `sigmoid(x)` rather than taking an
/// already-activated value, so callers passing activations get the slope at that activation.
pub fn sigmoid_derivative(x: f64) -> f64 {
  let s = sigmoid(x);
  s * (1.0 - s)
}

#[cfg(test)]
mod tests {
  use super::*;
  use proptest::prelude::*;

  #[test]
  fn known_values() {
    assert_eq!(sigmoid(0.0), 0.5);
    assert_eq!(sigmoid_derivative(0.0), 0.25);
    assert!((sigmoid(1.0) - 0.731_058_578_630_004_9).abs() < 1e-15);
  }

  #[test]
  fn saturates_at_extremes() {
    assert_eq!(sigmoid(1000.0), 1.0);
    assert_eq!(sigmoid(-1000.0), 0.0);
    assert_eq!(sigmoid_derivative(1000.0), 0.0);
    assert_eq!(sigmoid_derivative(-1000.0), 0.0);
  }

  #[test]
  fn derivative_takes_the_raw_argument() {
    let output = sigmoid(2.0);
    assert_eq!(sigmoid_derivative(output), sigmoid(output) * (1.0 - sigmoid(output)));
    assert_ne!(sigmoid_derivative(output), output * (1.0 - output));
  }

  proptest! {
    #[test]
    fn sigmoid_stays_in_unit_interval(x in -50.0..50.0f64) {
      let s = sigmoid(x);
      prop_assert!(s > 0.0 && s < 1.0);
      prop_assert!((s + sigmoid(-x) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn derivative_is_bounded(x in -1e6..1e6f64) {
      let d = sigmoid_derivative(x);
      prop_assert!((0.0..=0.25).contains(&d));
    }
  }
}
