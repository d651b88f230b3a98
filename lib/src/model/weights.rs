use std::ops::{Index, IndexMut};

use itertools::iproduct;
use rand::{
  distributions::{Distribution, Uniform},
  Rng,
};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Dense row-major matrix of weights. Dimensions are fixed at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightMatrix {
  rows: usize,
  cols: usize,
  data: Vec<f64>,
}

/// Half-width of the Xavier-uniform interval for a `fan_in x fan_out` matrix.
pub fn xavier_bound(fan_in: usize, fan_out: usize) -> f64 {
  (2.0 / (fan_in + fan_out) as f64).sqrt()
}

impl WeightMatrix {
  pub fn zeros(rows: usize, cols: usize) -> Self {
    Self {
      rows,
      cols,
      data: vec![0.0; rows * cols],
    }
  }

  pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
    let data = iproduct!(0..rows, 0..cols).map(|(r, c)| f(r, c)).collect();
    Self { rows, cols, data }
  }

  /// Xavier-uniform initialization: every entry is drawn from `[-b, b]` with
  /// `b = sqrt(2 / (rows + cols))`.
  pub fn xavier<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Self {
    if rows * cols == 0 {
      return Self::zeros(rows, cols);
    }
    let bound = xavier_bound(rows, cols);
    let distribution = Uniform::new_inclusive(-bound, bound);
    Self::from_fn(rows, cols, |_, _| distribution.sample(&mut *rng))
  }

  pub fn rows(&self) -> usize {
    self.rows
  }

  pub fn cols(&self) -> usize {
    self.cols
  }

  pub fn shape(&self) -> (usize, usize) {
    (self.rows, self.cols)
  }

  fn offset(&self, row: usize, col: usize) -> Result<usize> {
    if row < self.rows && col < self.cols {
      Ok(row * self.cols + col)
    } else {
      Err(Error::Index {
        row,
        col,
        rows: self.rows,
        cols: self.cols,
      })
    }
  }

  pub fn get(&self, row: usize, col: usize) -> Result<f64> {
    self.offset(row, col).map(|i| self.data[i])
  }

  pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
    let i = self.offset(row, col)?;
    self.data[i] = value;
    Ok(())
  }

  /// `(row, col, weight)` triples in row-major order.
  pub fn entries(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
    iproduct!(0..self.rows, 0..self.cols).map(move |(r, c)| (r, c, self.data[r * self.cols + c]))
  }

  pub fn has_nan(&self) -> bool {
    self.data.iter().any(|w| w.is_nan())
  }

  pub fn is_finite(&self) -> bool {
    self.data.iter().all(|w| w.is_finite())
  }

  /// Copy with every NaN replaced by `0.0`. Persisted matrices always go through this.
  pub fn sanitized(&self) -> Self {
    Self {
      data: self
        .data
        .iter()
        .map(|&w| if w.is_nan() { 0.0 } else { w })
        .collect(),
      ..self.clone()
    }
  }
}

impl Index<(usize, usize)> for WeightMatrix {
  type Output = f64;

  fn index(&self, (row, col): (usize, usize)) -> &f64 {
    assert!(
      row < self.rows && col < self.cols,
      "index ({row}, {col}) out of bounds for {}x{} matrix",
      self.rows,
      self.cols
    );
    &self.data[row * self.cols + col]
  }
}

impl IndexMut<(usize, usize)> for WeightMatrix {
  fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
    assert!(
      row < self.rows && col < self.cols,
      "index ({row}, {col}) out of bounds for {}x{} matrix",
      self.rows,
      self.cols
    );
    &mut self.data[row * self.cols + col]
  }
}
