use std::path::Path;

use tracing::warn;

use super::{Dataset, Example, Input, LABELS};
use crate::{Error, Result};

/// Rows that carry data: blank lines, `#` comments and a header row starting with `X` are skipped.
/// Yields 1-based line numbers for error messages.
fn data_rows(content: &str) -> impl Iterator<Item = (usize, &str)> {
  content
    .lines()
    .enumerate()
    .map(|(i, line)| (i + 1, line.trim()))
    .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
    .filter(|(_, line)| {
      !line
        .split(|c: char| c.is_whitespace() || c == ',')
        .next()
        .is_some_and(|first| first.eq_ignore_ascii_case("x"))
    })
}

fn parse_row(line_no: usize, line: &str) -> Result<Vec<f64>> {
  line
    .split(|c: char| c.is_whitespace() || c == ',')
    .filter(|part| !part.is_empty())
    .map(|val| {
      val
        .parse::<f64>()
        .map_err(|e| Error::dataset(format!("line {line_no}: {val:?}"), e))
    })
    .collect()
}

/// Parses `X Y Up Down Right Left Tag` rows, separated by whitespace or commas.
pub fn parse_dataset(content: &str, input_size: usize) -> Result<Dataset> {
  let mut dataset = Dataset::new();
  for (line_no, line) in data_rows(content) {
    let mut parts = parse_row(line_no, line)?;
    if parts.len() != input_size + 1 {
      return Err(Error::Dataset(format!(
        "line {line_no}: expected {} columns, got {}",
        input_size + 1,
        parts.len()
      )));
    }
    let label = parts.pop().unwrap_or_default();
    if !LABELS.contains(&label) {
      warn!("line {line_no}: label {label} is not one of {LABELS:?}, it can never be predicted");
    }
    dataset.push(Example::new(parts, label));
  }
  Ok(dataset)
}

/// Parses prediction rows. The label column is optional and ignored when present.
pub fn parse_prediction_inputs(content: &str, input_size: usize) -> Result<Vec<Input>> {
  data_rows(content)
    .map(|(line_no, line)| {
      let mut parts = parse_row(line_no, line)?;
      if parts.len() != input_size && parts.len() != input_size + 1 {
        return Err(Error::Dataset(format!(
          "line {line_no}: expected {input_size} or {} columns, got {}",
          input_size + 1,
          parts.len()
        )));
      }
      parts.truncate(input_size);
      Ok(parts)
    })
    .collect()
}

pub fn read_to_string(path: &Path) -> Result<String> {
  std::fs::read_to_string(path).map_err(|e| Error::dataset(format!("reading {}", path.display()), e))
}

pub fn read_dataset(path: &Path, input_size: usize) -> Result<Dataset> {
  parse_dataset(&read_to_string(path)?, input_size)
}
