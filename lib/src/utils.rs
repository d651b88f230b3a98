use serde::{de::DeserializeOwned, Serialize};
use std::{io, path::Path};

#[cfg(not(debug_assertions))]
use human_panic::setup_panic;
use tracing::{
  subscriber::{DefaultGuard, SetGlobalDefaultError},
  Level,
};

#[cfg(debug_assertions)]
extern crate better_panic;

// [NOTE] tracing
//
// Library code logs through the `tracing` macros and `#[tracing::instrument]`; only the binary
// installs a global subscriber. Tests scope one with `init_logging_tests`.

pub fn install_logger(verbose: bool) -> Result<(), SetGlobalDefaultError> {
  let level = if verbose { Level::DEBUG } else { Level::INFO };
  let subscriber = tracing_subscriber::fmt()
    .compact()
    .with_max_level(level)
    .finish();
  tracing::subscriber::set_global_default(subscriber)
}

pub fn init_logging(verbose: bool) -> Result<(), SetGlobalDefaultError> {
  // Human Panic. Only enabled when *not* debugging.
  #[cfg(not(debug_assertions))]
  {
    setup_panic!();
  }

  // Better Panic. Only enabled *when* debugging.
  #[cfg(debug_assertions)]
  {
    better_panic::Settings::debug()
      .most_recent_first(false)
      .lineno_suffix(true)
      .verbosity(better_panic::Verbosity::Full)
      .install();
  }

  // Setup Logging
  install_logger(verbose)?;

  Ok(())
}

/// Subscriber for the current test thread only; dropped with the guard.
pub fn init_logging_tests() -> DefaultGuard {
  let subscriber = tracing_subscriber::fmt()
    .compact()
    .with_test_writer()
    .with_max_level(Level::DEBUG)
    .finish();
  tracing::subscriber::set_default(subscriber)
}

pub fn serialize_to_file<T: Serialize>(path: &Path, obj: &T) -> io::Result<()> {
  let buff = serde_json::to_string_pretty(obj)?;
  std::fs::write(path, buff)
}

pub fn deserialize_from_file<T: DeserializeOwned>(path: &Path) -> io::Result<T> {
  let content = std::fs::read_to_string(path)?;
  Ok(serde_json::from_str(&content)?)
}
