//! Directional tag classifier.
//!
//! A 6-20-1 sigmoid network maps `X, Y, Up, Down, Right, Left` readings to one of the tags
//! `{0.25, 0.5, 0.75, 1.0}`. [`supervisor::ConvergenceSupervisor`] keeps retraining from fresh
//! weights until every training example is predicted exactly, persisting through a
//! [`store::WeightStore`] after each attempt.

pub mod dataset;
pub mod error;
pub mod inference;
pub mod model;
pub mod progress;
pub mod store;
pub mod subcommands;
pub mod supervisor;
pub mod utils;

pub use error::{Error, Result};
