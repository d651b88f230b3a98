use std::{error::Error, path::PathBuf, sync::Arc};

use axum::{
  extract::State,
  http::StatusCode,
  routing::{get, post},
  Json, Router,
};
use serde::Deserialize;
use tracing::info;

use crate::{
  inference::{InferenceSession, PredictionRow},
  model::{NeuralNetwork, TrainingConfig},
  store::JsonWeightStore,
};

/// Serves predictions from the stored weights over HTTP.
pub struct Server {
  port: u16,
  weights_dir: PathBuf,
  config: TrainingConfig,
}

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
  pub input: Vec<f64>,
}

impl Server {
  pub fn new(port: u16, weights_dir: PathBuf, config: TrainingConfig) -> Self {
    Self {
      port,
      weights_dir,
      config,
    }
  }

  pub async fn run(self) -> Result<(), Box<dyn Error>> {
    let store = JsonWeightStore::new(&self.weights_dir);
    let network = NeuralNetwork::new(self.config, &mut rand::thread_rng())?;
    let mut session = InferenceSession::new(network);
    session.ensure_loaded(&store)?;

    let server_addr = format!("0.0.0.0:{}", self.port);
    let app = Self::router(Arc::new(session));
    let tcp_listener = tokio::net::TcpListener::bind(&server_addr).await?;
    info!("Serving predictions on {server_addr}");
    axum::serve(tcp_listener, app).await?;
    Ok(())
  }

  pub fn router(session: Arc<InferenceSession>) -> Router {
    Router::new()
      .route("/", get(Self::handle_health))
      .route("/predict", post(Self::handle_predict))
      .with_state(session)
  }

  async fn handle_health() -> &'static str {
    "ok"
  }

  async fn handle_predict(
    State(session): State<Arc<InferenceSession>>,
    Json(request): Json<PredictRequest>,
  ) -> Result<Json<PredictionRow>, (StatusCode, String)> {
    session
      .predict_row(request.input)
      .map(Json)
      .map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::{Prediction, WeightMatrix};

  fn session() -> Arc<InferenceSession> {
    let network = NeuralNetwork::from_weights(
      TrainingConfig::default(),
      WeightMatrix::zeros(6, 20),
      WeightMatrix::from_fn(20, 1, |_, _| 0.1),
    )
    .unwrap();
    Arc::new(InferenceSession::trained(network))
  }

  #[tokio::test]
  async fn predicts_a_posted_input() {
    let request = PredictRequest { input: vec![0.0; 6] };
    let Json(row) = Server::handle_predict(State(session()), Json(request)).await.unwrap();
    assert_eq!(row.prediction, Prediction::Label(0.75));
  }

  #[tokio::test]
  async fn wrong_length_is_unprocessable() {
    let request = PredictRequest { input: vec![0.0; 3] };
    let (status, message) = Server::handle_predict(State(session()), Json(request))
      .await
      .unwrap_err();
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(message.contains("expected 6"), "{message}");
  }

  #[tokio::test]
  async fn health_check() {
    assert_eq!(Server::handle_health().await, "ok");
  }
}
