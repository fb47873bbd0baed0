use std::time::Duration;

use rand::Rng;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::http_client::http_client;
use crate::prediction::{PredictionOutcome, PredictionRequest, PredictionResult, PredictionSource};
use crate::registry::TeamRegistry;
use crate::selection::Selection;
use crate::simulator;

/// Failures of the network attempt itself. All of these are absorbed by
/// falling back to the simulator.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("http client unavailable: {0:#}")]
    Client(anyhow::Error),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("http {0}")]
    Status(u16),
    #[error("invalid json: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("response body is not a JSON object")]
    NotAnObject,
}

/// Failures outside the network attempt. These reach the user as a notice.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PredictError {
    #[error("no code registered for team {0}")]
    UnknownTeam(String),
    #[error("prediction worker stopped")]
    WorkerGone,
    #[error("prediction backend panicked: {0}")]
    BackendPanic(String),
}

pub trait PredictionBackend: Send {
    fn fetch(&self, request: &PredictionRequest) -> Result<PredictionResult, FetchError>;
}

/// POSTs the request as JSON to a fixed URL.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    url: String,
    timeout: Option<Duration>,
}

impl HttpBackend {
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            url: url.into(),
            timeout,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl PredictionBackend for HttpBackend {
    fn fetch(&self, request: &PredictionRequest) -> Result<PredictionResult, FetchError> {
        let client = http_client(self.timeout).map_err(FetchError::Client)?;
        let resp = client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .json(request)
            .send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let body = resp.text()?;
        parse_prediction_body(&body)
    }
}

pub fn parse_prediction_body(raw: &str) -> Result<PredictionResult, FetchError> {
    let root: Value = serde_json::from_str(raw.trim())?;
    PredictionResult::from_json(&root).ok_or(FetchError::NotAnObject)
}

pub fn build_request(
    registry: &TeamRegistry,
    selection: &Selection,
) -> Result<PredictionRequest, PredictError> {
    let home_name = selection.home.name;
    let away_name = selection.away.name;
    let home_code = registry
        .code_of(home_name)
        .ok_or_else(|| PredictError::UnknownTeam(home_name.to_string()))?;
    let away_code = registry
        .code_of(away_name)
        .ok_or_else(|| PredictError::UnknownTeam(away_name.to_string()))?;
    Ok(PredictionRequest {
        home_name: home_name.to_string(),
        away_name: away_name.to_string(),
        home_code,
        away_code,
    })
}

pub struct PredictionClient<B> {
    registry: TeamRegistry,
    backend: B,
}

impl<B: PredictionBackend> PredictionClient<B> {
    pub fn new(registry: TeamRegistry, backend: B) -> Self {
        Self { registry, backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// One attempt against the backend, simulated data on any fetch failure.
    pub fn predict<R: Rng + ?Sized>(
        &self,
        selection: &Selection,
        rng: &mut R,
    ) -> Result<PredictionOutcome, PredictError> {
        let request = build_request(&self.registry, selection)?;
        match self.backend.fetch(&request) {
            Ok(result) => {
                info!(
                    home = %request.home_name,
                    away = %request.away_name,
                    "prediction received from model"
                );
                Ok(PredictionOutcome {
                    result,
                    source: PredictionSource::Remote,
                })
            }
            Err(err) => {
                debug!(error = %err, "prediction endpoint failed, simulating");
                Ok(PredictionOutcome {
                    result: simulator::simulate_prediction(rng),
                    source: PredictionSource::Simulated,
                })
            }
        }
    }
}
