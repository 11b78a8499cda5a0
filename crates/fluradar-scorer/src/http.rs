//! HTTP Scorer Implementation
//!
//! Sends the twenty clinical inputs to a remote scoring service and reads a
//! probability back.
//!
//! # Wire format
//!
//! Request (`POST <endpoint>`), values in positional scoring order, binary
//! answers as `"Yes"` / `"No"`:
//!
//! ```text
//! {"inputs": [37.3, 160.0, 60.0, 1, 1, 1, 12, 90, 100, 100, "No", ...]}
//! ```
//!
//! Response:
//!
//! ```text
//! {"probability": 23.71}
//! ```
//!
//! # Examples
//!
//! ```no_run
//! use fluradar_scorer::HttpScorer;
//!
//! let scorer = HttpScorer::new("http://localhost:9000/predict")
//!     .unwrap()
//!     .with_max_retries(5);
//! ```

use crate::ScoringError;
use fluradar_domain::{ClinicalInputs, PositionalValue, ProbabilityScorer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Default timeout for scoring requests (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of attempts
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Longest wait between two attempts (60 seconds)
pub const MAX_BACKOFF_SECS: u64 = 60;

/// Remote probability scorer
#[derive(Debug, Clone)]
pub struct HttpScorer {
    endpoint: String,
    client: reqwest::Client,
    max_retries: u32,
}

/// Request body for the scoring service
#[derive(Serialize)]
struct ScoreRequest {
    inputs: Vec<Value>,
}

/// Response from the scoring service
#[derive(Deserialize)]
struct ScoreResponse {
    probability: f64,
}

impl HttpScorer {
    /// Create a scorer with the default timeout
    ///
    /// # Parameters
    ///
    /// - `endpoint`: full URL of the scoring route
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ScoringError> {
        Self::with_timeout(endpoint, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a scorer with an explicit request timeout
    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ScoringError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ScoringError::ClientBuild(e.to_string()))?;

        Ok(Self {
            endpoint: endpoint.into(),
            client,
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Set the maximum number of attempts
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Scoring endpoint URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Score the inputs
    ///
    /// Network failures and 5xx answers are retried with exponential backoff
    /// (1s, 2s, 4s, ...). A 4xx answer or an unreadable body fails at once.
    pub async fn score(&self, inputs: &ClinicalInputs) -> Result<f64, ScoringError> {
        let request_body = ScoreRequest {
            inputs: inputs.positional().iter().map(wire_value).collect(),
        };

        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.max_retries {
            match self.client.post(&self.endpoint).json(&request_body).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return match response.json::<ScoreResponse>().await {
                            Ok(body) if body.probability.is_finite() => {
                                debug!(probability = body.probability, "Scoring service answered");
                                Ok(body.probability)
                            }
                            Ok(_) => Err(ScoringError::InvalidResponse(
                                "Probability is not a finite number".to_string(),
                            )),
                            Err(e) => Err(ScoringError::InvalidResponse(format!(
                                "Failed to parse response: {}",
                                e
                            ))),
                        };
                    }

                    let error_text = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown error".to_string());
                    if status.is_client_error() {
                        return Err(ScoringError::Rejected(format!("HTTP {}: {}", status, error_text)));
                    }
                    last_error = Some(ScoringError::Communication(format!(
                        "HTTP {}: {}",
                        status, error_text
                    )));
                }
                Err(e) => {
                    last_error = Some(ScoringError::Communication(format!("Request failed: {}", e)));
                }
            }

            attempts += 1;
            if attempts < self.max_retries {
                warn!(attempt = attempts, "Scoring request failed, retrying");
                tokio::time::sleep(backoff_delay(attempts)).await;
            }
        }

        Err(last_error
            .unwrap_or_else(|| ScoringError::Communication("Max retries exceeded".to_string())))
    }
}

impl ProbabilityScorer for HttpScorer {
    type Error = ScoringError;

    async fn predict(&self, inputs: &ClinicalInputs) -> Result<f64, Self::Error> {
        self.score(inputs).await
    }
}

/// Wait after failed attempt number `attempt` (1-based): 1s, 2s, 4s, ...
fn backoff_delay(attempt: u32) -> Duration {
    let secs = 2u64.saturating_pow(attempt.saturating_sub(1));
    Duration::from_secs(secs.min(MAX_BACKOFF_SECS))
}

fn wire_value(value: &PositionalValue) -> Value {
    match value {
        PositionalValue::Decimal(v) => serde_json::Number::from_f64(*v)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        PositionalValue::Integer(v) => Value::from(*v),
        PositionalValue::Binary(b) => Value::from(b.as_str()),
    }
}
