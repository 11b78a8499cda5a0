//! Flu Radar Scoring Layer
//!
//! Implementations of the `ProbabilityScorer` trait from `fluradar-domain`.
//! The probability model itself is external; this crate only moves the
//! twenty inputs to it and the number back.
//!
//! # Scorers
//!
//! - `MockScorer`: Deterministic mock for testing and offline use
//! - `HttpScorer`: Remote scoring service over HTTP
//! - `ScorerBackend`: Either of the above, picked from configuration
//!
//! # Examples
//!
//! ```
//! use fluradar_scorer::MockScorer;
//!
//! let scorer = MockScorer::new(42.5);
//! assert_eq!(scorer.call_count(), 0);
//! ```

#![warn(missing_docs)]

pub mod http;

use fluradar_domain::{ClinicalInputs, ProbabilityScorer};
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use http::HttpScorer;

/// Errors that can occur while scoring
#[derive(Error, Debug)]
pub enum ScoringError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from the scoring service
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Scoring service rejected the inputs
    #[error("Inputs rejected: {0}")]
    Rejected(String),

    /// HTTP client could not be constructed
    #[error("Client configuration error: {0}")]
    ClientBuild(String),

    /// Generic error
    #[error("Scoring error: {0}")]
    Other(String),
}

/// Mock scorer for deterministic testing
///
/// Returns a fixed probability without any network calls and counts how many
/// times it was asked. Clones share the counter and the last inputs seen.
#[derive(Debug, Clone)]
pub struct MockScorer {
    probability: f64,
    fail: bool,
    call_count: Arc<Mutex<usize>>,
    last_inputs: Arc<Mutex<Option<ClinicalInputs>>>,
}

impl MockScorer {
    /// Create a scorer that always returns `probability`
    pub fn new(probability: f64) -> Self {
        Self {
            probability,
            fail: false,
            call_count: Arc::new(Mutex::new(0)),
            last_inputs: Arc::new(Mutex::new(None)),
        }
    }

    /// Create a scorer that always fails
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(0.0)
        }
    }

    /// Fixed probability returned by this scorer
    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Get the number of times predict was called
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Inputs of the most recent call
    pub fn last_inputs(&self) -> Option<ClinicalInputs> {
        self.last_inputs.lock().unwrap().clone()
    }

    fn record_call(&self, inputs: &ClinicalInputs) {
        *self.call_count.lock().unwrap() += 1;
        *self.last_inputs.lock().unwrap() = Some(inputs.clone());
    }
}

impl Default for MockScorer {
    fn default() -> Self {
        Self::new(50.0)
    }
}

impl ProbabilityScorer for MockScorer {
    type Error = ScoringError;

    async fn predict(&self, inputs: &ClinicalInputs) -> Result<f64, Self::Error> {
        self.record_call(inputs);

        if self.fail {
            return Err(ScoringError::Other("Mock error".to_string()));
        }
        Ok(self.probability)
    }
}

/// Scorer selected at startup
#[derive(Debug, Clone)]
pub enum ScorerBackend {
    /// Fixed-probability mock
    Mock(MockScorer),

    /// Remote scoring service
    Http(HttpScorer),
}

impl ScorerBackend {
    /// Short name for logs ("mock" / "http")
    pub fn name(&self) -> &'static str {
        match self {
            ScorerBackend::Mock(_) => "mock",
            ScorerBackend::Http(_) => "http",
        }
    }
}

impl ProbabilityScorer for ScorerBackend {
    type Error = ScoringError;

    async fn predict(&self, inputs: &ClinicalInputs) -> Result<f64, Self::Error> {
        match self {
            ScorerBackend::Mock(scorer) => scorer.predict(inputs).await,
            ScorerBackend::Http(scorer) => scorer.score(inputs).await,
        }
    }
}
