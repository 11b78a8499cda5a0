//! Flu Radar intake service
//!
//! Serves the clinical intake form: loads an observation from the record
//! source, prefills the twenty scoring fields, and asks the configured scorer
//! for a flu probability.

#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod form;
pub mod handlers;
pub mod intake;
pub mod render;

use config::{FormConfig, ScorerKind};
use fluradar_fhir::{FhirError, ObservationClient};
use fluradar_scorer::{HttpScorer, MockScorer, ScorerBackend, ScoringError};
use handlers::{create_router, AppState};
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;

/// Intake service error
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Record source could not be set up
    #[error("Record source error: {0}")]
    Fhir(#[from] FhirError),

    /// Scorer could not be set up
    #[error("Scorer error: {0}")]
    Scoring(#[from] ScoringError),

    /// File access error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON output error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Page template could not be compiled
    #[error("Render error: {0}")]
    Render(#[from] render::RenderError),

    /// Server binding error
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        /// Address that could not be bound
        addr: String,
        /// Underlying error
        source: std::io::Error,
    },

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Build the record client and scorer described by the configuration
pub fn build_state(
    config: &FormConfig,
) -> Result<AppState<ObservationClient, ScorerBackend>, FormError> {
    let source = ObservationClient::with_options(
        Duration::from_secs(config.record_source.timeout_secs),
        config.record_source.accept_invalid_certs,
    )?;

    let scorer = match config.scorer.backend {
        ScorerKind::Mock => ScorerBackend::Mock(MockScorer::new(config.scorer.mock_probability)),
        ScorerKind::Http => {
            let endpoint = config
                .scorer
                .endpoint
                .clone()
                .ok_or_else(|| config::ConfigError::MissingField("scorer.endpoint".to_string()))?;
            let scorer =
                HttpScorer::with_timeout(endpoint, Duration::from_secs(config.scorer.timeout_secs))?
                    .with_max_retries(config.scorer.max_retries);
            ScorerBackend::Http(scorer)
        }
    };

    let state = AppState::new(source, scorer, config.duplicate_labels.into())?;
    Ok(state)
}

/// Start the intake HTTP server
///
/// Builds the record client and scorer, then serves until the process is
/// stopped.
pub async fn start_server(config: FormConfig) -> Result<(), FormError> {
    config.validate()?;

    info!("Starting Flu Radar intake service");
    info!("Bind address: {}", config.bind_addr());
    info!("Duplicate labels: {:?}", config.duplicate_labels);
    info!("Record fetch timeout: {} seconds", config.record_source.timeout_secs);

    let state = build_state(&config)?;
    info!("Scorer backend: {}", state.scorer.name());

    let app = create_router(state);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| FormError::Bind {
            addr: addr.clone(),
            source,
        })?;
    info!("Intake service listening on {}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| FormError::Server(e.to_string()))?;

    Ok(())
}
