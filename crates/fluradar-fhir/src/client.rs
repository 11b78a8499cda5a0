//! Observation client
//!
//! One GET per fetch, bounded by a timeout, with the caller's bearer token
//! forwarded as given. There is no retry: a failed fetch is reported once and
//! the caller decides how to degrade.
//!
//! # Examples
//!
//! ```no_run
//! use fluradar_fhir::ObservationClient;
//!
//! # async fn example() -> Result<(), fluradar_fhir::FhirError> {
//! let client = ObservationClient::new()?;
//! let record = client
//!     .fetch_observation("token-from-ehr", "https://ehr.example.org/fhir/Observation/42")
//!     .await?;
//! println!("{} components", record.len());
//! # Ok(())
//! # }
//! ```

use crate::observation::record_from_value;
use crate::FhirError;
use fluradar_domain::{ExternalRecord, RecordSource};
use std::time::Duration;
use tracing::{debug, warn};

/// Default timeout for record fetches (10 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// HTTP client for Observation resources
#[derive(Debug, Clone)]
pub struct ObservationClient {
    client: reqwest::Client,
    timeout: Duration,
    accept_invalid_certs: bool,
}

impl ObservationClient {
    /// Create a client with the default timeout and certificate checks on
    pub fn new() -> Result<Self, FhirError> {
        Self::with_options(Duration::from_secs(DEFAULT_TIMEOUT_SECS), false)
    }

    /// Create a client with an explicit timeout and certificate policy
    ///
    /// # Parameters
    ///
    /// - `timeout`: upper bound for the whole request
    /// - `accept_invalid_certs`: skip TLS certificate verification (for
    ///   sandbox record servers with self-signed certificates)
    pub fn with_options(timeout: Duration, accept_invalid_certs: bool) -> Result<Self, FhirError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()
            .map_err(|e| FhirError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            timeout,
            accept_invalid_certs,
        })
    }

    /// Configured request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Whether TLS certificate verification is disabled
    pub fn accepts_invalid_certs(&self) -> bool {
        self.accept_invalid_certs
    }

    /// Fetch and decode one Observation
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - the endpoint cannot be reached or the timeout elapses
    /// - the endpoint answers with a non-2xx status
    /// - the body is not a JSON object
    pub async fn fetch_observation(&self, token: &str, url: &str) -> Result<ExternalRecord, FhirError> {
        debug!(url, "Fetching observation");

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/fhir+json, application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(url, status = status.as_u16(), "Observation endpoint returned error status");
            return Err(FhirError::Status(status.as_u16()));
        }

        let body: serde_json::Value = response.json().await?;
        let record = record_from_value(body)?;

        debug!(url, components = record.len(), "Observation decoded");
        Ok(record)
    }
}

impl RecordSource for ObservationClient {
    type Error = FhirError;

    async fn fetch(&self, token: &str, location: &str) -> Result<ExternalRecord, Self::Error> {
        self.fetch_observation(token, location).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = ObservationClient::new().unwrap();
        assert_eq!(client.timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert!(!client.accepts_invalid_certs());
    }

    #[test]
    fn test_client_with_options() {
        let client = ObservationClient::with_options(Duration::from_secs(2), true).unwrap();
        assert_eq!(client.timeout(), Duration::from_secs(2));
        assert!(client.accepts_invalid_certs());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint() {
        let client = ObservationClient::with_options(Duration::from_secs(2), false).unwrap();
        let result = client.fetch_observation("token", "http://127.0.0.1:1/Observation/1").await;

        match result {
            Err(FhirError::Communication(_)) | Err(FhirError::Timeout) => {} // Expected
            other => panic!("Expected communication error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let client = ObservationClient::new().unwrap();
        let result = client.fetch_observation("token", "not a url").await;
        assert!(result.is_err());
    }
}
