//! Flu Radar Record Source
//!
//! Fetches FHIR-style Observation resources from a health-record endpoint and
//! turns them into [`ExternalRecord`]s for the field extractor.
//!
//! # Overview
//!
//! ```text
//! Observation URL + bearer token → ObservationClient → JSON → ExternalRecord
//! ```
//!
//! Only the `component` array matters: each component's `code.text` becomes
//! the label, and `valueQuantity.value` and `valueInteger` are both kept.
//!
//! # Examples
//!
//! ```
//! use fluradar_fhir::parse_observation;
//!
//! let body = r#"{
//!     "resourceType": "Observation",
//!     "component": [
//!         {"code": {"text": "Pulse"}, "valueQuantity": {"value": 88}},
//!         {"code": {"text": "Sore throat?"}, "valueInteger": 1}
//!     ]
//! }"#;
//!
//! let record = parse_observation(body).unwrap();
//! assert_eq!(record.len(), 2);
//! ```

#![warn(missing_docs)]

pub mod client;
pub mod observation;

use thiserror::Error;

pub use client::{ObservationClient, DEFAULT_TIMEOUT_SECS};
pub use fluradar_domain::ExternalRecord;
pub use observation::parse_observation;

/// Errors that can occur while fetching a record
#[derive(Error, Debug)]
pub enum FhirError {
    /// Network or transport failure
    #[error("Communication error: {0}")]
    Communication(String),

    /// Request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,

    /// Endpoint answered with a non-success status
    #[error("HTTP {0}")]
    Status(u16),

    /// Body was not a usable Observation
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// HTTP client could not be constructed
    #[error("Client configuration error: {0}")]
    ClientBuild(String),
}

impl From<reqwest::Error> for FhirError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FhirError::Timeout
        } else if let Some(status) = e.status() {
            FhirError::Status(status.as_u16())
        } else if e.is_decode() {
            FhirError::InvalidResponse(e.to_string())
        } else {
            FhirError::Communication(e.to_string())
        }
    }
}

impl From<serde_json::Error> for FhirError {
    fn from(e: serde_json::Error) -> Self {
        FhirError::InvalidResponse(format!("JSON parse error: {}", e))
    }
}
