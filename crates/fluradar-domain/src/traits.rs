//! Trait definitions for external collaborators
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use crate::inputs::ClinicalInputs;
use crate::record::ExternalRecord;
use std::fmt::Display;
use std::future::Future;

/// Trait for fetching external records
///
/// Implemented by the infrastructure layer (fluradar-fhir)
pub trait RecordSource {
    /// Error type for fetch operations
    type Error: Display + Send + 'static;

    /// Fetch the record at `location`, authenticating with `token`
    ///
    /// The token is forwarded verbatim as a bearer credential.
    fn fetch(
        &self,
        token: &str,
        location: &str,
    ) -> impl Future<Output = Result<ExternalRecord, Self::Error>> + Send;
}

/// Trait for the external probability-estimation function
///
/// Implemented by the infrastructure layer (fluradar-scorer)
pub trait ProbabilityScorer {
    /// Error type for scoring operations
    type Error: Display + Send + 'static;

    /// Estimate the probability (as a percentage) for the given inputs
    fn predict(
        &self,
        inputs: &ClinicalInputs,
    ) -> impl Future<Output = Result<f64, Self::Error>> + Send;
}
