//! Flu Radar Domain Layer
//!
//! This crate holds the clinical field model shared by every other layer.
//! It has no external dependencies and defines the value objects, the
//! record-to-field mapping, and the trait interfaces for the collaborators
//! that live in other crates.
//!
//! ## Key Concepts
//!
//! - **External Record**: labeled components fetched from a health-record endpoint
//! - **Canonical Field**: one of twenty fixed clinical inputs (`temp`, `cough`, ...)
//! - **Canonical Field Set**: the fields recovered from one record
//! - **Clinical Inputs**: all twenty values, typed, in scoring order
//!
//! ## Example
//!
//! ```
//! use fluradar_domain::{extract, CanonicalField, Component, ExternalRecord, FieldValue, YesNo};
//!
//! let record = ExternalRecord::new(vec![
//!     Component::integer("Pulse", 88),
//!     Component::integer("Sore throat?", 1),
//! ]);
//!
//! let fields = extract(&record);
//! assert_eq!(fields.len(), 2);
//! assert_eq!(fields.get(CanonicalField::SoreThroat), Some(&FieldValue::Binary(YesNo::Yes)));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod extract;
pub mod field;
pub mod inputs;
pub mod record;
pub mod traits;
pub mod value;

// Re-exports for convenience
pub use extract::{extract, extract_with, CanonicalFieldSet, DuplicatePolicy};
pub use field::{CanonicalField, FieldKind, NumberKind};
pub use inputs::{ClinicalInputs, MissingFields, PositionalValue};
pub use record::{Component, ComponentValue, ExternalRecord};
pub use traits::{ProbabilityScorer, RecordSource};
pub use value::{FieldValue, NumericValue, YesNo};
