//! Observation decoding
//!
//! Decoding is lenient: a component without `code.text` gets an empty label,
//! a value that is not a number becomes absent, and a document without a
//! `component` array is an empty record. Only a body that is not a JSON
//! object is rejected.
//!
//! `valueQuantity.value` and `valueInteger` are kept side by side; which one
//! a field reads is decided at extraction.

use crate::FhirError;
use fluradar_domain::{Component, ComponentValue, ExternalRecord};
use serde::Deserialize;
use serde_json::Value;

#[derive(Deserialize)]
struct ObservationDto {
    #[serde(default)]
    component: Option<Vec<Value>>,
}

#[derive(Deserialize, Default)]
struct ComponentDto {
    #[serde(default)]
    code: Option<CodeDto>,
    #[serde(rename = "valueQuantity", default)]
    value_quantity: Option<QuantityDto>,
    #[serde(rename = "valueInteger", default)]
    value_integer: Option<Value>,
}

#[derive(Deserialize, Default)]
struct CodeDto {
    #[serde(default)]
    text: Option<Value>,
}

#[derive(Deserialize, Default)]
struct QuantityDto {
    #[serde(default)]
    value: Option<Value>,
}

/// Parse an Observation JSON document into an external record
///
/// # Errors
///
/// Returns [`FhirError::InvalidResponse`] if the body is not JSON or not a
/// JSON object.
pub fn parse_observation(body: &str) -> Result<ExternalRecord, FhirError> {
    let value: Value = serde_json::from_str(body)?;
    record_from_value(value)
}

/// Convert an already-parsed Observation document
pub(crate) fn record_from_value(value: Value) -> Result<ExternalRecord, FhirError> {
    if !value.is_object() {
        return Err(FhirError::InvalidResponse(
            "Observation must be a JSON object".to_string(),
        ));
    }

    let observation: ObservationDto = serde_json::from_value(value)?;
    Ok(observation
        .component
        .unwrap_or_default()
        .into_iter()
        .map(component_from_value)
        .collect())
}

fn component_from_value(value: Value) -> Component {
    // A malformed entry still occupies its slot, it just matches nothing
    let dto: ComponentDto = serde_json::from_value(value).unwrap_or_default();

    let label = dto
        .code
        .and_then(|code| code.text)
        .and_then(|text| text.as_str().map(str::to_string))
        .unwrap_or_default();

    let quantity = dto
        .value_quantity
        .and_then(|q| q.value)
        .map_or(ComponentValue::Absent, |v| number_value(&v));
    let integer = dto
        .value_integer
        .map_or(ComponentValue::Absent, |v| integer_value(&v));

    Component::new(label, quantity, integer)
}

/// Keep the number's own shape: integral literals stay integers
fn number_value(value: &Value) -> ComponentValue {
    match value {
        Value::Number(n) => n
            .as_i64()
            .map(ComponentValue::Integer)
            .or_else(|| n.as_f64().map(ComponentValue::Decimal))
            .unwrap_or(ComponentValue::Absent),
        _ => ComponentValue::Absent,
    }
}

/// Like [`number_value`], but a whole decimal such as `1.0` counts as an integer
fn integer_value(value: &Value) -> ComponentValue {
    match number_value(value) {
        ComponentValue::Decimal(v) if v.fract() == 0.0 && v.abs() < i64::MAX as f64 => {
            ComponentValue::Integer(v as i64)
        }
        other => other,
    }
}
