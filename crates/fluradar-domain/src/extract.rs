//! Field extraction - maps an external record onto the canonical fields
//!
//! Labels are compared exactly (after trimming) against the twenty known
//! record labels. Numeric fields take the component's quantity unchanged,
//! falling back to its integer; binary fields read the integer alone and
//! become `Yes` only for `1`. Unknown labels are skipped.

use crate::field::{CanonicalField, FieldKind};
use crate::record::{Component, ComponentValue, ExternalRecord};
use crate::value::{FieldValue, NumericValue, YesNo};
use std::collections::BTreeMap;

/// Which component wins when a record repeats a label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Keep the first occurrence in record order
    #[default]
    FirstMatch,

    /// Keep the last occurrence in record order
    LastMatch,
}

/// Canonical fields recovered from one record
///
/// Holds only the fields that were matched; callers apply their own defaults
/// for the rest. Iteration follows positional scoring order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CanonicalFieldSet {
    values: BTreeMap<CanonicalField, FieldValue>,
}

impl CanonicalFieldSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the value of a field
    pub fn get(&self, field: CanonicalField) -> Option<&FieldValue> {
        self.values.get(&field)
    }

    /// Get the value of a field by canonical key
    pub fn get_by_key(&self, key: &str) -> Option<&FieldValue> {
        CanonicalField::from_key(key).and_then(|field| self.get(field))
    }

    /// Check whether a field is present
    pub fn contains(&self, field: CanonicalField) -> bool {
        self.values.contains_key(&field)
    }

    /// Number of fields present
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check whether no field is present
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over present fields in scoring order
    pub fn iter(&self) -> impl Iterator<Item = (CanonicalField, &FieldValue)> {
        self.values.iter().map(|(field, value)| (*field, value))
    }

    /// Fields of the canonical set that are not present
    pub fn missing(&self) -> Vec<CanonicalField> {
        CanonicalField::ALL
            .into_iter()
            .filter(|field| !self.contains(*field))
            .collect()
    }

    /// Layer `overrides` on top of this set, returning a new set
    pub fn overlay(&self, overrides: &CanonicalFieldSet) -> CanonicalFieldSet {
        let mut values = self.values.clone();
        values.extend(overrides.values.iter().map(|(k, v)| (*k, *v)));
        CanonicalFieldSet { values }
    }
}

impl FromIterator<(CanonicalField, FieldValue)> for CanonicalFieldSet {
    /// Later entries replace earlier ones for the same field
    fn from_iter<I: IntoIterator<Item = (CanonicalField, FieldValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Extract canonical fields from a record, keeping the first duplicate
pub fn extract(record: &ExternalRecord) -> CanonicalFieldSet {
    extract_with(record, DuplicatePolicy::FirstMatch)
}

/// Extract canonical fields from a record with an explicit duplicate policy
pub fn extract_with(record: &ExternalRecord, policy: DuplicatePolicy) -> CanonicalFieldSet {
    let mut values = BTreeMap::new();

    for component in record.components() {
        let Some(field) = CanonicalField::from_record_label(&component.label) else {
            continue;
        };

        let Some(value) = field_value(field, component) else {
            continue;
        };

        match policy {
            DuplicatePolicy::FirstMatch => {
                values.entry(field).or_insert(value);
            }
            DuplicatePolicy::LastMatch => {
                values.insert(field, value);
            }
        }
    }

    CanonicalFieldSet { values }
}

/// Convert one component for `field`
///
/// A numeric field with no value yields nothing; a binary field always
/// yields an answer.
fn field_value(field: CanonicalField, component: &Component) -> Option<FieldValue> {
    match field.kind() {
        FieldKind::Numeric(_) => match component.numeric_value() {
            ComponentValue::Decimal(v) => Some(FieldValue::Numeric(NumericValue::Decimal(v))),
            ComponentValue::Integer(v) => Some(FieldValue::Numeric(NumericValue::Integer(v))),
            ComponentValue::Absent => None,
        },
        FieldKind::Binary => Some(FieldValue::Binary(YesNo::from_flag(component.flag()))),
    }
}
