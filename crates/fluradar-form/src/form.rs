//! Form state for the intake page.
//!
//! The page shows all twenty fields. Values come from three layers, lowest
//! first: built-in defaults, the set fetched from the record source, and a
//! user submission. A submission replaces the other layers entirely; blank
//! fields in it stay blank.

use fluradar_domain::{
    CanonicalField, CanonicalFieldSet, ClinicalInputs, FieldKind, FieldValue, NumericValue, YesNo,
};
use std::collections::HashMap;
use std::fmt;

/// Left column fields
pub const VITALS: [CanonicalField; 10] = [
    CanonicalField::Temperature,
    CanonicalField::Height,
    CanonicalField::Weight,
    CanonicalField::DaysOfIllness,
    CanonicalField::WeekOfYear,
    CanonicalField::Season,
    CanonicalField::RespiratoryRate,
    CanonicalField::SystolicBp,
    CanonicalField::OxygenSaturation,
    CanonicalField::Pulse,
];

/// Right column fields
pub const SYMPTOMS: [CanonicalField; 10] = [
    CanonicalField::FluVaccine,
    CanonicalField::Cough,
    CanonicalField::CoughSputum,
    CanonicalField::SoreThroat,
    CanonicalField::Rhinorrhea,
    CanonicalField::SinusPain,
    CanonicalField::ExposeHuman,
    CanonicalField::Travel,
    CanonicalField::MedHistAntiviral,
    CanonicalField::ChronicLungDisease,
];

/// Input widget description for one field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputSpec {
    /// Number input with inclusive bounds
    Number {
        /// Lowest accepted value
        min: f64,
        /// Highest accepted value
        max: f64,
        /// Initial value
        default: f64,
        /// Increment
        step: f64,
    },

    /// Yes/No select, defaults to No
    YesNo,
}

/// Label and widget for one field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    /// Field shown
    pub field: CanonicalField,
    /// Label shown next to the widget
    pub label: &'static str,
    /// Widget
    pub input: InputSpec,
}

impl FieldSpec {
    /// Widget description for `field`
    pub fn of(field: CanonicalField) -> Self {
        use CanonicalField::*;

        let number = |min, max, default, step| InputSpec::Number {
            min,
            max,
            default,
            step,
        };

        let (label, input) = match field {
            Temperature => ("Temperature (°C)", number(30.0, 42.0, 37.3, 1.0)),
            Height => ("HEIGHT (CM)", number(1.0, 400.0, 160.0, 0.5)),
            Weight => ("WEIGHT (KG)", number(1.0, 400.0, 60.0, 0.5)),
            DaysOfIllness => ("Days of illness", number(1.0, 14.0, 1.0, 1.0)),
            WeekOfYear => ("Week of year", number(1.0, 53.0, 1.0, 1.0)),
            Season => ("Season (1–4)", number(1.0, 4.0, 1.0, 1.0)),
            RespiratoryRate => ("Respiratory rate", number(10.0, 30.0, 12.0, 1.0)),
            SystolicBp => ("Systolic BP", number(50.0, 250.0, 90.0, 1.0)),
            OxygenSaturation => ("Oxygen saturation (%)", number(1.0, 100.0, 100.0, 1.0)),
            Pulse => ("Pulse", number(50.0, 180.0, 100.0, 1.0)),
            other => (other.record_label(), InputSpec::YesNo),
        };

        Self { field, label, input }
    }

    /// Default value of the field
    pub fn default_value(&self) -> FieldValue {
        match (self.input, self.field.kind()) {
            (InputSpec::Number { default, .. }, FieldKind::Numeric(kind)) => {
                FieldValue::Numeric(NumericValue::Decimal(default).coerce(kind))
            }
            _ => FieldValue::Binary(YesNo::No),
        }
    }
}

/// Defaults for all twenty fields
pub fn default_fields() -> CanonicalFieldSet {
    CanonicalField::ALL
        .into_iter()
        .map(|field| (field, FieldSpec::of(field).default_value()))
        .collect()
}

/// What is wrong with one field
#[derive(Debug, Clone, PartialEq)]
pub enum ProblemKind {
    /// No value given
    Missing,

    /// Value could not be read
    Unparseable(String),

    /// Value outside the widget bounds
    OutOfRange {
        /// Value given
        value: f64,
        /// Lowest accepted value
        min: f64,
        /// Highest accepted value
        max: f64,
    },
}

/// A field that blocks scoring
#[derive(Debug, Clone, PartialEq)]
pub struct FieldProblem {
    /// Field concerned
    pub field: CanonicalField,
    /// What is wrong
    pub kind: ProblemKind,
}

impl fmt::Display for FieldProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = FieldSpec::of(self.field).label;
        match &self.kind {
            ProblemKind::Missing => write!(f, "{} is required", label),
            ProblemKind::Unparseable(raw) => write!(f, "{}: cannot read '{}'", label, raw),
            ProblemKind::OutOfRange { value, min, max } => {
                write!(f, "{}: {} is outside {}..{}", label, value, min, max)
            }
        }
    }
}

/// Per-request view of the twenty fields
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormState {
    values: CanonicalFieldSet,
    raw: HashMap<CanonicalField, String>,
    problems: Vec<FieldProblem>,
}

impl FormState {
    /// Defaults with the fetched set layered on top
    pub fn prefilled(fetched: &CanonicalFieldSet) -> Self {
        let normalized: CanonicalFieldSet = fetched
            .iter()
            .filter_map(|(field, value)| normalize(field, value).map(|v| (field, v)))
            .collect();

        Self::checked(default_fields().overlay(&normalized), HashMap::new(), Vec::new())
    }

    /// Read an urlencoded form submission
    ///
    /// Keys other than the twenty canonical ones are ignored.
    pub fn from_submission(form: &HashMap<String, String>) -> Self {
        let mut values = Vec::new();
        let mut raw = HashMap::new();
        let mut problems = Vec::new();

        for field in CanonicalField::ALL {
            let text = form.get(field.key()).map(|s| s.trim()).unwrap_or("");
            if text.is_empty() {
                problems.push(FieldProblem {
                    field,
                    kind: ProblemKind::Missing,
                });
                continue;
            }

            match parse_text(field, text) {
                Some(value) => values.push((field, value)),
                None => {
                    raw.insert(field, text.to_string());
                    problems.push(FieldProblem {
                        field,
                        kind: ProblemKind::Unparseable(text.to_string()),
                    });
                }
            }
        }

        Self::checked(values.into_iter().collect(), raw, problems)
    }

    /// Read a JSON object keyed by canonical field
    ///
    /// Numbers are accepted for numeric fields; `"Yes"`/`"No"` or `0`/`1`
    /// for binary ones. Unknown keys are ignored.
    pub fn from_json(object: &serde_json::Map<String, serde_json::Value>) -> Self {
        let mut values = Vec::new();
        let mut raw = HashMap::new();
        let mut problems = Vec::new();

        for field in CanonicalField::ALL {
            let parsed = match object.get(field.key()) {
                None | Some(serde_json::Value::Null) => {
                    problems.push(FieldProblem {
                        field,
                        kind: ProblemKind::Missing,
                    });
                    continue;
                }
                Some(value) => json_value(field, value).ok_or_else(|| value.to_string()),
            };

            match parsed {
                Ok(value) => values.push((field, value)),
                Err(text) => {
                    raw.insert(field, text.clone());
                    problems.push(FieldProblem {
                        field,
                        kind: ProblemKind::Unparseable(text),
                    });
                }
            }
        }

        Self::checked(values.into_iter().collect(), raw, problems)
    }

    /// Current values
    pub fn values(&self) -> &CanonicalFieldSet {
        &self.values
    }

    /// Problems blocking scoring, in field order
    pub fn problems(&self) -> &[FieldProblem] {
        &self.problems
    }

    /// Problem for one field, if any
    pub fn problem(&self, field: CanonicalField) -> Option<&FieldProblem> {
        self.problems.iter().find(|p| p.field == field)
    }

    /// Text to put in the field's widget
    pub fn display_value(&self, field: CanonicalField) -> String {
        if let Some(raw) = self.raw.get(&field) {
            return raw.clone();
        }
        self.values
            .get(field)
            .map(|value| value.to_string())
            .unwrap_or_default()
    }

    /// Build scoring inputs if every field is present and in range
    pub fn inputs(&self) -> Result<ClinicalInputs, Vec<FieldProblem>> {
        if !self.problems.is_empty() {
            return Err(self.problems.clone());
        }

        ClinicalInputs::from_field_set(&self.values).map_err(|missing| {
            missing
                .fields
                .into_iter()
                .map(|field| FieldProblem {
                    field,
                    kind: ProblemKind::Missing,
                })
                .collect()
        })
    }

    /// Attach range problems and sort everything into field order
    fn checked(
        values: CanonicalFieldSet,
        raw: HashMap<CanonicalField, String>,
        mut problems: Vec<FieldProblem>,
    ) -> Self {
        for (field, value) in values.iter() {
            if let Some(problem) = range_problem(field, value) {
                problems.push(problem);
            }
        }
        problems.sort_by_key(|p| p.field);

        Self {
            values,
            raw,
            problems,
        }
    }
}

/// Coerce a fetched value into what the field's widget can show
///
/// Numeric values take the field's number kind; an integer in a Yes/No field
/// is `Yes` only when it is `1`. A Yes/No answer in a numeric field is
/// dropped, leaving the default.
fn normalize(field: CanonicalField, value: &FieldValue) -> Option<FieldValue> {
    match (field.kind(), value) {
        (FieldKind::Numeric(kind), FieldValue::Numeric(n)) => Some(FieldValue::Numeric(n.coerce(kind))),
        (FieldKind::Numeric(_), FieldValue::Binary(_)) => None,
        (FieldKind::Binary, FieldValue::Binary(b)) => Some(FieldValue::Binary(*b)),
        (FieldKind::Binary, FieldValue::Numeric(NumericValue::Integer(v))) => {
            Some(FieldValue::Binary(YesNo::from_flag(Some(*v))))
        }
        (FieldKind::Binary, FieldValue::Numeric(NumericValue::Decimal(_))) => {
            Some(FieldValue::Binary(YesNo::No))
        }
    }
}

fn parse_text(field: CanonicalField, text: &str) -> Option<FieldValue> {
    match field.kind() {
        FieldKind::Binary => YesNo::parse(text).map(FieldValue::Binary),
        FieldKind::Numeric(kind) => {
            let number = match text.parse::<i64>() {
                Ok(v) => NumericValue::Integer(v),
                Err(_) => {
                    let v = text.parse::<f64>().ok().filter(|v| v.is_finite())?;
                    NumericValue::Decimal(v)
                }
            };
            Some(FieldValue::Numeric(number.coerce(kind)))
        }
    }
}

fn json_value(field: CanonicalField, value: &serde_json::Value) -> Option<FieldValue> {
    match (field.kind(), value) {
        (FieldKind::Numeric(kind), serde_json::Value::Number(n)) => {
            let number = match n.as_i64() {
                Some(v) => NumericValue::Integer(v),
                None => NumericValue::Decimal(n.as_f64()?),
            };
            Some(FieldValue::Numeric(number.coerce(kind)))
        }
        (FieldKind::Binary, serde_json::Value::String(s)) => YesNo::parse(s).map(FieldValue::Binary),
        (FieldKind::Binary, serde_json::Value::Number(n)) => match n.as_i64() {
            Some(0) => Some(FieldValue::Binary(YesNo::No)),
            Some(1) => Some(FieldValue::Binary(YesNo::Yes)),
            _ => None,
        },
        _ => None,
    }
}

fn range_problem(field: CanonicalField, value: &FieldValue) -> Option<FieldProblem> {
    let InputSpec::Number { min, max, .. } = FieldSpec::of(field).input else {
        return None;
    };
    let value = value.as_numeric()?.as_f64();

    if value < min || value > max {
        Some(FieldProblem {
            field,
            kind: ProblemKind::OutOfRange { value, min, max },
        })
    } else {
        None
    }
}

/// JSON object of a field set, keyed by canonical key
pub fn fields_to_json(fields: &CanonicalFieldSet) -> serde_json::Value {
    let object = fields
        .iter()
        .map(|(field, value)| {
            let json = match value {
                FieldValue::Numeric(NumericValue::Integer(v)) => serde_json::Value::from(*v),
                FieldValue::Numeric(NumericValue::Decimal(v)) => serde_json::Number::from_f64(*v)
                    .map(serde_json::Value::Number)
                    .unwrap_or(serde_json::Value::Null),
                FieldValue::Binary(b) => serde_json::Value::from(b.as_str()),
            };
            (field.key().to_string(), json)
        })
        .collect();
    serde_json::Value::Object(object)
}
