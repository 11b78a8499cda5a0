//! The twenty scoring inputs, fully typed

use crate::extract::CanonicalFieldSet;
use crate::field::CanonicalField;
use crate::value::{FieldValue, NumericValue, YesNo};
use std::fmt;

/// Error returned when a field set lacks some of the twenty inputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingFields {
    /// Missing fields in scoring order
    pub fields: Vec<CanonicalField>,
}

impl MissingFields {
    /// Canonical keys of the missing fields
    pub fn keys(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.key()).collect()
    }
}

impl fmt::Display for MissingFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Missing clinical fields: {}", self.keys().join(", "))
    }
}

impl std::error::Error for MissingFields {}

/// One scoring argument
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PositionalValue {
    /// Decimal measurement
    Decimal(f64),
    /// Integer measurement
    Integer(i64),
    /// Yes/No answer
    Binary(YesNo),
}

/// All twenty clinical inputs in the shape the scoring function expects
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub struct ClinicalInputs {
    pub temp: f64,
    pub height: f64,
    pub weight: f64,
    pub days_of_illness: i64,
    pub week_of_year: i64,
    pub season: i64,
    pub respiratory_rate: i64,
    pub systolic_bp: i64,
    pub oxygen_saturation: i64,
    pub pulse: i64,
    pub flu_vaccine: YesNo,
    pub cough: YesNo,
    pub cough_sputum: YesNo,
    pub sore_throat: YesNo,
    pub rhinorrhea: YesNo,
    pub sinus_pain: YesNo,
    pub expose_human: YesNo,
    pub travel: YesNo,
    pub med_hist_antiviral: YesNo,
    pub chronic_lung_disease: YesNo,
}

impl ClinicalInputs {
    /// Build the inputs from a field set
    ///
    /// Numeric values are coerced to the field's number kind. A binary field
    /// holding an integer counts as `Yes` only for `1`. A numeric field
    /// holding a Yes/No answer is treated as missing.
    ///
    /// # Errors
    ///
    /// Returns [`MissingFields`] listing every field that could not be filled.
    pub fn from_field_set(fields: &CanonicalFieldSet) -> Result<Self, MissingFields> {
        use CanonicalField::*;

        let mut reader = FieldReader {
            fields,
            missing: Vec::new(),
        };

        // Read in scoring order so missing fields are reported in that order
        let values = (
            reader.decimal(Temperature),
            reader.decimal(Height),
            reader.decimal(Weight),
            reader.integer(DaysOfIllness),
            reader.integer(WeekOfYear),
            reader.integer(Season),
            reader.integer(RespiratoryRate),
            reader.integer(SystolicBp),
            reader.integer(OxygenSaturation),
            reader.integer(Pulse),
            reader.yes_no(FluVaccine),
            reader.yes_no(Cough),
            reader.yes_no(CoughSputum),
            reader.yes_no(SoreThroat),
            reader.yes_no(Rhinorrhea),
            reader.yes_no(SinusPain),
            reader.yes_no(ExposeHuman),
            reader.yes_no(Travel),
            reader.yes_no(MedHistAntiviral),
            reader.yes_no(ChronicLungDisease),
        );

        let (
            Some(temp),
            Some(height),
            Some(weight),
            Some(days_of_illness),
            Some(week_of_year),
            Some(season),
            Some(respiratory_rate),
            Some(systolic_bp),
            Some(oxygen_saturation),
            Some(pulse),
            Some(flu_vaccine),
            Some(cough),
            Some(cough_sputum),
            Some(sore_throat),
            Some(rhinorrhea),
            Some(sinus_pain),
            Some(expose_human),
            Some(travel),
            Some(med_hist_antiviral),
            Some(chronic_lung_disease),
        ) = values
        else {
            return Err(MissingFields {
                fields: reader.missing,
            });
        };

        Ok(Self {
            temp,
            height,
            weight,
            days_of_illness,
            week_of_year,
            season,
            respiratory_rate,
            systolic_bp,
            oxygen_saturation,
            pulse,
            flu_vaccine,
            cough,
            cough_sputum,
            sore_throat,
            rhinorrhea,
            sinus_pain,
            expose_human,
            travel,
            med_hist_antiviral,
            chronic_lung_disease,
        })
    }

    /// The twenty values in positional scoring order
    pub fn positional(&self) -> [PositionalValue; 20] {
        use PositionalValue::{Binary, Decimal, Integer};
        [
            Decimal(self.temp),
            Decimal(self.height),
            Decimal(self.weight),
            Integer(self.days_of_illness),
            Integer(self.week_of_year),
            Integer(self.season),
            Integer(self.respiratory_rate),
            Integer(self.systolic_bp),
            Integer(self.oxygen_saturation),
            Integer(self.pulse),
            Binary(self.flu_vaccine),
            Binary(self.cough),
            Binary(self.cough_sputum),
            Binary(self.sore_throat),
            Binary(self.rhinorrhea),
            Binary(self.sinus_pain),
            Binary(self.expose_human),
            Binary(self.travel),
            Binary(self.med_hist_antiviral),
            Binary(self.chronic_lung_disease),
        ]
    }

    /// Convert back into a complete field set
    pub fn to_field_set(&self) -> CanonicalFieldSet {
        CanonicalField::ALL
            .into_iter()
            .zip(self.positional())
            .map(|(field, value)| {
                let value = match value {
                    PositionalValue::Decimal(v) => FieldValue::Numeric(NumericValue::Decimal(v)),
                    PositionalValue::Integer(v) => FieldValue::Numeric(NumericValue::Integer(v)),
                    PositionalValue::Binary(b) => FieldValue::Binary(b),
                };
                (field, value)
            })
            .collect()
    }
}

/// Typed reads from a field set, remembering which fields were unusable
struct FieldReader<'a> {
    fields: &'a CanonicalFieldSet,
    missing: Vec<CanonicalField>,
}

impl FieldReader<'_> {
    fn decimal(&mut self, field: CanonicalField) -> Option<f64> {
        self.read(field, |value| value.as_numeric().map(|n| n.as_f64()))
    }

    fn integer(&mut self, field: CanonicalField) -> Option<i64> {
        self.read(field, |value| value.as_numeric().map(|n| n.as_i64()))
    }

    fn yes_no(&mut self, field: CanonicalField) -> Option<YesNo> {
        self.read(field, |value| {
            Some(match value {
                FieldValue::Binary(b) => *b,
                FieldValue::Numeric(NumericValue::Integer(v)) => YesNo::from_flag(Some(*v)),
                FieldValue::Numeric(NumericValue::Decimal(_)) => YesNo::No,
            })
        })
    }

    fn read<T>(&mut self, field: CanonicalField, convert: impl FnOnce(&FieldValue) -> Option<T>) -> Option<T> {
        let value = self.fields.get(field).and_then(convert);
        if value.is_none() {
            self.missing.push(field);
        }
        value
    }
}
