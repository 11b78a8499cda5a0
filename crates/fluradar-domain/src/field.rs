//! Canonical field module - the twenty clinical inputs
//!
//! Every field has a stable key (used in forms and JSON), the exact label it
//! carries in an upstream record, and a kind that decides how a record value
//! is coerced.

/// How a numeric field stores its value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberKind {
    /// Fractional values (temperature, height, weight)
    Decimal,

    /// Whole values (counts, rates, pressures)
    Integer,
}

/// Semantic type of a canonical field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Numeric measurement, copied through from the record
    Numeric(NumberKind),

    /// Yes/No flag derived from an integer
    Binary,
}

/// One of the twenty canonical clinical fields
///
/// Variants are declared in positional scoring order, so the derived
/// ordering matches [`CanonicalField::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CanonicalField {
    /// Body temperature in °C
    Temperature,
    /// Height in cm
    Height,
    /// Weight in kg
    Weight,
    /// Days of illness
    DaysOfIllness,
    /// Week of year
    WeekOfYear,
    /// Season (1-4)
    Season,
    /// Respiratory rate
    RespiratoryRate,
    /// Systolic blood pressure
    SystolicBp,
    /// Oxygen saturation (%)
    OxygenSaturation,
    /// Pulse
    Pulse,
    /// Influenza vaccine this year
    FluVaccine,
    /// New or increased cough
    Cough,
    /// Cough with sputum
    CoughSputum,
    /// Sore throat
    SoreThroat,
    /// Rhinorrhea or nasal congestion
    Rhinorrhea,
    /// Sinus pain
    SinusPain,
    /// Exposure to confirmed influenza
    ExposeHuman,
    /// Recent travel
    Travel,
    /// Influenza antivirals in the past 30 days
    MedHistAntiviral,
    /// Chronic lung disease
    ChronicLungDisease,
}

impl CanonicalField {
    /// All fields in positional scoring order
    pub const ALL: [CanonicalField; 20] = [
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

    /// Get the canonical key
    pub fn key(&self) -> &'static str {
        match self {
            CanonicalField::Temperature => "temp",
            CanonicalField::Height => "height",
            CanonicalField::Weight => "weight",
            CanonicalField::DaysOfIllness => "DOI",
            CanonicalField::WeekOfYear => "WOS",
            CanonicalField::Season => "season",
            CanonicalField::RespiratoryRate => "rr",
            CanonicalField::SystolicBp => "sbp",
            CanonicalField::OxygenSaturation => "o2s",
            CanonicalField::Pulse => "pulse",
            CanonicalField::FluVaccine => "fluvaccine",
            CanonicalField::Cough => "cough",
            CanonicalField::CoughSputum => "coughsputum",
            CanonicalField::SoreThroat => "sorethroat",
            CanonicalField::Rhinorrhea => "rhinorrhea",
            CanonicalField::SinusPain => "sinuspain",
            CanonicalField::ExposeHuman => "exposehuman",
            CanonicalField::Travel => "travel",
            CanonicalField::MedHistAntiviral => "medhistav",
            CanonicalField::ChronicLungDisease => "pastmedchronlundis",
        }
    }

    /// Get the exact label this field carries in an upstream record
    pub fn record_label(&self) -> &'static str {
        match self {
            CanonicalField::Temperature => "Temperature (°C)",
            CanonicalField::Height => "HEIGHT (CM)",
            CanonicalField::Weight => "WEIGHT (KG)",
            CanonicalField::DaysOfIllness => "Days of illness",
            CanonicalField::WeekOfYear => "Week of Year",
            CanonicalField::Season => "Season (1–4)",
            CanonicalField::RespiratoryRate => "Respiratory rate",
            CanonicalField::SystolicBp => "Systolic BP",
            CanonicalField::OxygenSaturation => "Oxygen saturation (%)",
            CanonicalField::Pulse => "Pulse",
            CanonicalField::FluVaccine => "Influenza vaccine this year?",
            CanonicalField::Cough => "New or increased cough?",
            CanonicalField::CoughSputum => "Cough with sputum?",
            CanonicalField::SoreThroat => "Sore throat?",
            CanonicalField::Rhinorrhea => "Rhinorrhea / nasal congestion?",
            CanonicalField::SinusPain => "Sinus pain?",
            CanonicalField::ExposeHuman => "Exposure to confirmed influenza?",
            CanonicalField::Travel => "Recent travel?",
            CanonicalField::MedHistAntiviral => "Influenza antivirals in past 30 days?",
            CanonicalField::ChronicLungDisease => "Chronic lung disease?",
        }
    }

    /// Get the semantic kind of this field
    pub fn kind(&self) -> FieldKind {
        match self {
            CanonicalField::Temperature | CanonicalField::Height | CanonicalField::Weight => {
                FieldKind::Numeric(NumberKind::Decimal)
            }
            CanonicalField::DaysOfIllness
            | CanonicalField::WeekOfYear
            | CanonicalField::Season
            | CanonicalField::RespiratoryRate
            | CanonicalField::SystolicBp
            | CanonicalField::OxygenSaturation
            | CanonicalField::Pulse => FieldKind::Numeric(NumberKind::Integer),
            _ => FieldKind::Binary,
        }
    }

    /// Check whether this is a Yes/No field
    pub fn is_binary(&self) -> bool {
        self.kind() == FieldKind::Binary
    }

    /// Position of this field in the scoring argument list (0-based)
    pub fn position(&self) -> usize {
        *self as usize
    }

    /// Look up a field by canonical key (case-sensitive)
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }

    /// Look up a field by record label
    ///
    /// Surrounding whitespace is trimmed; the comparison itself is exact.
    pub fn from_record_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.into_iter().find(|field| field.record_label() == label)
    }
}

impl std::fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl std::str::FromStr for CanonicalField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s).ok_or_else(|| format!("Unknown field key: {}", s))
    }
}
