//! Typed field values

use crate::field::NumberKind;
use std::fmt;

/// A number as it arrived from the record: decimal or integer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericValue {
    /// Decimal quantity
    Decimal(f64),

    /// Integer quantity
    Integer(i64),
}

impl NumericValue {
    /// Get the value as `f64`
    pub fn as_f64(&self) -> f64 {
        match *self {
            NumericValue::Decimal(v) => v,
            NumericValue::Integer(v) => v as f64,
        }
    }

    /// Get the value as `i64`, truncating decimals toward zero
    pub fn as_i64(&self) -> i64 {
        match *self {
            NumericValue::Decimal(v) => v.trunc() as i64,
            NumericValue::Integer(v) => v,
        }
    }

    /// Coerce into the representation a field of `kind` expects
    pub fn coerce(&self, kind: NumberKind) -> NumericValue {
        match kind {
            NumberKind::Decimal => NumericValue::Decimal(self.as_f64()),
            NumberKind::Integer => NumericValue::Integer(self.as_i64()),
        }
    }
}

impl fmt::Display for NumericValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Keep a trailing ".0" so decimals stay recognisable
            NumericValue::Decimal(v) if v.fract() == 0.0 && v.is_finite() => write!(f, "{:.1}", v),
            NumericValue::Decimal(v) => write!(f, "{}", v),
            NumericValue::Integer(v) => write!(f, "{}", v),
        }
    }
}

/// Binary clinical answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum YesNo {
    /// Negative answer (also the fallback)
    #[default]
    No,

    /// Positive answer
    Yes,
}

impl YesNo {
    /// Derive from an integer flag: only `1` means Yes
    pub fn from_flag(flag: Option<i64>) -> Self {
        if flag == Some(1) {
            YesNo::Yes
        } else {
            YesNo::No
        }
    }

    /// Get the display string ("Yes" / "No")
    pub fn as_str(&self) -> &'static str {
        match self {
            YesNo::No => "No",
            YesNo::Yes => "Yes",
        }
    }

    /// Parse "Yes" or "No" (exact)
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Yes" => Some(YesNo::Yes),
            "No" => Some(YesNo::No),
            _ => None,
        }
    }
}

impl fmt::Display for YesNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value of one canonical field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    /// Measurement
    Numeric(NumericValue),

    /// Yes/No answer
    Binary(YesNo),
}

impl FieldValue {
    /// Numeric content, if this is a numeric value
    pub fn as_numeric(&self) -> Option<NumericValue> {
        match self {
            FieldValue::Numeric(n) => Some(*n),
            FieldValue::Binary(_) => None,
        }
    }

    /// Yes/No content, if this is a binary value
    pub fn as_yes_no(&self) -> Option<YesNo> {
        match self {
            FieldValue::Binary(b) => Some(*b),
            FieldValue::Numeric(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Numeric(n) => n.fmt(f),
            FieldValue::Binary(b) => b.fmt(f),
        }
    }
}
