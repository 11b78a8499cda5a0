//! External record module - labeled components from an upstream source

/// Value carried by a record component
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ComponentValue {
    /// Decimal quantity
    Decimal(f64),

    /// Integer value
    Integer(i64),

    /// No usable value
    #[default]
    Absent,
}

/// One labeled entry of an external record
///
/// A component can carry a quantity, an integer, or both. Numeric fields
/// read the quantity first and fall back to the integer; binary fields read
/// only the integer.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    /// Free-text label (matched after trimming)
    pub label: String,

    /// Quantity value
    pub quantity: ComponentValue,

    /// Integer value
    pub integer: ComponentValue,
}

impl Component {
    /// Create a component from both of its values
    pub fn new(label: impl Into<String>, quantity: ComponentValue, integer: ComponentValue) -> Self {
        Self {
            label: label.into(),
            quantity,
            integer,
        }
    }

    /// Create a component with a decimal quantity
    pub fn decimal(label: impl Into<String>, value: f64) -> Self {
        Self::new(label, ComponentValue::Decimal(value), ComponentValue::Absent)
    }

    /// Create a component with an integer value
    pub fn integer(label: impl Into<String>, value: i64) -> Self {
        Self::new(label, ComponentValue::Absent, ComponentValue::Integer(value))
    }

    /// Create a component with no value
    pub fn absent(label: impl Into<String>) -> Self {
        Self::new(label, ComponentValue::Absent, ComponentValue::Absent)
    }

    /// Value for a numeric field: the quantity, else the integer
    pub fn numeric_value(&self) -> ComponentValue {
        match self.quantity {
            ComponentValue::Absent => self.integer,
            quantity => quantity,
        }
    }

    /// Integer flag for a binary field
    pub fn flag(&self) -> Option<i64> {
        match self.integer {
            ComponentValue::Integer(v) => Some(v),
            _ => None,
        }
    }
}

/// Sequence of components as fetched from the record source
///
/// Built once per fetch and read-only to the extractor.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExternalRecord {
    components: Vec<Component>,
}

impl ExternalRecord {
    /// Create a record from components, preserving order
    pub fn new(components: Vec<Component>) -> Self {
        Self { components }
    }

    /// Create an empty record
    pub fn empty() -> Self {
        Self::default()
    }

    /// Components in record order
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Number of components
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Check whether the record has no components
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl FromIterator<Component> for ExternalRecord {
    fn from_iter<I: IntoIterator<Item = Component>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
