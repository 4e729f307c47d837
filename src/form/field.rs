//! Field classification and field values

use std::fmt;

use indexmap::IndexMap;
use lopdf::{Dictionary, Object};

/// Field values to write, keyed by field name, in insertion order
pub type FieldValues = IndexMap<String, FieldValue>;

/// Kind of form field an annotation node stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// `/FT /Tx` without kids
    TextField,
    /// `/FT /Btn` without kids
    Checkbox,
    /// `/FT /Btn` whose kids are the group's option widgets
    RadioGroup,
}

impl FieldKind {
    /// Classify a field node from its own `/FT` tag and `/Kids` array
    ///
    /// Returns `None` for nodes the filler does not write to (choice and
    /// signature fields, text fields with widget kids, nodes without `/FT`).
    /// A `/Kids` entry that is an indirect reference counts as present.
    pub fn classify(node: &Dictionary) -> Option<Self> {
        let field_type = node.get(b"FT").and_then(Object::as_name).ok()?;
        let has_kids = match node.get(b"Kids") {
            Ok(Object::Array(kids)) => !kids.is_empty(),
            Ok(Object::Reference(_)) => true,
            _ => false,
        };

        match (field_type, has_kids) {
            (b"Tx", false) => Some(FieldKind::TextField),
            (b"Btn", false) => Some(FieldKind::Checkbox),
            (b"Btn", true) => Some(FieldKind::RadioGroup),
            _ => None,
        }
    }
}

/// A value to write in a form field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Free text
    Text(String),
    /// Whole number, also the index form of a radio button choice
    Integer(i64),
    /// Decimal number, typically an amount
    Real(f64),
    /// Yes/no value written as text
    Bool(bool),
    /// Appearance state name for a checkbox, without the leading `/`
    Name(String),
}

impl FieldValue {
    /// Checkbox appearance state name
    pub fn name(name: impl Into<String>) -> Self {
        FieldValue::Name(name.into())
    }

    /// Numeric value, if this is a number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(n) => Some(*n as f64),
            FieldValue::Real(x) => Some(*x),
            _ => None,
        }
    }

    /// Radio button index, if this is a whole number
    pub fn as_index(&self) -> Option<isize> {
        match self {
            FieldValue::Integer(n) => isize::try_from(*n).ok(),
            _ => None,
        }
    }

    /// Short type label used when printing field settings
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Text(_) => "text",
            FieldValue::Integer(_) => "integer",
            FieldValue::Real(_) => "real",
            FieldValue::Bool(_) => "boolean",
            FieldValue::Name(_) => "name",
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(text) => f.write_str(text),
            FieldValue::Integer(n) => write!(f, "{}", n),
            // Whole reals keep their decimal point: `120.0`, not `120`
            FieldValue::Real(x) if x.fract() == 0.0 && x.abs() < 1e16 => write!(f, "{:.1}", x),
            FieldValue::Real(x) => write!(f, "{}", x),
            FieldValue::Bool(true) => f.write_str("True"),
            FieldValue::Bool(false) => f.write_str("False"),
            FieldValue::Name(name) => f.write_str(name),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(text: &str) -> Self {
        FieldValue::Text(text.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(text: String) -> Self {
        FieldValue::Text(text)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Integer(n)
    }
}

impl From<f64> for FieldValue {
    fn from(x: f64) -> Self {
        FieldValue::Real(x)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}
