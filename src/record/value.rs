//! Tagged field values.
//!
//! The slot variant is chosen from the field's descriptor when the value is
//! written, so reads are a `match` instead of a string parse. Pointer slots
//! carry no data of their own: the target lives in the owning record's
//! forward set, keyed by field index.

use crate::schema::{FieldDescriptor, FieldKind};
use std::fmt;

/// One field slot.
///
/// Numbers keep the text they were written with, so `1.50E2` reads back as
/// written; equality compares the parsed value only.
#[derive(Debug, Clone)]
pub enum FieldValue {
    /// Absent or null literal.
    Empty,
    /// Text, choice key, or numeric text that did not parse (e.g. `autosize`).
    Text(String),
    /// Finite number in an `Integer` or `Real` field.
    Number { value: f64, text: String },
    /// Pointer slot; see [`Record::target`](super::Record::target).
    Pointer,
}

impl FieldValue {
    /// Interpret `text` for a field described by `descriptor`.
    ///
    /// Pointer fields always produce [`FieldValue::Pointer`]; resolving the
    /// text to a target is the graph's job.
    pub fn from_text(descriptor: &FieldDescriptor, text: &str) -> Self {
        if descriptor.is_pointer() {
            return FieldValue::Pointer;
        }
        if text.is_empty() {
            return FieldValue::Empty;
        }
        match descriptor.kind {
            FieldKind::Integer | FieldKind::Real => match parse_finite(text) {
                Some(value) => FieldValue::Number {
                    value,
                    text: text.to_string(),
                },
                None => FieldValue::Text(text.to_string()),
            },
            _ => FieldValue::Text(text.to_string()),
        }
    }

    /// Number written in its shortest form.
    pub fn number(value: f64) -> Self {
        FieldValue::Number {
            value,
            text: value.to_string(),
        }
    }

    /// Parsed value of a numeric slot.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number { value, .. } => Some(*value),
            _ => None,
        }
    }

    /// Blank slot for `descriptor`.
    pub fn blank(descriptor: Option<&FieldDescriptor>) -> Self {
        match descriptor {
            Some(d) if d.is_pointer() => FieldValue::Pointer,
            _ => FieldValue::Empty,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Empty)
    }

    /// Literal text, or `None` for empty and pointer slots.
    pub fn literal(&self) -> Option<String> {
        match self {
            FieldValue::Empty | FieldValue::Pointer => None,
            FieldValue::Text(s) | FieldValue::Number { text: s, .. } => Some(s.clone()),
        }
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FieldValue::Empty, FieldValue::Empty) | (FieldValue::Pointer, FieldValue::Pointer) => true,
            (FieldValue::Text(a), FieldValue::Text(b)) => a == b,
            (FieldValue::Number { value: a, .. }, FieldValue::Number { value: b, .. }) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Empty | FieldValue::Pointer => Ok(()),
            FieldValue::Text(s) | FieldValue::Number { text: s, .. } => f.write_str(s),
        }
    }
}

/// Parse a number, refusing NaN and infinities.
pub(crate) fn parse_finite(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
