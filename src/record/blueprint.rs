//! `Blueprint`: the textual description of a record awaiting admission.
//!
//! Blueprints are what the serializer produces on read and consumes on
//! write. Every field is text; pointer fields carry either a target name or
//! a target identity string and are resolved when the blueprint is admitted.

use crate::record::handle::Handle;
use crate::schema::TypeId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blueprint {
    pub type_id: TypeId,
    /// Identity to preserve; a fresh one is minted when `None`.
    pub handle: Option<Handle>,
    pub comment: String,
    pub fields: Vec<String>,
}

impl Blueprint {
    pub fn new(type_id: impl Into<TypeId>) -> Self {
        Self {
            type_id: type_id.into(),
            handle: None,
            comment: String::new(),
            fields: Vec::new(),
        }
    }

    pub fn with_handle(mut self, handle: Handle) -> Self {
        self.handle = Some(handle);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Set field `index`, padding with empty fields as needed.
    pub fn with_field(mut self, index: usize, value: impl Into<String>) -> Self {
        if self.fields.len() <= index {
            self.fields.resize(index + 1, String::new());
        }
        self.fields[index] = value.into();
        self
    }

    /// Append field values in order.
    pub fn with_fields<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.extend(values.into_iter().map(Into::into));
        self
    }

    /// Text of field `index`, empty when absent.
    pub fn field(&self, index: usize) -> &str {
        self.fields.get(index).map_or("", String::as_str)
    }
}
