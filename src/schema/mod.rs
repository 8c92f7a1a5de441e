//! Schema view: the read-only type descriptions records are built from.
//!
//! The graph never owns a schema; it consults a [`SchemaProvider`] through an
//! `Arc` and resolves each record's [`TypeDescriptor`] once, when the record
//! is created.

pub mod in_memory;
pub mod types;

pub use in_memory::InMemorySchema;
pub use types::{ALL_OBJECTS, Bound, FieldDescriptor, FieldKind, TypeDescriptor, TypeId};

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How pointer fields are written by the serializer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PointerConvention {
    /// Pointers serialize as the target's name; unnamed targets get one.
    #[default]
    ByName,
    /// Pointers serialize as the target's identity string.
    ByIdentity,
}

/// Source of type descriptors.
pub trait SchemaProvider {
    /// Descriptor for `id`, or `None` if the schema does not know the type.
    fn type_descriptor(&self, id: &TypeId) -> Option<Arc<TypeDescriptor>>;

    /// Every type the schema describes, in schema order.
    fn type_ids(&self) -> Vec<TypeId>;

    /// Serialization convention for pointer fields.
    fn pointer_convention(&self) -> PointerConvention {
        PointerConvention::ByName
    }
}

impl<T: SchemaProvider + ?Sized> SchemaProvider for Arc<T> {
    #[inline]
    fn type_descriptor(&self, id: &TypeId) -> Option<Arc<TypeDescriptor>> {
        (**self).type_descriptor(id)
    }
    #[inline]
    fn type_ids(&self) -> Vec<TypeId> {
        (**self).type_ids()
    }
    #[inline]
    fn pointer_convention(&self) -> PointerConvention {
        (**self).pointer_convention()
    }
}
