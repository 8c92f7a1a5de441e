//! `InMemorySchema`: a [`SchemaProvider`] backed by an ordered map.

use super::{PointerConvention, SchemaProvider, TypeDescriptor, TypeId};
use indexmap::IndexMap;
use std::sync::Arc;

/// Schema held entirely in memory, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct InMemorySchema {
    types: IndexMap<TypeId, Arc<TypeDescriptor>>,
    convention: PointerConvention,
}

impl InMemorySchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_type(mut self, descriptor: TypeDescriptor) -> Self {
        self.insert(descriptor);
        self
    }

    /// Switch pointer serialization to identity strings.
    pub fn by_identity(mut self) -> Self {
        self.convention = PointerConvention::ByIdentity;
        self
    }

    /// Add or replace a type. Returns the previous descriptor for that id.
    pub fn insert(&mut self, descriptor: TypeDescriptor) -> Option<Arc<TypeDescriptor>> {
        self.types
            .insert(descriptor.id.clone(), Arc::new(descriptor))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Wrap in an `Arc` ready to hand to a graph.
    pub fn into_shared(self) -> Arc<dyn SchemaProvider> {
        Arc::new(self)
    }
}

impl SchemaProvider for InMemorySchema {
    fn type_descriptor(&self, id: &TypeId) -> Option<Arc<TypeDescriptor>> {
        self.types.get(id).cloned()
    }

    fn type_ids(&self) -> Vec<TypeId> {
        self.types.keys().cloned().collect()
    }

    fn pointer_convention(&self) -> PointerConvention {
        self.convention
    }
}
