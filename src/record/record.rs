//! `Record`: one schema-typed instance owned by a [`Graph`](crate::graph::Graph).
//!
//! A record owns its field slots and both halves of its pointer bookkeeping:
//! the *forward* map (field index → target) and the *reverse* set of
//! `(source, field index)` pairs pointing at it. The two halves of every
//! pointer live on different records; only the graph can keep them mirrored,
//! so every mutator here is crate-private and the graph is the sole caller.

use super::handle::Handle;
use super::value::FieldValue;
use crate::schema::{FieldDescriptor, TypeDescriptor, TypeId};
use itertools::Itertools;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Record {
    pub(crate) handle: Handle,
    pub(crate) descriptor: Arc<TypeDescriptor>,
    pub(crate) comment: String,
    pub(crate) fields: Vec<FieldValue>,
    /// Field index → target.
    pub(crate) forward: BTreeMap<usize, Handle>,
    /// `(source, source field index)` pairs that target this record.
    pub(crate) reverse: BTreeSet<(Handle, usize)>,
    pub(crate) initialized: bool,
}

impl Record {
    pub(crate) fn new(handle: Handle, descriptor: Arc<TypeDescriptor>) -> Self {
        Self {
            handle,
            descriptor,
            comment: String::new(),
            fields: Vec::new(),
            forward: BTreeMap::new(),
            reverse: BTreeSet::new(),
            initialized: false,
        }
    }

    #[inline]
    pub fn handle(&self) -> Handle {
        self.handle
    }

    #[inline]
    pub fn type_id(&self) -> &TypeId {
        &self.descriptor.id
    }

    #[inline]
    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    /// `false` once the record has been disconnected from its graph.
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    #[inline]
    pub fn num_fields(&self) -> usize {
        self.fields.len()
    }

    /// Descriptor of field `index`, if the schema defines one there.
    pub fn field_descriptor(&self, index: usize) -> Option<&FieldDescriptor> {
        self.descriptor.field(index)
    }

    /// Raw slot at `index`.
    pub fn value(&self, index: usize) -> Option<&FieldValue> {
        self.fields.get(index)
    }

    /// Literal text of a non-pointer field; `None` when absent or empty.
    pub fn literal(&self, index: usize) -> Option<String> {
        self.fields.get(index).and_then(FieldValue::literal)
    }

    /// Target of pointer field `index`.
    #[inline]
    pub fn target(&self, index: usize) -> Option<Handle> {
        self.forward.get(&index).copied()
    }

    /// `true` if field `index` is absent, empty, or a pointer with no target.
    pub fn is_null(&self, index: usize) -> bool {
        match self.fields.get(index) {
            None | Some(FieldValue::Empty) => true,
            Some(FieldValue::Pointer) => !self.forward.contains_key(&index),
            Some(_) => false,
        }
    }

    /// The record's name: `None` if the type has no name field, `Some("")`
    /// if it has one that is not set.
    pub fn name(&self) -> Option<&str> {
        let idx = self.descriptor.name_index()?;
        match self.fields.get(idx) {
            Some(FieldValue::Text(s)) => Some(s.as_str()),
            _ => Some(""),
        }
    }

    /// Distinct targets, in field order.
    pub fn targets(&self) -> Vec<Handle> {
        self.forward.values().copied().unique().collect()
    }

    /// Distinct records pointing here.
    pub fn sources(&self) -> Vec<Handle> {
        self.reverse.iter().map(|&(src, _)| src).dedup().collect()
    }

    /// Field indices through which `source` points at this record.
    pub fn source_indices(&self, source: Handle) -> Vec<usize> {
        self.reverse
            .range((source, 0)..=(source, usize::MAX))
            .map(|&(_, i)| i)
            .collect()
    }

    /// `(field index, target)` pairs held by this record.
    pub fn forward_pointers(&self) -> impl Iterator<Item = (usize, Handle)> + '_ {
        self.forward.iter().map(|(&i, &h)| (i, h))
    }

    /// `(source, field index)` pairs held against this record.
    pub fn reverse_pointers(&self) -> impl Iterator<Item = (Handle, usize)> + '_ {
        self.reverse.iter().copied()
    }

    pub fn num_extensible_groups(&self) -> usize {
        let g = self.descriptor.group_size();
        let fixed = self.descriptor.num_fixed();
        if g == 0 || self.fields.len() <= fixed {
            0
        } else {
            (self.fields.len() - fixed) / g
        }
    }

    // ---------------------------------------------------------------------
    // Scratch-state helpers (graph only)
    // ---------------------------------------------------------------------

    /// Copy of fields and forward map for a copy-on-attempt edit. The reverse
    /// set is left empty; it never changes as part of the record's own edit.
    pub(crate) fn scratch(&self) -> Record {
        Record {
            handle: self.handle,
            descriptor: Arc::clone(&self.descriptor),
            comment: self.comment.clone(),
            fields: self.fields.clone(),
            forward: self.forward.clone(),
            reverse: BTreeSet::new(),
            initialized: self.initialized,
        }
    }

    /// Pad with blank slots up to `len` fields.
    pub(crate) fn extend_to(&mut self, len: usize) {
        while self.fields.len() < len {
            let blank = FieldValue::blank(self.descriptor.field(self.fields.len()));
            self.fields.push(blank);
        }
    }

    /// Field count needed to hold `index` without leaving a partial group.
    pub(crate) fn whole_len_for(&self, index: usize) -> usize {
        match self.descriptor.group_of(index) {
            Some(group) => self.descriptor.group_start(group + 1),
            None => index + 1,
        }
    }

    /// Open `count` blank slots at `start`, renumbering pointers above it.
    pub(crate) fn open_slots(&mut self, start: usize, count: usize) {
        let blanks: Vec<FieldValue> = (0..count)
            .map(|k| FieldValue::blank(self.descriptor.field(start + k)))
            .collect();
        self.fields.splice(start..start, blanks);
        let upper = self.forward.split_off(&start);
        self.forward
            .extend(upper.into_iter().map(|(i, h)| (i + count, h)));
    }

    /// Remove `count` slots at `start`, dropping their pointers and
    /// renumbering pointers above them.
    pub(crate) fn close_slots(&mut self, start: usize, count: usize) {
        self.fields.drain(start..start + count);
        let mut upper = self.forward.split_off(&start);
        let above = upper.split_off(&(start + count));
        self.forward
            .extend(above.into_iter().map(|(i, h)| (i - count, h)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldDescriptor;

    fn list_type() -> Arc<TypeDescriptor> {
        Arc::new(
            TypeDescriptor::new("ZoneList")
                .with_field(FieldDescriptor::name("Name"))
                .with_extensible_group(vec![
                    FieldDescriptor::pointer("Zone", ["ZoneNames"]),
                    FieldDescriptor::real("Multiplier"),
                ]),
        )
    }

    #[test]
    fn fresh_record_is_uninitialized_and_unnamed() {
        let r = Record::new(Handle::mint(), list_type());
        assert!(!r.is_initialized());
        assert_eq!(r.name(), Some(""));
        assert_eq!(r.num_fields(), 0);
        assert!(r.is_null(0));
    }

    #[test]
    fn extend_to_uses_descriptor_slots() {
        let mut r = Record::new(Handle::mint(), list_type());
        r.extend_to(3);
        assert_eq!(
            r.fields,
            vec![FieldValue::Empty, FieldValue::Pointer, FieldValue::Empty]
        );
        assert_eq!(r.num_extensible_groups(), 1);
        assert_eq!(r.whole_len_for(4), 5);
        assert_eq!(r.whole_len_for(0), 1);
    }

    #[test]
    fn open_and_close_slots_renumber_pointers() {
        let a = Handle::mint();
        let b = Handle::mint();
        let mut r = Record::new(Handle::mint(), list_type());
        r.extend_to(5);
        r.forward.insert(1, a);
        r.forward.insert(3, b);

        r.open_slots(3, 2);
        assert_eq!(r.num_fields(), 7);
        assert_eq!(r.target(1), Some(a));
        assert_eq!(r.target(3), None);
        assert_eq!(r.target(5), Some(b));
        assert_eq!(r.fields[3], FieldValue::Pointer);

        r.close_slots(1, 2);
        assert_eq!(r.num_fields(), 5);
        assert_eq!(r.target(1), None);
        assert_eq!(r.target(3), Some(b));
        assert_eq!(r.targets(), vec![b]);
    }

    #[test]
    fn sources_and_indices_are_deduplicated() {
        let src = Handle::mint();
        let other = Handle::mint();
        let mut r = Record::new(Handle::mint(), list_type());
        r.reverse.insert((src, 1));
        r.reverse.insert((src, 3));
        r.reverse.insert((other, 1));
        let sources = r.sources();
        assert_eq!(sources.len(), 2);
        assert!(sources.contains(&src) && sources.contains(&other));
        assert_eq!(r.source_indices(src), vec![1, 3]);
        assert!(r.source_indices(Handle::mint()).is_empty());
    }

    #[test]
    fn scratch_drops_reverse_only() {
        let mut r = Record::new(Handle::mint(), list_type());
        r.extend_to(3);
        r.forward.insert(1, Handle::mint());
        r.reverse.insert((Handle::mint(), 1));
        let s = r.scratch();
        assert_eq!(s.fields, r.fields);
        assert_eq!(s.forward, r.forward);
        assert!(s.reverse.is_empty());
    }
}
