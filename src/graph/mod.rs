//! The `Graph`: membership, indexing, strictness enforcement, admission,
//! mutation and removal of records.
//!
//! Records live in an insertion-ordered arena keyed by [`Handle`]. Pointer
//! fields are stored as index entries (`forward` on the source, `reverse` on
//! the target), never as owning references, so no record owns another.
//!
//! Every mutating call follows the same shape: build a scratch copy of the
//! affected record, audit it at the active [`StrictnessLevel`], then swap it
//! in and mirror the pointer changes. A rejected call leaves no trace,
//! including in the change journal.
//!
//! ```rust
//! use bem_graph::prelude::*;
//!
//! let schema = InMemorySchema::new()
//!     .with_type(
//!         TypeDescriptor::new("Zone")
//!             .with_field(FieldDescriptor::name("Name").required())
//!             .in_reference_list("ZoneNames"),
//!     )
//!     .with_type(
//!         TypeDescriptor::new("Lights")
//!             .with_field(FieldDescriptor::name("Name"))
//!             .with_field(FieldDescriptor::pointer("Zone Name", ["ZoneNames"])),
//!     );
//! let mut graph = Graph::new(schema.into_shared());
//!
//! let zone = graph.admit(Blueprint::new("Zone"), PointerPolicy::Nullify).unwrap();
//! assert_eq!(graph.record(zone).unwrap().name(), Some("Zone 1"));
//!
//! let lights = graph
//!     .admit(
//!         Blueprint::new("Lights").with_fields(["Lights 1", "Zone 1"]),
//!         PointerPolicy::Strict,
//!     )
//!     .unwrap();
//! assert_eq!(graph.target(lights, 1), Some(zone));
//!
//! assert!(graph.set_name(zone, "Main Zone"));
//! assert_eq!(graph.get_string(lights, 1), "Main Zone");
//! ```

mod admit;
mod clone;
mod export;
mod groups;
pub(crate) mod index;
mod invariants;
mod mutate;
mod remove;

#[cfg(test)]
mod tests;

use crate::notify::{EventHub, GraphEvent, ListenerId};
use crate::order::{OrderEditor, RecordOrder};
use crate::record::names::{base_names_match, construct_next_name, eq_ignore_case};
use crate::record::{FieldValue, Handle, Record};
use crate::schema::{ALL_OBJECTS, FieldDescriptor, SchemaProvider, TypeId};
use crate::validity::{StrictnessLevel, ValidityReport, classify_graph, classify_record};
use index::GraphIndex;
use indexmap::IndexMap;
use itertools::Itertools;
use std::fmt;
use std::sync::Arc;

/// What admission does with pointer text it cannot resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerPolicy {
    /// Log a warning and commit the field as null.
    Nullify,
    /// Fail the whole batch.
    Strict,
}

/// Construction-time settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphOptions {
    /// Initial strictness level.
    pub strictness: StrictnessLevel,
    /// Admission renames incoming records whose names clash with members.
    pub rename_on_admit: bool,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            strictness: StrictnessLevel::Draft,
            rename_on_admit: true,
        }
    }
}

pub struct Graph {
    pub(crate) schema: Arc<dyn SchemaProvider>,
    pub(crate) records: IndexMap<Handle, Record>,
    pub(crate) index: GraphIndex,
    pub(crate) order: RecordOrder,
    pub(crate) strictness: StrictnessLevel,
    pub(crate) options: GraphOptions,
    pub(crate) events: EventHub,
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("records", &self.records.len())
            .field("strictness", &self.strictness)
            .field("order", &self.order)
            .finish()
    }
}

impl Graph {
    pub fn new(schema: Arc<dyn SchemaProvider>) -> Self {
        Self::with_options(schema, GraphOptions::default())
    }

    pub fn with_options(schema: Arc<dyn SchemaProvider>, options: GraphOptions) -> Self {
        Self {
            schema,
            records: IndexMap::new(),
            index: GraphIndex::default(),
            order: RecordOrder::default(),
            strictness: options.strictness,
            options,
            events: EventHub::default(),
        }
    }

    pub fn schema(&self) -> &Arc<dyn SchemaProvider> {
        &self.schema
    }

    pub fn options(&self) -> GraphOptions {
        self.options
    }

    // ---------------------------------------------------------------------
    // Membership & enumeration
    // ---------------------------------------------------------------------

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[inline]
    pub fn is_member(&self, handle: Handle) -> bool {
        self.records.contains_key(&handle)
    }

    /// The member record with `handle`.
    #[inline]
    pub fn record(&self, handle: Handle) -> Option<&Record> {
        self.records.get(&handle)
    }

    /// Alias of [`record`](Self::record).
    #[inline]
    pub fn lookup_by_handle(&self, handle: Handle) -> Option<&Record> {
        self.records.get(&handle)
    }

    /// Member handles in insertion order, or ordered by the order policy.
    pub fn handles(&self, sorted: bool) -> Vec<Handle> {
        let all: Vec<Handle> = self.records.keys().copied().collect();
        if sorted { self.sort(&all) } else { all }
    }

    /// Member records in insertion order, or ordered by the order policy.
    pub fn records(&self, sorted: bool) -> Vec<&Record> {
        if !sorted {
            return self.records.values().collect();
        }
        self.handles(true)
            .into_iter()
            .filter_map(|h| self.records.get(&h))
            .collect()
    }

    /// A newly ordered copy of `handles` under the order policy.
    pub fn sort(&self, handles: &[Handle]) -> Vec<Handle> {
        self.order.sort(
            handles,
            |h| self.records.get(&h).map(|r| r.type_id().clone()),
            |h| self.records.get_index_of(&h),
        )
    }

    /// Records ordered by the order policy.
    pub fn sort_records<'a>(&'a self, records: &[&'a Record]) -> Vec<&'a Record> {
        let handles: Vec<Handle> = records.iter().map(|r| r.handle()).collect();
        self.sort(&handles)
            .into_iter()
            .filter_map(|h| records.iter().find(|r| r.handle() == h).copied())
            .collect()
    }

    pub fn order(&self) -> &RecordOrder {
        &self.order
    }

    /// Direct-order editor; see [`OrderEditor`].
    pub fn order_mut(&mut self) -> OrderEditor<'_> {
        OrderEditor {
            order: &mut self.order,
            members: &self.records,
        }
    }

    // ---------------------------------------------------------------------
    // Indexed lookups
    // ---------------------------------------------------------------------

    /// Members whose name matches `name`, case-insensitively. When `exact`
    /// is `false`, any member in the same name series matches too
    /// (`Zone 2` finds `Zone 1`, `zone` and `Zone_7`).
    pub fn lookup_by_name(&self, name: &str, exact: bool) -> Vec<Handle> {
        let set = if exact {
            self.index.named(name)
        } else {
            self.index.in_series(name)
        };
        set.map(|s| s.iter().copied().collect()).unwrap_or_default()
    }

    pub fn lookup_by_type(&self, type_id: &TypeId) -> Vec<Handle> {
        self.index
            .of_type(type_id)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn count_by_type(&self, type_id: &TypeId) -> usize {
        self.index.of_type(type_id).map_or(0, |s| s.len())
    }

    /// The member of `type_id` named exactly `name` (case-insensitive).
    pub fn lookup_by_type_and_name(&self, type_id: &TypeId, name: &str) -> Option<Handle> {
        self.index
            .named(name)?
            .iter()
            .copied()
            .find(|h| self.records.get(h).is_some_and(|r| r.type_id() == type_id))
    }

    /// Members that belong to reference list `list`.
    pub fn lookup_by_reference_list(&self, list: &str) -> Vec<Handle> {
        if list == ALL_OBJECTS {
            return self.records.keys().copied().collect();
        }
        self.index
            .in_list(list)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Members that belong to any of `lists`, without duplicates.
    pub fn lookup_by_reference_lists<S: AsRef<str>>(&self, lists: &[S]) -> Vec<Handle> {
        lists
            .iter()
            .flat_map(|l| self.lookup_by_reference_list(l.as_ref()))
            .unique()
            .collect()
    }

    /// Members named exactly `name` that belong to any of `lists`.
    pub fn lookup_by_name_and_reference<S: AsRef<str>>(&self, name: &str, lists: &[S]) -> Vec<Handle> {
        self.lookup_by_name(name, true)
            .into_iter()
            .filter(|&h| self.can_be_target(h, lists))
            .collect()
    }

    /// `true` if `handle` is a member of any of `lists`.
    pub fn can_be_target<S: AsRef<str>>(&self, handle: Handle, lists: &[S]) -> bool {
        self.records.contains_key(&handle)
            && lists.iter().any(|l| {
                let l = l.as_ref();
                l == ALL_OBJECTS || self.index.in_list(l).is_some_and(|s| s.contains(&handle))
            })
    }

    /// Other members whose name clashes with `record`'s: same name,
    /// case-insensitively, and at least one shared declared reference list.
    pub fn name_conflicts(&self, record: &Record) -> Vec<Handle> {
        match record.name() {
            Some(name) if !name.is_empty() => {
                self.clashes_with(record.handle(), &record.descriptor().references, name)
            }
            _ => Vec::new(),
        }
    }

    pub(crate) fn clashes_with(&self, handle: Handle, references: &[String], name: &str) -> Vec<Handle> {
        let Some(named) = self.index.named(name) else {
            return Vec::new();
        };
        named
            .iter()
            .copied()
            .filter(|&other| other != handle)
            .filter(|other| {
                self.records.get(other).is_some_and(|r| {
                    r.descriptor()
                        .references
                        .iter()
                        .any(|l| references.contains(l))
                })
            })
            .collect()
    }

    /// Next unused name in `name`'s series across the whole graph.
    pub fn next_name(&self, name: &str, fill_in: bool) -> String {
        let series: Vec<&str> = self
            .index
            .in_series(name)
            .into_iter()
            .flatten()
            .filter_map(|h| self.records.get(h).and_then(Record::name))
            .collect();
        construct_next_name(name, series, fill_in)
    }

    /// Next default name for records of `type_id`, e.g. `Zone 3`.
    pub fn next_name_for_type(&self, type_id: &TypeId, fill_in: bool) -> String {
        let base = type_id.default_name_base();
        let series: Vec<&str> = self
            .index
            .of_type(type_id)
            .into_iter()
            .flatten()
            .filter_map(|h| self.records.get(h).and_then(Record::name))
            .filter(|n| base_names_match(&base, n))
            .collect();
        construct_next_name(&base, series, fill_in)
    }

    // ---------------------------------------------------------------------
    // Field reads
    // ---------------------------------------------------------------------

    /// Field `index` of `handle` as text.
    ///
    /// Pointer fields resolve to the target's name, or its identity string
    /// when the target is unnamed. An absent or null field yields the schema
    /// default when `return_default` is set, otherwise `None`.
    pub fn get(&self, handle: Handle, index: usize, return_default: bool) -> Option<String> {
        let record = self.records.get(&handle)?;
        let desc = record.field_descriptor(index)?;
        let value = match record.value(index) {
            Some(FieldValue::Pointer) => record.target(index).map(|t| self.display_target(t)),
            Some(v) => v.literal(),
            None => None,
        };
        value.or_else(|| {
            if return_default {
                desc.default.clone()
            } else {
                None
            }
        })
    }

    /// [`get`](Self::get) without defaults, empty when there is no value.
    pub fn get_string(&self, handle: Handle, index: usize) -> String {
        self.get(handle, index, false).unwrap_or_default()
    }

    /// Target of pointer field `index`.
    pub fn target(&self, handle: Handle, index: usize) -> Option<Handle> {
        self.records.get(&handle)?.target(index)
    }

    /// Targets of every pointer field, deduplicated.
    pub fn targets(&self, handle: Handle) -> Vec<Handle> {
        self.records.get(&handle).map(Record::targets).unwrap_or_default()
    }

    /// Records pointing at `handle`, deduplicated.
    pub fn sources(&self, handle: Handle) -> Vec<Handle> {
        self.records.get(&handle).map(Record::sources).unwrap_or_default()
    }

    /// Field indices through which `source` points at `handle`.
    pub fn source_indices(&self, handle: Handle, source: Handle) -> Vec<usize> {
        self.records
            .get(&handle)
            .map(|r| r.source_indices(source))
            .unwrap_or_default()
    }

    pub(crate) fn display_target(&self, target: Handle) -> String {
        match self.records.get(&target).and_then(Record::name) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => target.to_string(),
        }
    }

    /// Resolve pointer text against members: `Some(None)` for empty text,
    /// `Some(Some(h))` when resolved, `None` when unresolved.
    pub(crate) fn resolve_pointer_text(
        &self,
        desc: &FieldDescriptor,
        text: &str,
    ) -> Option<Option<Handle>> {
        let text = text.trim();
        if text.is_empty() {
            return Some(None);
        }
        if let Some(h) = Handle::parse(text) {
            return self.records.contains_key(&h).then_some(Some(h));
        }
        let candidates = self.lookup_by_name(text, true);
        let lists = desc.reference_lists();
        if let Some(&h) = candidates.iter().find(|&&c| self.can_be_target(c, lists)) {
            return Some(Some(h));
        }
        if self.strictness < StrictnessLevel::Draft {
            return candidates.first().map(|&h| Some(h));
        }
        None
    }

    // ---------------------------------------------------------------------
    // Strictness & validity
    // ---------------------------------------------------------------------

    #[inline]
    pub fn strictness(&self) -> StrictnessLevel {
        self.strictness
    }

    /// Raise or lower the strictness level. Lowering always succeeds;
    /// raising succeeds only if the graph is already valid at `level`.
    pub fn set_strictness_level(&mut self, level: StrictnessLevel) -> bool {
        if level <= self.strictness {
            self.strictness = level;
            return true;
        }
        let report = self.report(level);
        if report.is_valid() {
            self.strictness = level;
            true
        } else {
            log::info!("strictness stays {:?}: {report}", self.strictness);
            false
        }
    }

    pub fn is_valid(&self, level: StrictnessLevel) -> bool {
        classify_graph(self, level).is_empty()
    }

    /// Audit every member plus type-level checks at `level`.
    pub fn report(&self, level: StrictnessLevel) -> ValidityReport {
        ValidityReport::new(level, classify_graph(self, level))
    }

    /// Audit one member at `level`.
    pub fn record_report(&self, handle: Handle, level: StrictnessLevel) -> Option<ValidityReport> {
        let record = self.records.get(&handle)?;
        Some(ValidityReport::new(level, classify_record(self, record, level)))
    }

    // ---------------------------------------------------------------------
    // Notifications
    // ---------------------------------------------------------------------

    /// Register a listener; it sees one coalesced batch of events after
    /// every committed top-level call.
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&GraphEvent) + 'static,
    {
        self.events.subscribe(Box::new(listener))
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.events.unsubscribe(id)
    }

    /// End of a top-level call: check invariants, then deliver events.
    pub(crate) fn finish(&mut self) {
        use crate::debug_invariants::DebugInvariants;
        self.debug_assert_invariants();
        self.events.flush();
    }

    // ---------------------------------------------------------------------
    // Pointer mirroring
    // ---------------------------------------------------------------------

    /// Mirror a new forward entry `source[index] -> target` onto the target.
    pub(crate) fn link(&mut self, source: Handle, index: usize, target: Handle) {
        let forwards = self.forwards_of(source, index);
        if let Some(t) = self.records.get_mut(&target) {
            t.reverse.insert((source, index));
        }
        for list in forwards {
            self.index.forward_gain(&list, target);
        }
    }

    /// Remove the mirror of `source[index] -> target` from the target.
    pub(crate) fn unlink(&mut self, source: Handle, index: usize, target: Handle) {
        let forwards = self.forwards_of(source, index);
        let Some(t) = self.records.get_mut(&target) else {
            return;
        };
        let present = t.reverse.remove(&(source, index));
        invariants::inv_assert!(
            present,
            "Missing mirror reverse[{target:?}] for forward {source:?}[{index}]"
        );
        for list in forwards {
            let native = t.descriptor().references.contains(&list);
            self.index.forward_loss(&list, target, native);
        }
    }

    fn forwards_of(&self, source: Handle, index: usize) -> Vec<String> {
        self.records
            .get(&source)
            .and_then(|r| r.field_descriptor(index))
            .map(|d| d.forwards.clone())
            .unwrap_or_default()
    }
}

/// `true` if `a` and `b` name the same thing, ignoring case.
pub(crate) fn same_name(a: &str, b: &str) -> bool {
    eq_ignore_case(a, b)
}
