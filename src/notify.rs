//! Change notifications.
//!
//! Mutators append entries to a journal while they work; when a top-level
//! call commits, the journal is coalesced into at most one [`GraphEvent`]
//! per record and handed to every listener. Rejected calls truncate the
//! journal, so listeners never hear about them.

use crate::record::Handle;
use crate::schema::TypeId;
use indexmap::{IndexMap, IndexSet};
use std::fmt;

/// A pointer field that changed target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationshipChange {
    pub index: usize,
    pub old_target: Option<Handle>,
    pub new_target: Option<Handle>,
}

/// Coalesced changes to one record during one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordChange {
    pub handle: Handle,
    pub name_changed: bool,
    /// Any literal other than the name changed.
    pub data_changed: bool,
    pub relationships: Vec<RelationshipChange>,
}

impl RecordChange {
    fn new(handle: Handle) -> Self {
        Self {
            handle,
            name_changed: false,
            data_changed: false,
            relationships: Vec::new(),
        }
    }

    fn is_empty(&self) -> bool {
        !self.name_changed && !self.data_changed && self.relationships.is_empty()
    }

    fn relate(&mut self, change: RelationshipChange) {
        match self
            .relationships
            .iter_mut()
            .find(|r| r.index == change.index)
        {
            Some(existing) => existing.new_target = change.new_target,
            None => self.relationships.push(change),
        }
        self.relationships.retain(|r| r.old_target != r.new_target);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphEvent {
    Added(Handle),
    Removed { handle: Handle, type_id: TypeId },
    Changed(RecordChange),
}

/// Token returned by [`Graph::subscribe`](crate::graph::Graph::subscribe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Debug, Clone)]
pub(crate) enum Entry {
    Added(Handle),
    Removed(Handle, TypeId),
    Name(Handle),
    Data(Handle),
    Relationship(Handle, RelationshipChange),
}

type Listener = Box<dyn FnMut(&GraphEvent)>;

#[derive(Default)]
pub(crate) struct EventHub {
    listeners: Vec<(ListenerId, Listener)>,
    next_id: u64,
    journal: Vec<Entry>,
}

impl fmt::Debug for EventHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHub")
            .field("listeners", &self.listeners.len())
            .field("journal", &self.journal)
            .finish()
    }
}

impl EventHub {
    pub(crate) fn subscribe(&mut self, listener: Listener) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners.push((id, listener));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(l, _)| *l != id);
        self.listeners.len() != before
    }

    #[inline]
    pub(crate) fn record(&mut self, entry: Entry) {
        self.journal.push(entry);
    }

    #[inline]
    pub(crate) fn checkpoint(&self) -> usize {
        self.journal.len()
    }

    pub(crate) fn rollback(&mut self, checkpoint: usize) {
        self.journal.truncate(checkpoint);
    }

    /// Coalesce the journal and deliver it.
    pub(crate) fn flush(&mut self) {
        if self.journal.is_empty() {
            return;
        }
        let events = coalesce(std::mem::take(&mut self.journal));
        for event in &events {
            for (_, listener) in self.listeners.iter_mut() {
                listener(event);
            }
        }
    }
}

fn coalesce(journal: Vec<Entry>) -> Vec<GraphEvent> {
    let mut added: IndexSet<Handle> = IndexSet::new();
    let mut removed: IndexMap<Handle, TypeId> = IndexMap::new();
    let mut changed: IndexMap<Handle, RecordChange> = IndexMap::new();

    for entry in journal {
        match entry {
            Entry::Added(h) => {
                added.insert(h);
            }
            Entry::Removed(h, t) => {
                removed.insert(h, t);
            }
            Entry::Name(h) => {
                changed
                    .entry(h)
                    .or_insert_with(|| RecordChange::new(h))
                    .name_changed = true;
            }
            Entry::Data(h) => {
                changed
                    .entry(h)
                    .or_insert_with(|| RecordChange::new(h))
                    .data_changed = true;
            }
            Entry::Relationship(h, rel) => {
                changed
                    .entry(h)
                    .or_insert_with(|| RecordChange::new(h))
                    .relate(rel);
            }
        }
    }

    let mut events = Vec::new();
    events.extend(
        added
            .iter()
            .filter(|h| !removed.contains_key(*h))
            .map(|&h| GraphEvent::Added(h)),
    );
    events.extend(
        changed
            .into_values()
            .filter(|c| !c.is_empty())
            .filter(|c| !added.contains(&c.handle) && !removed.contains_key(&c.handle))
            .map(GraphEvent::Changed),
    );
    events.extend(
        removed
            .into_iter()
            .filter(|(h, _)| !added.contains(h))
            .map(|(handle, type_id)| GraphEvent::Removed { handle, type_id }),
    );
    events
}
