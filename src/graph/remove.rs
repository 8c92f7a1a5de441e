//! Removal: disconnect a record, nulling every pointer into or out of it.
//! There is no cascading delete.

use super::Graph;
use super::invariants::inv_assert;
use crate::notify::{Entry, RelationshipChange};
use crate::record::{Handle, Record};
use crate::validity::StrictnessLevel;
use crate::schema::TypeId;
use std::collections::{HashMap, HashSet};

impl Graph {
    /// Remove `handle` from the graph.
    ///
    /// Every referrer's pointer field to it reads as "no target" afterwards.
    /// Returns `false` if `handle` is not a member, or, at Final, if the
    /// removal would leave the graph invalid (a referrer's required pointer
    /// or the last record of a required type).
    pub fn remove(&mut self, handle: Handle) -> bool {
        let ok = self.detach_inner(handle).is_some();
        self.finish();
        ok
    }

    /// [`remove`](Self::remove), handing back the disconnected record.
    /// The record reports itself uninitialized.
    pub fn detach(&mut self, handle: Handle) -> Option<Record> {
        let out = self.detach_inner(handle);
        self.finish();
        out
    }

    /// Remove several records as one unit: either all go or none do.
    pub fn remove_batch(&mut self, handles: &[Handle]) -> bool {
        let batch: HashSet<Handle> = handles.iter().copied().collect();
        if batch.iter().any(|h| !self.records.contains_key(h)) || self.removal_blocked(&batch) {
            return false;
        }
        for &h in handles {
            self.disconnect(h, true);
        }
        self.finish();
        true
    }

    fn detach_inner(&mut self, handle: Handle) -> Option<Record> {
        if !self.records.contains_key(&handle) {
            return None;
        }
        if self.removal_blocked(&HashSet::from([handle])) {
            log::debug!("{handle:?}: removal refused at {:?}", self.strictness);
            return None;
        }
        self.disconnect(handle, true)
    }

    /// At Final, would removing `batch` leave the graph invalid?
    fn removal_blocked(&self, batch: &HashSet<Handle>) -> bool {
        if self.strictness < StrictnessLevel::Final {
            return false;
        }
        let mut per_type: HashMap<&TypeId, usize> = HashMap::new();
        for h in batch {
            let Some(rec) = self.records.get(h) else {
                continue;
            };
            *per_type.entry(rec.type_id()).or_insert(0) += 1;
            for (src, i) in rec.reverse_pointers() {
                if batch.contains(&src) {
                    continue;
                }
                let required = self
                    .records
                    .get(&src)
                    .and_then(|s| s.field_descriptor(i))
                    .is_some_and(|d| d.required && d.default.is_none());
                if required {
                    return true;
                }
            }
        }
        per_type.into_iter().any(|(t, n)| {
            self.schema
                .type_descriptor(t)
                .is_some_and(|d| d.required && self.count_by_type(t) <= n)
        })
    }

    /// Unconditionally disconnect `handle`. With `journal`, the removal and
    /// every referrer's nulled field are recorded for notification.
    pub(crate) fn disconnect(&mut self, handle: Handle, journal: bool) -> Option<Record> {
        let record = self.records.get(&handle)?;
        let forward: Vec<(usize, Handle)> = record.forward_pointers().collect();
        let reverse: Vec<(Handle, usize)> = record.reverse_pointers().collect();

        for (i, t) in forward {
            self.unlink(handle, i, t);
        }
        if let Some(rec) = self.records.get_mut(&handle) {
            rec.forward.clear();
        }

        for (src, i) in reverse {
            if src == handle {
                continue;
            }
            let forwards = self
                .records
                .get(&src)
                .and_then(|s| s.field_descriptor(i))
                .map(|d| d.forwards.clone())
                .unwrap_or_default();
            let cleared = match self.records.get_mut(&src) {
                Some(s) if s.forward.get(&i) == Some(&handle) => {
                    s.forward.remove(&i);
                    true
                }
                _ => false,
            };
            if !cleared {
                inv_assert!(
                    cleared,
                    "reverse[{handle:?}] lists {src:?}[{i}] but that field does not point here"
                );
                log::debug!("{handle:?}: reverse pointer from {src:?}[{i}] cannot be followed");
                continue;
            }
            for list in &forwards {
                let native = self
                    .records
                    .get(&handle)
                    .is_some_and(|r| r.descriptor().references.contains(list));
                self.index.forward_loss(list, handle, native);
            }
            if journal {
                self.events.record(Entry::Relationship(
                    src,
                    RelationshipChange { index: i, old_target: Some(handle), new_target: None },
                ));
            }
        }

        let mut record = self.records.shift_remove(&handle)?;
        self.index.remove(&record);
        self.order.forget(handle);
        record.forward.clear();
        record.reverse.clear();
        record.initialized = false;
        if journal {
            self.events
                .record(Entry::Removed(handle, record.type_id().clone()));
        }
        Some(record)
    }
}
