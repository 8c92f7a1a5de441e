//! Graph-owned lookup indices, maintained incrementally on every commit.
//!
//! * by type
//! * by lowercase name, and by lowercase base name for series lookups
//! * by reference list: the lists a type declares plus lists a record joins
//!   while some pointer field that *forwards* the list targets it

use crate::record::names::{base_name, name_key};
use crate::record::{Handle, Record};
use crate::schema::TypeId;
use indexmap::IndexSet;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub(crate) struct GraphIndex {
    by_type: HashMap<TypeId, IndexSet<Handle>>,
    by_name: HashMap<String, IndexSet<Handle>>,
    by_base: HashMap<String, IndexSet<Handle>>,
    by_reference: HashMap<String, IndexSet<Handle>>,
    /// How many forwarding pointers keep `(list, target)` alive.
    forwarded: HashMap<(String, Handle), usize>,
}

fn add(map: &mut HashMap<String, IndexSet<Handle>>, key: String, h: Handle) {
    map.entry(key).or_default().insert(h);
}

fn drop_from(map: &mut HashMap<String, IndexSet<Handle>>, key: &str, h: Handle) {
    if let Some(set) = map.get_mut(key) {
        set.shift_remove(&h);
        if set.is_empty() {
            map.remove(key);
        }
    }
}

impl GraphIndex {
    pub(crate) fn insert(&mut self, record: &Record) {
        let h = record.handle();
        self.by_type
            .entry(record.type_id().clone())
            .or_default()
            .insert(h);
        if let Some(name) = record.name() {
            self.add_name(h, name);
        }
        for list in &record.descriptor().references {
            add(&mut self.by_reference, list.clone(), h);
        }
    }

    pub(crate) fn remove(&mut self, record: &Record) {
        let h = record.handle();
        if let Some(set) = self.by_type.get_mut(record.type_id()) {
            set.shift_remove(&h);
            if set.is_empty() {
                self.by_type.remove(record.type_id());
            }
        }
        if let Some(name) = record.name() {
            self.drop_name(h, name);
        }
        for list in &record.descriptor().references {
            drop_from(&mut self.by_reference, list, h);
        }
        let stale: Vec<(String, Handle)> = self
            .forwarded
            .keys()
            .filter(|(_, t)| *t == h)
            .cloned()
            .collect();
        for key in stale {
            self.forwarded.remove(&key);
            drop_from(&mut self.by_reference, &key.0, h);
        }
    }

    pub(crate) fn rename(&mut self, h: Handle, old: &str, new: &str) {
        self.drop_name(h, old);
        self.add_name(h, new);
    }

    fn add_name(&mut self, h: Handle, name: &str) {
        if name.is_empty() {
            return;
        }
        add(&mut self.by_name, name_key(name), h);
        add(&mut self.by_base, name_key(base_name(name)), h);
    }

    fn drop_name(&mut self, h: Handle, name: &str) {
        if name.is_empty() {
            return;
        }
        drop_from(&mut self.by_name, &name_key(name), h);
        drop_from(&mut self.by_base, &name_key(base_name(name)), h);
    }

    /// A forwarding pointer now targets `target`.
    pub(crate) fn forward_gain(&mut self, list: &str, target: Handle) {
        let n = self
            .forwarded
            .entry((list.to_string(), target))
            .or_insert(0);
        *n += 1;
        add(&mut self.by_reference, list.to_string(), target);
    }

    /// A forwarding pointer stopped targeting `target`. `native` is whether
    /// the target's own type declares `list`.
    pub(crate) fn forward_loss(&mut self, list: &str, target: Handle, native: bool) {
        let key = (list.to_string(), target);
        let Some(n) = self.forwarded.get_mut(&key) else {
            return;
        };
        *n -= 1;
        if *n == 0 {
            self.forwarded.remove(&key);
            if !native {
                drop_from(&mut self.by_reference, list, target);
            }
        }
    }

    pub(crate) fn of_type(&self, t: &TypeId) -> Option<&IndexSet<Handle>> {
        self.by_type.get(t)
    }

    pub(crate) fn named(&self, name: &str) -> Option<&IndexSet<Handle>> {
        self.by_name.get(&name_key(name))
    }

    pub(crate) fn in_series(&self, name: &str) -> Option<&IndexSet<Handle>> {
        self.by_base.get(&name_key(base_name(name)))
    }

    pub(crate) fn in_list(&self, list: &str) -> Option<&IndexSet<Handle>> {
        self.by_reference.get(list)
    }

    pub(crate) fn forward_count(&self, list: &str, target: Handle) -> usize {
        self.forwarded
            .get(&(list.to_string(), target))
            .copied()
            .unwrap_or(0)
    }

    pub(crate) fn type_entries(&self) -> impl Iterator<Item = (&TypeId, &IndexSet<Handle>)> {
        self.by_type.iter()
    }

    pub(crate) fn name_entries(&self) -> impl Iterator<Item = (&String, &IndexSet<Handle>)> {
        self.by_name.iter()
    }

    pub(crate) fn reference_entries(&self) -> impl Iterator<Item = (&String, &IndexSet<Handle>)> {
        self.by_reference.iter()
    }
}
