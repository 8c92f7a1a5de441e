//! Admission of blueprints: single, batch, and merge.
//!
//! A batch is admitted as one unit. Pointer text is resolved first against
//! the batch itself (so siblings can refer to each other by name or by
//! blueprint-supplied identity), then against existing members. New records
//! are inserted, linked, named and audited; if the audit fails, everything
//! the batch did is undone and the call returns
//! [`GraphError::Rejected`].

use super::{Graph, PointerPolicy, same_name};
use crate::graph_error::GraphError;
use crate::notify::{Entry, RelationshipChange};
use crate::record::{Blueprint, FieldValue, Handle, Record};
use crate::schema::{FieldDescriptor, TypeDescriptor};
use crate::validity::{StrictnessLevel, ValidityReport, classify_graph, classify_record};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Outcome of resolving one pointer field's text inside a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolved {
    Null,
    Sibling(usize),
    Member(Handle),
    Unresolved,
}

/// Blueprints of one batch with their resolved descriptors.
struct Siblings<'a> {
    blueprints: &'a [Blueprint],
    descriptors: &'a [Arc<TypeDescriptor>],
    by_handle: HashMap<Handle, usize>,
}

impl<'a> Siblings<'a> {
    fn new(blueprints: &'a [Blueprint], descriptors: &'a [Arc<TypeDescriptor>]) -> Self {
        let by_handle = blueprints
            .iter()
            .enumerate()
            .filter_map(|(i, bp)| bp.handle.map(|h| (h, i)))
            .collect();
        Self {
            blueprints,
            descriptors,
            by_handle,
        }
    }

    fn name_of(&self, i: usize) -> &str {
        self.descriptors[i]
            .name_index()
            .map_or("", |k| self.blueprints[i].field(k))
    }

    fn named<'s>(&'s self, text: &'s str) -> impl Iterator<Item = usize> + 's {
        (0..self.blueprints.len()).filter(move |&j| {
            let name = self.name_of(j);
            !name.is_empty() && same_name(name, text)
        })
    }
}

fn check_shape(desc: &TypeDescriptor, count: usize) -> Result<(), GraphError> {
    if !desc.is_extensible() && count > desc.num_fixed() {
        return Err(GraphError::NotExtensible {
            type_id: desc.id.clone(),
            fixed: desc.num_fixed(),
            found: count,
        });
    }
    if let Some(max) = desc.max_field_count() {
        if count > max {
            return Err(GraphError::TooManyFields {
                type_id: desc.id.clone(),
                max,
                found: count,
            });
        }
    }
    if !desc.is_whole_group_count(count) {
        return Err(GraphError::PartialExtensibleGroup {
            type_id: desc.id.clone(),
            group_size: desc.group_size(),
            found: count,
        });
    }
    Ok(())
}

impl Graph {
    /// Admit one blueprint. See [`admit_batch`](Self::admit_batch).
    pub fn admit(&mut self, blueprint: Blueprint, policy: PointerPolicy) -> Result<Handle, GraphError> {
        let mut handles = self.admit_batch(std::slice::from_ref(&blueprint), policy)?;
        handles
            .pop()
            .ok_or_else(|| GraphError::InvariantViolation("admission returned no handle".into()))
    }

    /// Admit `blueprints` as one unit and return their handles in order.
    ///
    /// Each record gets the blueprint's identity if one is supplied and
    /// free, otherwise a fresh one. A record whose name clashes with a member
    /// sharing a reference list is renamed to the next free name in its
    /// series. A name field with no default that is left empty gets a
    /// synthesized name (`Zone 1`, ...). Pointer text that resolves to
    /// nothing is committed as null under [`PointerPolicy::Nullify`] and
    /// fails the batch under [`PointerPolicy::Strict`].
    pub fn admit_batch(
        &mut self,
        blueprints: &[Blueprint],
        policy: PointerPolicy,
    ) -> Result<Vec<Handle>, GraphError> {
        let plan = vec![None; blueprints.len()];
        self.admit_planned(blueprints, &plan, policy)
    }

    /// Like [`admit_batch`](Self::admit_batch), but each blueprint that has an
    /// equivalent member reuses it instead of creating a duplicate.
    ///
    /// A member is equivalent when it has the same type, equal literal
    /// fields, and every pointer field equal or unset on at least one side.
    /// Reused members gain the blueprint's pointers where their own field is
    /// unset.
    pub fn merge_batch(
        &mut self,
        blueprints: &[Blueprint],
        policy: PointerPolicy,
    ) -> Result<Vec<Handle>, GraphError> {
        self.merge_groups(blueprints, &[], policy)
    }

    /// [`merge_batch`](Self::merge_batch) with grouped equivalence: if any
    /// member of a group (indices into `blueprints`) lacks an equivalent,
    /// the whole group is admitted as new records.
    pub fn merge_groups(
        &mut self,
        blueprints: &[Blueprint],
        groups: &[Vec<usize>],
        policy: PointerPolicy,
    ) -> Result<Vec<Handle>, GraphError> {
        let n = blueprints.len();
        let mut grouped = HashSet::new();
        for group in groups {
            for &i in group {
                if i >= n || !grouped.insert(i) {
                    return Err(GraphError::InvalidGroup(i));
                }
            }
        }
        let descriptors = self.descriptors_for(blueprints)?;
        let siblings = Siblings::new(blueprints, &descriptors);

        let mut forced: HashSet<usize> = HashSet::new();
        let equivalents = loop {
            let found = self.settle_equivalents(&siblings, &forced);
            let mut grew = false;
            for group in groups {
                if group.iter().any(|&i| found[i].is_none()) {
                    for &i in group {
                        grew |= forced.insert(i);
                    }
                }
            }
            if !grew {
                break found;
            }
        };
        self.admit_planned(blueprints, &equivalents, policy)
    }

    /// Equivalent member for each unforced blueprint.
    ///
    /// A pointer to a sibling only matches once that sibling has an
    /// equivalent, so passes repeat until nothing changes. Each pass reads
    /// the previous one, making the result independent of blueprint order.
    fn settle_equivalents(&self, siblings: &Siblings<'_>, forced: &HashSet<usize>) -> Vec<Option<Handle>> {
        let n = siblings.blueprints.len();
        let mut found: Vec<Option<Handle>> = vec![None; n];
        for _ in 0..=n {
            let next: Vec<Option<Handle>> = (0..n)
                .map(|i| {
                    if forced.contains(&i) {
                        None
                    } else {
                        self.equivalent_of(siblings, i, &found)
                    }
                })
                .collect();
            if next == found {
                break;
            }
            found = next;
        }
        found
    }

    fn descriptors_for(&self, blueprints: &[Blueprint]) -> Result<Vec<Arc<TypeDescriptor>>, GraphError> {
        blueprints
            .iter()
            .map(|bp| {
                self.schema
                    .type_descriptor(&bp.type_id)
                    .ok_or_else(|| GraphError::UnknownType(bp.type_id.clone()))
            })
            .collect()
    }

    fn resolve_in_batch(&self, siblings: &Siblings<'_>, desc: &FieldDescriptor, text: &str) -> Resolved {
        let text = text.trim();
        if text.is_empty() {
            return Resolved::Null;
        }
        if let Some(h) = Handle::parse(text) {
            if let Some(&j) = siblings.by_handle.get(&h) {
                return Resolved::Sibling(j);
            }
            return if self.records.contains_key(&h) {
                Resolved::Member(h)
            } else {
                Resolved::Unresolved
            };
        }
        let lists = desc.reference_lists();
        if let Some(j) = siblings
            .named(text)
            .find(|&j| lists.iter().any(|l| siblings.descriptors[j].belongs_to(l)))
        {
            return Resolved::Sibling(j);
        }
        let members = self.lookup_by_name(text, true);
        if let Some(&h) = members.iter().find(|&&h| self.can_be_target(h, lists)) {
            return Resolved::Member(h);
        }
        if self.strictness < StrictnessLevel::Draft {
            if let Some(j) = siblings.named(text).next() {
                return Resolved::Sibling(j);
            }
            if let Some(&h) = members.first() {
                return Resolved::Member(h);
            }
        }
        Resolved::Unresolved
    }

    fn equivalent_of(&self, siblings: &Siblings<'_>, i: usize, known: &[Option<Handle>]) -> Option<Handle> {
        let bp = &siblings.blueprints[i];
        let desc = &siblings.descriptors[i];
        let name = desc
            .name_index()
            .map(|k| bp.field(k))
            .filter(|n| !n.is_empty());
        let candidates: Vec<Handle> = match name {
            Some(n) => self.lookup_by_type_and_name(&desc.id, n).into_iter().collect(),
            None => self.lookup_by_type(&desc.id),
        };
        candidates.into_iter().find(|c| {
            self.records.get(c).is_some_and(|rec| {
                data_fields_equal(desc, bp, rec) && self.pointers_compatible(siblings, i, known, rec)
            })
        })
    }

    fn pointers_compatible(
        &self,
        siblings: &Siblings<'_>,
        i: usize,
        known: &[Option<Handle>],
        rec: &Record,
    ) -> bool {
        let desc = &siblings.descriptors[i];
        siblings.blueprints[i]
            .fields
            .iter()
            .enumerate()
            .all(|(k, text)| {
                let Some(d) = desc.field(k).filter(|d| d.is_pointer()) else {
                    return true;
                };
                let Some(current) = rec.target(k) else {
                    return true;
                };
                match self.resolve_in_batch(siblings, d, text) {
                    Resolved::Null => true,
                    Resolved::Member(h) => h == current,
                    Resolved::Sibling(j) if j == i => current == rec.handle(),
                    Resolved::Sibling(j) => known.get(j).copied().flatten() == Some(current),
                    Resolved::Unresolved => false,
                }
            })
    }

    /// Admit `blueprints`; entries of `reuse` that are `Some` stand for an
    /// existing member instead of a new record.
    pub(crate) fn admit_planned(
        &mut self,
        blueprints: &[Blueprint],
        reuse: &[Option<Handle>],
        policy: PointerPolicy,
    ) -> Result<Vec<Handle>, GraphError> {
        let descriptors = self.descriptors_for(blueprints)?;
        let reused = |i: usize| reuse.get(i).copied().flatten();

        let mut handles = Vec::with_capacity(blueprints.len());
        let mut claimed = HashSet::new();
        for (i, bp) in blueprints.iter().enumerate() {
            if let Some(existing) = reused(i) {
                handles.push(existing);
                continue;
            }
            check_shape(&descriptors[i], bp.fields.len())?;
            let handle = match bp.handle {
                Some(h) => {
                    if self.records.contains_key(&h) || !claimed.insert(h) {
                        return Err(GraphError::DuplicateHandle(h));
                    }
                    h
                }
                None => Handle::mint(),
            };
            handles.push(handle);
        }

        let siblings = Siblings::new(blueprints, &descriptors);
        let mut links: Vec<Vec<(usize, Handle)>> = vec![Vec::new(); blueprints.len()];
        for (i, bp) in blueprints.iter().enumerate() {
            for (k, text) in bp.fields.iter().enumerate() {
                let Some(d) = descriptors[i].field(k).filter(|d| d.is_pointer()) else {
                    continue;
                };
                match self.resolve_in_batch(&siblings, d, text) {
                    Resolved::Null => {}
                    Resolved::Sibling(j) => links[i].push((k, handles[j])),
                    Resolved::Member(h) => links[i].push((k, h)),
                    Resolved::Unresolved if reused(i).is_some() => {}
                    Resolved::Unresolved => match policy {
                        PointerPolicy::Strict => {
                            return Err(GraphError::UnresolvedPointer {
                                blueprint: i,
                                index: k,
                                text: text.clone(),
                                policy,
                            });
                        }
                        PointerPolicy::Nullify => log::warn!(
                            "`{}` {:?}: pointer field {k} text `{text}` did not resolve; committed as null",
                            bp.type_id,
                            handles[i]
                        ),
                    },
                }
            }
        }

        // -- everything below mutates and is undone on rejection ----------
        let was_empty = self.records.is_empty();
        let checkpoint = self.events.checkpoint();
        let mut inserted = Vec::new();
        for (i, bp) in blueprints.iter().enumerate() {
            if reused(i).is_some() {
                continue;
            }
            let desc = &descriptors[i];
            let h = handles[i];
            let mut record = Record::new(h, Arc::clone(desc));
            record.comment = bp.comment.clone();
            record.fields = bp
                .fields
                .iter()
                .enumerate()
                .map(|(k, t)| match desc.field(k) {
                    Some(d) => FieldValue::from_text(d, t),
                    None => FieldValue::Empty,
                })
                .collect();
            if self.options.rename_on_admit {
                if let Some(k) = desc.name_index() {
                    let name = bp.field(k);
                    if !name.is_empty() && !self.clashes_with(h, &desc.references, name).is_empty() {
                        let renamed = self.next_name(name, false);
                        log::debug!("`{}` {h:?}: name `{name}` taken, admitted as `{renamed}`", desc.id);
                        record.fields[k] = FieldValue::Text(renamed);
                    }
                }
            }
            record.initialized = true;
            self.index.insert(&record);
            self.records.insert(h, record);
            self.order.admit(h);
            inserted.push(i);
        }

        for &i in &inserted {
            let h = handles[i];
            for &(k, t) in &links[i] {
                if let Some(r) = self.records.get_mut(&h) {
                    r.forward.insert(k, t);
                }
                self.link(h, k, t);
            }
        }

        // (reused member, field, target, field count before the fill)
        let mut filled: Vec<(Handle, usize, Handle, usize)> = Vec::new();
        for (i, planned) in reuse.iter().enumerate() {
            let Some(e) = *planned else { continue };
            for &(k, t) in &links[i] {
                let Some(r) = self.records.get_mut(&e) else { continue };
                let open = r.field_descriptor(k).is_some_and(|d| d.is_pointer())
                    && (k < r.num_fields() || k < r.descriptor().num_fixed())
                    && r.target(k).is_none();
                if !open {
                    continue;
                }
                let before = r.num_fields();
                r.extend_to(r.whole_len_for(k).max(before));
                r.forward.insert(k, t);
                self.link(e, k, t);
                filled.push((e, k, t, before));
            }
        }

        for &i in &inserted {
            let desc = &descriptors[i];
            let Some(k) = desc.name_index() else { continue };
            if desc.fields[k].default.is_some() {
                continue;
            }
            let h = handles[i];
            if self.records.get(&h).and_then(Record::name) != Some("") {
                continue;
            }
            let name = self.next_name_for_type(&desc.id, true);
            if let Some(r) = self.records.get_mut(&h) {
                r.extend_to(r.whole_len_for(k));
                r.fields[k] = FieldValue::Text(name.clone());
            }
            self.index.rename(h, "", &name);
        }

        let level = self.strictness;
        let errors = if level == StrictnessLevel::Final || was_empty {
            classify_graph(self, level)
        } else {
            let touched: HashSet<Handle> = inserted
                .iter()
                .map(|&i| handles[i])
                .chain(filled.iter().map(|&(e, ..)| e))
                .collect();
            touched
                .iter()
                .filter_map(|h| self.records.get(h))
                .flat_map(|r| classify_record(self, r, level))
                .collect()
        };
        if !errors.is_empty() {
            for &(e, k, t, before) in filled.iter().rev() {
                if let Some(r) = self.records.get_mut(&e) {
                    r.forward.remove(&k);
                    r.fields.truncate(before);
                }
                self.unlink(e, k, t);
            }
            for &i in inserted.iter().rev() {
                self.disconnect(handles[i], false);
            }
            self.events.rollback(checkpoint);
            let report = ValidityReport::new(level, errors);
            log::debug!("admission rejected: {report}");
            return Err(GraphError::Rejected(report));
        }

        for &i in &inserted {
            self.events.record(Entry::Added(handles[i]));
        }
        for (e, k, t, _) in filled {
            self.events.record(Entry::Relationship(
                e,
                RelationshipChange { index: k, old_target: None, new_target: Some(t) },
            ));
        }
        self.finish();
        Ok(handles)
    }
}

fn data_fields_equal(desc: &TypeDescriptor, bp: &Blueprint, rec: &Record) -> bool {
    let n = bp.fields.len().max(rec.num_fields());
    (0..n).all(|k| match desc.field(k) {
        Some(d) if d.is_pointer() => true,
        Some(d) if d.is_name => same_name(bp.field(k), rec.name().unwrap_or_default()),
        Some(d) => rec.value(k).unwrap_or(&FieldValue::Empty) == &FieldValue::from_text(d, bp.field(k)),
        None => bp.field(k).is_empty(),
    })
}
