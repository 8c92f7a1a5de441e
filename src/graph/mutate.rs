//! Field-level mutation: literals, pointers, names, comments.

use super::Graph;
use crate::notify::{Entry, RelationshipChange};
use crate::record::{FieldValue, Handle, Record};
use crate::validity::{StrictnessLevel, classify_field};

impl Graph {
    /// Write literal `value` into non-pointer field `index`, auditing it at
    /// the active strictness level. Writing past the end extends the record
    /// to a whole extensible group; the extension is dropped on rejection.
    /// Name fields delegate to [`set_name`](Self::set_name).
    pub fn set_literal(&mut self, handle: Handle, index: usize, value: &str) -> bool {
        self.set_literal_with(handle, index, value, true)
    }

    /// [`set_literal`](Self::set_literal) with the audit optional.
    pub fn set_literal_with(
        &mut self,
        handle: Handle,
        index: usize,
        value: &str,
        check_validity: bool,
    ) -> bool {
        let ok = self.set_literal_inner(handle, index, value, check_validity);
        self.finish();
        ok
    }

    /// Point field `index` at `target` (or clear it with `None`).
    ///
    /// Above Minimal a required field may not be cleared; above Draft the
    /// target must belong to one of the field's reference lists.
    pub fn set_pointer(&mut self, handle: Handle, index: usize, target: Option<Handle>) -> bool {
        self.set_pointer_with(handle, index, target, true)
    }

    /// [`set_pointer`](Self::set_pointer) with the audit optional.
    pub fn set_pointer_with(
        &mut self,
        handle: Handle,
        index: usize,
        target: Option<Handle>,
        check_validity: bool,
    ) -> bool {
        let ok = self.set_pointer_inner(handle, index, target, check_validity);
        self.finish();
        ok
    }

    /// Set any field from text: pointer text is resolved by identity string
    /// or name, name fields go through [`set_name`](Self::set_name).
    pub fn set_text(&mut self, handle: Handle, index: usize, text: &str) -> bool {
        let ok = self.set_text_inner(handle, index, text);
        self.finish();
        ok
    }

    /// Append a literal at the end of the field sequence.
    pub fn push_literal(&mut self, handle: Handle, value: &str) -> bool {
        let Some(end) = self.records.get(&handle).map(Record::num_fields) else {
            return false;
        };
        self.set_literal(handle, end, value)
    }

    /// Append a pointer at the end of the field sequence.
    pub fn push_pointer(&mut self, handle: Handle, target: Option<Handle>) -> bool {
        let Some(end) = self.records.get(&handle).map(Record::num_fields) else {
            return false;
        };
        self.set_pointer(handle, end, target)
    }

    /// Rename a record.
    ///
    /// At Draft or Final, a name already used by a record sharing a
    /// reference list is replaced by the next free name in its series, and
    /// an empty name is refused for a required name field.
    pub fn set_name(&mut self, handle: Handle, name: &str) -> bool {
        let ok = self.set_name_inner(handle, name, true);
        self.finish();
        ok
    }

    /// Give the record a default name (`Zone 1`, `Zone 2`, ...) if it has
    /// none, or unconditionally with `overwrite`.
    pub fn create_name(&mut self, handle: Handle, overwrite: bool) -> bool {
        let ok = self.create_name_inner(handle, overwrite);
        self.finish();
        ok
    }

    pub fn set_comment(&mut self, handle: Handle, comment: &str) -> bool {
        let Some(record) = self.records.get(&handle) else {
            return false;
        };
        let mut scratch = record.scratch();
        scratch.comment = comment.to_string();
        self.commit(scratch);
        self.finish();
        true
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    pub(crate) fn set_literal_inner(
        &mut self,
        handle: Handle,
        index: usize,
        value: &str,
        check_validity: bool,
    ) -> bool {
        let Some(record) = self.records.get(&handle) else {
            return false;
        };
        let Some(desc) = record.field_descriptor(index) else {
            return false;
        };
        if desc.is_pointer() {
            return false;
        }
        if record.descriptor().name_index() == Some(index) {
            return self.set_name_inner(handle, value, check_validity);
        }
        let value = FieldValue::from_text(desc, value);
        let mut scratch = record.scratch();
        let touched = pad_for(&mut scratch, index);
        scratch.fields[index] = value;
        if check_validity && !self.audit(&scratch, &touched) {
            return false;
        }
        self.commit(scratch);
        true
    }

    pub(crate) fn set_pointer_inner(
        &mut self,
        handle: Handle,
        index: usize,
        target: Option<Handle>,
        check_validity: bool,
    ) -> bool {
        let Some(record) = self.records.get(&handle) else {
            return false;
        };
        if !record.field_descriptor(index).is_some_and(|d| d.is_pointer()) {
            return false;
        }
        if target.is_some_and(|t| !self.records.contains_key(&t)) {
            return false;
        }
        let mut scratch = record.scratch();
        let touched = pad_for(&mut scratch, index);
        match target {
            Some(t) => scratch.forward.insert(index, t),
            None => scratch.forward.remove(&index),
        };
        if check_validity && !self.audit(&scratch, &touched) {
            return false;
        }
        self.commit(scratch);
        true
    }

    pub(crate) fn set_text_inner(&mut self, handle: Handle, index: usize, text: &str) -> bool {
        let Some(desc) = self
            .records
            .get(&handle)
            .and_then(|r| r.field_descriptor(index))
        else {
            return false;
        };
        if !desc.is_pointer() {
            return self.set_literal_inner(handle, index, text, true);
        }
        let desc = desc.clone();
        match self.resolve_pointer_text(&desc, text) {
            Some(target) => self.set_pointer_inner(handle, index, target, true),
            None => {
                log::debug!("{handle:?}[{index}]: pointer text `{text}` did not resolve");
                false
            }
        }
    }

    pub(crate) fn set_name_inner(&mut self, handle: Handle, name: &str, check_validity: bool) -> bool {
        let Some(record) = self.records.get(&handle) else {
            return false;
        };
        let Some(index) = record.descriptor().name_index() else {
            return false;
        };
        let desc = &record.descriptor().fields[index];
        let mut name = name.to_string();
        if check_validity && self.strictness >= StrictnessLevel::Draft {
            if name.is_empty() {
                if desc.required {
                    log::debug!("{handle:?}: refusing to clear a required name");
                    return false;
                }
            } else if !self
                .clashes_with(handle, &record.descriptor().references, &name)
                .is_empty()
            {
                let renamed = self.next_name(&name, false);
                if !self
                    .clashes_with(handle, &record.descriptor().references, &renamed)
                    .is_empty()
                {
                    return false;
                }
                log::debug!("{handle:?}: name `{name}` taken, using `{renamed}`");
                name = renamed;
            }
        }
        let value = FieldValue::from_text(desc, &name);
        let mut scratch = record.scratch();
        let touched = pad_for(&mut scratch, index);
        scratch.fields[index] = value;
        if check_validity && !self.audit(&scratch, &touched) {
            return false;
        }
        self.commit(scratch);
        true
    }

    pub(crate) fn create_name_inner(&mut self, handle: Handle, overwrite: bool) -> bool {
        let Some(record) = self.records.get(&handle) else {
            return false;
        };
        let Some(current) = record.name() else {
            return false;
        };
        if !current.is_empty() && !overwrite {
            return true;
        }
        let name = self.next_name_for_type(record.type_id(), true);
        self.set_name_inner(handle, &name, true)
    }

    /// `true` if fields `indices` of `scratch` pass the audit at the active level.
    pub(crate) fn audit(&self, scratch: &Record, indices: &[usize]) -> bool {
        let level = self.strictness;
        for &i in indices {
            let errors = classify_field(self, scratch, i, level);
            if let Some(e) = errors.first() {
                log::debug!("rejected: {e}");
                return false;
            }
        }
        true
    }

    /// Swap `scratch` into the arena, mirroring pointer changes onto
    /// targets, updating indices and journaling what changed.
    pub(crate) fn commit(&mut self, scratch: Record) {
        let handle = scratch.handle();
        let Some(old) = self.records.get(&handle) else {
            return;
        };
        let old_forward = old.forward.clone();
        let old_name = old.name().map(str::to_string);
        let name_index = old.descriptor().name_index();
        let data_changed = old.comment != scratch.comment
            || old.fields.len() != scratch.fields.len()
            || old
                .fields
                .iter()
                .zip(&scratch.fields)
                .enumerate()
                .any(|(i, (a, b))| Some(i) != name_index && (a != b || a.literal() != b.literal()));

        let mut relationships = Vec::new();
        for (&i, &t) in &old_forward {
            let new = scratch.forward.get(&i).copied();
            if new != Some(t) {
                self.unlink(handle, i, t);
                relationships.push(RelationshipChange { index: i, old_target: Some(t), new_target: new });
            }
        }
        for (&i, &t) in &scratch.forward {
            if !old_forward.contains_key(&i) {
                relationships.push(RelationshipChange { index: i, old_target: None, new_target: Some(t) });
            }
        }
        let new_name = scratch.name().map(str::to_string);
        let added: Vec<(usize, Handle)> = scratch
            .forward
            .iter()
            .filter(|(i, t)| old_forward.get(i) != Some(t))
            .map(|(&i, &t)| (i, t))
            .collect();

        if let Some(rec) = self.records.get_mut(&handle) {
            rec.fields = scratch.fields;
            rec.forward = scratch.forward;
            rec.comment = scratch.comment;
        }
        for (i, t) in added {
            self.link(handle, i, t);
        }

        if old_name != new_name {
            self.index.rename(
                handle,
                old_name.as_deref().unwrap_or_default(),
                new_name.as_deref().unwrap_or_default(),
            );
            self.events.record(Entry::Name(handle));
        }
        if data_changed {
            self.events.record(Entry::Data(handle));
        }
        for rel in relationships {
            self.events.record(Entry::Relationship(handle, rel));
        }
    }
}

/// Extend `scratch` to a whole group covering `index` when it falls past the
/// end. Returns `index` plus every slot the padding added.
fn pad_for(scratch: &mut Record, index: usize) -> Vec<usize> {
    let old_len = scratch.num_fields();
    if index < old_len {
        return vec![index];
    }
    scratch.extend_to(scratch.whole_len_for(index));
    (old_len..scratch.num_fields()).collect()
}
