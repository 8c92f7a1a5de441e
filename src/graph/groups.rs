//! Extensible-group operations.
//!
//! Groups are whole blocks of `group_size` fields after the fixed prefix.
//! Inserting or erasing a group anywhere but the end renumbers the pointer
//! entries of every later field; [`Record::open_slots`] and
//! [`Record::close_slots`] do that on the scratch copy and the commit
//! mirrors the renumbered entries onto the targets.

use super::Graph;
use crate::record::{FieldValue, Handle, Record};
use crate::validity::StrictnessLevel;

impl Graph {
    /// Append one extensible group. `values` must hold exactly one value
    /// per group field, or be empty for a blank group. Pointer values are
    /// resolved by identity string or name; unresolvable text rejects the
    /// whole push.
    pub fn push_extensible_group<S: AsRef<str>>(&mut self, handle: Handle, values: &[S]) -> bool {
        let ok = self.push_group_inner(handle, values);
        self.finish();
        ok
    }

    /// Insert one extensible group before group `group`, shifting later
    /// groups up. Past the last group this is a push.
    pub fn insert_extensible_group<S: AsRef<str>>(
        &mut self,
        handle: Handle,
        group: usize,
        values: &[S],
    ) -> bool {
        let ok = self.insert_group_inner(handle, group, values);
        self.finish();
        ok
    }

    /// Erase extensible group `group`, shifting later groups down, and
    /// return its display values. At Final, an erase that would leave fewer
    /// than the type's minimum fields is refused.
    pub fn erase_extensible_group(&mut self, handle: Handle, group: usize) -> Option<Vec<String>> {
        let out = self.erase_group_inner(handle, group);
        self.finish();
        out
    }

    /// Erase the last extensible group.
    pub fn pop_extensible_group(&mut self, handle: Handle) -> Option<Vec<String>> {
        let last = self
            .records
            .get(&handle)?
            .num_extensible_groups()
            .checked_sub(1)?;
        self.erase_extensible_group(handle, last)
    }

    /// Pop groups until none remain or the minimum field count stops it.
    pub fn clear_extensible_groups(&mut self, handle: Handle) -> Vec<Vec<String>> {
        let mut erased = Vec::new();
        while let Some(last) = self
            .records
            .get(&handle)
            .and_then(|r| r.num_extensible_groups().checked_sub(1))
        {
            match self.erase_group_inner(handle, last) {
                Some(values) => erased.push(values),
                None => break,
            }
        }
        self.finish();
        erased.reverse();
        erased
    }

    /// Display values of extensible group `group`.
    pub fn extensible_group(&self, handle: Handle, group: usize) -> Option<Vec<String>> {
        let record = self.records.get(&handle)?;
        if group >= record.num_extensible_groups() {
            return None;
        }
        let start = record.descriptor().group_start(group);
        let size = record.descriptor().group_size();
        Some((start..start + size).map(|i| self.get_string(handle, i)).collect())
    }

    pub fn num_extensible_groups(&self, handle: Handle) -> usize {
        self.records
            .get(&handle)
            .map_or(0, Record::num_extensible_groups)
    }

    // ---------------------------------------------------------------------

    fn push_group_inner<S: AsRef<str>>(&mut self, handle: Handle, values: &[S]) -> bool {
        let Some(record) = self.records.get(&handle) else {
            return false;
        };
        let desc = record.descriptor();
        let start = record.num_fields().max(desc.num_fixed());
        let group = match desc.group_of(start) {
            Some(g) => g,
            None => return false,
        };
        self.insert_group_at(handle, group, values)
    }

    fn insert_group_inner<S: AsRef<str>>(&mut self, handle: Handle, group: usize, values: &[S]) -> bool {
        let Some(record) = self.records.get(&handle) else {
            return false;
        };
        let group = group.min(record.num_extensible_groups());
        self.insert_group_at(handle, group, values)
    }

    fn insert_group_at<S: AsRef<str>>(&mut self, handle: Handle, group: usize, values: &[S]) -> bool {
        let Some(record) = self.records.get(&handle) else {
            return false;
        };
        let desc = record.descriptor();
        let size = desc.group_size();
        if size == 0 || !(values.is_empty() || values.len() == size) {
            return false;
        }
        let total = record.num_fields().max(desc.num_fixed()) + size;
        if desc.max_field_count().is_some_and(|max| total > max) {
            return false;
        }
        let start = desc.group_start(group);

        let mut scratch = record.scratch();
        scratch.extend_to(desc.num_fixed());
        scratch.open_slots(start, size);
        if !self.fill_slots(&mut scratch, start, values) {
            return false;
        }
        let written: Vec<usize> = (start..start + size).collect();
        if !self.audit(&scratch, &written) {
            return false;
        }
        self.commit(scratch);
        true
    }

    /// Write `values` into `scratch` from `start`, resolving pointer text.
    fn fill_slots<S: AsRef<str>>(&self, scratch: &mut Record, start: usize, values: &[S]) -> bool {
        for (k, value) in values.iter().enumerate() {
            let i = start + k;
            let Some(desc) = scratch.field_descriptor(i).cloned() else {
                return false;
            };
            if desc.is_pointer() {
                match self.resolve_pointer_text(&desc, value.as_ref()) {
                    Some(Some(t)) => {
                        scratch.forward.insert(i, t);
                    }
                    Some(None) => {}
                    None => {
                        log::debug!(
                            "{:?}[{i}]: pointer text `{}` did not resolve",
                            scratch.handle(),
                            value.as_ref()
                        );
                        return false;
                    }
                }
            } else {
                scratch.fields[i] = FieldValue::from_text(&desc, value.as_ref());
            }
        }
        true
    }

    pub(crate) fn erase_group_inner(&mut self, handle: Handle, group: usize) -> Option<Vec<String>> {
        let record = self.records.get(&handle)?;
        if group >= record.num_extensible_groups() {
            return None;
        }
        let desc = record.descriptor();
        let size = desc.group_size();
        if self.strictness >= StrictnessLevel::Final
            && record.num_fields() - size < desc.min_fields
        {
            log::debug!("{handle:?}: erasing group {group} would go below {} fields", desc.min_fields);
            return None;
        }
        let start = desc.group_start(group);
        let values: Vec<String> = (start..start + size)
            .map(|i| self.get_string(handle, i))
            .collect();
        let mut scratch = record.scratch();
        scratch.close_slots(start, size);
        self.commit(scratch);
        Some(values)
    }
}
