//! Blueprint export: the inverse of admission.

use super::Graph;
use crate::record::{Blueprint, FieldValue, Handle, Record};
use crate::schema::PointerConvention;

impl Graph {
    /// Blueprint for `handle`, carrying its identity, comment and fields.
    ///
    /// Pointer fields are written per the schema's
    /// [`PointerConvention`]. Under `ByName`, targets that have a name field
    /// but no name are given one first, so the blueprint can be admitted
    /// elsewhere.
    pub fn export_blueprint(&mut self, handle: Handle) -> Option<Blueprint> {
        if !self.records.contains_key(&handle) {
            return None;
        }
        self.name_targets_of(&[handle]);
        self.finish();
        self.records.get(&handle).map(|r| self.blueprint_of(r))
    }

    /// Blueprints for every member, in insertion or sorted order.
    pub fn export_blueprints(&mut self, sorted: bool) -> Vec<Blueprint> {
        let handles = self.handles(sorted);
        self.name_targets_of(&handles);
        self.finish();
        handles
            .into_iter()
            .filter_map(|h| self.records.get(&h))
            .map(|r| self.blueprint_of(r))
            .collect()
    }

    fn name_targets_of(&mut self, handles: &[Handle]) {
        if self.schema.pointer_convention() != PointerConvention::ByName {
            return;
        }
        let unnamed: Vec<Handle> = handles
            .iter()
            .flat_map(|&h| self.targets(h))
            .filter(|t| self.records.get(t).and_then(Record::name) == Some(""))
            .collect();
        for t in unnamed {
            self.create_name_inner(t, false);
        }
    }

    fn blueprint_of(&self, record: &Record) -> Blueprint {
        let by_identity = self.schema.pointer_convention() == PointerConvention::ByIdentity;
        let fields = (0..record.num_fields())
            .map(|k| match (record.value(k), record.target(k)) {
                (Some(FieldValue::Pointer), Some(t)) if by_identity => t.to_string(),
                (Some(FieldValue::Pointer), Some(t)) => self.display_target(t),
                (Some(v), _) => v.literal().unwrap_or_default(),
                (None, _) => String::new(),
            })
            .collect();
        Blueprint {
            type_id: record.type_id().clone(),
            handle: Some(record.handle()),
            comment: record.comment().to_string(),
            fields,
        }
    }
}
