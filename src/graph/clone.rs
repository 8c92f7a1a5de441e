//! Whole-graph and subset copies.

use super::{Graph, GraphOptions};
use crate::graph_error::GraphError;
use crate::record::{Handle, Record};
use crate::validity::StrictnessLevel;
use itertools::Itertools;
use std::collections::HashMap;
use std::sync::Arc;

impl Graph {
    /// Copy of the whole graph sharing the same schema.
    ///
    /// With `keep_handles` the copy's records carry the same identities,
    /// otherwise every record gets a fresh one and pointers are rewritten to
    /// match. Listeners are not carried over.
    pub fn clone_graph(&self, keep_handles: bool) -> Graph {
        let handles: Vec<Handle> = self.records.keys().copied().collect();
        let mut out = Graph::with_options(Arc::clone(&self.schema), self.options);
        out.strictness = self.strictness;
        let map = self.copy_records(&handles, keep_handles, &mut out);
        out.order = self.order.remapped(&map);
        out.finish();
        out
    }

    /// Copy of the records in `handles` as a standalone graph at `level`.
    ///
    /// Pointers that leave the subset read as null in the copy. Fails with
    /// [`GraphError::UnknownHandle`] for a non-member and with
    /// [`GraphError::Rejected`] if the copy is not valid at `level`.
    pub fn clone_subset(
        &self,
        handles: &[Handle],
        keep_handles: bool,
        level: StrictnessLevel,
    ) -> Result<Graph, GraphError> {
        if let Some(missing) = handles.iter().copied().find(|h| !self.records.contains_key(h)) {
            return Err(GraphError::UnknownHandle(missing));
        }
        let subset: Vec<Handle> = handles.iter().copied().unique().collect();
        let options = GraphOptions {
            strictness: level,
            ..self.options
        };
        let mut out = Graph::with_options(Arc::clone(&self.schema), options);
        out.strictness = StrictnessLevel::Minimal;
        let map = self.copy_records(&subset, keep_handles, &mut out);
        out.order = self.order.remapped(&map);

        let report = out.report(level);
        if !report.is_valid() {
            log::debug!("subset copy rejected: {report}");
            return Err(GraphError::Rejected(report));
        }
        out.strictness = level;
        out.finish();
        Ok(out)
    }

    /// Copy `handles` into `out`, relinking pointers that stay inside the
    /// copied set. Returns the old-to-new identity map.
    fn copy_records(&self, handles: &[Handle], keep_handles: bool, out: &mut Graph) -> HashMap<Handle, Handle> {
        let map: HashMap<Handle, Handle> = handles
            .iter()
            .map(|&h| (h, if keep_handles { h } else { Handle::mint() }))
            .collect();

        for (&old, &new) in handles.iter().filter_map(|h| map.get_key_value(h)) {
            let Some(src) = self.records.get(&old) else {
                continue;
            };
            let mut copy = Record::new(new, Arc::clone(&src.descriptor));
            copy.comment = src.comment.clone();
            copy.fields = src.fields.clone();
            copy.initialized = true;
            out.index.insert(&copy);
            out.records.insert(new, copy);
            out.order.admit(new);
        }

        for (&old, &new) in handles.iter().filter_map(|h| map.get_key_value(h)) {
            let Some(src) = self.records.get(&old) else {
                continue;
            };
            for (k, t) in src.forward_pointers() {
                let Some(&nt) = map.get(&t) else { continue };
                if let Some(r) = out.records.get_mut(&new) {
                    r.forward.insert(k, nt);
                }
                out.link(new, k, nt);
            }
        }
        map
    }
}
