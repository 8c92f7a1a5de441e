//! Mirror and index consistency checks for [`Graph`].
//!
//! `inv_assert*` fire in debug builds and whenever the `strict-invariants`
//! feature is enabled; they compile to no-ops otherwise.

use super::Graph;
use crate::debug_invariants::DebugInvariants;
use crate::graph_error::GraphError;
use crate::record::FieldValue;
use crate::record::names::name_key;
use std::collections::HashSet;

#[cfg(any(debug_assertions, feature = "strict-invariants"))]
macro_rules! inv_assert {
    ($($tt:tt)*) => { assert!($($tt)*); };
}
#[cfg(not(any(debug_assertions, feature = "strict-invariants")))]
macro_rules! inv_assert {
    ($cond:expr, $($tt:tt)*) => {
        let _ = $cond;
    };
}
pub(crate) use inv_assert;

fn violation(msg: String) -> Result<(), GraphError> {
    Err(GraphError::InvariantViolation(msg))
}

impl DebugInvariants for Graph {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "graph");
    }

    fn validate_invariants(&self) -> Result<(), GraphError> {
        // forward -> reverse
        for (&src, rec) in &self.records {
            if !rec.is_initialized() {
                return violation(format!("member {src:?} is not initialized"));
            }
            if rec.handle() != src {
                return violation(format!("arena key {src:?} holds {:?}", rec.handle()));
            }
            for (i, dst) in rec.forward_pointers() {
                if !matches!(rec.value(i), Some(FieldValue::Pointer)) {
                    return violation(format!("{src:?}[{i}] holds a target but is not a pointer slot"));
                }
                let Some(target) = self.records.get(&dst) else {
                    return violation(format!("{src:?}[{i}] points at non-member {dst:?}"));
                };
                if !target.reverse.contains(&(src, i)) {
                    return violation(format!("Missing mirror reverse[{dst:?}] for forward {src:?}[{i}]"));
                }
            }
        }
        // reverse -> forward
        for (&dst, rec) in &self.records {
            for (src, i) in rec.reverse_pointers() {
                let ok = self
                    .records
                    .get(&src)
                    .is_some_and(|s| s.target(i) == Some(dst));
                if !ok {
                    return violation(format!("Missing mirror forward {src:?}[{i}] for reverse[{dst:?}]"));
                }
            }
        }
        // type index
        let mut typed = 0usize;
        for (type_id, set) in self.index.type_entries() {
            for h in set {
                typed += 1;
                if self.records.get(h).is_none_or(|r| r.type_id() != type_id) {
                    return violation(format!("type index lists {h:?} under `{type_id}`"));
                }
            }
        }
        if typed != self.records.len() {
            return violation(format!("type index holds {typed} of {} members", self.records.len()));
        }
        // name index
        let mut named = HashSet::new();
        for (key, set) in self.index.name_entries() {
            for h in set {
                let Some(name) = self.records.get(h).and_then(|r| r.name()) else {
                    return violation(format!("name index lists unnamed {h:?}"));
                };
                if &name_key(name) != key {
                    return violation(format!("name index lists {h:?} under `{key}`, name is `{name}`"));
                }
                named.insert(*h);
            }
        }
        for (h, rec) in &self.records {
            if rec.name().is_some_and(|n| !n.is_empty()) && !named.contains(h) {
                return violation(format!("{h:?} is named but missing from the name index"));
            }
        }
        // reference lists
        for (list, set) in self.index.reference_entries() {
            for h in set {
                let Some(rec) = self.records.get(h) else {
                    return violation(format!("reference list `{list}` lists non-member {h:?}"));
                };
                if !rec.descriptor().belongs_to(list) && self.index.forward_count(list, *h) == 0 {
                    return violation(format!("{h:?} in `{list}` without declaring or forwarding it"));
                }
            }
        }
        // direct order
        if let Some(seq) = self.order.direct_sequence() {
            let mut seen = HashSet::new();
            for h in seq {
                if !self.records.contains_key(h) || !seen.insert(*h) {
                    return violation(format!("direct order holds stale or repeated {h:?}"));
                }
            }
        }
        Ok(())
    }
}
