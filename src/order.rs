//! Order policy: deterministic enumeration over records.
//!
//! Two mutually exclusive modes. *Type priority* ranks records by the
//! position of their type in a caller-supplied list; *direct* keeps an
//! explicit sequence of handles. Switching modes discards the other mode's
//! state. Default iteration over a graph is insertion order and never
//! consults the policy; only [`Graph::sort`](crate::graph::Graph::sort) and
//! the `sorted` flavors of enumeration do.

use crate::record::{Handle, Record};
use crate::schema::TypeId;
use indexmap::IndexMap;
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RecordOrder {
    /// No policy: sorting keeps insertion order.
    #[default]
    Insertion,
    TypePriority(Vec<TypeId>),
    Direct(Vec<Handle>),
}

impl RecordOrder {
    pub fn is_direct(&self) -> bool {
        matches!(self, RecordOrder::Direct(_))
    }

    pub fn type_priority(&self) -> Option<&[TypeId]> {
        match self {
            RecordOrder::TypePriority(t) => Some(t),
            _ => None,
        }
    }

    pub fn direct_sequence(&self) -> Option<&[Handle]> {
        match self {
            RecordOrder::Direct(seq) => Some(seq),
            _ => None,
        }
    }

    /// Position of `handle` in the direct sequence.
    pub fn index_of(&self, handle: Handle) -> Option<usize> {
        self.direct_sequence()?.iter().position(|&h| h == handle)
    }

    /// Return `handles` ordered by this policy.
    ///
    /// `insertion` gives each handle's position in graph insertion order and
    /// is the tiebreak in every mode; `type_of` is consulted by type priority.
    pub(crate) fn sort<FT, FP>(&self, handles: &[Handle], type_of: FT, insertion: FP) -> Vec<Handle>
    where
        FT: Fn(Handle) -> Option<TypeId>,
        FP: Fn(Handle) -> Option<usize>,
    {
        let mut out = handles.to_vec();
        match self {
            RecordOrder::Insertion => {
                out.sort_by_key(|&h| insertion(h).unwrap_or(usize::MAX));
            }
            RecordOrder::TypePriority(types) => {
                let rank: HashMap<&TypeId, usize> =
                    types.iter().enumerate().map(|(i, t)| (t, i)).collect();
                out.sort_by_key(|&h| {
                    let r = type_of(h)
                        .and_then(|t| rank.get(&t).copied())
                        .unwrap_or(types.len());
                    (r, insertion(h).unwrap_or(usize::MAX))
                });
            }
            RecordOrder::Direct(seq) => {
                let pos: HashMap<Handle, usize> =
                    seq.iter().enumerate().map(|(i, &h)| (h, i)).collect();
                // sort_by_key is stable: handles outside the sequence keep
                // their relative input order after the sequenced ones.
                out.sort_by_key(|h| pos.get(h).copied().unwrap_or(usize::MAX));
            }
        }
        out
    }

    /// Drop `handle` from the direct sequence.
    pub(crate) fn forget(&mut self, handle: Handle) {
        if let RecordOrder::Direct(seq) = self {
            seq.retain(|&h| h != handle);
        }
    }

    /// Append `handle` to the direct sequence if it is not already there.
    pub(crate) fn admit(&mut self, handle: Handle) {
        if let RecordOrder::Direct(seq) = self {
            if !seq.contains(&handle) {
                seq.push(handle);
            }
        }
    }

    /// Copy with every handle mapped through `map`; unmapped handles drop out.
    pub(crate) fn remapped(&self, map: &HashMap<Handle, Handle>) -> RecordOrder {
        match self {
            RecordOrder::Direct(seq) => {
                RecordOrder::Direct(seq.iter().filter_map(|h| map.get(h).copied()).collect())
            }
            other => other.clone(),
        }
    }
}

/// Direct-order editing bound to a graph's membership.
///
/// Every operation fails (returns `false`) when the policy is not in direct
/// mode, or when a handle is neither in the sequence nor a graph member.
pub struct OrderEditor<'g> {
    pub(crate) order: &'g mut RecordOrder,
    pub(crate) members: &'g IndexMap<Handle, Record>,
}

impl OrderEditor<'_> {
    fn known(&self, handle: Handle) -> bool {
        self.members.contains_key(&handle)
            || self
                .order
                .direct_sequence()
                .is_some_and(|s| s.contains(&handle))
    }

    fn seq(&mut self) -> Option<&mut Vec<Handle>> {
        match self.order {
            RecordOrder::Direct(seq) => Some(seq),
            _ => None,
        }
    }

    /// Move (or add) `handle` to the end.
    pub fn append(&mut self, handle: Handle) -> bool {
        if !self.known(handle) {
            return false;
        }
        let Some(seq) = self.seq() else { return false };
        seq.retain(|&h| h != handle);
        seq.push(handle);
        true
    }

    /// Move (or add) `handle` in front of `before`; appends when `before`
    /// is not in the sequence.
    pub fn insert_before(&mut self, handle: Handle, before: Handle) -> bool {
        if !self.known(handle) || handle == before {
            return false;
        }
        let Some(seq) = self.seq() else { return false };
        seq.retain(|&h| h != handle);
        match seq.iter().position(|&h| h == before) {
            Some(i) => seq.insert(i, handle),
            None => seq.push(handle),
        }
        true
    }

    /// Move (or add) `handle` to position `index`, clamped to the length.
    pub fn insert_at(&mut self, handle: Handle, index: usize) -> bool {
        if !self.known(handle) {
            return false;
        }
        let Some(seq) = self.seq() else { return false };
        seq.retain(|&h| h != handle);
        let at = index.min(seq.len());
        seq.insert(at, handle);
        true
    }

    /// Move a sequenced `handle` in front of sequenced `before`.
    pub fn move_before(&mut self, handle: Handle, before: Handle) -> bool {
        if handle == before {
            return false;
        }
        let Some(seq) = self.seq() else { return false };
        if !seq.contains(&handle) || !seq.contains(&before) {
            return false;
        }
        seq.retain(|&h| h != handle);
        let Some(i) = seq.iter().position(|&h| h == before) else {
            return false;
        };
        seq.insert(i, handle);
        true
    }

    /// Move a sequenced `handle` to position `index`, clamped to the length.
    pub fn move_to(&mut self, handle: Handle, index: usize) -> bool {
        let Some(seq) = self.seq() else { return false };
        let Some(from) = seq.iter().position(|&h| h == handle) else {
            return false;
        };
        seq.remove(from);
        let at = index.min(seq.len());
        seq.insert(at, handle);
        true
    }

    /// Exchange the positions of two sequenced handles.
    pub fn swap(&mut self, a: Handle, b: Handle) -> bool {
        let Some(seq) = self.seq() else { return false };
        let ia = seq.iter().position(|&h| h == a);
        let ib = seq.iter().position(|&h| h == b);
        match (ia, ib) {
            (Some(i), Some(j)) => {
                seq.swap(i, j);
                true
            }
            _ => false,
        }
    }

    /// Remove `handle` from the sequence (not from the graph).
    pub fn erase(&mut self, handle: Handle) -> bool {
        let Some(seq) = self.seq() else { return false };
        let before = seq.len();
        seq.retain(|&h| h != handle);
        seq.len() != before
    }

    /// Switch to type priority, discarding any direct sequence.
    pub fn set_type_priority(&mut self, types: Vec<TypeId>) {
        *self.order = RecordOrder::TypePriority(types);
    }

    /// Switch to direct mode with `handles` (members only, first occurrence
    /// kept), discarding any type priority.
    pub fn set_direct(&mut self, handles: Vec<Handle>) {
        let mut seen = std::collections::HashSet::new();
        let seq = handles
            .into_iter()
            .filter(|h| self.members.contains_key(h) && seen.insert(*h))
            .collect();
        *self.order = RecordOrder::Direct(seq);
    }

    /// Drop any policy.
    pub fn clear(&mut self) {
        *self.order = RecordOrder::Insertion;
    }
}
