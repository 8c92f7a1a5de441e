//! GraphError: unified error type for bem-graph's fallible APIs
//!
//! Record-level mutations report rejection through `bool`/`Option` returns.
//! Batch operations (admission, merge, subset clone) and invariant
//! validation return `Result<_, GraphError>` so callers learn *why* a
//! batch was refused.

use crate::graph::PointerPolicy;
use crate::record::handle::Handle;
use crate::schema::TypeId;
use crate::validity::ValidityReport;
use thiserror::Error;

/// Unified error type for graph operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// The schema provider does not describe the requested type.
    #[error("schema has no type `{0}`")]
    UnknownType(TypeId),
    /// A blueprint asked for an identity that is already taken.
    #[error("handle {0} is already a member of the graph")]
    DuplicateHandle(Handle),
    /// The handle does not name a member of the graph.
    #[error("handle {0} is not a member of the graph")]
    UnknownHandle(Handle),
    /// Fields beyond the fixed prefix do not form whole extensible groups.
    #[error("type `{type_id}`: {found} fields do not form whole extensible groups of {group_size}")]
    PartialExtensibleGroup {
        type_id: TypeId,
        group_size: usize,
        found: usize,
    },
    /// More field values than the schema allows.
    #[error("type `{type_id}`: {found} fields exceed the maximum of {max}")]
    TooManyFields {
        type_id: TypeId,
        max: usize,
        found: usize,
    },
    /// The type declares no extensible group but the blueprint carries extra fields.
    #[error("type `{type_id}` has {fixed} fields, blueprint carries {found}")]
    NotExtensible {
        type_id: TypeId,
        fixed: usize,
        found: usize,
    },
    /// A pointer's text could not be resolved and the policy forbids losing it.
    #[error("blueprint {blueprint}: pointer field {index} text `{text}` did not resolve (policy {policy:?})")]
    UnresolvedPointer {
        blueprint: usize,
        index: usize,
        text: String,
        policy: PointerPolicy,
    },
    /// Group indices passed to a grouped merge are out of range or overlap.
    #[error("merge group refers to blueprint {0}, which is out of range or already grouped")]
    InvalidGroup(usize),
    /// Admitted records failed validation at the active strictness level.
    #[error("admission rejected: {0}")]
    Rejected(ValidityReport),
    /// Mirror or index consistency check failed.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}
