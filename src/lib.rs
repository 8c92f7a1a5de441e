#![cfg_attr(docsrs, feature(doc_cfg))]
//! # bem-graph
//!
//! bem-graph is an in-memory object graph for building-energy model input
//! files. Records are typed by an external schema, hold their fields as text
//! or numbers, and point at each other through non-owning identity links that
//! the graph keeps mirrored in both directions.
//!
//! ## Features
//! - Schema-driven records with fixed fields plus repeating extensible groups
//! - Pointer fields resolved through named reference lists, with reverse
//!   lookups kept in step on every edit
//! - Three cumulative strictness levels (`Minimal`, `Draft`, `Final`) that
//!   every mutation is audited against before it is committed
//! - All-or-nothing batch admission, merge against existing records, and
//!   subset copies
//! - Name-series management (`Zone 1`, `Zone 2`, ...) scoped by reference list
//! - Coalesced change notifications delivered after each committed call
//!
//! ## Usage
//!
//! ```rust
//! use bem_graph::prelude::*;
//!
//! let schema = InMemorySchema::new().with_type(
//!     TypeDescriptor::new("Material")
//!         .with_field(FieldDescriptor::name("Name").required())
//!         .with_field(FieldDescriptor::real("Thickness").with_minimum(Bound::Exclusive(0.0)))
//!         .in_reference_list("MaterialName"),
//! );
//! let mut graph = Graph::new(schema.into_shared());
//! let brick = graph
//!     .admit(Blueprint::new("Material").with_fields(["Brick", "0.1"]), PointerPolicy::Strict)
//!     .unwrap();
//!
//! // Out-of-range values are refused at the default `Draft` level.
//! assert!(!graph.set_literal(brick, 1, "-1"));
//! assert_eq!(graph.get_string(brick, 1), "0.1");
//! ```
//!
//! ## Invariant checking
//!
//! Debug builds, and release builds with the `strict-invariants` or
//! `check-invariants` feature, re-check pointer mirrors and indices after
//! every committed call; see [`DebugInvariants`].

pub mod debug_invariants;
pub mod graph;
pub mod graph_error;
pub mod notify;
pub mod order;
pub mod record;
pub mod schema;
pub mod validity;

pub use debug_invariants::DebugInvariants;

pub mod prelude {
    //! Convenient re-exports of the commonly used types.
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::graph::{Graph, GraphOptions, PointerPolicy};
    pub use crate::graph_error::GraphError;
    pub use crate::notify::{GraphEvent, ListenerId, RecordChange, RelationshipChange};
    pub use crate::order::{OrderEditor, RecordOrder};
    pub use crate::record::{Blueprint, FieldValue, Handle, Record};
    pub use crate::schema::{
        Bound, FieldDescriptor, FieldKind, InMemorySchema, PointerConvention, SchemaProvider,
        TypeDescriptor, TypeId,
    };
    pub use crate::validity::{DataError, DataErrorKind, StrictnessLevel, ValidityReport};
}
