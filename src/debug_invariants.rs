//! Structural self-checks for the graph.
//!
//! [`Graph`](crate::graph::Graph) re-checks its pointer mirrors, secondary
//! indices and direct order after every top-level call that commits.
//! The checks run in debug builds and in release builds with the
//! `strict-invariants` or `check-invariants` feature; otherwise they
//! compile away.

use crate::graph_error::GraphError;

/// Self-check for a structure that keeps redundant bookkeeping in step.
pub trait DebugInvariants {
    /// Panic with the first broken invariant when checks are enabled.
    fn debug_assert_invariants(&self);
    /// First broken invariant as [`GraphError::InvariantViolation`].
    fn validate_invariants(&self) -> Result<(), GraphError>;
}

/// Run `$check` (a `Result<(), GraphError>`) and panic with
/// `[invariants] <ctx>: <error>` if it fails. Expands to nothing when
/// checks are disabled.
#[macro_export]
macro_rules! debug_invariants {
    ($check:expr, $($ctx:tt)*) => {
        #[cfg(any(debug_assertions, feature = "strict-invariants", feature = "check-invariants"))]
        if let Err(e) = $check {
            panic!(concat!("[invariants] ", $($ctx)*, ": {}"), e);
        }
    };
}
