//! `Handle`: the stable identity of a record
//!
//! Every record admitted to a [`Graph`](crate::graph::Graph) is keyed by a
//! `Handle`. Handles are random v4 UUIDs, so identities minted in one graph
//! never collide with identities read back from a serialized file or
//! preserved by [`Graph::clone_graph`](crate::graph::Graph::clone_graph).
//!
//! The identity string used in pointer text and serialized output is the
//! braced hyphenated form, e.g. `{1b4e28ba-2fa1-11d2-883f-0016d3cca427}`.

use std::{fmt, str::FromStr};
use thiserror::Error;
use uuid::Uuid;

/// Process-unique identifier of a record.
///
/// # Memory layout
/// This type is `repr(transparent)` over [`Uuid`] (16 bytes). The nil UUID
/// is never a valid handle; "no target" is spelled `Option<Handle>`.
#[derive(
    Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[repr(transparent)]
pub struct Handle(Uuid);

impl Handle {
    /// Mints a fresh random handle.
    #[inline]
    pub fn mint() -> Self {
        Handle(Uuid::new_v4())
    }

    /// Wraps an existing UUID. Returns `None` for the nil UUID.
    ///
    /// ```rust
    /// # use bem_graph::record::handle::Handle;
    /// assert!(Handle::from_uuid(uuid::Uuid::nil()).is_none());
    /// ```
    #[inline]
    pub fn from_uuid(raw: Uuid) -> Option<Self> {
        if raw.is_nil() { None } else { Some(Handle(raw)) }
    }

    /// Returns the wrapped UUID.
    #[inline]
    pub const fn as_uuid(self) -> Uuid {
        self.0
    }

    /// Parses an identity string, braced or bare. Surrounding whitespace is
    /// ignored; anything else that is not a non-nil UUID yields `None`.
    pub fn parse(text: &str) -> Option<Self> {
        let t = text.trim();
        let inner = t
            .strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
            .unwrap_or(t);
        Uuid::parse_str(inner).ok().and_then(Handle::from_uuid)
    }
}

/// Returned when text is not a non-nil identity string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("`{0}` is not a handle identity string")]
pub struct ParseHandleError(pub String);

impl FromStr for Handle {
    type Err = ParseHandleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Handle::parse(s).ok_or_else(|| ParseHandleError(s.to_string()))
    }
}

/// `Handle({uuid})`
impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handle").field(&format_args!("{self}")).finish()
    }
}

/// Braced identity string.
impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.braced())
    }
}
