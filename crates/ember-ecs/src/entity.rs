//! Entity identifiers.
//!
//! An [`EntityId`] is an opaque 64-bit handle issued monotonically by the
//! [`EntityManager`](crate::manager::EntityManager), which probes past any
//! collision so that an ID is unique for the process lifetime. An
//! [`Entity`] pairs the ID with a validity flag the manager maintains; a
//! destroyed entity's record is invalidated in place and swept out at the
//! next refresh.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// EntityId
// ---------------------------------------------------------------------------

/// Opaque 64-bit entity identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Raw `u64` representation.
    #[inline]
    pub const fn to_raw(self) -> u64 {
        self.0
    }

    /// Reconstruct from a raw `u64`.
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// An entity handle: its ID plus the validity flag the manager maintains.
///
/// Destroying an entity invalidates the *manager's* record; copies held by
/// callers keep reporting the validity they had when issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entity {
    id: EntityId,
    valid: bool,
}

impl Entity {
    pub(crate) fn new(id: EntityId) -> Self {
        Self { id, valid: true }
    }

    /// The entity's identifier.
    #[inline]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Whether this record is still valid.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub(crate) fn invalidate(&mut self) {
        self.valid = false;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
