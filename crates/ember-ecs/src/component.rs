//! Component identity and the registration-phase catalogue.
//!
//! Components are plain data records identified by a user-chosen 64-bit
//! [`ComponentId`]. Before any archetype or entity exists, every component
//! type is registered in the [`ComponentCatalogue`], which assigns it a
//! dense bit index inside the archetype fingerprint; the catalogue is then
//! locked for the rest of the run.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ComponentId
// ---------------------------------------------------------------------------

/// User-chosen 64-bit tag identifying a component type.
///
/// The core accepts any value, including zero; higher layers conventionally
/// reserve `0` as "none".
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId(u64);

impl ComponentId {
    /// Wrap a raw tag value.
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw tag value.
    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentId({})", self.0)
    }
}

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

/// A component type: a plain-old-data record with a compile-time ID.
///
/// The [`bytemuck::Pod`] bound is what makes it sound to ferry component
/// values through the byte-oriented staging and column storage: any bit
/// pattern of the right length is a valid value, so copies are plain
/// memcpys.
pub trait Component: bytemuck::Pod {
    /// The component's unique tag.
    const ID: ComponentId;
}

// ---------------------------------------------------------------------------
// ComponentCatalogue
// ---------------------------------------------------------------------------

/// Registration-phase catalogue mapping each [`ComponentId`] to its dense
/// fingerprint-bit index.
///
/// Registration is idempotent per ID and assigns indices in registration
/// order. Once [`lock`](Self::lock) flips the one-way latch, the index
/// assignment is final; all archetype and entity creation happens after the
/// lock.
#[derive(Debug, Default)]
pub struct ComponentCatalogue {
    index_of: HashMap<ComponentId, usize>,
    locked: bool,
}

impl ComponentCatalogue {
    /// Create an empty, unlocked catalogue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign `id` the next dense bit index, or return the one it already
    /// has. Callers must check [`is_locked`](Self::is_locked) first;
    /// registering through a locked catalogue is a programming error.
    pub fn register(&mut self, id: ComponentId) -> usize {
        debug_assert!(!self.locked, "catalogue is locked");

        if let Some(&index) = self.index_of.get(&id) {
            return index;
        }
        let index = self.index_of.len();
        self.index_of.insert(id, index);
        index
    }

    /// Flip the one-way registration latch.
    #[inline]
    pub fn lock(&mut self) {
        self.locked = true;
    }

    /// Whether registration has been locked.
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// The dense bit index assigned to `id`, if registered.
    #[inline]
    pub fn index_of(&self, id: ComponentId) -> Option<usize> {
        self.index_of.get(&id).copied()
    }

    /// Number of registered component IDs. Fixed after the lock; this is
    /// the fingerprint bit width.
    #[inline]
    pub fn len(&self) -> usize {
        self.index_of.len()
    }

    /// Whether any component IDs have been registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index_of.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
