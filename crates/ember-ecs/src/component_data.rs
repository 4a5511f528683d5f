//! Transient component staging storage.
//!
//! [`ComponentData`] is the SoA bag builders fill while an entity is being
//! composed, and the vehicle for ferrying an entity's components between
//! archetypes during migration. It keeps three parallel streams -- component
//! IDs, component sizes, and one packed byte blob holding the concatenated
//! component bodies in the same order. The blob is allocated through the
//! memory system, like every other component buffer in the engine.

use std::slice;

use ember_memory::UnsafeHandle;

use crate::component::ComponentId;

/// Initial blob capacity in bytes.
const DEFAULT_DATA_CAPACITY: usize = 8;

/// A growable `(ids, sizes, bytes)` staging record for one entity's
/// components.
///
/// Invariant: the sum of `sizes` equals the blob's used byte count, and the
/// blob holds the component bodies packed in `ids` order.
pub struct ComponentData {
    ids: Vec<ComponentId>,
    sizes: Vec<usize>,
    blob: UnsafeHandle,
    bytes_stored: usize,
}

impl ComponentData {
    /// Create an empty record. No memory is allocated until the first
    /// component with a non-zero size is added.
    pub fn new() -> Self {
        Self {
            ids: Vec::new(),
            sizes: Vec::new(),
            blob: UnsafeHandle::null(),
            bytes_stored: 0,
        }
    }

    /// Number of staged components.
    #[inline]
    pub fn count(&self) -> usize {
        self.ids.len()
    }

    /// Whether no components are staged.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Total bytes stored in the blob.
    #[inline]
    pub fn bytes_stored(&self) -> usize {
        self.bytes_stored
    }

    /// The staged component IDs, in insertion order.
    #[inline]
    pub fn component_ids(&self) -> &[ComponentId] {
        &self.ids
    }

    /// The staged component sizes, parallel to
    /// [`component_ids`](Self::component_ids).
    #[inline]
    pub fn component_sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// The packed component bodies, in insertion order.
    pub fn bytes(&self) -> &[u8] {
        if self.bytes_stored == 0 {
            &[]
        } else {
            unsafe { slice::from_raw_parts(self.blob.ptr, self.bytes_stored) }
        }
    }

    /// Append a component to the three streams.
    ///
    /// # Panics
    ///
    /// Panics if `id` is already staged (duplicate components are a
    /// programmer error), if `bytes` does not span `size` bytes, or if the
    /// memory system cannot grow the blob.
    pub fn add(&mut self, id: ComponentId, size: usize, bytes: &[u8]) {
        assert_eq!(bytes.len(), size, "component byte count must match size");
        assert!(
            !self.ids.contains(&id),
            "component {id:?} is already staged"
        );

        self.reserve(size);
        if size > 0 {
            unsafe {
                ember_memory::memory_copy(
                    self.blob.ptr.add(self.bytes_stored),
                    bytes.as_ptr(),
                    size,
                );
            }
        }
        self.bytes_stored += size;

        self.ids.push(id);
        self.sizes.push(size);
    }

    /// Remove the first occurrence of `id`, compacting all three streams.
    /// A no-op when `id` is not staged.
    pub fn remove(&mut self, id: ComponentId) {
        let Some(index) = self.ids.iter().position(|&staged| staged == id) else {
            return;
        };

        let offset: usize = self.sizes[..index].iter().sum();
        let size = self.sizes[index];
        let tail = self.bytes_stored - offset - size;
        if tail > 0 {
            unsafe {
                ember_memory::memory_move(
                    self.blob.ptr.add(offset),
                    self.blob.ptr.add(offset + size),
                    tail,
                );
            }
        }
        self.bytes_stored -= size;

        self.ids.remove(index);
        self.sizes.remove(index);
    }

    /// Iterate the staged components as `(id, size, bytes)` triples in
    /// insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (ComponentId, usize, &[u8])> + '_ {
        let mut offset = 0;
        self.ids.iter().zip(&self.sizes).map(move |(&id, &size)| {
            let bytes = if size == 0 {
                &[][..]
            } else {
                unsafe { slice::from_raw_parts(self.blob.ptr.add(offset), size) }
            };
            offset += size;
            (id, size, bytes)
        })
    }

    fn reserve(&mut self, additional: usize) {
        let needed = self.bytes_stored + additional;
        if needed == 0 || needed <= self.blob.size {
            return;
        }

        if self.blob.is_null() {
            let handle = ember_memory::alloc_unsafe(needed.max(DEFAULT_DATA_CAPACITY));
            assert!(
                !handle.is_null(),
                "memory system exhausted while staging component data"
            );
            self.blob = handle;
        } else {
            let handle =
                unsafe { ember_memory::reallocate(self.blob, needed.max(self.blob.size * 2)) };
            assert!(
                !handle.is_null(),
                "memory system exhausted while staging component data"
            );
            self.blob = handle;
        }
    }
}

impl Default for ComponentData {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for ComponentData {
    fn clone(&self) -> Self {
        let blob = if self.bytes_stored == 0 {
            UnsafeHandle::null()
        } else {
            let handle = ember_memory::alloc_unsafe(self.bytes_stored);
            assert!(
                !handle.is_null(),
                "memory system exhausted while cloning component data"
            );
            unsafe { ember_memory::memory_copy(handle.ptr, self.blob.ptr, self.bytes_stored) };
            handle
        };

        Self {
            ids: self.ids.clone(),
            sizes: self.sizes.clone(),
            blob,
            bytes_stored: self.bytes_stored,
        }
    }
}

impl PartialEq for ComponentData {
    fn eq(&self, other: &Self) -> bool {
        self.ids == other.ids && self.sizes == other.sizes && self.bytes() == other.bytes()
    }
}

impl Eq for ComponentData {}

impl Drop for ComponentData {
    fn drop(&mut self) {
        if !self.blob.is_null() {
            unsafe { ember_memory::free_unsafe(self.blob) };
        }
    }
}

impl std::fmt::Debug for ComponentData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentData")
            .field("ids", &self.ids)
            .field("sizes", &self.sizes)
            .field("bytes_stored", &self.bytes_stored)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
