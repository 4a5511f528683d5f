//! Archetype storage.
//!
//! An [`Archetype`] stores every entity that shares exactly one component
//! set, column-major: one byte-buffer [`Column`] per component, plus a
//! parallel entity-ID list and a row index. All column backing storage is
//! allocated through the memory system.
//!
//! # Safety
//!
//! This module contains `unsafe` code because component data is stored as
//! type-erased byte buffers. The invariants are upheld by the
//! [`EntityManager`](crate::manager::EntityManager): every column access
//! uses the stride recorded for that column, and typed access only happens
//! for the component type whose ID keys the column.

use std::collections::HashMap;
use std::ptr::NonNull;
use std::slice;

use ember_memory::UnsafeHandle;

use crate::component::{Component, ComponentId};
use crate::component_data::ComponentData;
use crate::entity::EntityId;
use crate::fingerprint::Fingerprint;
use crate::query::ComponentQuery;

// ---------------------------------------------------------------------------
// Column -- type-erased component storage
// ---------------------------------------------------------------------------

/// A densely packed, type-erased buffer holding one component's bodies,
/// row `i` belonging to the archetype's `entity_ids[i]`.
///
/// The element stride is learned from the first pushed value; every later
/// push must match it.
pub(crate) struct Column {
    handle: UnsafeHandle,
    stride: Option<usize>,
    len: usize,
    capacity: usize,
}

impl Column {
    fn new() -> Self {
        Self {
            handle: UnsafeHandle::null(),
            stride: None,
            len: 0,
            capacity: 0,
        }
    }

    /// Number of stored rows.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// The element stride. Panics if nothing has been pushed yet.
    #[inline]
    pub(crate) fn stride(&self) -> usize {
        self.stride.expect("column stride is unset until the first push")
    }

    fn grow_if_needed(&mut self) {
        if self.len < self.capacity {
            return;
        }
        let new_capacity = if self.capacity == 0 { 4 } else { self.capacity * 2 };

        let stride = self.stride();
        if stride == 0 {
            self.capacity = new_capacity;
            return;
        }

        let bytes = new_capacity * stride;
        let handle = if self.handle.is_null() {
            ember_memory::alloc_unsafe(bytes)
        } else {
            unsafe { ember_memory::reallocate(self.handle, bytes) }
        };
        assert!(
            !handle.is_null(),
            "memory system exhausted while growing an archetype column"
        );
        self.handle = handle;
        self.capacity = new_capacity;
    }

    /// Append one element's bytes.
    pub(crate) fn push(&mut self, bytes: &[u8]) {
        match self.stride {
            None => self.stride = Some(bytes.len()),
            Some(stride) => {
                assert_eq!(bytes.len(), stride, "column stride mismatch");
            }
        }

        self.grow_if_needed();
        let stride = self.stride();
        if stride > 0 {
            unsafe {
                ember_memory::memory_copy(
                    self.handle.ptr.add(self.len * stride),
                    bytes.as_ptr(),
                    stride,
                );
            }
        }
        self.len += 1;
    }

    /// Swap-remove the element at `row`: the last element's bytes move into
    /// its place and the length shrinks by one.
    pub(crate) fn swap_remove(&mut self, row: usize) {
        debug_assert!(row < self.len);
        let last = self.len - 1;
        let stride = self.stride();
        if stride > 0 && row != last {
            unsafe {
                ember_memory::memory_copy(
                    self.handle.ptr.add(row * stride),
                    self.handle.ptr.add(last * stride),
                    stride,
                );
            }
        }
        self.len -= 1;
    }

    /// The element bytes at `row`.
    pub(crate) fn bytes_at(&self, row: usize) -> &[u8] {
        debug_assert!(row < self.len);
        let stride = self.stride();
        if stride == 0 {
            &[]
        } else {
            unsafe { slice::from_raw_parts(self.handle.ptr.add(row * stride), stride) }
        }
    }

    /// The mutable element bytes at `row`.
    pub(crate) fn bytes_at_mut(&mut self, row: usize) -> &mut [u8] {
        debug_assert!(row < self.len);
        let stride = self.stride();
        if stride == 0 {
            &mut []
        } else {
            unsafe { slice::from_raw_parts_mut(self.handle.ptr.add(row * stride), stride) }
        }
    }

    /// Raw pointer to the element at `row`.
    ///
    /// # Safety
    ///
    /// `row` must be below [`len`](Self::len), and the caller must uphold
    /// Rust aliasing rules for whatever references it derives.
    pub(crate) unsafe fn ptr_at(&self, row: usize) -> *mut u8 {
        debug_assert!(row < self.len);
        self.handle.ptr.add(row * self.stride())
    }
}

impl Clone for Column {
    fn clone(&self) -> Self {
        let stride = self.stride.unwrap_or(0);
        let used = self.len * stride;

        let handle = if used == 0 {
            UnsafeHandle::null()
        } else {
            let handle = ember_memory::alloc_unsafe(used);
            assert!(
                !handle.is_null(),
                "memory system exhausted while cloning an archetype column"
            );
            unsafe { ember_memory::memory_copy(handle.ptr, self.handle.ptr, used) };
            handle
        };

        Self {
            handle,
            stride: self.stride,
            len: self.len,
            capacity: self.len,
        }
    }
}

impl Drop for Column {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            unsafe { ember_memory::free_unsafe(self.handle) };
        }
    }
}

impl std::fmt::Debug for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Column")
            .field("stride", &self.stride)
            .field("len", &self.len)
            .field("capacity", &self.capacity)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Archetype
// ---------------------------------------------------------------------------

/// The set of entities sharing exactly one component set, stored
/// column-major.
///
/// Invariants: every column's length equals the entity list's length;
/// `row_of_entity[e] == i` iff `entity_ids[i] == e`; the fingerprint is
/// determined solely by the component-ID set.
#[derive(Debug, Clone)]
pub struct Archetype {
    fingerprint: Fingerprint,
    component_ids: Vec<ComponentId>,
    columns: HashMap<ComponentId, Column>,
    entity_ids: Vec<EntityId>,
    row_of_entity: HashMap<EntityId, usize>,
}

impl Archetype {
    /// Create an empty archetype for the given fingerprint and component
    /// set.
    ///
    /// # Panics
    ///
    /// Panics if the fingerprint's set-bit count does not match the ID
    /// count, or if an ID appears more than once.
    pub fn new(fingerprint: Fingerprint, component_ids: Vec<ComponentId>) -> Self {
        assert_eq!(
            fingerprint.true_count(),
            component_ids.len(),
            "fingerprint must have one set bit per component id"
        );

        let mut columns = HashMap::with_capacity(component_ids.len());
        for &id in &component_ids {
            let previous = columns.insert(id, Column::new());
            assert!(previous.is_none(), "duplicate component id {id:?}");
        }

        Self {
            fingerprint,
            component_ids,
            columns,
            entity_ids: Vec::new(),
            row_of_entity: HashMap::new(),
        }
    }

    /// The archetype's fingerprint.
    #[inline]
    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// The component IDs present, in registration order at construction.
    #[inline]
    pub fn component_ids(&self) -> &[ComponentId] {
        &self.component_ids
    }

    /// Number of resident entities.
    #[inline]
    pub fn entity_count(&self) -> usize {
        self.entity_ids.len()
    }

    /// Number of component columns.
    #[inline]
    pub fn component_count(&self) -> usize {
        self.columns.len()
    }

    /// The resident entity IDs in row order.
    #[inline]
    pub fn entity_ids(&self) -> &[EntityId] {
        &self.entity_ids
    }

    /// Constant-time column lookup for a component type.
    #[inline]
    pub fn has_component<T: Component>(&self) -> bool {
        self.has_component_id(T::ID)
    }

    /// Constant-time column lookup by ID.
    #[inline]
    pub fn has_component_id(&self, id: ComponentId) -> bool {
        self.columns.contains_key(&id)
    }

    /// Whether `entity_id` is resident.
    #[inline]
    pub fn contains_entity(&self, entity_id: EntityId) -> bool {
        self.row_of_entity.contains_key(&entity_id)
    }

    /// The row occupied by `entity_id`, if resident.
    #[inline]
    pub(crate) fn row_of(&self, entity_id: EntityId) -> Option<usize> {
        self.row_of_entity.get(&entity_id).copied()
    }

    /// Append a new entity row, splitting `blob` into one slice per
    /// component in `ids` order and pushing each onto its column.
    ///
    /// Refuses (returns `false`) if the entity is already resident.
    ///
    /// # Panics
    ///
    /// Panics if `ids`/`sizes` do not line up 1:1 with this archetype's
    /// columns, or if `blob` does not span exactly the summed sizes.
    pub fn try_add_component_data(
        &mut self,
        entity_id: EntityId,
        ids: &[ComponentId],
        sizes: &[usize],
        blob: &[u8],
    ) -> bool {
        assert_eq!(ids.len(), sizes.len(), "ids and sizes must be parallel");
        assert_eq!(
            ids.len(),
            self.columns.len(),
            "component ids must cover every column"
        );
        assert_eq!(
            sizes.iter().sum::<usize>(),
            blob.len(),
            "blob must span exactly the summed component sizes"
        );

        if self.row_of_entity.contains_key(&entity_id) {
            return false;
        }

        self.row_of_entity.insert(entity_id, self.entity_ids.len());
        self.entity_ids.push(entity_id);

        let mut offset = 0;
        for (&id, &size) in ids.iter().zip(sizes) {
            let column = self
                .columns
                .get_mut(&id)
                .expect("archetype does not contain component id");
            column.push(&blob[offset..offset + size]);
            offset += size;
        }

        true
    }

    /// Append the entity's `(id, stride, bytes)` triples to `out`, one per
    /// column, in this archetype's component order.
    ///
    /// # Panics
    ///
    /// Panics if the entity is not resident.
    pub fn component_data_for_entity(&self, entity_id: EntityId, out: &mut ComponentData) {
        let row = self
            .row_of(entity_id)
            .expect("entity must belong to the archetype");

        for &id in &self.component_ids {
            let column = &self.columns[&id];
            out.add(id, column.stride(), column.bytes_at(row));
        }
    }

    /// A typed view of one component of a resident entity.
    ///
    /// Returns `None` when the entity is not resident or the archetype has
    /// no column for `T`.
    pub fn component_for_entity<T: Component>(&self, entity_id: EntityId) -> Option<&T> {
        let row = self.row_of(entity_id)?;
        let column = self.columns.get(&T::ID)?;
        if std::mem::size_of::<T>() == 0 {
            // ZST: any well-aligned non-null pointer is a valid referent.
            return Some(unsafe { NonNull::<T>::dangling().as_ref() });
        }
        Some(bytemuck::from_bytes(column.bytes_at(row)))
    }

    /// A mutable typed view of one component of a resident entity.
    pub fn component_for_entity_mut<T: Component>(&mut self, entity_id: EntityId) -> Option<&mut T> {
        let row = self.row_of(entity_id)?;
        let column = self.columns.get_mut(&T::ID)?;
        if std::mem::size_of::<T>() == 0 {
            return Some(unsafe { NonNull::<T>::dangling().as_mut() });
        }
        Some(bytemuck::from_bytes_mut(column.bytes_at_mut(row)))
    }

    /// Raw pointer to the queried component at `row`, for the query layer.
    ///
    /// # Safety
    ///
    /// `row` must be a live row and the caller must have exclusive access
    /// to this archetype when deriving mutable references.
    pub(crate) unsafe fn column_ptr(&self, id: ComponentId, row: usize) -> *mut u8 {
        self.columns
            .get(&id)
            .expect("archetype must contain the queried component")
            .ptr_at(row)
    }

    /// Swap-remove the entity's row from every column and the entity list,
    /// fixing the row index of whichever entity was moved into the gap.
    ///
    /// Returns `false` if the entity was not resident.
    pub fn try_remove_component_data(&mut self, entity_id: EntityId) -> bool {
        let Some(row) = self.row_of_entity.remove(&entity_id) else {
            return false;
        };
        let last = self.entity_ids.len() - 1;

        self.entity_ids.swap_remove(row);
        for column in self.columns.values_mut() {
            column.swap_remove(row);
        }

        if row < last {
            self.row_of_entity.insert(self.entity_ids[row], row);
        }

        true
    }

    /// Invoke `callback` once per resident row with typed views into every
    /// queried column. Iteration order matches the entity list.
    pub fn for_each<Q: ComponentQuery, F>(&mut self, mut callback: F)
    where
        F: FnMut(Q::Item<'_>),
    {
        for row in 0..self.entity_ids.len() {
            // Exclusive access to `self` makes the mutable views sound.
            let item = unsafe { Q::fetch(self, row) };
            callback(item);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
