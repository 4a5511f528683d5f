//! Compile-time component queries.
//!
//! A [`ComponentQuery`] is a tuple of component types -- `(A,)` through
//! `(A, B, C, D)` -- that resolves, per archetype row, to a tuple of
//! mutable references into the matching columns. It powers
//! [`Archetype::for_each`](crate::archetype::Archetype::for_each),
//! [`EntityManager::for_each`](crate::manager::EntityManager::for_each),
//! and tuple-typed entity access.
//!
//! ## Soundness
//!
//! Fetching produces `&mut T` from a shared archetype reference via raw
//! pointer casts. Every entry point that runs a fetch takes the archetype
//! (or the whole manager) by `&mut`, which guarantees exclusive access for
//! the duration of the iteration and makes the cast sound. Queries must not
//! name the same component type twice; the manager asserts this before
//! iterating.

use std::mem;
use std::ptr::NonNull;

use crate::archetype::Archetype;
use crate::component::{Component, ComponentId};

// ---------------------------------------------------------------------------
// ComponentQuery
// ---------------------------------------------------------------------------

/// A tuple of component types fetched together, one row at a time.
pub trait ComponentQuery {
    /// The per-row output: a tuple of mutable component references.
    type Item<'a>;

    /// Append the queried component IDs, in tuple order.
    fn component_ids(out: &mut Vec<ComponentId>);

    /// Fetch one row from an archetype.
    ///
    /// # Safety
    ///
    /// `row` must be a live row in `archetype`, every queried component must
    /// have a column there, and the caller must hold exclusive access to the
    /// archetype so the mutable references cannot alias.
    unsafe fn fetch(archetype: &Archetype, row: usize) -> Self::Item<'_>;
}

/// Fetch one typed mutable reference out of an archetype column.
///
/// # Safety
///
/// See [`ComponentQuery::fetch`].
unsafe fn fetch_one<T: Component>(archetype: &Archetype, row: usize) -> &mut T {
    if mem::size_of::<T>() == 0 {
        // ZST: any well-aligned non-null pointer is a valid referent.
        return NonNull::<T>::dangling().as_mut();
    }
    &mut *(archetype.column_ptr(T::ID, row) as *mut T)
}

impl<A: Component> ComponentQuery for (A,) {
    type Item<'a> = (&'a mut A,);

    fn component_ids(out: &mut Vec<ComponentId>) {
        out.push(A::ID);
    }

    unsafe fn fetch(archetype: &Archetype, row: usize) -> Self::Item<'_> {
        (fetch_one::<A>(archetype, row),)
    }
}

impl<A: Component, B: Component> ComponentQuery for (A, B) {
    type Item<'a> = (&'a mut A, &'a mut B);

    fn component_ids(out: &mut Vec<ComponentId>) {
        out.push(A::ID);
        out.push(B::ID);
    }

    unsafe fn fetch(archetype: &Archetype, row: usize) -> Self::Item<'_> {
        (fetch_one::<A>(archetype, row), fetch_one::<B>(archetype, row))
    }
}

impl<A: Component, B: Component, C: Component> ComponentQuery for (A, B, C) {
    type Item<'a> = (&'a mut A, &'a mut B, &'a mut C);

    fn component_ids(out: &mut Vec<ComponentId>) {
        out.push(A::ID);
        out.push(B::ID);
        out.push(C::ID);
    }

    unsafe fn fetch(archetype: &Archetype, row: usize) -> Self::Item<'_> {
        (
            fetch_one::<A>(archetype, row),
            fetch_one::<B>(archetype, row),
            fetch_one::<C>(archetype, row),
        )
    }
}

impl<A: Component, B: Component, C: Component, D: Component> ComponentQuery for (A, B, C, D) {
    type Item<'a> = (&'a mut A, &'a mut B, &'a mut C, &'a mut D);

    fn component_ids(out: &mut Vec<ComponentId>) {
        out.push(A::ID);
        out.push(B::ID);
        out.push(C::ID);
        out.push(D::ID);
    }

    unsafe fn fetch(archetype: &Archetype, row: usize) -> Self::Item<'_> {
        (
            fetch_one::<A>(archetype, row),
            fetch_one::<B>(archetype, row),
            fetch_one::<C>(archetype, row),
            fetch_one::<D>(archetype, row),
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
