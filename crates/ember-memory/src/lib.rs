//! Ember memory core -- arena-backed allocation for the engine runtime.
//!
//! This crate provides the process-wide memory subsystem: a fixed [`Arena`]
//! acquired once at startup, a [`FreeListAllocator`] that serves aligned
//! allocations out of it, and the [`system`] facade with its typed
//! allocation helpers. Every higher-level buffer in the engine (archetype
//! columns, staging blobs) allocates through this crate rather than the
//! global allocator, so a single used-byte counter accounts for all of it.
//!
//! # Quick Start
//!
//! ```
//! ember_memory::initialise(1024);
//!
//! let handle = ember_memory::allocate(64);
//! assert!(!handle.is_null());
//! assert_eq!(ember_memory::used_memory(), 64 + ember_memory::header_size());
//!
//! unsafe { ember_memory::free(handle.ptr) };
//! assert_eq!(ember_memory::used_memory(), 0);
//!
//! ember_memory::shutdown();
//! ```

#![deny(unsafe_code)]

#[allow(unsafe_code)]
pub mod arena;
pub mod footprint;
#[allow(unsafe_code)]
pub mod free_list;
#[allow(unsafe_code)]
pub mod system;

pub use arena::Arena;
pub use footprint::{BlockFootprint, MemoryDebugHandle, MemoryFootprint};
pub use free_list::{AllocationPolicy, FreeListAllocator, FreeRegion};
pub use system::{
    alloc_buffer, alloc_unsafe, alloc_value, allocate, allocate_aligned, check_memory_footprint,
    free, free_buffer, free_memory, free_unsafe, free_value, initialise, is_initialised,
    memory_clear, memory_copy, memory_move, reallocate, reallocate_aligned, shutdown,
    total_memory, used_memory, UnsafeHandle,
};

/// The platform memory alignment. Every allocation size is rounded up to a
/// multiple of this, and it is the default alignment for allocations that do
/// not request a stricter one.
pub const PLATFORM_ALIGNMENT: usize = 8;

/// Rounds `size` up to the next multiple of [`PLATFORM_ALIGNMENT`].
#[inline]
pub const fn aligned_size(size: usize) -> usize {
    (size + PLATFORM_ALIGNMENT - 1) & !(PLATFORM_ALIGNMENT - 1)
}

/// The per-allocation header footprint, as placed in front of every live
/// block. Convenience re-export so callers can reason about used-byte
/// arithmetic without reaching into [`free_list`].
#[inline]
pub const fn header_size() -> usize {
    FreeListAllocator::header_size()
}
