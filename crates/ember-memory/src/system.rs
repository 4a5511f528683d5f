//! The process-wide memory system facade.
//!
//! [`initialise`] acquires the arena and installs the one live
//! [`FreeListAllocator`] for this thread of execution; [`shutdown`] tears it
//! down and asserts that every byte was returned first. Everything in
//! between -- raw handles, typed values, buffers -- goes through the
//! module-level functions here.
//!
//! The engine's scheduling model is single-threaded cooperative, so the
//! "process-wide singleton" lives in thread-local storage: each thread of
//! execution (including each test thread) gets an independent system with
//! independent lifecycle rules.
//!
//! Operations invoked before [`initialise`] or after [`shutdown`] return the
//! null handle (and [`free`] becomes a no-op) instead of crashing, so
//! teardown-order mistakes surface in the used-byte assertion rather than as
//! a crash mid-drop.

use std::cell::RefCell;
use std::mem;
use std::ptr::{self, NonNull};

use crate::arena::Arena;
use crate::footprint::{MemoryDebugHandle, MemoryFootprint};
use crate::free_list::{AllocationPolicy, FreeListAllocator};
use crate::{aligned_size, PLATFORM_ALIGNMENT};

// ---------------------------------------------------------------------------
// UnsafeHandle
// ---------------------------------------------------------------------------

/// A `(pointer, size)` pair returned by [`allocate`] and [`reallocate`].
///
/// `size` is the user-visible request rounded up to platform alignment. The
/// pointer is null iff the system is not live or the arena is exhausted.
#[derive(Debug, Clone, Copy)]
pub struct UnsafeHandle {
    /// Start of the usable bytes.
    pub ptr: *mut u8,
    /// Usable byte count.
    pub size: usize,
}

impl UnsafeHandle {
    /// The failed/empty handle.
    #[inline]
    pub const fn null() -> Self {
        Self {
            ptr: ptr::null_mut(),
            size: 0,
        }
    }

    /// Whether this handle represents a failed or absent allocation.
    #[inline]
    pub fn is_null(&self) -> bool {
        self.ptr.is_null()
    }
}

// ---------------------------------------------------------------------------
// The thread-local system
// ---------------------------------------------------------------------------

struct MemorySystem {
    // Field order matters: the allocator's node graph lives inside the
    // arena, so the arena must outlive every allocator operation. Neither
    // runs drop glue over the other, but keep the pairing explicit.
    _arena: Arena,
    allocator: FreeListAllocator,
}

thread_local! {
    static SYSTEM: RefCell<Option<MemorySystem>> = const { RefCell::new(None) };
}

/// Acquire a `bytes`-sized arena from the platform and mark the system live.
///
/// # Panics
///
/// Panics if the system is already live, or if `bytes` is zero.
pub fn initialise(bytes: usize) {
    SYSTEM.with(|system| {
        let mut slot = system.borrow_mut();
        if slot.is_some() {
            tracing::error!("memory system initialised twice");
            panic!("memory system is already initialised");
        }

        let arena = Arena::new(bytes);
        let allocator = FreeListAllocator::new(
            arena.base(),
            arena.size(),
            PLATFORM_ALIGNMENT,
            AllocationPolicy::FirstFit,
        );
        *slot = Some(MemorySystem {
            _arena: arena,
            allocator,
        });
    });
    tracing::debug!(bytes, "memory system initialised");
}

/// Tear the system down, releasing the arena.
///
/// # Panics
///
/// Panics if the system is not live, or if any bytes are still allocated --
/// every collection must have released its backing storage first.
pub fn shutdown() {
    SYSTEM.with(|system| {
        let mut slot = system.borrow_mut();
        let Some(live) = slot.take() else {
            tracing::error!("memory system shut down while not initialised");
            panic!("memory system is not initialised");
        };
        let used = live.allocator.used();
        if used != 0 {
            tracing::error!(used, "memory system shut down with live allocations");
            panic!("memory system shut down with {used} bytes still allocated");
        }
    });
    tracing::debug!("memory system shut down");
}

/// Whether the system is currently live.
pub fn is_initialised() -> bool {
    SYSTEM.with(|system| system.borrow().is_some())
}

/// Bytes currently allocated (headers and padding included). Zero when the
/// system is not live.
pub fn used_memory() -> usize {
    SYSTEM.with(|system| {
        system
            .borrow()
            .as_ref()
            .map_or(0, |live| live.allocator.used())
    })
}

/// Bytes currently free. Zero when the system is not live.
pub fn free_memory() -> usize {
    SYSTEM.with(|system| {
        system
            .borrow()
            .as_ref()
            .map_or(0, |live| live.allocator.free_bytes())
    })
}

/// Total arena bytes. Zero when the system is not live.
pub fn total_memory() -> usize {
    SYSTEM.with(|system| {
        system
            .borrow()
            .as_ref()
            .map_or(0, |live| live.allocator.total())
    })
}

// ---------------------------------------------------------------------------
// Raw allocation
// ---------------------------------------------------------------------------

/// Allocate `size` bytes at platform alignment.
///
/// Returns the null handle when the system is not live or the arena cannot
/// satisfy the request.
pub fn allocate(size: usize) -> UnsafeHandle {
    allocate_aligned(size, PLATFORM_ALIGNMENT)
}

/// Allocate `size` bytes whose pointer meets `alignment`.
///
/// `size` is rounded up to platform alignment before allocation, and the
/// rounded size is what the returned handle reports.
pub fn allocate_aligned(size: usize, alignment: usize) -> UnsafeHandle {
    SYSTEM.with(|system| {
        let mut slot = system.borrow_mut();
        let Some(live) = slot.as_mut() else {
            return UnsafeHandle::null();
        };

        let rounded = aligned_size(size);
        match live.allocator.allocate(rounded, alignment) {
            Some(ptr) => UnsafeHandle {
                ptr: ptr.as_ptr(),
                size: rounded,
            },
            None => UnsafeHandle::null(),
        }
    })
}

/// Move an allocation to a new block of `size` bytes at platform
/// alignment, copying `min(old, new)` bytes across. The old handle is
/// consumed; its block is zeroed and freed.
///
/// Returns the null handle (without touching the old block) when the new
/// allocation cannot be satisfied.
///
/// # Safety
///
/// `handle` must be a live handle previously returned by [`allocate`],
/// [`allocate_aligned`], or this function.
pub unsafe fn reallocate(handle: UnsafeHandle, size: usize) -> UnsafeHandle {
    reallocate_aligned(handle, size, PLATFORM_ALIGNMENT)
}

/// [`reallocate`] with an explicit alignment for the new block.
///
/// # Safety
///
/// See [`reallocate`].
pub unsafe fn reallocate_aligned(
    handle: UnsafeHandle,
    size: usize,
    alignment: usize,
) -> UnsafeHandle {
    if handle.is_null() {
        return allocate_aligned(size, alignment);
    }

    let moved = allocate_aligned(size, alignment);
    if moved.is_null() {
        return UnsafeHandle::null();
    }

    ptr::copy_nonoverlapping(handle.ptr, moved.ptr, handle.size.min(moved.size));
    free(handle.ptr);
    moved
}

/// Zero the block's usable bytes, then return the slot to the allocator.
///
/// A no-op when the system is not live or `ptr` is null.
///
/// # Safety
///
/// `ptr` must point to a live allocation made through this system and must
/// not be used afterwards.
pub unsafe fn free(ptr: *mut u8) {
    SYSTEM.with(|system| {
        let mut slot = system.borrow_mut();
        let Some(live) = slot.as_mut() else {
            return;
        };
        let Some(ptr) = NonNull::new(ptr) else {
            return;
        };

        let footprint = live.allocator.footprint(ptr);
        let body = footprint.size - FreeListAllocator::header_size() - footprint.padding;
        ptr::write_bytes(ptr.as_ptr(), 0, body);

        live.allocator.free(ptr);
    });
}

// ---------------------------------------------------------------------------
// Typed helpers
// ---------------------------------------------------------------------------

/// Allocate one aligned slot for `T` and move `value` into it.
///
/// Returns `None` when the system is not live or the arena is exhausted.
///
/// # Panics
///
/// Panics for zero-sized `T` -- such values need no allocation.
pub fn alloc_value<T>(value: T) -> Option<NonNull<T>> {
    assert!(
        mem::size_of::<T>() > 0,
        "zero-sized values need no allocation"
    );

    let handle = allocate_aligned(
        mem::size_of::<T>(),
        mem::align_of::<T>().max(PLATFORM_ALIGNMENT),
    );
    let ptr = NonNull::new(handle.ptr as *mut T)?;
    unsafe { ptr.as_ptr().write(value) };
    Some(ptr)
}

/// Drop the value in place, zero its bytes, and free the slot.
///
/// # Safety
///
/// `ptr` must have been returned by [`alloc_value`] and not freed since.
pub unsafe fn free_value<T>(ptr: NonNull<T>) {
    ptr::drop_in_place(ptr.as_ptr());
    // `free` zeroes the body bytes before handing the slot back.
    free(ptr.as_ptr() as *mut u8);
}

/// Allocate a contiguous array of `len` default-constructed `T`s.
///
/// Returns `None` when the system is not live or the arena is exhausted.
///
/// # Panics
///
/// Panics if the buffer would span zero bytes.
pub fn alloc_buffer<T: Default>(len: usize) -> Option<NonNull<T>> {
    assert!(
        len * mem::size_of::<T>() > 0,
        "buffer must span at least one byte"
    );

    let handle = allocate_aligned(
        len * mem::size_of::<T>(),
        mem::align_of::<T>().max(PLATFORM_ALIGNMENT),
    );
    let ptr = NonNull::new(handle.ptr as *mut T)?;
    for index in 0..len {
        unsafe { ptr.as_ptr().add(index).write(T::default()) };
    }
    Some(ptr)
}

/// Drop `len` elements in place, zero the buffer, and free the slot.
///
/// # Safety
///
/// `ptr` and `len` must match a buffer returned by [`alloc_buffer`] that has
/// not been freed since.
pub unsafe fn free_buffer<T>(ptr: NonNull<T>, len: usize) {
    for index in 0..len {
        ptr::drop_in_place(ptr.as_ptr().add(index));
    }
    free(ptr.as_ptr() as *mut u8);
}

/// Byte-granular escape hatch: allocate `size` bytes at platform alignment.
///
/// # Panics
///
/// Panics if `size` is zero.
pub fn alloc_unsafe(size: usize) -> UnsafeHandle {
    assert!(size > 0, "allocation size must be greater than 0 bytes");
    allocate(size)
}

/// Release a handle obtained from [`alloc_unsafe`].
///
/// # Safety
///
/// `handle` must be live and must not be used afterwards.
///
/// # Panics
///
/// Panics on the null handle.
pub unsafe fn free_unsafe(handle: UnsafeHandle) {
    assert!(!handle.is_null(), "handle pointer must not be null");
    free(handle.ptr);
}

// ---------------------------------------------------------------------------
// Byte primitives
// ---------------------------------------------------------------------------

/// Copy `count` bytes between non-overlapping regions.
///
/// # Safety
///
/// Both regions must be valid for `count` bytes and must not overlap.
pub unsafe fn memory_copy(destination: *mut u8, source: *const u8, count: usize) {
    ptr::copy_nonoverlapping(source, destination, count);
}

/// Copy `count` bytes between possibly overlapping regions.
///
/// # Safety
///
/// Both regions must be valid for `count` bytes.
pub unsafe fn memory_move(destination: *mut u8, source: *const u8, count: usize) {
    ptr::copy(source, destination, count);
}

/// Zero `count` bytes.
///
/// # Safety
///
/// The region must be valid for `count` bytes of writes.
pub unsafe fn memory_clear(block: *mut u8, count: usize) {
    ptr::write_bytes(block, 0, count);
}

// ---------------------------------------------------------------------------
// Footprint sweep
// ---------------------------------------------------------------------------

/// Resolve a collection's `(debug name, pointer)` pairs into filled
/// footprint reports.
///
/// Returns an empty list when the system is not live. Null pointers in the
/// debug handles are skipped.
///
/// # Safety
///
/// Every non-null pointer the callback yields must be a live allocation made
/// through this system.
pub unsafe fn check_memory_footprint<F>(debug_handles: F) -> Vec<MemoryFootprint>
where
    F: FnOnce() -> Vec<MemoryDebugHandle>,
{
    let handles = debug_handles();

    SYSTEM.with(|system| {
        let slot = system.borrow();
        let Some(live) = slot.as_ref() else {
            return Vec::new();
        };

        handles
            .iter()
            .filter_map(|handle| {
                let ptr = NonNull::new(handle.pointer as *mut u8)?;
                Some(MemoryFootprint {
                    name: handle.name,
                    block: live.allocator.footprint(ptr),
                })
            })
            .collect()
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
