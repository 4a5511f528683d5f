//! The arena: one contiguous byte region owned for the memory system's
//! entire lifetime.
//!
//! The arena is acquired from the platform once, at [`Arena::new`], and
//! released when the arena is dropped. Nothing else about it ever changes:
//! the [`FreeListAllocator`](crate::FreeListAllocator) carves it up, but the
//! region itself stays fixed.

use std::alloc::{self, Layout};
use std::ptr::NonNull;

use crate::PLATFORM_ALIGNMENT;

/// A fixed, contiguous, platform-aligned byte region.
pub struct Arena {
    ptr: NonNull<u8>,
    layout: Layout,
}

impl Arena {
    /// Acquire a region of `size` bytes from the platform.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero. Aborts via `handle_alloc_error` if the
    /// platform cannot provide the region.
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "arena size must be non-zero");

        let layout =
            Layout::from_size_align(size, PLATFORM_ALIGNMENT).expect("arena layout overflow");
        let raw = unsafe { alloc::alloc(layout) };
        let Some(ptr) = NonNull::new(raw) else {
            alloc::handle_alloc_error(layout);
        };

        Self { ptr, layout }
    }

    /// Base address of the region. Always [`PLATFORM_ALIGNMENT`]-aligned.
    #[inline]
    pub fn base(&self) -> NonNull<u8> {
        self.ptr
    }

    /// Size of the region in bytes. Fixed at construction.
    #[inline]
    pub fn size(&self) -> usize {
        self.layout.size()
    }
}

impl Drop for Arena {
    fn drop(&mut self) {
        unsafe {
            alloc::dealloc(self.ptr.as_ptr(), self.layout);
        }
    }
}

impl std::fmt::Debug for Arena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arena")
            .field("base", &self.ptr)
            .field("size", &self.layout.size())
            .finish()
    }
}
