//! Free-list allocator over a fixed arena.
//!
//! The allocator keeps an intrusive, address-ordered singly linked list of
//! free regions whose nodes live *inside* the arena itself. Every live
//! allocation is preceded by an [`AllocationHeader`] recording the slot's
//! total footprint, the padding in front of the header, and the alignment
//! that was honoured, which is all `free` and `footprint` need to recover
//! the original region.
//!
//! # Safety
//!
//! This module manipulates raw pointers into the arena. The invariants are:
//! free nodes are strictly address-ordered and never physically adjacent
//! (adjacent regions are coalesced on free), every node lies inside
//! `[base, base + total)`, and headers are only read for pointers previously
//! returned by [`FreeListAllocator::allocate`] and not yet freed. The
//! allocator owns the node graph outright; nodes never outlive the arena.

use std::mem;
use std::ptr::{self, NonNull};

use crate::footprint::BlockFootprint;
use crate::{aligned_size, PLATFORM_ALIGNMENT};

// ---------------------------------------------------------------------------
// AllocationPolicy
// ---------------------------------------------------------------------------

/// Placement policy used when scanning the free list for a candidate region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationPolicy {
    /// Take the first (lowest-address) region that fits.
    FirstFit,
    /// Take the region with the smallest non-negative slack; an exact fit
    /// short-circuits the scan.
    BestFit,
    /// Reserved for a future tree-backed free store. Selecting it is an
    /// error; there is no silent fallback.
    RedBlackTree,
}

// ---------------------------------------------------------------------------
// In-arena structures
// ---------------------------------------------------------------------------

/// A free region. Lives in-place at the start of the region it describes.
#[repr(C)]
struct FreeNode {
    /// Bytes covered by this region, including the node itself.
    size: usize,
    /// Next node in address order, or null.
    next: *mut FreeNode,
}

/// Metadata preceding every live allocation, at `user_ptr - header_size()`.
#[repr(C)]
struct AllocationHeader {
    /// Total slot footprint: pre-padding + header + body + any absorbed
    /// remainder.
    size: usize,
    /// Bytes between the slot's natural start and this header.
    padding: u32,
    /// The alignment honoured for the user pointer.
    alignment: u32,
}

/// A `(offset, size)` snapshot of one free region, for tests and
/// diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeRegion {
    /// Byte offset of the region from the arena base.
    pub offset: usize,
    /// Bytes covered by the region.
    pub size: usize,
}

/// A candidate produced by a placement scan.
struct Fit {
    node: *mut FreeNode,
    prev: *mut FreeNode,
    padding: usize,
}

// ---------------------------------------------------------------------------
// FreeListAllocator
// ---------------------------------------------------------------------------

/// Serves aligned byte allocations out of a single fixed arena.
///
/// One instance exists per memory system. Operations are O(live regions)
/// worst case. The allocator does not own the arena bytes; the caller must
/// keep the backing region alive for the allocator's lifetime.
pub struct FreeListAllocator {
    base: NonNull<u8>,
    total: usize,
    used: usize,
    head: *mut FreeNode,
    default_alignment: usize,
    policy: AllocationPolicy,
}

impl FreeListAllocator {
    /// Install an allocator over `[base, base + size)` with a single free
    /// node covering the whole region.
    ///
    /// # Panics
    ///
    /// Panics if `size` cannot hold a free node, if `base` or
    /// `default_alignment` are not platform-aligned powers of two, or if
    /// `policy` is [`AllocationPolicy::RedBlackTree`] (reserved,
    /// unimplemented).
    pub fn new(
        base: NonNull<u8>,
        size: usize,
        default_alignment: usize,
        policy: AllocationPolicy,
    ) -> Self {
        assert!(
            size >= mem::size_of::<FreeNode>(),
            "arena of {size} bytes cannot hold a free-list node"
        );
        assert_eq!(
            base.as_ptr() as usize % PLATFORM_ALIGNMENT,
            0,
            "arena base must be platform-aligned"
        );
        assert!(
            default_alignment.is_power_of_two(),
            "default alignment must be a power of two"
        );
        if policy == AllocationPolicy::RedBlackTree {
            tracing::error!("the RedBlackTree policy is reserved and has no implementation");
            panic!("unimplemented allocation policy: RedBlackTree");
        }

        let mut allocator = Self {
            base,
            total: size,
            used: 0,
            head: ptr::null_mut(),
            default_alignment,
            policy,
        };
        allocator.clear();
        allocator
    }

    /// The per-allocation header footprint: the header struct rounded up to
    /// platform alignment, which is the fixed distance between a user
    /// pointer and its header.
    #[inline]
    pub const fn header_size() -> usize {
        aligned_size(mem::size_of::<AllocationHeader>())
    }

    /// Bytes currently allocated, including headers and padding.
    #[inline]
    pub fn used(&self) -> usize {
        self.used
    }

    /// Bytes currently free.
    #[inline]
    pub fn free_bytes(&self) -> usize {
        self.total - self.used
    }

    /// Total arena bytes managed by this allocator.
    #[inline]
    pub fn total(&self) -> usize {
        self.total
    }

    /// The placement policy chosen at construction.
    #[inline]
    pub fn policy(&self) -> AllocationPolicy {
        self.policy
    }

    /// The alignment used when callers do not request a stricter one.
    #[inline]
    pub fn default_alignment(&self) -> usize {
        self.default_alignment
    }

    /// Reset to the initial state: zero bytes used, one free node covering
    /// the whole arena. Any outstanding allocations are forgotten.
    pub fn clear(&mut self) {
        let first = self.base.as_ptr() as *mut FreeNode;
        unsafe {
            (*first).size = self.total;
            (*first).next = ptr::null_mut();
        }
        self.head = first;
        self.used = 0;
    }

    // -- allocation ---------------------------------------------------------

    /// Allocate `size` bytes using the allocator's default alignment.
    pub fn allocate_default(&mut self, size: usize) -> Option<NonNull<u8>> {
        self.allocate(size, self.default_alignment)
    }

    /// Allocate `size` bytes whose returned pointer is `alignment`-aligned.
    ///
    /// `size` is rounded up to platform alignment so that free-list nodes
    /// rebuilt over the slot (and any split tail) stay aligned.
    ///
    /// Returns `None` when no free region can hold the request; the arena is
    /// left untouched in that case.
    ///
    /// # Panics
    ///
    /// Panics if `alignment` is not a power of two.
    pub fn allocate(&mut self, size: usize, alignment: usize) -> Option<NonNull<u8>> {
        assert!(
            alignment.is_power_of_two(),
            "allocation alignment must be a power of two"
        );
        if size < mem::size_of::<FreeNode>() {
            tracing::warn!(
                size,
                node_size = mem::size_of::<FreeNode>(),
                "allocation is smaller than a free-list node; consider a different allocator"
            );
        }
        let size = aligned_size(size);

        let fit = unsafe {
            match self.policy {
                AllocationPolicy::FirstFit => self.find_first_fit(size, alignment),
                AllocationPolicy::BestFit => self.find_best_fit(size, alignment),
                AllocationPolicy::RedBlackTree => unreachable!("rejected at construction"),
            }
        };
        let Some(fit) = fit else {
            tracing::error!(size, alignment, "free list has no region large enough");
            return None;
        };

        unsafe {
            let node_addr = fit.node as usize;
            let node_size = (*fit.node).size;
            let node_next = (*fit.node).next;
            let required = size + fit.padding;

            let remainder = node_size - required;
            let footprint = if remainder > mem::size_of::<FreeNode>() {
                // Split: the tail of the region becomes a new free node,
                // chained in place of the consumed one.
                let tail = (node_addr + required) as *mut FreeNode;
                (*tail).size = remainder;
                (*tail).next = node_next;
                self.replace_node(fit.prev, tail);
                required
            } else {
                // Too small to host a node: absorb the remainder into the
                // slot so a later free reclaims it.
                self.replace_node(fit.prev, node_next);
                node_size
            };

            let header = (node_addr + fit.padding - Self::header_size()) as *mut AllocationHeader;
            (*header).size = footprint;
            (*header).padding = (fit.padding - Self::header_size()) as u32;
            (*header).alignment = alignment as u32;

            self.used += footprint;

            NonNull::new((node_addr + fit.padding) as *mut u8)
        }
    }

    /// Return the allocation at `ptr` to the free list, coalescing with any
    /// physically adjacent free regions.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by [`allocate`](Self::allocate) on this
    /// allocator and not freed since.
    pub unsafe fn free(&mut self, ptr: NonNull<u8>) {
        let header = (ptr.as_ptr() as usize - Self::header_size()) as *const AllocationHeader;
        let footprint = (*header).size;
        let padding = (*header).padding as usize;

        // The slot's natural start is where the free node goes; it covers
        // the entire footprint the allocation consumed.
        let node = (ptr.as_ptr() as usize - Self::header_size() - padding) as *mut FreeNode;
        (*node).size = footprint;

        let mut prev: *mut FreeNode = ptr::null_mut();
        let mut current = self.head;
        while !current.is_null() && (current as usize) < (node as usize) {
            prev = current;
            current = (*current).next;
        }
        (*node).next = current;
        if prev.is_null() {
            self.head = node;
        } else {
            (*prev).next = node;
        }

        self.used -= footprint;

        self.merge(node, prev);
    }

    /// Read back the footprint of the live allocation at `ptr`.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by [`allocate`](Self::allocate) on this
    /// allocator and not freed since.
    pub unsafe fn footprint(&self, ptr: NonNull<u8>) -> BlockFootprint {
        let header = (ptr.as_ptr() as usize - Self::header_size()) as *const AllocationHeader;
        BlockFootprint {
            size: (*header).size,
            offset: ptr.as_ptr() as usize - self.base.as_ptr() as usize,
            padding: (*header).padding as usize,
            alignment: (*header).alignment as usize,
        }
    }

    /// Snapshot the free list as `(offset, size)` regions in address order.
    pub fn free_regions(&self) -> Vec<FreeRegion> {
        let base = self.base.as_ptr() as usize;
        let mut regions = Vec::new();
        let mut current = self.head;
        while !current.is_null() {
            unsafe {
                regions.push(FreeRegion {
                    offset: current as usize - base,
                    size: (*current).size,
                });
                current = (*current).next;
            }
        }
        regions
    }

    // -- placement scans ----------------------------------------------------

    /// Padding that makes `address + padding` meet `alignment` while leaving
    /// at least a header's worth of bytes in front of the user pointer.
    fn alignment_padding(address: usize, alignment: usize) -> usize {
        let modulo = address & (alignment - 1);
        let mut padding = if modulo == 0 { 0 } else { alignment - modulo };

        if padding < Self::header_size() {
            let shortfall = Self::header_size() - padding;
            padding += alignment * shortfall.div_ceil(alignment);
        }

        padding
    }

    unsafe fn find_first_fit(&self, size: usize, alignment: usize) -> Option<Fit> {
        let mut prev: *mut FreeNode = ptr::null_mut();
        let mut current = self.head;

        while !current.is_null() {
            let padding = Self::alignment_padding(current as usize, alignment);
            if (*current).size >= size + padding {
                return Some(Fit {
                    node: current,
                    prev,
                    padding,
                });
            }
            prev = current;
            current = (*current).next;
        }

        None
    }

    unsafe fn find_best_fit(&self, size: usize, alignment: usize) -> Option<Fit> {
        let mut best: Option<Fit> = None;
        let mut best_slack = usize::MAX;

        let mut prev: *mut FreeNode = ptr::null_mut();
        let mut current = self.head;

        while !current.is_null() {
            let padding = Self::alignment_padding(current as usize, alignment);
            let required = size + padding;

            if (*current).size >= required {
                let slack = (*current).size - required;
                if slack == 0 {
                    return Some(Fit {
                        node: current,
                        prev,
                        padding,
                    });
                }
                if slack < best_slack {
                    best_slack = slack;
                    best = Some(Fit {
                        node: current,
                        prev,
                        padding,
                    });
                }
            }

            prev = current;
            current = (*current).next;
        }

        best
    }

    // -- list surgery -------------------------------------------------------

    /// Replace the successor of `prev` (the list head when `prev` is null)
    /// with `node`.
    unsafe fn replace_node(&mut self, prev: *mut FreeNode, node: *mut FreeNode) {
        if prev.is_null() {
            self.head = node;
        } else {
            (*prev).next = node;
        }
    }

    /// Coalesce `node` with its successor, then `prev` with `node`, wherever
    /// the regions are physically contiguous.
    unsafe fn merge(&mut self, node: *mut FreeNode, prev: *mut FreeNode) {
        let next = (*node).next;
        if !next.is_null() && node as usize + (*node).size == next as usize {
            (*node).size += (*next).size;
            (*node).next = (*next).next;
        }

        if !prev.is_null() && prev as usize + (*prev).size == node as usize {
            (*prev).size += (*node).size;
            (*prev).next = (*node).next;
        }
    }
}

impl std::fmt::Debug for FreeListAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FreeListAllocator")
            .field("total", &self.total)
            .field("used", &self.used)
            .field("policy", &self.policy)
            .field("free_regions", &self.free_regions().len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Arena;

    const KIB: usize = 1024;

    fn setup(size: usize, policy: AllocationPolicy) -> (Arena, FreeListAllocator) {
        let arena = Arena::new(size);
        let allocator = FreeListAllocator::new(arena.base(), size, PLATFORM_ALIGNMENT, policy);
        (arena, allocator)
    }

    #[test]
    fn initialisation_installs_a_single_spanning_node() {
        let (_arena, allocator) = setup(KIB, AllocationPolicy::FirstFit);

        assert_eq!(allocator.total(), KIB);
        assert_eq!(allocator.used(), 0);
        assert_eq!(allocator.free_bytes(), KIB);
        assert_eq!(allocator.policy(), AllocationPolicy::FirstFit);
        assert_eq!(
            allocator.free_regions(),
            vec![FreeRegion {
                offset: 0,
                size: KIB
            }]
        );
    }

    #[test]
    #[should_panic(expected = "unimplemented allocation policy")]
    fn red_black_tree_policy_is_rejected() {
        let arena = Arena::new(KIB);
        let _ = FreeListAllocator::new(
            arena.base(),
            KIB,
            PLATFORM_ALIGNMENT,
            AllocationPolicy::RedBlackTree,
        );
    }

    #[test]
    #[should_panic(expected = "power of two")]
    fn non_power_of_two_alignment_is_rejected() {
        let (_arena, mut allocator) = setup(KIB, AllocationPolicy::FirstFit);
        let _ = allocator.allocate(64, 3);
    }

    #[test]
    fn allocate_first_fit_accounts_for_headers() {
        let (_arena, mut allocator) = setup(KIB, AllocationPolicy::FirstFit);
        let header = FreeListAllocator::header_size();

        let a1 = allocator.allocate(64, 4).unwrap();
        assert_eq!(allocator.used(), 64 + header);

        let a2 = allocator.allocate(32, 4).unwrap();
        assert_eq!(allocator.used(), 64 + header + 32 + header);
        assert!(a2.as_ptr() as usize > a1.as_ptr() as usize);

        // Both came off the front of the single free node.
        assert_eq!(allocator.free_regions().len(), 1);
    }

    #[test]
    fn free_single_allocation_restores_initial_state() {
        let (_arena, mut allocator) = setup(KIB, AllocationPolicy::FirstFit);
        let header = FreeListAllocator::header_size();

        let a1 = allocator.allocate(64, 4).unwrap();
        assert_eq!(allocator.used(), 64 + header);

        unsafe { allocator.free(a1) };
        assert_eq!(allocator.used(), 0);
        assert_eq!(
            allocator.free_regions(),
            vec![FreeRegion {
                offset: 0,
                size: KIB
            }]
        );
    }

    #[test]
    fn free_allocation_when_others_present_leaves_a_hole() {
        let (_arena, mut allocator) = setup(KIB, AllocationPolicy::FirstFit);
        let header = FreeListAllocator::header_size();

        let a1 = allocator.allocate(64, 4).unwrap();
        let _a2 = allocator.allocate(32, 4).unwrap();

        unsafe { allocator.free(a1) };
        assert_eq!(allocator.used(), 32 + header);
        assert_eq!(allocator.free_regions().len(), 2);
    }

    #[test]
    fn free_multiple_allocations_coalesces_back_to_one_node() {
        let (_arena, mut allocator) = setup(KIB, AllocationPolicy::FirstFit);
        let header = FreeListAllocator::header_size();

        let a1 = allocator.allocate(64, 4).unwrap();
        let a2 = allocator.allocate(32, 4).unwrap();

        unsafe { allocator.free(a1) };
        assert_eq!(allocator.used(), 32 + header);
        assert_eq!(allocator.free_regions().len(), 2);

        unsafe { allocator.free(a2) };
        assert_eq!(allocator.used(), 0);
        assert_eq!(
            allocator.free_regions(),
            vec![FreeRegion {
                offset: 0,
                size: KIB
            }]
        );
    }

    #[test]
    fn first_fit_reuses_the_lowest_address_hole() {
        let (_arena, mut allocator) = setup(KIB, AllocationPolicy::FirstFit);

        let a1 = allocator.allocate(64, PLATFORM_ALIGNMENT).unwrap();
        let _a2 = allocator.allocate(32, PLATFORM_ALIGNMENT).unwrap();

        unsafe { allocator.free(a1) };

        // 48 + header fits in the 64 + header hole left by `a1`.
        let a3 = allocator.allocate(48, PLATFORM_ALIGNMENT).unwrap();
        assert_eq!(a3, a1);
    }

    #[test]
    fn best_fit_picks_the_smallest_viable_hole() {
        let (_arena, mut allocator) = setup(KIB, AllocationPolicy::BestFit);

        let a = allocator.allocate(128, PLATFORM_ALIGNMENT).unwrap();
        let _b = allocator.allocate(32, PLATFORM_ALIGNMENT).unwrap();
        let c = allocator.allocate(64, PLATFORM_ALIGNMENT).unwrap();
        let _d = allocator.allocate(32, PLATFORM_ALIGNMENT).unwrap();

        // Two holes: 144 bytes at the front, 80 bytes where `c` was.
        unsafe { allocator.free(a) };
        unsafe { allocator.free(c) };
        assert_eq!(allocator.free_regions().len(), 3);

        // 48 + header = 64 required; the 80-byte hole has the least slack.
        let e = allocator.allocate(48, PLATFORM_ALIGNMENT).unwrap();
        assert_eq!(e, c);
    }

    #[test]
    fn best_fit_short_circuits_on_an_exact_fit() {
        let (_arena, mut allocator) = setup(KIB, AllocationPolicy::BestFit);

        let a = allocator.allocate(128, PLATFORM_ALIGNMENT).unwrap();
        let _b = allocator.allocate(32, PLATFORM_ALIGNMENT).unwrap();
        let c = allocator.allocate(64, PLATFORM_ALIGNMENT).unwrap();
        let _d = allocator.allocate(32, PLATFORM_ALIGNMENT).unwrap();

        unsafe { allocator.free(a) };
        unsafe { allocator.free(c) };

        // 64 + header exactly matches the hole left by `c`, even though the
        // larger front hole comes first in the list.
        let e = allocator.allocate(64, PLATFORM_ALIGNMENT).unwrap();
        assert_eq!(e, c);
    }

    #[test]
    fn exhaustion_returns_none_and_leaves_state_untouched() {
        let (_arena, mut allocator) = setup(256, AllocationPolicy::FirstFit);

        assert!(allocator.allocate(512, PLATFORM_ALIGNMENT).is_none());
        assert_eq!(allocator.used(), 0);
        assert_eq!(allocator.free_regions().len(), 1);
    }

    #[test]
    fn remainder_too_small_to_split_is_absorbed_and_reclaimed() {
        let (_arena, mut allocator) = setup(144, AllocationPolicy::FirstFit);
        let header = FreeListAllocator::header_size();

        let a = allocator.allocate(64, PLATFORM_ALIGNMENT).unwrap();
        assert_eq!(allocator.used(), 64 + header);

        // 40 + header = 56 required out of the 64-byte tail node; the 8-byte
        // remainder cannot host a node, so the slot absorbs it.
        let b = allocator.allocate(40, PLATFORM_ALIGNMENT).unwrap();
        assert_eq!(allocator.used(), 144);
        assert!(allocator.free_regions().is_empty());

        unsafe { allocator.free(b) };
        assert_eq!(allocator.used(), 64 + header);
        assert_eq!(
            allocator.free_regions(),
            vec![FreeRegion {
                offset: 64 + header,
                size: 64
            }]
        );

        unsafe { allocator.free(a) };
        assert_eq!(allocator.used(), 0);
        assert_eq!(allocator.free_regions().len(), 1);
    }

    #[test]
    fn free_into_an_empty_list_reinstalls_the_head() {
        let (_arena, mut allocator) = setup(128, AllocationPolicy::FirstFit);

        let a = allocator.allocate(64, PLATFORM_ALIGNMENT).unwrap();
        let b = allocator.allocate(32, PLATFORM_ALIGNMENT).unwrap();
        assert_eq!(allocator.used(), 128);
        assert!(allocator.free_regions().is_empty());

        unsafe { allocator.free(a) };
        unsafe { allocator.free(b) };
        assert_eq!(allocator.used(), 0);
        assert_eq!(
            allocator.free_regions(),
            vec![FreeRegion {
                offset: 0,
                size: 128
            }]
        );
    }

    #[test]
    fn stricter_alignments_are_honoured() {
        let (_arena, mut allocator) = setup(KIB, AllocationPolicy::FirstFit);

        let a = allocator.allocate(64, 32).unwrap();
        assert_eq!(a.as_ptr() as usize % 32, 0);

        let b = allocator.allocate(64, 64).unwrap();
        assert_eq!(b.as_ptr() as usize % 64, 0);

        unsafe {
            allocator.free(a);
            allocator.free(b);
        }
        assert_eq!(allocator.used(), 0);
        assert_eq!(allocator.free_regions().len(), 1);
    }

    #[test]
    fn footprint_reports_size_offset_padding_and_alignment() {
        let (_arena, mut allocator) = setup(KIB, AllocationPolicy::FirstFit);
        let header = FreeListAllocator::header_size();

        let a1 = allocator.allocate(64, 4).unwrap();
        let a2 = allocator.allocate(32, 8).unwrap();

        let f1 = unsafe { allocator.footprint(a1) };
        assert_eq!(f1.size, 64 + header);
        assert_eq!(f1.offset, header);
        assert_eq!(f1.padding, 0);
        assert_eq!(f1.alignment, 4);

        let f2 = unsafe { allocator.footprint(a2) };
        assert_eq!(f2.size, 32 + header);
        assert_eq!(f2.offset, 64 + header * 2);
        assert_eq!(f2.padding, 0);
        assert_eq!(f2.alignment, 8);
    }

    #[test]
    fn used_plus_free_always_equals_total() {
        let (_arena, mut allocator) = setup(KIB, AllocationPolicy::FirstFit);

        let mut live = Vec::new();
        for size in [24, 64, 8, 120, 40] {
            live.push(allocator.allocate(size, PLATFORM_ALIGNMENT).unwrap());
            assert_eq!(allocator.used() + allocator.free_bytes(), KIB);
            let free_sum: usize = allocator.free_regions().iter().map(|r| r.size).sum();
            assert_eq!(free_sum, allocator.free_bytes());
        }

        // Free out of order to exercise middle-of-list splices.
        for index in [2, 0, 4, 1, 3] {
            unsafe { allocator.free(live[index]) };
            assert_eq!(allocator.used() + allocator.free_bytes(), KIB);
            let free_sum: usize = allocator.free_regions().iter().map(|r| r.size).sum();
            assert_eq!(free_sum, allocator.free_bytes());
        }

        assert_eq!(allocator.used(), 0);
        assert_eq!(allocator.free_regions().len(), 1);
    }

    #[test]
    fn clear_forgets_outstanding_allocations() {
        let (_arena, mut allocator) = setup(KIB, AllocationPolicy::FirstFit);

        let _ = allocator.allocate(64, PLATFORM_ALIGNMENT).unwrap();
        let _ = allocator.allocate(32, PLATFORM_ALIGNMENT).unwrap();
        assert!(allocator.used() > 0);

        allocator.clear();
        assert_eq!(allocator.used(), 0);
        assert_eq!(
            allocator.free_regions(),
            vec![FreeRegion {
                offset: 0,
                size: KIB
            }]
        );
    }
}
