//! Per-block diagnostic records reported by the allocator.

/// The footprint of a single live allocation, as recovered from its header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockFootprint {
    /// Total slot bytes: pre-padding + header + body + any absorbed
    /// remainder.
    pub size: usize,
    /// Byte offset of the user pointer from the arena base.
    pub offset: usize,
    /// Bytes between the slot's natural start and the header. Zero when the
    /// slot begins on a platform-aligned boundary.
    pub padding: usize,
    /// The alignment honoured for this allocation.
    pub alignment: usize,
}

/// A `(debug name, pointer)` pair supplied by a collection when the memory
/// system sweeps footprints for diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct MemoryDebugHandle {
    /// Human-readable owner label, e.g. `"archetype column"`.
    pub name: &'static str,
    /// The live allocation to report on.
    pub pointer: *const u8,
}

/// A filled diagnostic record: the caller's debug handle plus the block data
/// the allocator recovered for it.
#[derive(Debug, Clone, Copy)]
pub struct MemoryFootprint {
    /// Owner label carried over from the [`MemoryDebugHandle`].
    pub name: &'static str,
    /// The block-level footprint.
    pub block: BlockFootprint,
}
