//! Compile-time tuning parameters.
//!
//! Mirrors the "settings" block at the top of the original C allocator
//! (`PG_SIZE`, `PG_AMOUNT`, `ALIGNMENT`): edit the constants below to retune
//! the arena, everything downstream is derived and checked at compile time.

use static_assertions::const_assert;

/// Bytes per page. Must be a power of two.
pub(crate) const PG_SIZE: usize = 1024;

/// Number of pages in the arena.
pub(crate) const PG_AMOUNT: usize = 8;

/// Decision boundary between small (multi-block) and large (single-block)
/// placements.
pub(crate) const PG_HALF_SIZE: usize = PG_SIZE / 2;

/// Alignment used for the first size class and for rounding up the header
/// size. Must be a power of two.
pub(crate) const ALIGNMENT: usize = 16;

/// Total arena size in bytes.
pub(crate) const ARENA_SIZE: usize = PG_AMOUNT * PG_SIZE;

const_assert!(PG_SIZE.is_power_of_two());
const_assert!(ALIGNMENT.is_power_of_two());
const_assert!(PG_HALF_SIZE * 2 == PG_SIZE);
const_assert!(PG_AMOUNT > 0);

/// Round `size` up to the next multiple of `align` (`align` a power of two).
pub(crate) const fn align_up(size: usize, align: usize) -> usize {
    (size + align - 1) & !(align - 1)
}

const_assert!(ALIGNMENT >= core::mem::size_of::<usize>());
