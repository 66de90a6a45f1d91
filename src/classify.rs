//! The classifier: maps a requested byte count to a page-placement
//! decision.
//!
//! mimalloc's size-class lookup (`_bin`) serves the same role as
//! `small_class` here, just over a much richer table of classes than a
//! fixed 8-page arena needs.

use crate::config::{PG_HALF_SIZE, PG_SIZE};
use crate::header::HDR;

/// A placement decision: either a size class on a single multi-block page,
/// or a run of contiguous pages for one large block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Placement {
    Small { size_class: usize },
    Large { pg_run_length: usize },
}

/// Classify a requested allocation size. Always succeeds — whether the
/// placement can actually be satisfied is up to the small/large engines.
pub(crate) fn classify(sz: usize) -> Placement {
    if sz < PG_HALF_SIZE {
        Placement::Small { size_class: small_class(sz) }
    } else {
        Placement::Large { pg_run_length: run_length(sz) }
    }
}

/// Smallest power-of-two size class, starting at `ALIGNMENT`, that fits
/// `sz`. `sz == 0` yields the smallest class.
fn small_class(sz: usize) -> usize {
    use crate::config::ALIGNMENT;
    let mut c = ALIGNMENT;
    while c < sz {
        c <<= 1;
    }
    c
}

/// Number of contiguous pages needed to host a header plus `sz` payload
/// bytes.
fn run_length(sz: usize) -> usize {
    (sz + HDR + PG_SIZE - 1) / PG_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ALIGNMENT;

    #[test]
    fn zero_byte_alloc_is_smallest_class() {
        assert_eq!(classify(0), Placement::Small { size_class: ALIGNMENT });
    }

    #[test]
    fn classes_double_from_alignment() {
        assert_eq!(classify(1), Placement::Small { size_class: 16 });
        assert_eq!(classify(16), Placement::Small { size_class: 16 });
        assert_eq!(classify(17), Placement::Small { size_class: 32 });
        assert_eq!(classify(128), Placement::Small { size_class: 128 });
        assert_eq!(classify(129), Placement::Small { size_class: 256 });
    }

    #[test]
    fn boundary_half_page_minus_one_is_small() {
        // A request of PG_HALF_SIZE - 1 = 511 bytes is still multi-block,
        // landing in the highest class a small request can ever reach
        // (512 == PG_HALF_SIZE itself).
        assert_eq!(classify(PG_HALF_SIZE - 1), Placement::Small { size_class: 512 });
    }

    #[test]
    fn boundary_exactly_half_page_is_large() {
        // Exactly PG_HALF_SIZE is single-block.
        match classify(PG_HALF_SIZE) {
            Placement::Large { pg_run_length } => assert_eq!(pg_run_length, 1),
            other => panic!("expected Large, got {:?}", other),
        }
    }

    #[test]
    fn large_run_length_rounds_up() {
        // 700 bytes + 16-byte header = 716, fits in 1 page of 1024.
        assert_eq!(classify(700), Placement::Large { pg_run_length: 1 });
        // 1200 + 16 = 1216, needs 2 pages of 1024.
        assert_eq!(classify(1200), Placement::Large { pg_run_length: 2 });
    }
}
