//! The small-block engine: pages hosting many equal-sized blocks.
//!
//! Built against arena byte offsets instead of raw pointers, in the style
//! of a free-list queue: small, single-purpose functions chained
//! together, each recomputing the page's free-list summary rather than
//! maintaining it incrementally.

use crate::config::PG_SIZE;
use crate::header::{BlockHeader, HDR};
use crate::page::PageState;

fn step(size_class: usize) -> usize {
    HDR + size_class
}

/// Offsets, relative to the start of a page, of each header slot on a
/// multi-block page of `size_class`: tiles the page without overlap or
/// gap until the next header would exceed the boundary.
pub(crate) fn offsets(size_class: usize) -> impl Iterator<Item = usize> {
    let s = step(size_class);
    (0..).map(move |i| i * s).take_while(move |&off| off + s <= PG_SIZE)
}

/// Total number of block slots a page of `size_class` holds.
fn total_blocks(size_class: usize) -> usize {
    offsets(size_class).count()
}

/// First page in index order that is `MultiBlk` of `size_class` with a
/// free slot.
pub(crate) fn find_page_with_class(pages: &[PageState], size_class: usize) -> Option<usize> {
    pages.iter().position(|p| match p {
        PageState::MultiBlk { size_class: sc, free_count, .. } => {
            *sc == size_class && *free_count > 0
        }
        _ => false,
    })
}

/// Lowest-indexed `Free` page.
pub(crate) fn find_free_page(pages: &[PageState]) -> Option<usize> {
    pages.iter().position(PageState::is_free)
}

/// Recompute `first_free_block`/`free_count` by walking the chain.
fn refresh(bytes: &[u8], page_idx: usize, size_class: usize) -> (Option<usize>, usize) {
    let base = page_idx * PG_SIZE;
    let mut first_free = None;
    let mut free_count = 0;
    for off in offsets(size_class) {
        let header = BlockHeader::read_at(bytes, base + off);
        if !header.busy {
            free_count += 1;
            if first_free.is_none() {
                first_free = Some(off);
            }
        }
    }
    (first_free, free_count)
}

/// Initialize `page_idx` (assumed `Free`) as a multi-block page of
/// `size_class`: tile it with not-busy headers and compute the resulting
/// state.
pub(crate) fn init_multiblk(bytes: &mut [u8], page_idx: usize, size_class: usize) -> PageState {
    let base = page_idx * PG_SIZE;
    for off in offsets(size_class) {
        BlockHeader { payload_size: size_class, busy: false }.write_at(bytes, base + off);
    }
    let (first_free_block, free_count) = refresh(bytes, page_idx, size_class);
    PageState::MultiBlk { size_class, first_free_block, free_count }
}

/// Allocate the page's `first_free_block`. The page must be `MultiBlk`
/// with `free_count > 0`.
///
/// Returns the header's absolute arena offset and the page's new state.
pub(crate) fn alloc_in_page(bytes: &mut [u8], page_idx: usize, state: PageState) -> (usize, PageState) {
    let (size_class, first_free_block, free_count) = state
        .as_multiblk()
        .expect("alloc_in_page called on a non-MultiBlk page");
    debug_assert!(free_count > 0, "alloc_in_page called with free_count == 0");
    let rel = first_free_block.expect("free_count > 0 implies first_free_block is Some");
    let base = page_idx * PG_SIZE;
    let abs = base + rel;

    let mut header = BlockHeader::read_at(bytes, abs);
    assert!(!header.busy, "internal invariant violated: first_free_block pointed at a busy header");
    header.busy = true;
    header.write_at(bytes, abs);

    let (new_first, new_count) = refresh(bytes, page_idx, size_class);
    (abs, PageState::MultiBlk { size_class, first_free_block: new_first, free_count: new_count })
}

/// Free the block at absolute offset `header_offset` on `page_idx`.
/// Returns the page's new state, `Free` if this released the last block
/// on the page.
pub(crate) fn free_in_page(bytes: &mut [u8], page_idx: usize, header_offset: usize, state: PageState) -> PageState {
    let (size_class, _, _) = state.as_multiblk().expect("free_in_page called on a non-MultiBlk page");

    let mut header = BlockHeader::read_at(bytes, header_offset);
    header.busy = false;
    header.write_at(bytes, header_offset);

    let (new_first, new_count) = refresh(bytes, page_idx, size_class);
    if new_count == total_blocks(size_class) {
        PageState::Free
    } else {
        PageState::MultiBlk { size_class, first_free_block: new_first, free_count: new_count }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_tile_the_page_without_overlap() {
        let offs: Vec<usize> = offsets(128).collect();
        // PG_SIZE = 1024, HDR = 16, size_class = 128 -> step = 144.
        // floor(1024 / 144) = 7 blocks fit.
        assert_eq!(offs.len(), 7);
        for w in offs.windows(2) {
            assert_eq!(w[1] - w[0], HDR + 128);
        }
        let last = *offs.last().unwrap();
        assert!(last + HDR + 128 <= PG_SIZE);
    }

    #[test]
    fn init_then_alloc_then_free_restores_free_page() {
        let mut bytes = [0u8; PG_SIZE];
        let mut state = init_multiblk(&mut bytes, 0, 128);
        assert_eq!(state.as_multiblk().unwrap().2, 7);

        let (header_offset, new_state) = alloc_in_page(&mut bytes, 0, state);
        state = new_state;
        assert_eq!(state.as_multiblk().unwrap().2, 6);
        assert_eq!(header_offset, 0);

        state = free_in_page(&mut bytes, 0, header_offset, state);
        assert!(state.is_free());
    }

    #[test]
    fn fills_seven_blocks_then_freeing_middle_updates_first_free() {
        let mut bytes = [0u8; PG_SIZE];
        let mut state = init_multiblk(&mut bytes, 0, 128);
        let mut offsets_allocated = Vec::new();
        for _ in 0..7 {
            let (off, s) = alloc_in_page(&mut bytes, 0, state);
            offsets_allocated.push(off);
            state = s;
        }
        assert_eq!(state.as_multiblk().unwrap().2, 0);
        assert!(state.as_multiblk().unwrap().1.is_none());

        // free blocks at index 3, 4, 5
        for &idx in &[3usize, 4, 5] {
            state = free_in_page(&mut bytes, 0, offsets_allocated[idx], state);
        }
        let (_, first_free, free_count) = state.as_multiblk().unwrap();
        assert_eq!(free_count, 3);
        assert_eq!(first_free, Some(offsets_allocated[3]));
    }
}
