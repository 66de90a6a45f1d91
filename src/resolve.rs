//! The address resolver: recovers the owning page and block header for an
//! arbitrary arena offset. Underpins `free` and `realloc`.
//!
//! Plays the same role as a pointer-to-segment/page chain
//! (`_ptr_segment`/`_segment_page_of`/`_ptr_page`): the page index is
//! always `offset / PG_SIZE`, never `offset / PG_SIZE - 1` — an
//! off-by-one that shows up in some C allocators of this shape.

use crate::config::{ARENA_SIZE, PG_SIZE};
use crate::error::ResolveError;
use crate::header::BlockHeader;
use crate::page::PageState;
use crate::small;

/// Owning page index for an arena-relative byte offset, or `None` if the
/// offset falls outside the arena entirely.
pub(crate) fn page_of_offset(offset: usize) -> Option<usize> {
    if offset >= ARENA_SIZE {
        None
    } else {
        Some(offset / PG_SIZE)
    }
}

/// Walk leftward from `page_idx` until a non-`SIntermediate` page is
/// found — that page is the head of the large run. Returns `page_idx`
/// itself if it isn't interior.
fn head_of(pages: &[PageState], page_idx: usize) -> Option<usize> {
    let mut i = page_idx;
    loop {
        match pages[i] {
            PageState::SIntermediate => {
                if i == 0 {
                    return None;
                }
                i -= 1;
            }
            _ => return Some(i),
        }
    }
}

/// Resolve an arena-relative offset to the `(page_idx, header_offset)`
/// pair owning it. Rejects a match whose header is not busy with
/// `AlreadyFree` rather than handing back a free block as if it were
/// live.
pub(crate) fn resolve(bytes: &[u8], pages: &[PageState], offset: usize) -> Result<(usize, usize), ResolveError> {
    let page_idx = page_of_offset(offset).ok_or(ResolveError::NotOwned)?;

    let (owner, header_offset) = match pages[page_idx] {
        PageState::MultiBlk { size_class, .. } => {
            let base = page_idx * PG_SIZE;
            small::offsets(size_class)
                .find_map(|off| {
                    let header = BlockHeader::read_at(bytes, base + off);
                    if header.span(base + off).contains(&offset) {
                        Some((page_idx, base + off))
                    } else {
                        None
                    }
                })
                .ok_or(ResolveError::NotFound)?
        }
        PageState::SingleBlk { .. } => (page_idx, page_idx * PG_SIZE),
        PageState::SIntermediate => {
            let head = head_of(pages, page_idx).ok_or(ResolveError::NotFound)?;
            match pages[head] {
                PageState::SingleBlk { .. } => (head, head * PG_SIZE),
                _ => return Err(ResolveError::NotFound),
            }
        }
        PageState::Free => return Err(ResolveError::NotFound),
    };

    if BlockHeader::read_at(bytes, header_offset).busy {
        Ok((owner, header_offset))
    } else {
        Err(ResolveError::AlreadyFree)
    }
}
