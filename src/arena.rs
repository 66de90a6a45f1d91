//! `Allocator`: the single owned value that threads the arena and page
//! table through every operation.
//!
//! Some C allocators of this shape keep process-wide state as `static
//! mut` globals guarded by ad hoc initialization checks. `Allocator` is a
//! single owned value instead, to keep reasoning about its state local to
//! wherever it's held; `lib.rs`'s `PageAllocator` wraps exactly one
//! instance of it behind an `UnsafeCell` for `#[global_allocator]` use.

use log::{error, info, warn};

use crate::classify::{classify, Placement};
use crate::config::{ARENA_SIZE, PG_AMOUNT};
use crate::dump;
use crate::error::ResolveError;
use crate::header::{BlockHeader, HDR};
use crate::large;
use crate::page::PageState;
use crate::resolve;
use crate::small;

/// A fixed-capacity allocator over a statically sized arena of
/// `PG_AMOUNT * PG_SIZE` bytes, serviced from `PG_AMOUNT` pages.
///
/// The arena is an inline byte array, not a heap allocation: every
/// pointer handed out by [`Allocator::alloc`] points into `self`. Do not
/// move an `Allocator` while pointers it returned are still live — place
/// it in a `static` (see [`crate::PageAllocator`]) or otherwise pin it in
/// place for the duration of its use.
pub struct Allocator {
    bytes: [u8; ARENA_SIZE],
    pages: [PageState; PG_AMOUNT],
}

impl Allocator {
    /// Construct a fresh allocator with every page `Free`.
    pub const fn new() -> Self {
        Allocator { bytes: [0u8; ARENA_SIZE], pages: [PageState::Free; PG_AMOUNT] }
    }

    /// Reset every page to `Free`. Idempotent.
    pub fn init(&mut self) {
        self.bytes = [0u8; ARENA_SIZE];
        self.pages = [PageState::Free; PG_AMOUNT];
    }

    /// Arena-relative byte offset of `ptr`, or `None` if it does not fall
    /// inside this arena.
    fn offset_of(&self, ptr: *mut u8) -> Option<usize> {
        let base = self.bytes.as_ptr() as usize;
        let p = ptr as usize;
        if p < base {
            return None;
        }
        let offset = p - base;
        if offset >= ARENA_SIZE {
            None
        } else {
            Some(offset)
        }
    }

    /// Raw pointer to arena-relative `offset`.
    fn ptr_at(&mut self, offset: usize) -> *mut u8 {
        // Safety: `offset < ARENA_SIZE` is an invariant of every caller
        // below (checked via `offset_of` or produced by the engines,
        // which never hand back an out-of-bounds offset).
        unsafe { self.bytes.as_mut_ptr().add(offset) }
    }

    /// Allocate `sz` bytes. Returns null if the request cannot be
    /// satisfied.
    pub fn alloc(&mut self, sz: usize) -> *mut u8 {
        match classify(sz) {
            Placement::Small { size_class } => self.alloc_small(size_class),
            Placement::Large { pg_run_length } => self.alloc_large(pg_run_length),
        }
    }

    fn alloc_small(&mut self, size_class: usize) -> *mut u8 {
        let page_idx = match small::find_page_with_class(&self.pages, size_class) {
            Some(idx) => idx,
            None => match small::find_free_page(&self.pages) {
                Some(idx) => {
                    self.pages[idx] = small::init_multiblk(&mut self.bytes, idx, size_class);
                    idx
                }
                None => {
                    warn!("alloc({}): no free page available for size class {}", size_class, size_class);
                    return core::ptr::null_mut();
                }
            },
        };
        let state = self.pages[page_idx];
        let (header_offset, new_state) = small::alloc_in_page(&mut self.bytes, page_idx, state);
        self.pages[page_idx] = new_state;
        self.ptr_at(header_offset + HDR)
    }

    fn alloc_large(&mut self, pg_run_length: usize) -> *mut u8 {
        match large::find_free_run(&self.pages, pg_run_length) {
            Some(head) => {
                let base = large::init_run(&mut self.bytes, &mut self.pages, head, pg_run_length);
                self.ptr_at(base + HDR)
            }
            None => {
                warn!("alloc: no run of {} contiguous free pages available", pg_run_length);
                core::ptr::null_mut()
            }
        }
    }

    /// Resolve `ptr` to a live block, or log the appropriate diagnostic
    /// and return `Err`. Contract failures are a no-op plus a diagnostic,
    /// never a panic.
    fn resolve_live(&self, ptr: *mut u8, op: &str) -> Result<(usize, usize, BlockHeader), ()> {
        let offset = match self.offset_of(ptr) {
            Some(offset) => offset,
            None => {
                error!("{}(): pointer {:p} is not owned by this arena", op, ptr);
                return Err(());
            }
        };
        match resolve::resolve(&self.bytes, &self.pages, offset) {
            Ok((page_idx, header_offset)) => {
                let header = BlockHeader::read_at(&self.bytes, header_offset);
                Ok((page_idx, header_offset, header))
            }
            Err(ResolveError::NotOwned) => {
                error!("{}(): pointer {:p} is not owned by this arena", op, ptr);
                Err(())
            }
            Err(ResolveError::NotFound) => {
                error!("{}(): pointer {:p} does not resolve to a live block", op, ptr);
                Err(())
            }
            Err(ResolveError::AlreadyFree) => {
                error!("{}(): block at {:p} is already free", op, ptr);
                Err(())
            }
        }
    }

    /// Release the block owning `ptr`. Double-free and foreign pointers
    /// are rejected with a diagnostic; state is left unchanged.
    pub fn free(&mut self, ptr: *mut u8) {
        let (page_idx, header_offset, _header) = match self.resolve_live(ptr, "free") {
            Ok(v) => v,
            Err(()) => return,
        };
        match self.pages[page_idx] {
            PageState::MultiBlk { .. } => {
                let state = self.pages[page_idx];
                self.pages[page_idx] = small::free_in_page(&mut self.bytes, page_idx, header_offset, state);
            }
            PageState::SingleBlk { .. } => {
                large::free_run(&mut self.bytes, &mut self.pages, page_idx);
            }
            PageState::Free | PageState::SIntermediate => {
                unreachable!("resolve() only ever returns a MultiBlk or SingleBlk head page")
            }
        }
    }

    /// Resize the block owning `ptr` to `sz` bytes. Shrinking or staying
    /// within the current class returns `ptr` unchanged;
    /// growing migrates to a fresh block and copies the old payload.
    /// Returns null (leaving the original block intact) if the fresh
    /// allocation fails or `ptr` is invalid.
    pub fn realloc(&mut self, ptr: *mut u8, sz: usize) -> *mut u8 {
        let (_page_idx, _header_offset, header) = match self.resolve_live(ptr, "realloc") {
            Ok(v) => v,
            Err(()) => return core::ptr::null_mut(),
        };

        if header.payload_size >= sz {
            return ptr;
        }

        let new_ptr = self.alloc(sz);
        if new_ptr.is_null() {
            warn!("realloc(): fresh allocation of {} bytes failed, original block left intact", sz);
            return core::ptr::null_mut();
        }

        // Safety: `ptr` and `new_ptr` are both live, disjoint blocks
        // inside `self.bytes`; `header.payload_size` bytes were valid at
        // `ptr` and `new_ptr`'s block is at least that large (classify
        // only grows).
        unsafe {
            core::ptr::copy_nonoverlapping(ptr, new_ptr, header.payload_size);
        }
        self.free(ptr);
        new_ptr
    }

    /// Write a diagnostic rendering of the arena to the log's info
    /// channel.
    pub fn dump(&self) {
        info!("mem dump:");
        for page_idx in 0..PG_AMOUNT {
            let line = dump::render_page(&self.bytes, &self.pages[page_idx], page_idx);
            // Safety: `render_page` only ever writes the ASCII bytes
            // b' ', b'#', b'-', b'!'.
            let text = unsafe { core::str::from_utf8_unchecked(&line) };
            let addr = self.bytes.as_ptr() as usize + page_idx * crate::config::PG_SIZE;
            info!("[{}] addr={:#06x}\t%{}%", page_idx, addr, text);
        }
    }
}

impl Default for Allocator {
    fn default() -> Self {
        Allocator::new()
    }
}
