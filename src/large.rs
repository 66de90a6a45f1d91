//! The large-block engine: contiguous runs of pages hosting one block
//! each.
//!
//! Plays the same role as mimalloc's segment/page-of-pages bookkeeping for
//! large and huge allocations, minus the OS-backed growth and
//! thread-local reclaim machinery a fixed, single-threaded arena has no
//! use for.

use crate::config::{PG_AMOUNT, PG_SIZE};
use crate::header::{BlockHeader, HDR};
use crate::page::PageState;

/// First run of `pg_run_length` consecutive `Free` pages, in index order.
pub(crate) fn find_free_run(pages: &[PageState], pg_run_length: usize) -> Option<usize> {
    if pg_run_length == 0 || pg_run_length > PG_AMOUNT {
        return None;
    }
    (0..=PG_AMOUNT - pg_run_length).find(|&start| {
        pages[start..start + pg_run_length].iter().all(PageState::is_free)
    })
}

/// Write the head header and mark the run's page states. Returns the
/// run's absolute header offset.
pub(crate) fn init_run(bytes: &mut [u8], pages: &mut [PageState; PG_AMOUNT], head: usize, pg_run_length: usize) -> usize {
    let base = head * PG_SIZE;
    let payload_size = pg_run_length * PG_SIZE - HDR;
    BlockHeader { payload_size, busy: true }.write_at(bytes, base);

    pages[head] = PageState::SingleBlk { pg_run_length };
    for page in pages.iter_mut().skip(head + 1).take(pg_run_length - 1) {
        *page = PageState::SIntermediate;
    }
    base
}

/// Release the run headed by `head`: flip the header's busy bit and
/// return every page in the run to `Free`.
pub(crate) fn free_run(bytes: &mut [u8], pages: &mut [PageState; PG_AMOUNT], head: usize) {
    let pg_run_length = match pages[head] {
        PageState::SingleBlk { pg_run_length } => pg_run_length,
        _ => panic!("internal invariant violated: free_run called on a non-head page"),
    };
    let base = head * PG_SIZE;
    let mut header = BlockHeader::read_at(bytes, base);
    header.busy = false;
    header.write_at(bytes, base);

    for page in pages.iter_mut().skip(head).take(pg_run_length) {
        *page = PageState::Free;
    }
}
