//! Per-page state.
//!
//! Expressed as a single sum type rather than a flat struct plus a
//! discriminant and a union for the class/run-length field, so Rust
//! enforces "every page is in exactly one state" at the type level
//! instead of by convention.

/// The state of one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PageState {
    /// Unused; available for multi-block initialization or as part of a
    /// large run.
    Free,
    /// Hosts many equal-sized blocks of `size_class`.
    MultiBlk {
        size_class: usize,
        /// Byte offset (within the page) of the first non-busy header, or
        /// `None` if the page is full.
        first_free_block: Option<usize>,
        free_count: usize,
    },
    /// Head page of a contiguous run of `pg_run_length` pages hosting one
    /// block.
    SingleBlk { pg_run_length: usize },
    /// Interior (non-head) page of a large run; carries no block state of
    /// its own.
    SIntermediate,
}

impl PageState {
    pub(crate) fn is_free(&self) -> bool {
        matches!(self, PageState::Free)
    }

    pub(crate) fn as_multiblk(&self) -> Option<(usize, Option<usize>, usize)> {
        match *self {
            PageState::MultiBlk { size_class, first_free_block, free_count } => {
                Some((size_class, first_free_block, free_count))
            }
            _ => None,
        }
    }
}

impl Default for PageState {
    fn default() -> Self {
        PageState::Free
    }
}
