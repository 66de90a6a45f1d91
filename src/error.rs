//! Internal error types.
//!
//! These never escape the public API as `Result`s: the public surface
//! keeps the pointer-or-null / no-op contract a C allocator gives you, but
//! typing failures internally keeps `resolve.rs` and `arena.rs`'s dispatch
//! logic honest about *why* an operation failed. Capacity failures (no
//! free page, no free run) don't need a typed error of their own:
//! `small`'s and `large`'s lookups already return `Option`, and `arena.rs`
//! logs the reason directly at the call site.

/// A contract failure: the caller passed an address this allocator does
/// not own, or targeted an already-free block. Collapses to a no-op with a
/// diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ResolveError {
    /// The address does not fall inside the arena at all.
    NotOwned,
    /// The address falls inside the arena but no live header covers it
    /// (e.g. it points at a `Free` or `SIntermediate` page reached without
    /// first resolving to its head).
    NotFound,
    /// The resolved block exists but is already free (double-free guard).
    AlreadyFree,
}
