//! Stack growth for the recursive walks over syntax trees.
//!
//! Parsing, resolution, renaming, printing and reduction all recurse once per
//! level of nesting. Each of them wraps its recursive step in
//! [`ensure_sufficient_stack`] so deeply nested input grows the native stack
//! instead of overflowing it.

/// Remaining stack below which a new segment is allocated.
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated segment.
const STACK_PER_RECURSION: usize = 2 * 1024 * 1024;

#[inline]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}
