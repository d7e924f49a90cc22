//! Row-scoped storage-key derivation.
//!
//! A sub-field belonging to row `i` of a composite named `base` is stored
//! under `{base}_{i}_{sub}`. This derivation is the single invariant that
//! makes round-tripping possible; callers re-derive it at every use instead
//! of caching, since row indices and base names shift between calls.

/// Storage name for one sub-field of one indexed row.
#[must_use]
pub fn row_scoped_name(base: &str, index: usize, sub: &str) -> String {
    format!("{base}_{index}_{sub}")
}

/// Storage name for one sub-field of a group (single implicit row).
#[must_use]
pub fn group_scoped_name(base: &str, sub: &str) -> String {
    format!("{base}_{sub}")
}

///
/// TESTS
///
