use derive_more::Display;
use ulid::Ulid;

///
/// RowId
///
/// Client-local row identity. Minted by the editing surface for rows it
/// creates; the reconciler derives stable ids for server-fetched rows.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct RowId(Ulid);

impl RowId {
    #[must_use]
    pub const fn new(id: Ulid) -> Self {
        Self(id)
    }
}

impl From<u128> for RowId {
    fn from(raw: u128) -> Self {
        Self(Ulid(raw))
    }
}

///
/// RowStatus
///
/// Transient client-side annotation tracking a row's unsaved local state.
/// Never persisted as field data; a successful save resets it to `Clean`.
/// Invalid combinations (deleted + inserted) are unrepresentable.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RowStatus {
    /// Matches the last known server state.
    Clean,
    /// Created locally, appended at the end.
    Added,
    /// Existing row with an unsaved sub-field edit.
    Changed,
    /// Removed locally; hidden but retained until the next save.
    Deleted,
    /// Existing row whose displayed order changed, with the new target.
    Reordered { target: usize },
    /// Created locally and spliced before an existing row. Final numbering
    /// is only authoritative once the server has persisted and renumbered.
    Inserted { anchor: RowId },
}

impl RowStatus {
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        !matches!(self, Self::Clean)
    }

    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        matches!(self, Self::Deleted)
    }

    /// True for rows the server has never seen.
    #[must_use]
    pub const fn is_provisional(&self) -> bool {
        matches!(self, Self::Added | Self::Inserted { .. })
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_is_the_only_non_dirty_status() {
        assert!(!RowStatus::Clean.is_dirty());
        assert!(RowStatus::Changed.is_dirty());
        assert!(RowStatus::Deleted.is_dirty());
        assert!(RowStatus::Reordered { target: 3 }.is_dirty());
        assert!(RowStatus::Inserted { anchor: RowId::from(7) }.is_dirty());
    }
}
