use crate::{reconcile::RowId, row::RowValue};
use fieldset_schema::types::FieldKey;
use std::collections::BTreeMap;

/// Sentinel index for template/preview rows. Such rows exist only in the
/// editing surface and are never persisted; the merge ignores them.
pub const TEMPLATE_ROW_INDEX: usize = usize::MAX;

///
/// PageRequest
///
/// What the reconciler hands the transport collaborator to fetch one page.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PageRequest {
    pub field_key: FieldKey,
    pub page: usize,
    pub rows_per_page: usize,
    pub force_refresh: bool,
}

///
/// PageResponse
///
/// One fetched page: rendered rows keyed by server row index, plus the
/// authoritative total.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PageResponse {
    pub rows: BTreeMap<usize, RowValue>,
    pub total_rows: usize,
}

///
/// FetchToken
///
/// Single-flight bookkeeping: a token is valid only while it is the most
/// recent fetch issued for its field instance.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FetchToken {
    pub(crate) seq: u64,
    pub(crate) page: usize,
}

impl FetchToken {
    #[must_use]
    pub const fn page(&self) -> usize {
        self.page
    }
}

///
/// MergeOutcome
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MergeOutcome {
    /// The page was merged; ids are in display order, deleted rows hidden.
    Applied { visible: Vec<RowId> },
    /// A newer navigation superseded this fetch; its result was discarded.
    Superseded,
}

///
/// TitleRequest
///
/// Row-title refresh request, produced after a debounced edit and consumed
/// by the transport collaborator.
///

#[derive(Clone, Debug, PartialEq)]
pub struct TitleRequest {
    pub field_key: FieldKey,
    pub row_index: usize,
    pub layout_tag: Option<fieldset_schema::types::LayoutTag>,
    pub row_value: RowValue,
}
