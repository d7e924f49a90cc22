//! Client-side paginated row reconciliation: merges server-fetched pages
//! with locally pending, unsaved row edits. Data entered by the user and
//! not yet confirmed saved is never silently discarded by a refresh.

mod debounce;
mod page;
mod status;

pub use debounce::{CONTENT_DEBOUNCE_MS, COSMETIC_DEBOUNCE_MS, Debounce, RefreshKind};
pub use page::{FetchToken, MergeOutcome, PageRequest, PageResponse, TEMPLATE_ROW_INDEX, TitleRequest};
pub use status::{RowId, RowStatus};

use crate::{
    error::InternalError,
    obs::sink::{self, MetricsEvent},
    row::RowValue,
};
use fieldset_schema::types::FieldKey;
use std::collections::BTreeMap;
use ulid::Ulid;

///
/// TrackedRow
///

#[derive(Clone, Debug, PartialEq)]
pub struct TrackedRow {
    pub id: RowId,
    /// Server row index, for rows the server has seen.
    pub server_index: Option<usize>,
    pub status: RowStatus,
    pub value: RowValue,
}

///
/// RowReconciler
///
/// State machine per composite-field instance. Fetches are single-flight:
/// a new navigation supersedes any outstanding token, and a stale token's
/// result is discarded rather than applied.
///

#[derive(Debug)]
pub struct RowReconciler {
    field_key: FieldKey,
    rows_per_page: usize,
    page: usize,
    total_rows: usize,

    tracked: BTreeMap<RowId, TrackedRow>,
    /// Display order for the current page, deleted rows included (hidden).
    order: Vec<RowId>,

    fetch_seq: u64,
    inflight: Option<FetchToken>,
    needs_reload: bool,
}

impl RowReconciler {
    #[must_use]
    pub fn new(field_key: FieldKey, rows_per_page: usize) -> Self {
        Self {
            field_key,
            rows_per_page: rows_per_page.max(1),
            page: 0,
            total_rows: 0,
            tracked: BTreeMap::new(),
            order: Vec::new(),
            fetch_seq: 0,
            inflight: None,
            needs_reload: false,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    #[must_use]
    pub const fn page(&self) -> usize {
        self.page
    }

    #[must_use]
    pub const fn total_rows(&self) -> usize {
        self.total_rows
    }

    #[must_use]
    pub const fn page_count(&self) -> usize {
        let pages = self.total_rows.div_ceil(self.rows_per_page);
        if pages == 0 { 1 } else { pages }
    }

    #[must_use]
    pub const fn needs_reload(&self) -> bool {
        self.needs_reload
    }

    #[must_use]
    pub fn row(&self, id: RowId) -> Option<&TrackedRow> {
        self.tracked.get(&id)
    }

    /// Rows in display order, deleted rows excluded.
    pub fn visible(&self) -> impl Iterator<Item = &TrackedRow> {
        self.order
            .iter()
            .filter_map(|id| self.tracked.get(id))
            .filter(|row| !row.status.is_deleted())
    }

    // ------------------------------------------------------------------
    // Fetch lifecycle
    // ------------------------------------------------------------------

    /// Issue a fetch for one page, superseding any outstanding fetch for
    /// this field instance.
    pub fn begin_fetch(&mut self, page: usize, force_refresh: bool) -> (FetchToken, PageRequest) {
        self.fetch_seq += 1;
        let token = FetchToken {
            seq: self.fetch_seq,
            page,
        };
        self.inflight = Some(token);

        let request = PageRequest {
            field_key: self.field_key.clone(),
            page,
            rows_per_page: self.rows_per_page,
            force_refresh,
        };

        (token, request)
    }

    /// Merge a fetched page. A token that is no longer the outstanding one
    /// describes a page the user already navigated away from; its result
    /// is discarded.
    pub fn apply_page(&mut self, token: FetchToken, response: &PageResponse) -> MergeOutcome {
        if self.inflight != Some(token) {
            sink::record(MetricsEvent::FetchSuperseded);
            return MergeOutcome::Superseded;
        }

        self.inflight = None;
        self.page = token.page;
        self.total_rows = response.total_rows;
        self.needs_reload = false;
        self.clamp_page();

        let by_server_index: BTreeMap<usize, RowId> = self
            .tracked
            .values()
            .filter_map(|row| row.server_index.map(|index| (index, row.id)))
            .collect();

        // Server sequence first; unsaved local rows always win over the
        // server's copy for the same row key.
        let mut merged: Vec<RowId> = Vec::with_capacity(response.rows.len());
        for (&index, value) in &response.rows {
            if index == TEMPLATE_ROW_INDEX {
                continue;
            }

            let id = match by_server_index.get(&index) {
                Some(&id) if self.tracked[&id].status.is_dirty() => id,
                Some(&id) => {
                    if let Some(row) = self.tracked.get_mut(&id) {
                        row.value = value.clone();
                    }
                    id
                }
                None => {
                    let id = Self::server_row_id(index);
                    self.tracked.insert(
                        id,
                        TrackedRow {
                            id,
                            server_index: Some(index),
                            status: RowStatus::Clean,
                            value: value.clone(),
                        },
                    );
                    id
                }
            };
            merged.push(id);
        }

        // Splice locally inserted rows at their recorded anchors; append
        // locally added rows, both in their previous relative order.
        let previous: Vec<RowId> = self.order.clone();
        for id in previous {
            let Some(row) = self.tracked.get(&id) else {
                continue;
            };
            match row.status {
                RowStatus::Inserted { anchor } => {
                    let at = merged.iter().position(|m| *m == anchor).unwrap_or(merged.len());
                    if !merged.contains(&id) {
                        merged.insert(at, id);
                    }
                }
                RowStatus::Added => {
                    if !merged.contains(&id) {
                        merged.push(id);
                    }
                }
                _ => {}
            }
        }

        // Reapply unsaved reorders: a locally moved row keeps its target
        // position, not the server's stale order.
        let reordered: Vec<(RowId, usize)> = merged
            .iter()
            .filter_map(|id| match self.tracked.get(id).map(|row| row.status) {
                Some(RowStatus::Reordered { target }) => Some((*id, target)),
                _ => None,
            })
            .collect();
        for (id, target) in reordered {
            if let Some(from) = merged.iter().position(|existing| *existing == id) {
                let moved = merged.remove(from);
                merged.insert(target.min(merged.len()), moved);
            }
        }

        // Clean rows that fell off the current page are dropped; dirty
        // rows from other pages survive until save.
        let keep: Vec<RowId> = self
            .tracked
            .values()
            .filter(|row| !row.status.is_dirty() && !merged.contains(&row.id))
            .map(|row| row.id)
            .collect();
        for id in keep {
            self.tracked.remove(&id);
        }

        self.order = merged;

        MergeOutcome::Applied {
            visible: self
                .visible()
                .map(|row| row.id)
                .collect(),
        }
    }

    // ------------------------------------------------------------------
    // Local edits
    // ------------------------------------------------------------------

    /// Record a sub-field edit on a row.
    pub fn edit(&mut self, id: RowId, value: RowValue) -> Result<(), InternalError> {
        let row = self.row_mut(id)?;

        match row.status {
            RowStatus::Deleted => {
                return Err(InternalError::reconcile_conflict(format!(
                    "row {id} is deleted; edits are not accepted"
                )));
            }
            RowStatus::Clean => row.status = RowStatus::Changed,
            // Already dirty in a way that survives the edit.
            RowStatus::Added
            | RowStatus::Changed
            | RowStatus::Reordered { .. }
            | RowStatus::Inserted { .. } => {}
        }

        row.value = value;
        Ok(())
    }

    /// Create a new row appended at the end.
    pub fn add(&mut self, id: RowId, value: RowValue) -> Result<(), InternalError> {
        self.insert_tracked(id, value, RowStatus::Added)?;
        self.order.push(id);
        self.total_rows += 1;
        Ok(())
    }

    /// Create a new row spliced before an existing one.
    pub fn insert_before(
        &mut self,
        id: RowId,
        anchor: RowId,
        value: RowValue,
    ) -> Result<(), InternalError> {
        if !self.tracked.contains_key(&anchor) {
            return Err(InternalError::reconcile_not_found(format!(
                "insert anchor {anchor} is not a known row"
            )));
        }

        self.insert_tracked(id, value, RowStatus::Inserted { anchor })?;
        let at = self
            .order
            .iter()
            .position(|existing| *existing == anchor)
            .unwrap_or(self.order.len());
        self.order.insert(at, id);
        self.total_rows += 1;
        Ok(())
    }

    /// Remove a row. Rows the server has seen are hidden until save so
    /// navigation can undo; provisional rows vanish outright.
    pub fn remove(&mut self, id: RowId) -> Result<(), InternalError> {
        let row = self.row_mut(id)?;

        match row.status {
            RowStatus::Deleted => return Ok(()),
            RowStatus::Added | RowStatus::Inserted { .. } => {
                self.tracked.remove(&id);
                self.order.retain(|existing| *existing != id);
            }
            RowStatus::Clean | RowStatus::Changed | RowStatus::Reordered { .. } => {
                row.status = RowStatus::Deleted;
            }
        }

        self.total_rows = self.total_rows.saturating_sub(1);
        self.clamp_page();
        Ok(())
    }

    /// Move a row to a new displayed position.
    pub fn reorder(&mut self, id: RowId, target: usize) -> Result<(), InternalError> {
        let row = self.row_mut(id)?;

        match row.status {
            RowStatus::Deleted => {
                return Err(InternalError::reconcile_conflict(format!(
                    "row {id} is deleted; it cannot be reordered"
                )));
            }
            // Provisional rows have no server order to diverge from.
            RowStatus::Added | RowStatus::Inserted { .. } => {}
            RowStatus::Clean | RowStatus::Changed | RowStatus::Reordered { .. } => {
                row.status = RowStatus::Reordered { target };
            }
        }

        if let Some(from) = self.order.iter().position(|existing| *existing == id) {
            let moved = self.order.remove(from);
            let at = target.min(self.order.len());
            self.order.insert(at, moved);
        }

        Ok(())
    }

    /// A successful save confirmed every pending edit: statuses reset to
    /// clean, provisional order markers are discarded, and the next reload
    /// provides the server-confirmed order.
    pub fn confirm_saved(&mut self) {
        let deleted: Vec<RowId> = self
            .tracked
            .values()
            .filter(|row| row.status.is_deleted())
            .map(|row| row.id)
            .collect();
        for id in deleted {
            self.tracked.remove(&id);
            self.order.retain(|existing| *existing != id);
        }

        for row in self.tracked.values_mut() {
            row.status = RowStatus::Clean;
            // Final numbering comes from the reload.
            row.server_index = None;
        }

        self.needs_reload = true;
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn insert_tracked(
        &mut self,
        id: RowId,
        value: RowValue,
        status: RowStatus,
    ) -> Result<(), InternalError> {
        if self.tracked.contains_key(&id) {
            return Err(InternalError::reconcile_conflict(format!(
                "row id {id} already exists"
            )));
        }

        self.tracked.insert(
            id,
            TrackedRow {
                id,
                server_index: None,
                status,
                value,
            },
        );
        Ok(())
    }

    fn row_mut(&mut self, id: RowId) -> Result<&mut TrackedRow, InternalError> {
        self.tracked
            .get_mut(&id)
            .ok_or_else(|| InternalError::reconcile_not_found(format!("unknown row id {id}")))
    }

    /// If the viewed page fell past the end, force a reload of the new
    /// last page.
    fn clamp_page(&mut self) {
        let last = self.page_count() - 1;
        if self.page > last {
            self.page = last;
            self.needs_reload = true;
        }
    }

    /// Stable identity for a server row: derived from its index so repeat
    /// fetches of the same page converge on the same id.
    fn server_row_id(index: usize) -> RowId {
        RowId::new(Ulid::from_parts(0, index as u128 + 1))
    }
}

///
/// TESTS
///
